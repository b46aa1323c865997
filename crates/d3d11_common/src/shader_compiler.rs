use std::ffi::CString;
use std::path::Path;

use tracing::debug;
use tracing::error;
use windows::core::HSTRING;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D::Fxc::D3DCompileFromFile;
use windows::Win32::Graphics::Direct3D::Fxc::D3DCOMPILE_DEBUG;
use windows::Win32::Graphics::Direct3D::Fxc::D3DCOMPILE_ENABLE_STRICTNESS;
use windows::Win32::Graphics::Direct3D::Fxc::D3DCOMPILE_SKIP_OPTIMIZATION;
use windows::Win32::Graphics::Direct3D::ID3DBlob;

use crate::asset::ResourceLoader;
use crate::asset::ShaderBytecode;
use crate::asset::ShaderOptions;
use crate::error::AssetError;
use crate::error::MyResult;

/// Compiles HLSL source files with the legacy FXC compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct FxcCompiler;

pub(crate) fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
    }
}

impl ResourceLoader for FxcCompiler {
    type Resource = ShaderBytecode;
    type Options = ShaderOptions;

    fn load(&self, path: &Path, options: &ShaderOptions) -> MyResult<ShaderBytecode> {
        let name = path.display().to_string();
        let entry_point = CString::new(options.entry_point.as_str())
            .map_err(|e| eyre::eyre!("bad entry point {:?}: {e}", options.entry_point))?;
        let profile = CString::new(options.profile.as_str())
            .map_err(|e| eyre::eyre!("bad profile {:?}: {e}", options.profile))?;

        let mut flags = D3DCOMPILE_ENABLE_STRICTNESS;
        if options.debug {
            flags |= D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION;
        }

        debug!("Compiling {name} ({} {})", options.entry_point, options.profile);
        let mut shader_blob = None;
        let mut error_blob = None;
        let result = unsafe {
            D3DCompileFromFile(
                &HSTRING::from(path.as_os_str()),
                None,
                None,
                PCSTR(entry_point.as_ptr() as *const u8),
                PCSTR(profile.as_ptr() as *const u8),
                flags,
                0,
                &mut shader_blob,
                Some(&mut error_blob),
            )
        };

        if let Err(e) = result {
            let message = match &error_blob {
                Some(blob) => String::from_utf8_lossy(blob_bytes(blob)).trim().to_owned(),
                None => e.message(),
            };
            error!(
                "Shader compile error in {name} ({} {}): {message}",
                options.entry_point, options.profile
            );
            return Err(AssetError::ShaderCompile {
                name,
                entry_point: options.entry_point.clone(),
                profile: options.profile.clone(),
                message,
            }
            .into());
        }

        let blob =
            shader_blob.ok_or_else(|| eyre::eyre!("compiler returned no bytecode for {name}"))?;
        Ok(ShaderBytecode {
            name,
            entry_point: options.entry_point.clone(),
            profile: options.profile.clone(),
            bytes: blob_bytes(&blob).to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const VALID: &str = "float4 VSMain(float3 position : POSITION) : SV_POSITION\n\
                         {\n    return float4(position, 1.0f);\n}\n";
    const BROKEN: &str = "float4 VSMain(float3 position : POSITION) : SV_POSITION\n\
                          {\n    return undeclared_value;\n}\n";

    fn options(entry_point: &str, debug: bool) -> ShaderOptions {
        ShaderOptions {
            debug,
            ..ShaderOptions::new("vs_5_0", entry_point)
        }
    }

    #[test]
    fn valid_source_compiles_to_dxbc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid.hlsl");
        fs::write(&path, VALID).unwrap();

        let release = FxcCompiler.load(&path, &options("VSMain", false)).unwrap();
        assert!(release.as_bytes().starts_with(b"DXBC"));
        assert_eq!(release.entry_point, "VSMain");
        assert_eq!(release.profile, "vs_5_0");
        assert_eq!(release.name, path.display().to_string());

        // debug builds embed extra information in the container
        let debug = FxcCompiler.load(&path, &options("VSMain", true)).unwrap();
        assert!(debug.as_bytes().starts_with(b"DXBC"));
        assert_ne!(debug.as_bytes(), release.as_bytes());
    }

    #[test]
    fn compile_errors_carry_the_compiler_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.hlsl");
        fs::write(&path, BROKEN).unwrap();

        let error = FxcCompiler.load(&path, &options("VSMain", true)).unwrap_err();
        match error.downcast_ref::<AssetError>() {
            Some(AssetError::ShaderCompile {
                name,
                entry_point,
                profile,
                message,
            }) => {
                assert_eq!(name, &path.display().to_string());
                assert_eq!(entry_point, "VSMain");
                assert_eq!(profile, "vs_5_0");
                assert!(message.contains("undeclared_value"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_entry_points_and_files_are_compile_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid.hlsl");
        fs::write(&path, VALID).unwrap();

        for (path, entry_point) in [
            (path.clone(), "PSMain"),
            (dir.path().join("absent.hlsl"), "VSMain"),
        ] {
            let error = FxcCompiler.load(&path, &options(entry_point, false)).unwrap_err();
            match error.downcast_ref::<AssetError>() {
                Some(AssetError::ShaderCompile { message, .. }) => assert!(!message.is_empty()),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }
}

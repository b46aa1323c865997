use std::path::PathBuf;

use crate::shader_model::ShaderStage;

pub type MyResult<T, E = MyReport> = core::result::Result<T, E>;

pub struct MyReport {
    inner: eyre::Report,
}

impl MyReport {
    /// Borrows the typed error this report was built from, if it is an `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    pub fn wrap_err(self, context: impl std::fmt::Display + Send + Sync + 'static) -> Self {
        Self {
            inner: self.inner.wrap_err(context),
        }
    }
}

impl From<eyre::Report> for MyReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl From<AssetError> for MyReport {
    fn from(error: AssetError) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl From<std::io::Error> for MyReport {
    fn from(error: std::io::Error) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl From<MyReport> for eyre::Report {
    fn from(report: MyReport) -> Self {
        report.inner
    }
}

impl std::fmt::Display for MyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::fmt::Debug for MyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for MyReport {
    fn from(error: windows::core::Error) -> Self {
        Self {
            inner: eyre::Report::new(WrappedWindowsError::from(error)),
        }
    }
}

/// Keeps the HRESULT and its system message together when a Win32 or
/// Direct3D call fails, so the report prints `0x80070057 The parameter is incorrect.`
#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl WrappedWindowsError {
    pub fn code(&self) -> windows::core::HRESULT {
        self.inner.code()
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x} {}", self.inner.code().0, self.inner.message())
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("search path {0:?} does not exist")]
    SearchPathMissing(PathBuf),

    #[error("resource {name:?} not found in any search path (tried {searched:?})")]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("model {0:?} contains no meshes")]
    EmptyModel(PathBuf),

    #[error("model is full, it was created for {capacity} meshes")]
    ModelFull { capacity: usize },

    #[error("invalid mesh {name:?}: {reason}")]
    InvalidMesh { name: String, reason: String },

    #[error("failed to compile {name:?} ({entry_point} {profile}): {message}")]
    ShaderCompile {
        name: String,
        entry_point: String,
        profile: String,
        message: String,
    },

    #[error("no {stage:?} shader profile is supported by this device")]
    UnsupportedShaderModel { stage: ShaderStage },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_errors_survive_the_report_wrapper() {
        let report: MyReport = AssetError::ModelFull { capacity: 2 }.into();
        assert!(matches!(
            report.downcast_ref::<AssetError>(),
            Some(AssetError::ModelFull { capacity: 2 })
        ));
        assert_eq!(
            report.to_string(),
            "model is full, it was created for 2 meshes"
        );
    }

    #[test]
    fn wrapped_context_keeps_the_source() {
        let report: MyReport = AssetError::SearchPathMissing(PathBuf::from("nope")).into();
        let report = report.wrap_err("adding search path");
        assert_eq!(report.to_string(), "adding search path");
        assert!(report.downcast_ref::<AssetError>().is_some());
    }
}

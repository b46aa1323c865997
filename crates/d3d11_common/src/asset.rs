//! Name keyed cache of models and compiled shaders, found through an ordered
//! list of search directories.

use std::collections::HashMap;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::AssetError;
use crate::error::MyResult;
use crate::model::ModelData;

/// Turns a file on disk into an in-memory resource.
pub trait ResourceLoader {
    type Resource;
    type Options;

    fn load(&self, path: &Path, options: &Self::Options) -> MyResult<Self::Resource>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderOptions {
    pub profile: String,
    pub entry_point: String,
    pub debug: bool,
}

impl ShaderOptions {
    pub fn new(profile: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            entry_point: entry_point.into(),
            debug: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBytecode {
    pub name: String,
    pub entry_point: String,
    pub profile: String,
    pub bytes: Vec<u8>,
}

impl ShaderBytecode {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct AssetManager<M, S> {
    model_loader: M,
    shader_loader: S,
    base_path: PathBuf,
    search_paths: Vec<PathBuf>,
    models: HashMap<String, ModelData>,
    shaders: HashMap<String, ShaderBytecode>,
}

impl<M, S> AssetManager<M, S>
where
    M: ResourceLoader<Resource = ModelData, Options = ()>,
    S: ResourceLoader<Resource = ShaderBytecode, Options = ShaderOptions>,
{
    pub fn new(model_loader: M, shader_loader: S) -> MyResult<Self> {
        let mut manager = Self {
            model_loader,
            shader_loader,
            base_path: PathBuf::new(),
            search_paths: Vec::new(),
            models: HashMap::new(),
            shaders: HashMap::new(),
        };
        manager.initialize()?;
        Ok(manager)
    }

    /// Records the current working directory as the base every search path
    /// is relative to.
    pub fn initialize(&mut self) -> MyResult<()> {
        self.base_path = std::env::current_dir()?;
        debug!("Asset base path is {}", self.base_path.display());
        Ok(())
    }

    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn add_path(&mut self, path: impl AsRef<Path>) -> MyResult<()> {
        let path = path.as_ref();
        let full = self.base_path.join(path);
        if !full.is_dir() {
            return Err(AssetError::SearchPathMissing(full).into());
        }
        info!("Added asset search path {}", full.display());
        self.search_paths.push(path.to_path_buf());
        Ok(())
    }

    /// Adds every path that exists, warning about the rest. Returns how many
    /// were added.
    pub fn add_existing_paths<P>(&mut self, paths: impl IntoIterator<Item = P>) -> usize
    where
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            match self.add_path(path) {
                Ok(()) => added += 1,
                Err(e) => warn!("Skipping asset search path: {e}"),
            }
        }
        added
    }

    /// First existing file called `name` across the search paths, in the
    /// order they were added. Names are always relative to a search path;
    /// rooted names never resolve.
    pub fn resolve(&self, name: &str) -> MyResult<PathBuf> {
        let rooted = Path::new(name)
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
        if rooted {
            debug!("Refusing to resolve rooted asset name {name:?}");
            return Err(AssetError::NotFound {
                name: name.to_owned(),
                searched: Vec::new(),
            }
            .into());
        }

        let mut searched = Vec::with_capacity(self.search_paths.len());
        for search_path in &self.search_paths {
            let candidate = self.base_path.join(search_path).join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
            searched.push(candidate);
        }
        Err(AssetError::NotFound {
            name: name.to_owned(),
            searched,
        }
        .into())
    }

    pub fn load_model(&mut self, name: &str) -> MyResult<&ModelData> {
        if !self.models.contains_key(name) {
            let path = self.resolve(name)?;
            let model = self
                .model_loader
                .load(&path, &())
                .map_err(|e| e.wrap_err(format!("loading model {name:?}")))?;
            info!(
                "Loaded model {name:?}: {} meshes, {} triangles",
                model.mesh_count(),
                model.triangle_count()
            );
            self.models.insert(name.to_owned(), model);
        }
        self.get_model(name)
            .ok_or_else(|| eyre::eyre!("model {name:?} missing from cache").into())
    }

    pub fn get_model(&self, name: &str) -> Option<&ModelData> {
        self.models.get(name)
    }

    pub fn load_shader(
        &mut self,
        name: &str,
        profile: &str,
        entry_point: &str,
    ) -> MyResult<&ShaderBytecode> {
        if !self.shaders.contains_key(name) {
            let path = self.resolve(name)?;
            let options = ShaderOptions::new(profile, entry_point);
            let shader = self.shader_loader.load(&path, &options)?;
            info!(
                "Loaded shader {name:?} ({entry_point} {profile}), {} bytes",
                shader.bytes.len()
            );
            self.shaders.insert(name.to_owned(), shader);
        }
        self.get_shader(name)
            .ok_or_else(|| eyre::eyre!("shader {name:?} missing from cache").into())
    }

    pub fn get_shader(&self, name: &str) -> Option<&ShaderBytecode> {
        self.shaders.get(name)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use super::*;
    use crate::model::MeshData;
    use crate::model::PositionNormalUv;

    #[derive(Default)]
    struct FakeModels {
        calls: Cell<usize>,
    }

    impl ResourceLoader for FakeModels {
        type Resource = ModelData;
        type Options = ();

        fn load(&self, path: &Path, _: &()) -> MyResult<ModelData> {
            self.calls.set(self.calls.get() + 1);
            if fs::read_to_string(path)?.contains("broken") {
                return Err(eyre::eyre!("unreadable model").into());
            }
            let mut model = ModelData::with_capacity(1)?;
            model.add_mesh(MeshData {
                name: "tri".to_owned(),
                vertices: vec![PositionNormalUv::default(); 3],
                indices: vec![0, 1, 2],
            })?;
            Ok(model)
        }
    }

    #[derive(Default)]
    struct FakeCompiler {
        calls: Cell<usize>,
    }

    impl ResourceLoader for FakeCompiler {
        type Resource = ShaderBytecode;
        type Options = ShaderOptions;

        fn load(&self, path: &Path, options: &ShaderOptions) -> MyResult<ShaderBytecode> {
            self.calls.set(self.calls.get() + 1);
            Ok(ShaderBytecode {
                name: path.display().to_string(),
                entry_point: options.entry_point.clone(),
                profile: options.profile.clone(),
                bytes: fs::read(path)?,
            })
        }
    }

    fn manager(base: &Path) -> AssetManager<FakeModels, FakeCompiler> {
        AssetManager::new(FakeModels::default(), FakeCompiler::default())
            .unwrap()
            .with_base_path(base)
    }

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn new_manager_starts_in_the_working_directory() {
        let manager = AssetManager::new(FakeModels::default(), FakeCompiler::default()).unwrap();
        assert_eq!(manager.base_path(), std::env::current_dir().unwrap());
        assert!(manager.search_paths().is_empty());
        assert_eq!(manager.model_count(), 0);
        assert_eq!(manager.shader_count(), 0);
    }

    #[test]
    fn only_existing_directories_become_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("raw")).unwrap();
        touch(&dir.path().join("file.txt"), "");
        let mut manager = manager(dir.path());

        manager.add_path("raw").unwrap();
        let missing = manager.add_path("missing").unwrap_err();
        assert!(matches!(
            missing.downcast_ref::<AssetError>(),
            Some(AssetError::SearchPathMissing(_))
        ));
        assert!(manager.add_path("file.txt").is_err());
        assert_eq!(manager.search_paths(), &[PathBuf::from("raw")]);
    }

    #[test]
    fn lenient_add_counts_what_it_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("raw")).unwrap();
        let mut manager = manager(dir.path());

        let added = manager.add_existing_paths(["gone", "raw", "also-gone"]);
        assert_eq!(added, 1);
        assert_eq!(manager.search_paths(), &[PathBuf::from("raw")]);
        assert_eq!(manager.add_existing_paths(Vec::<PathBuf>::new()), 0);
    }

    #[test]
    fn resolve_prefers_earlier_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("first/shared.hlsl"), "first");
        touch(&dir.path().join("second/shared.hlsl"), "second");
        touch(&dir.path().join("second/only.hlsl"), "only");
        let mut manager = manager(dir.path());
        manager.add_path("first").unwrap();
        manager.add_path("second").unwrap();

        assert_eq!(
            manager.resolve("shared.hlsl").unwrap(),
            dir.path().join("first").join("shared.hlsl")
        );
        assert_eq!(
            manager.resolve("only.hlsl").unwrap(),
            dir.path().join("second").join("only.hlsl")
        );
    }

    #[test]
    fn unresolved_names_list_every_candidate() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        let mut manager = manager(dir.path());
        manager.add_path("a").unwrap();
        manager.add_path("b").unwrap();

        let error = manager.resolve("ghost.obj").unwrap_err();
        match error.downcast_ref::<AssetError>() {
            Some(AssetError::NotFound { name, searched }) => {
                assert_eq!(name, "ghost.obj");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rooted_names_stay_inside_the_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("raw")).unwrap();
        let outside = dir.path().join("outside/secret.obj");
        touch(&outside, "v 0 0 0");
        let mut manager = manager(dir.path());
        manager.add_path("raw").unwrap();

        let error = manager.resolve(&outside.display().to_string()).unwrap_err();
        match error.downcast_ref::<AssetError>() {
            Some(AssetError::NotFound { searched, .. }) => assert!(searched.is_empty()),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(manager.load_model(&outside.display().to_string()).is_err());
        assert_eq!(manager.model_loader.calls.get(), 0);

        // nested relative names still resolve
        touch(&dir.path().join("raw/meshes/orb.obj"), "v 0 0 0");
        assert_eq!(
            manager.resolve("meshes/orb.obj").unwrap(),
            dir.path().join("raw").join("meshes/orb.obj")
        );
    }

    #[test]
    fn models_are_loaded_once_per_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("raw/orb.obj"), "v 0 0 0");
        let mut manager = manager(dir.path());
        manager.add_path("raw").unwrap();

        assert!(manager.get_model("orb.obj").is_none());
        assert_eq!(manager.load_model("orb.obj").unwrap().mesh_count(), 1);
        assert_eq!(manager.load_model("orb.obj").unwrap().mesh_count(), 1);
        assert_eq!(manager.model_loader.calls.get(), 1);
        assert_eq!(manager.model_count(), 1);
        assert!(manager.get_model("orb.obj").is_some());
    }

    #[test]
    fn failed_loads_leave_the_cache_alone() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("raw/bad.obj"), "broken");
        let mut manager = manager(dir.path());
        manager.add_path("raw").unwrap();

        assert!(manager.load_model("bad.obj").is_err());
        assert!(manager.load_model("absent.obj").is_err());
        assert_eq!(manager.model_count(), 0);
        assert!(manager.get_model("bad.obj").is_none());

        // a failure is not cached, the next call tries again
        assert!(manager.load_model("bad.obj").is_err());
        assert_eq!(manager.model_loader.calls.get(), 2);
    }

    #[test]
    fn shaders_are_compiled_once_with_the_requested_options() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("raw/basicVS.hlsl"), "bytecode");
        let mut manager = manager(dir.path());
        manager.add_path("raw").unwrap();

        let shader = manager.load_shader("basicVS.hlsl", "vs_5_0", "VSMain").unwrap();
        assert_eq!(shader.profile, "vs_5_0");
        assert_eq!(shader.entry_point, "VSMain");
        assert_eq!(shader.as_bytes(), b"bytecode");

        // the name alone is the cache key
        let again = manager.load_shader("basicVS.hlsl", "ps_5_0", "Other").unwrap();
        assert_eq!(again.entry_point, "VSMain");
        assert_eq!(manager.shader_loader.calls.get(), 1);
        assert_eq!(manager.shader_count(), 1);
        assert_eq!(manager.model_count(), 0);
    }

    #[test]
    fn absolute_search_paths_ignore_the_base() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("abs/model.obj"), "v 0 0 0");
        let mut manager = manager(Path::new("/definitely/not/here"));
        manager.add_path(dir.path().join("abs")).unwrap();

        assert_eq!(
            manager.resolve("model.obj").unwrap(),
            dir.path().join("abs").join("model.obj")
        );
    }
}

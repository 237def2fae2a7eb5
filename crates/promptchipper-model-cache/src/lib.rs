//! # promptchipper-model-cache
//!
//! Locates model artifacts on disk. Nothing is downloaded; artifacts are
//! expected to already be in the model directory.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories_next::ProjectDirs;

/// Attempt to build a System/$USER [`ProjectDirs`] for promptchipper.
///
/// Used to determine the default model directory.
pub fn promptchipper_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "crates", "promptchipper")
}

/// Environment variable key to override the default model directory.
pub const PROMPTCHIPPER_MODEL_DIR: &str = "PROMPTCHIPPER_MODEL_DIR";

/// File extensions recognized as model artifacts.
pub const MODEL_EXTENSIONS: &[&str] = &["json", "tiktoken", "model"];

/// Get the model directory for promptchipper.
///
/// The resolution order is:
/// 1. `path`, if present.
/// 2. [`PROMPTCHIPPER_MODEL_DIR`] env var.
/// 3. `project_dirs().data_dir()`
/// 4. `None`
pub fn resolve_model_dir<P: AsRef<Path>>(path: Option<P>) -> Option<PathBuf> {
    if let Some(path) = path {
        path.as_ref().to_path_buf().into()
    } else if let Ok(path) = env::var(PROMPTCHIPPER_MODEL_DIR) {
        PathBuf::from(path).into()
    } else if let Some(pds) = promptchipper_project_dirs() {
        pds.data_dir().to_path_buf().into()
    } else {
        None
    }
}

/// Options for [`ModelCache`].
#[derive(Clone, Default, Debug)]
pub struct ModelCacheOptions {
    /// Optional path to the model directory.
    pub model_dir: Option<PathBuf>,
}

impl ModelCacheOptions {
    /// Set the model directory.
    pub fn with_model_dir<P: AsRef<Path>>(
        self,
        model_dir: P,
    ) -> Self {
        Self {
            model_dir: Some(model_dir.as_ref().to_path_buf()),
        }
    }

    /// Resolve the options.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        self.model_dir = resolve_model_dir(self.model_dir);
        if self.model_dir.is_none() {
            anyhow::bail!("Unable to resolve model dir.");
        }
        Ok(self)
    }
}

/// A directory of model artifacts.
#[derive(Clone, Debug)]
pub struct ModelCache {
    model_dir: PathBuf,
}

impl ModelCache {
    /// Construct a new [`ModelCache`].
    pub fn init(options: ModelCacheOptions) -> anyhow::Result<Self> {
        let model_dir = options
            .resolve()?
            .model_dir
            .context("model dir resolved to nothing")?;

        log::debug!("model dir: {}", model_dir.display());

        Ok(Self { model_dir })
    }

    /// The model directory.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Resolve a model name or path to an existing artifact.
    ///
    /// `name` is used as-is when it names an existing file; otherwise it is
    /// looked up in the model directory, first verbatim, then with each of
    /// [`MODEL_EXTENSIONS`].
    pub fn resolve_model_path(
        &self,
        name: &str,
    ) -> anyhow::Result<PathBuf> {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return Ok(direct);
        }

        let candidates = std::iter::once(self.model_dir.join(name)).chain(
            MODEL_EXTENSIONS
                .iter()
                .map(|ext| self.model_dir.join(format!("{name}.{ext}"))),
        );
        for candidate in candidates {
            if candidate.is_file() {
                log::debug!("resolved model {name:?} to {}", candidate.display());
                return Ok(candidate);
            }
        }

        anyhow::bail!(
            "model {name:?} not found in {}",
            self.model_dir.display()
        )
    }

    /// List the model artifacts in the model directory, sorted by path.
    pub fn list_models(&self) -> anyhow::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.model_dir)
            .with_context(|| format!("failed to read {}", self.model_dir.display()))?;

        let mut models = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_model = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MODEL_EXTENSIONS.contains(&ext));
            if is_model && path.is_file() {
                models.push(path);
            }
        }
        models.sort();

        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempdir::TempDir;

    use super::*;

    #[test]
    #[serial]
    fn test_resolve_model_dir() {
        let original = env::var(PROMPTCHIPPER_MODEL_DIR);

        let no_path: Option<PathBuf> = None;
        let path = Some(PathBuf::from("/tmp/promptchipper"));
        let pds = promptchipper_project_dirs();
        let var_path = PathBuf::from("/tmp/promptchipper-models");

        // No env var.
        unsafe { env::remove_var(PROMPTCHIPPER_MODEL_DIR) }

        assert_eq!(resolve_model_dir(path.clone()), path.clone());

        assert_eq!(
            resolve_model_dir(no_path.clone()),
            pds.map(|pds| pds.data_dir().to_path_buf())
        );

        // With env var.
        unsafe { env::set_var(PROMPTCHIPPER_MODEL_DIR, var_path.to_str().unwrap()) }

        assert_eq!(resolve_model_dir(path.clone()), path.clone());

        assert_eq!(resolve_model_dir(no_path), Some(var_path.clone()));

        let cache = ModelCache::init(ModelCacheOptions::default()).unwrap();
        assert_eq!(cache.model_dir(), var_path.as_path());

        // restore original env var.
        match original {
            Ok(original) => unsafe { env::set_var(PROMPTCHIPPER_MODEL_DIR, original) },
            Err(_) => unsafe { env::remove_var(PROMPTCHIPPER_MODEL_DIR) },
        }
    }

    #[test]
    fn test_resolve_model_path() {
        let tmp_dir = TempDir::new("model_cache").unwrap();
        let tekken = tmp_dir.path().join("tekken.json");
        let ranks = tmp_dir.path().join("small.tiktoken");
        std::fs::write(&tekken, "{}").unwrap();
        std::fs::write(&ranks, "").unwrap();
        std::fs::write(tmp_dir.path().join("notes.txt"), "").unwrap();

        let cache =
            ModelCache::init(ModelCacheOptions::default().with_model_dir(tmp_dir.path())).unwrap();

        assert_eq!(cache.resolve_model_path("tekken").unwrap(), tekken);
        assert_eq!(cache.resolve_model_path("tekken.json").unwrap(), tekken);
        assert_eq!(cache.resolve_model_path("small").unwrap(), ranks);
        assert_eq!(
            cache.resolve_model_path(tekken.to_str().unwrap()).unwrap(),
            tekken
        );
        assert!(cache.resolve_model_path("absent").is_err());

        assert_eq!(cache.list_models().unwrap(), vec![ranks, tekken]);
    }

    #[test]
    fn test_list_missing_dir() {
        let cache = ModelCache::init(
            ModelCacheOptions::default().with_model_dir("/definitely/not/a/model/dir"),
        )
        .unwrap();
        assert!(cache.list_models().is_err());
    }
}

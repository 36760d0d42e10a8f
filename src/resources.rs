use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable that overrides the resource root directory.
pub const ROOT_ENV: &str = "COURTSIDE_ROOT";

/// Errors raised while reading scene assets from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {0} does not contain any meshes")]
    EmptyModel(PathBuf),
}

/// Resolves resource paths relative to a fixed root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    root: PathBuf,
}

impl ResourcePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `$COURTSIDE_ROOT` when set, otherwise the crate directory.
    pub fn from_env() -> Self {
        match env::var_os(ROOT_ENV) {
            Some(root) if !root.is_empty() => Self::new(root),
            _ => Self::new(env!("CARGO_MANIFEST_DIR")),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths_onto_root() {
        let paths = ResourcePaths::new("/data/scene");
        assert_eq!(
            paths.path("resources/textures/container2.png"),
            PathBuf::from("/data/scene/resources/textures/container2.png")
        );
    }

    #[test]
    fn missing_asset_error_names_the_path() {
        let err = AssetError::NotFound(PathBuf::from("resources/objects/ball/ball.obj"));
        assert_eq!(
            err.to_string(),
            "asset not found: resources/objects/ball/ball.obj"
        );
    }
}

use std::path::PathBuf;

use log::{error, info};

use crate::model::ModelData;
use crate::resources::{AssetError, ResourcePaths};
use crate::scene::{ModelId, DIFFUSE_MAP, SPECULAR_MAP};
use crate::texture::{TextureData, TextureError};

/// Outcome of loading one scene model from disk.
#[derive(Debug)]
pub struct ModelEntry {
    pub id: ModelId,
    pub path: PathBuf,
    pub model: Result<ModelData, AssetError>,
}

/// Outcome of loading one standalone texture from disk.
#[derive(Debug)]
pub struct TextureEntry {
    pub path: PathBuf,
    pub texture: Result<TextureData, TextureError>,
}

/// CPU-side assets for the whole scene. Failures are kept per asset so the
/// caller can substitute placeholders and keep going.
#[derive(Debug)]
pub struct SceneAssets {
    pub models: Vec<ModelEntry>,
    pub diffuse_map: TextureEntry,
    pub specular_map: TextureEntry,
}

impl SceneAssets {
    pub fn load(resources: &ResourcePaths) -> Self {
        let diffuse_map = load_texture_entry(resources.path(DIFFUSE_MAP));
        let specular_map = load_texture_entry(resources.path(SPECULAR_MAP));

        let models = ModelId::ALL
            .iter()
            .map(|&id| {
                let path = resources.path(id.path());
                let model = ModelData::load(&path);
                match &model {
                    Ok(model) => {
                        for texture in &model.textures_loaded {
                            info!("{} {}", texture.path.display(), texture.kind);
                        }
                    }
                    Err(err) => error!("{err}"),
                }
                ModelEntry { id, path, model }
            })
            .collect();

        Self {
            models,
            diffuse_map,
            specular_map,
        }
    }

    pub fn failures(&self) -> usize {
        let models = self.models.iter().filter(|m| m.model.is_err()).count();
        let textures = [&self.diffuse_map, &self.specular_map]
            .iter()
            .filter(|t| t.texture.is_err())
            .count();
        models + textures
    }
}

fn load_texture_entry(path: PathBuf) -> TextureEntry {
    let texture = TextureData::load(&path);
    if let Err(err) = &texture {
        error!("{err}");
    }
    TextureEntry { path, texture }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_assets_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let assets = SceneAssets::load(&ResourcePaths::new(dir.path()));
        assert_eq!(assets.models.len(), ModelId::ALL.len());
        assert_eq!(assets.failures(), ModelId::ALL.len() + 2);
        assert!(matches!(
            assets.models[0].model,
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn present_models_load_from_the_resource_root() {
        let dir = tempfile::tempdir().unwrap();
        let ball = dir.path().join(ModelId::PulseBall.path());
        fs::create_dir_all(ball.parent().unwrap()).unwrap();
        fs::write(&ball, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let assets = SceneAssets::load(&ResourcePaths::new(dir.path()));
        let entry = assets
            .models
            .iter()
            .find(|m| m.id == ModelId::PulseBall)
            .unwrap();
        assert_eq!(entry.path, ball);
        assert_eq!(entry.model.as_ref().unwrap().meshes.len(), 1);
        assert_eq!(assets.failures(), ModelId::ALL.len() + 1);
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec3;
use log::{debug, warn};

use crate::resources::AssetError;

/// Floats per interleaved vertex: `position.xyz`, `normal.xyz`, `uv.xy`.
pub const VERTEX_STRIDE: usize = 8;

/// Role a texture plays in the lighting shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Diffuse => "texture_diffuse",
            Self::Specular => "texture_specular",
        })
    }
}

/// Texture referenced by a model's materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture {
    pub path: PathBuf,
    pub kind: TextureKind,
}

/// Texture maps bound for one mesh, resolved relative to the OBJ file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialMaps {
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
}

/// One drawable part of a model with interleaved vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub material: MaterialMaps,
}

impl MeshData {
    /// Unit cube centred on the origin, one vertex per triangle corner.
    pub fn cube() -> Self {
        Self {
            name: "cube".to_string(),
            vertices: CUBE_VERTICES.to_vec(),
            indices: (0..(CUBE_VERTICES.len() / VERTEX_STRIDE) as u32).collect(),
            material: MaterialMaps::default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }
}

#[rustfmt::skip]
const CUBE_VERTICES: [f32; 36 * VERTEX_STRIDE] = [
    // positions        // normals        // uv
    -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 0.0,
     0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 0.0,
     0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 1.0,
     0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  1.0, 1.0,
    -0.5,  0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,  0.0, 0.0,

    -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 0.0,
     0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 1.0,
     0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  1.0, 1.0,
    -0.5,  0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,  0.0, 0.0,

    -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,  1.0, 0.0,
    -0.5,  0.5, -0.5,  -1.0,  0.0,  0.0,  1.0, 1.0,
    -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,  -1.0,  0.0,  0.0,  0.0, 0.0,
    -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,  1.0, 0.0,

     0.5,  0.5,  0.5,   1.0,  0.0,  0.0,  1.0, 0.0,
     0.5,  0.5, -0.5,   1.0,  0.0,  0.0,  1.0, 1.0,
     0.5, -0.5, -0.5,   1.0,  0.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -0.5,   1.0,  0.0,  0.0,  0.0, 1.0,
     0.5, -0.5,  0.5,   1.0,  0.0,  0.0,  0.0, 0.0,
     0.5,  0.5,  0.5,   1.0,  0.0,  0.0,  1.0, 0.0,

    -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  0.0, 1.0,
     0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  1.0, 1.0,
     0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  1.0, 0.0,
     0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5,   0.0, -1.0,  0.0,  0.0, 0.0,
    -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,  0.0, 1.0,

    -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  1.0, 1.0,
     0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  1.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5,  0.5,  0.5,   0.0,  1.0,  0.0,  0.0, 0.0,
    -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,  0.0, 1.0,
];

/// A model loaded from an OBJ file and its MTL library.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub path: PathBuf,
    pub meshes: Vec<MeshData>,
    /// Every distinct texture the materials reference, in discovery order.
    pub textures_loaded: Vec<LoadedTexture>,
}

impl ModelData {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        if !path.is_file() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }
        let (models, materials) =
            tobj::load_obj(path, &load_options()).map_err(|source| AssetError::Model {
                path: path.to_path_buf(),
                source,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::build(path, base_dir, models, materials)
    }

    /// Parses an OBJ held in memory; `mtl` answers any `mtllib` request.
    pub fn from_obj_str(
        name: &str,
        obj: &str,
        mtl: Option<&str>,
        base_dir: &Path,
    ) -> Result<Self, AssetError> {
        let path = base_dir.join(name);
        let mut reader = obj.as_bytes();
        let (models, materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
            match mtl {
                Some(mtl) => tobj::load_mtl_buf(&mut mtl.as_bytes()),
                None => Err(tobj::LoadError::OpenFileFailed),
            }
        })
        .map_err(|source| AssetError::Model {
            path: path.clone(),
            source,
        })?;
        Self::build(&path, base_dir, models, materials)
    }

    fn build(
        path: &Path,
        base_dir: &Path,
        models: Vec<tobj::Model>,
        materials: Result<Vec<tobj::Material>, tobj::LoadError>,
    ) -> Result<Self, AssetError> {
        let materials = materials.unwrap_or_else(|err| {
            warn!("failed to load materials for {}: {err}", path.display());
            Vec::new()
        });
        let material_maps: Vec<MaterialMaps> = materials
            .iter()
            .map(|material| MaterialMaps {
                diffuse: material.diffuse_texture.as_deref().map(|t| base_dir.join(t)),
                specular: material.specular_texture.as_deref().map(|t| base_dir.join(t)),
            })
            .collect();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());

        let mut meshes = Vec::with_capacity(models.len());
        let mut textures_loaded: Vec<LoadedTexture> = Vec::new();
        for model in models {
            let name = if model.name.is_empty() || model.name == "unnamed_object" {
                stem.clone()
            } else {
                model.name
            };
            let mesh = model.mesh;
            if mesh.indices.is_empty() {
                debug!("skipping mesh '{name}' without faces");
                continue;
            }

            let material = mesh
                .material_id
                .and_then(|id| material_maps.get(id))
                .cloned()
                .unwrap_or_default();
            for (texture, kind) in [
                (&material.diffuse, TextureKind::Diffuse),
                (&material.specular, TextureKind::Specular),
            ] {
                let Some(texture) = texture else {
                    continue;
                };
                if !textures_loaded.iter().any(|t| &t.path == texture) {
                    textures_loaded.push(LoadedTexture {
                        path: texture.clone(),
                        kind,
                    });
                }
            }

            meshes.push(MeshData {
                name,
                vertices: interleave(&mesh),
                indices: mesh.indices,
                material,
            });
        }

        if meshes.is_empty() {
            return Err(AssetError::EmptyModel(path.to_path_buf()));
        }

        for mesh in meshes.iter_mut() {
            if needs_normals(&mesh.vertices) {
                compute_normals(mesh);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            meshes,
            textures_loaded,
        })
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

fn interleave(mesh: &tobj::Mesh) -> Vec<f32> {
    let count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_texcoords = mesh.texcoords.len() / 2 == count;
    let mut vertices = Vec::with_capacity(count * VERTEX_STRIDE);
    for i in 0..count {
        vertices.extend_from_slice(&mesh.positions[i * 3..i * 3 + 3]);
        if has_normals {
            vertices.extend_from_slice(&mesh.normals[i * 3..i * 3 + 3]);
        } else {
            vertices.extend_from_slice(&[0.0; 3]);
        }
        if has_texcoords {
            vertices.extend_from_slice(&mesh.texcoords[i * 2..i * 2 + 2]);
        } else {
            vertices.extend_from_slice(&[0.0; 2]);
        }
    }
    vertices
}

fn needs_normals(vertices: &[f32]) -> bool {
    vertices
        .chunks_exact(VERTEX_STRIDE)
        .any(|chunk| chunk[3] == 0.0 && chunk[4] == 0.0 && chunk[5] == 0.0)
}

fn compute_normals(mesh: &mut MeshData) {
    let position = |vertices: &[f32], i: usize| {
        Vec3::from_slice(&vertices[i * VERTEX_STRIDE..i * VERTEX_STRIDE + 3])
    };
    let mut accum = vec![Vec3::ZERO; mesh.vertex_count()];

    for triangle in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let p0 = position(&mesh.vertices, i0);
        let p1 = position(&mesh.vertices, i1);
        let p2 = position(&mesh.vertices, i2);
        let normal = (p1 - p0).cross(p2 - p0);
        if normal.length_squared() > f32::EPSILON {
            let normal = normal.normalize();
            accum[i0] += normal;
            accum[i1] += normal;
            accum[i2] += normal;
        }
    }

    for (i, normal) in accum.into_iter().enumerate() {
        let normal = normal.normalize_or_zero();
        mesh.vertices[i * VERTEX_STRIDE + 3..i * VERTEX_STRIDE + 6]
            .copy_from_slice(&normal.to_array());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_OBJECTS: &str = "
mtllib court.mtl
o Floor
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
usemtl wood
f 1/1/1 2/2/1 3/3/1 4/4/1
o Hoop
v 0 3 0
v 1 3 0
v 0 4 0
usemtl metal
f 5 6 7
";

    const MATERIALS: &str = "
newmtl wood
map_Kd textures/wood.png
map_Ks textures/wood_spec.png
newmtl metal
map_Kd textures/wood.png
";

    #[test]
    fn splits_objects_into_meshes_with_material_maps() {
        let model =
            ModelData::from_obj_str("court.obj", TWO_OBJECTS, Some(MATERIALS), Path::new("/res"))
                .unwrap();
        assert_eq!(model.meshes.len(), 2);

        let floor = &model.meshes[0];
        assert_eq!(floor.name, "Floor");
        assert_eq!(floor.indices.len(), 6);
        assert_eq!(
            floor.material.diffuse,
            Some(PathBuf::from("/res/textures/wood.png"))
        );
        assert_eq!(
            floor.material.specular,
            Some(PathBuf::from("/res/textures/wood_spec.png"))
        );

        let hoop = &model.meshes[1];
        assert_eq!(hoop.material.specular, None);
    }

    #[test]
    fn shared_textures_are_listed_once() {
        let model =
            ModelData::from_obj_str("court.obj", TWO_OBJECTS, Some(MATERIALS), Path::new("/res"))
                .unwrap();
        let kinds: Vec<_> = model.textures_loaded.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TextureKind::Diffuse, TextureKind::Specular]);
        assert_eq!(model.textures_loaded[0].kind.to_string(), "texture_diffuse");
    }

    #[test]
    fn interleaves_position_normal_and_uv() {
        let model =
            ModelData::from_obj_str("court.obj", TWO_OBJECTS, Some(MATERIALS), Path::new("/res"))
                .unwrap();
        let floor = &model.meshes[0];
        assert_eq!(floor.vertices.len(), floor.vertex_count() * VERTEX_STRIDE);
        let second = &floor.vertices[VERTEX_STRIDE..2 * VERTEX_STRIDE];
        assert_eq!(second, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn computes_missing_normals() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = ModelData::from_obj_str("tri.obj", obj, None, Path::new(".")).unwrap();
        for chunk in model.meshes[0].vertices.chunks_exact(VERTEX_STRIDE) {
            let normal = Vec3::new(chunk[3], chunk[4], chunk[5]);
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cube_has_unit_normals_on_every_corner() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.indices.len(), 36);
        for chunk in cube.vertices.chunks_exact(VERTEX_STRIDE) {
            let position = Vec3::new(chunk[0], chunk[1], chunk[2]);
            let normal = Vec3::new(chunk[3], chunk[4], chunk[5]);
            assert_eq!(normal.length(), 1.0);
            assert_eq!(position.dot(normal), 0.5);
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ModelData::load(Path::new("resources/objects/none.obj")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn model_without_faces_is_rejected() {
        let err = ModelData::from_obj_str("empty.obj", "v 0 0 0\n", None, Path::new("."))
            .unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel(_)));
    }
}

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::scene::PointLight;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub projection: Mat4,
    pub view: Mat4,
    pub position: Vec3,
}

/// Per-frame uniform shared by both pipelines.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub light_position: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],
    /// Constant, linear and quadratic falloff, then material shininess.
    pub attenuation: [f32; 4],
}

impl GlobalUniform {
    pub fn new(camera: &CameraParams, light: &PointLight, shininess: f32) -> Self {
        Self {
            projection: camera.projection.to_cols_array_2d(),
            view: camera.view.to_cols_array_2d(),
            view_position: camera.position.extend(1.0).into(),
            light_position: light.position.extend(1.0).into(),
            light_ambient: light.ambient.extend(1.0).into(),
            light_diffuse: light.diffuse.extend(1.0).into(),
            light_specular: light.specular.extend(1.0).into(),
            attenuation: [light.constant, light.linear, light.quadratic, shininess],
        }
    }
}

/// Per-draw uniform holding the model and normal matrices.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
}

impl ObjectConstants {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal_matrix(model)),
        }
    }
}

/// Inverse transpose of the upper 3x3. A collapsed scale (the pulsing balls
/// pass through zero) has no inverse, so identity is used instead.
pub(crate) fn normal_matrix(model: Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(model);
    if upper.determinant().abs() <= f32::EPSILON {
        Mat3::IDENTITY
    } else {
        upper.inverse().transpose()
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

/// Textured Phong shading lit by a single attenuated point light.
pub(crate) const MODEL_SHADER: &str = r#"
struct GlobalUniform {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    view_position: vec4<f32>,
    light_position: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    light_specular: vec4<f32>,
    attenuation: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@group(2) @binding(0)
var diffuse_map: texture_2d<f32>;
@group(2) @binding(1)
var specular_map: texture_2d<f32>;
@group(2) @binding(2)
var material_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.projection * globals.view * world_position;
    out.world_pos = world_position.xyz;
    out.normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;
    out.uv = input.uv;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, material_sampler, input.uv).rgb;
    let specular_mask = textureSample(specular_map, material_sampler, input.uv).r;

    let normal = normalize(input.normal);
    let to_light = globals.light_position.xyz - input.world_pos;
    let light_dir = normalize(to_light);
    let view_dir = normalize(globals.view_position.xyz - input.world_pos);

    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), globals.attenuation.w);

    let distance = length(to_light);
    let falloff = 1.0 / (globals.attenuation.x
        + globals.attenuation.y * distance
        + globals.attenuation.z * distance * distance);

    let ambient = globals.light_ambient.rgb * albedo;
    let diffuse = globals.light_diffuse.rgb * diff * albedo;
    let specular = globals.light_specular.rgb * spec * specular_mask;
    return vec4<f32>((ambient + diffuse + specular) * falloff, 1.0);
}
"#;

/// Unlit white cubes marking the light positions.
pub(crate) const MARKER_SHADER: &str = r#"
struct GlobalUniform {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    view_position: vec4<f32>,
    light_position: vec4<f32>,
    light_ambient: vec4<f32>,
    light_diffuse: vec4<f32>,
    light_specular: vec4<f32>,
    attenuation: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.projection * globals.view * object.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

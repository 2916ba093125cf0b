//! Render pipelines for the scene pass.

pub mod bars;
pub mod flat;

/// Hemisphere + directional lighting shared by the lit shaders.
/// Colours are linear; `lambert` takes and returns linear RGB.
pub const LIGHTING_WGSL: &str = r#"
const SKY_COLOR: vec3<f32> = vec3<f32>(1.0, 1.0, 1.0);
const GROUND_COLOR: vec3<f32> = vec3<f32>(0.0578, 0.0578, 0.0578); // #444444
const HEMI_INTENSITY: f32 = 0.6;
const SUN_COLOR: vec3<f32> = vec3<f32>(1.0, 1.0, 1.0);
const SUN_INTENSITY: f32 = 0.9;
// Light at (200, 300, 200) aimed at the chart origin.
const SUN_DIR: vec3<f32> = vec3<f32>(0.4851, 0.7276, 0.4851);

fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let lo = c / 12.92;
    let hi = pow((c + 0.055) / 1.055, vec3<f32>(2.4));
    return select(hi, lo, c <= vec3<f32>(0.04045));
}

fn lambert(albedo: vec3<f32>, n: vec3<f32>) -> vec3<f32> {
    let hemi = mix(GROUND_COLOR, SKY_COLOR, 0.5 * n.y + 0.5) * HEMI_INTENSITY;
    let sun = SUN_COLOR * SUN_INTENSITY * max(dot(n, SUN_DIR), 0.0);
    return albedo * (hemi + sun);
}
"#;

/// Shader source with the lighting helpers prepended.
pub fn with_lighting(body: &str) -> String {
    format!("{LIGHTING_WGSL}\n{body}")
}

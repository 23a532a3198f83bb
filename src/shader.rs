//! GPU-side data layouts and the point-sprite shader.
//!
//! One shader serves both the galaxy point cloud and the trajectory
//! overlays; the per-draw [`SpriteStyle`] uniform carries the color and
//! sprite size. The fragment falloff `1 - (x^2 + y^2)` combined with
//! additive blending reproduces the soft accumulating glow of the
//! reference renderer.

use bytemuck::{Pod, Zeroable};

/// Shared per-frame uniforms.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Per-draw sprite appearance.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SpriteStyle {
    /// RGBA; alpha is the per-sprite peak intensity under additive blending.
    pub color: [f32; 4],
    /// Sprite half-size in clip-space units.
    pub size: f32,
    pub _padding: [f32; 3],
}

pub const SPRITE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

struct SpriteStyle {
    color: vec4<f32>,
    size: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(0) @binding(1)
var<uniform> style: SpriteStyle;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let corner = quad_vertices[vertex_index];

    var clip_pos = uniforms.view_proj * vec4<f32>(particle_pos, 1.0);
    clip_pos.x += corner.x * style.size * clip_pos.w;
    clip_pos.y += corner.y * style.size * clip_pos.w;

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.uv = corner;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let falloff = 1.0 - dot(in.uv, in.uv);
    if falloff <= 0.0 {
        discard;
    }
    return vec4<f32>(style.color.rgb, falloff * style.color.a);
}
"#;

/// WGSL shader for instanced scene meshes: ambient term, one key light,
/// optional linear fog.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb pre-multiplied by intensity
    ambient: vec4<f32>,
    // w: 0 none, 1 point, 2 directional
    light_pos: vec4<f32>,
    // rgb pre-multiplied by intensity, w: point cutoff distance (0 = none)
    light_color: vec4<f32>,
    // w: 1 when fog is enabled
    fog_color: vec4<f32>,
    // x: near, y: far
    fog_range: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    // x: unlit, y: metalness, z: roughness
    @location(7) surface: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) surface: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.surface = instance.surface;
    return out;
}

fn key_light(pos: vec3<f32>, normal: vec3<f32>) -> vec3<f32> {
    let kind = uniforms.light_pos.w;
    if kind < 0.5 {
        return vec3<f32>(0.0);
    }
    var dir = normalize(uniforms.light_pos.xyz);
    var attenuation = 1.0;
    if kind < 1.5 {
        let to_light = uniforms.light_pos.xyz - pos;
        let dist = max(length(to_light), 0.001);
        dir = to_light / dist;
        attenuation = 1.0 / max(dist * dist, 1.0);
        let cutoff = uniforms.light_color.w;
        if cutoff > 0.0 {
            attenuation = attenuation * clamp(1.0 - dist / cutoff, 0.0, 1.0);
        }
    }
    let n = select(normal, -normal, dot(normal, dir) < 0.0 && dot(normal, uniforms.camera_pos.xyz - pos) < 0.0);
    let diffuse = max(dot(n, dir), 0.0);
    return uniforms.light_color.rgb * diffuse * attenuation;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var rgb = in.color.rgb;
    if in.surface.x < 0.5 {
        let metalness = in.surface.y;
        let roughness = in.surface.z;
        let normal = normalize(in.world_normal);
        let lit = uniforms.ambient.rgb + key_light(in.world_pos, normal);

        let view_dir = normalize(uniforms.camera_pos.xyz - in.world_pos);
        let half_dir = normalize(view_dir + normalize(uniforms.light_pos.xyz - in.world_pos));
        let shininess = mix(64.0, 2.0, roughness);
        let spec = pow(max(dot(normal, half_dir), 0.0), shininess) * (1.0 - roughness) * step(0.5, uniforms.light_pos.w);

        rgb = rgb * lit * (1.0 - 0.5 * metalness) + vec3<f32>(spec) * mix(vec3<f32>(0.04), in.color.rgb, metalness);
    }
    if uniforms.fog_color.w > 0.5 {
        let dist = length(uniforms.camera_pos.xyz - in.world_pos);
        let near = uniforms.fog_range.x;
        let far = uniforms.fog_range.y;
        let f = clamp((dist - near) / max(far - near, 0.0001), 0.0, 1.0);
        rgb = mix(rgb, uniforms.fog_color.rgb, f);
    }
    return vec4<f32>(rgb, in.color.a);
}
"#;

/// Fullscreen triangle that stretches the offscreen scene target over the
/// surface.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

struct BlitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BlitOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_blit(in: BlitOutput) -> @location(0) vec4<f32> {
    return textureSample(scene_texture, scene_sampler, in.uv);
}
"#;

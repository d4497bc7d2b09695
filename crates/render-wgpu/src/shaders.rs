/// Shared uniform block. `params` = (time, terrain elevation, aspect, unused).
const UNIFORMS: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
"#;

/// Full-screen triangle shaded with animated gradient noise.
const BACKGROUND_BODY: &str = r#"
struct BackgroundOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_background(@builtin(vertex_index) index: u32) -> BackgroundOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: BackgroundOutput;
    out.clip_position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

fn hash3(p: vec3<f32>) -> vec3<f32> {
    let q = vec3<f32>(
        dot(p, vec3<f32>(127.1, 311.7, 74.7)),
        dot(p, vec3<f32>(269.5, 183.3, 246.1)),
        dot(p, vec3<f32>(113.5, 271.9, 124.6)),
    );
    return -1.0 + 2.0 * fract(sin(q) * 43758.5453123);
}

fn corner(i: vec3<f32>, f: vec3<f32>, o: vec3<f32>) -> f32 {
    return dot(hash3(i + o), f - o);
}

fn gradient_noise(p: vec3<f32>) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * f * (f * (f * 6.0 - 15.0) + 10.0);
    let x00 = mix(corner(i, f, vec3<f32>(0.0, 0.0, 0.0)), corner(i, f, vec3<f32>(1.0, 0.0, 0.0)), u.x);
    let x10 = mix(corner(i, f, vec3<f32>(0.0, 1.0, 0.0)), corner(i, f, vec3<f32>(1.0, 1.0, 0.0)), u.x);
    let x01 = mix(corner(i, f, vec3<f32>(0.0, 0.0, 1.0)), corner(i, f, vec3<f32>(1.0, 0.0, 1.0)), u.x);
    let x11 = mix(corner(i, f, vec3<f32>(0.0, 1.0, 1.0)), corner(i, f, vec3<f32>(1.0, 1.0, 1.0)), u.x);
    return mix(mix(x00, x10, u.y), mix(x01, x11, u.y), u.z);
}

@fragment
fn fs_background(in: BackgroundOutput) -> @location(0) vec4<f32> {
    let time = uniforms.params.x;
    let p = vec3<f32>(in.uv.x * uniforms.params.z * 3.0, in.uv.y * 3.0, time * 0.1);
    let n = gradient_noise(p) * 0.5 + 0.5;
    let top = vec3<f32>(0.02, 0.03, 0.08);
    let bottom = vec3<f32>(0.10, 0.06, 0.18);
    let base = mix(top, bottom, in.uv.y);
    return vec4<f32>(base + vec3<f32>(0.05, 0.08, 0.12) * n, 1.0);
}
"#;

/// Lit terrain mesh coloured by height.
const TERRAIN_BODY: &str = r#"
struct TerrainVertex {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct TerrainOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_terrain(vertex: TerrainVertex) -> TerrainOutput {
    let world = vec3<f32>(vertex.position.x, vertex.position.y + uniforms.params.y, vertex.position.z);
    var out: TerrainOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.normal = normalize(vertex.normal);
    out.height = vertex.position.y;
    return out;
}

@fragment
fn fs_terrain(in: TerrainOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let diffuse = max(dot(in.normal, light_dir), 0.0);
    let lighting = 0.3 + diffuse * 0.7;
    let low = vec3<f32>(0.10, 0.20, 0.35);
    let high = vec3<f32>(0.45, 0.70, 0.85);
    let t = clamp(in.height * 0.25 + 0.5, 0.0, 1.0);
    return vec4<f32>(mix(low, high, t) * lighting, 1.0);
}
"#;

/// Instanced octahedra, one per particle. Instance = (x, y, z, size).
const PARTICLE_BODY: &str = r#"
struct MarkerVertex {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct ParticleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};

@vertex
fn vs_particle(vertex: MarkerVertex, @location(2) instance: vec4<f32>) -> ParticleOutput {
    let world = instance.xyz + vertex.position * instance.w;
    var out: ParticleOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.normal = vertex.normal;
    return out;
}

@fragment
fn fs_particle(in: ParticleOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let lighting = 0.6 + max(dot(in.normal, light_dir), 0.0) * 0.4;
    return vec4<f32>(vec3<f32>(0.85, 0.9, 1.0) * lighting, 1.0);
}
"#;

pub fn background_shader() -> String {
    format!("{UNIFORMS}{BACKGROUND_BODY}")
}

pub fn terrain_shader() -> String {
    format!("{UNIFORMS}{TERRAIN_BODY}")
}

pub fn particle_shader() -> String {
    format!("{UNIFORMS}{PARTICLE_BODY}")
}

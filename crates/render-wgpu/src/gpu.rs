use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use terrascene_kernel::Scene;
use terrascene_render::{Projection, view_projection};
use wgpu::util::DeviceExt;

use crate::shaders;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Particle marker diameter in world units.
const PARTICLE_SIZE: f32 = 0.08;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ParticleInstance {
    position_size: [f32; 4],
}

/// Octahedron marker spanning `[-0.5, 0.5]` on each axis, one face per
/// octant, wound counter-clockwise seen from outside.
fn marker_mesh() -> (Vec<Vertex>, Vec<u16>) {
    const AXES: [[f32; 3]; 6] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let vertices = AXES
        .iter()
        .map(|&axis| Vertex {
            position: axis.map(|c| c * 0.5),
            normal: axis,
        })
        .collect();

    let mut indices = Vec::with_capacity(24);
    for sx in [0u16, 1] {
        for sy in [0u16, 1] {
            for sz in [0u16, 1] {
                let (x, y, z) = (sx, 2 + sy, 4 + sz);
                // Each negative axis flips the winding.
                if (sx + sy + sz) % 2 == 0 {
                    indices.extend_from_slice(&[x, y, z]);
                } else {
                    indices.extend_from_slice(&[x, z, y]);
                }
            }
        }
    }
    (vertices, indices)
}

fn terrain_vertices(scene: &Scene) -> Vec<Vertex> {
    scene
        .terrain()
        .vertices()
        .iter()
        .map(|v| Vertex {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
        })
        .collect()
}

fn particle_instances(scene: &Scene) -> Vec<ParticleInstance> {
    scene
        .particles()
        .positions()
        .iter()
        .map(|p| ParticleInstance {
            position_size: [p.x, p.y, p.z, PARTICLE_SIZE],
        })
        .collect()
}

fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

struct PipelineParts<'a> {
    label: &'a str,
    source: String,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    depth: wgpu::DepthStencilState,
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    parts: PipelineParts<'_>,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(parts.label),
        source: wgpu::ShaderSource::Wgsl(parts.source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(parts.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(parts.vs),
            compilation_options: Default::default(),
            buffers: parts.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(parts.fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: parts.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(parts.depth),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

/// wgpu-based scene renderer.
///
/// Terrain geometry is uploaded once at construction. Each frame writes the
/// uniforms and the particle instance buffer, then draws background,
/// terrain, and particles in a single pass.
pub struct WgpuRenderer {
    background_pipeline: wgpu::RenderPipeline,
    terrain_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    terrain_vertex_buffer: wgpu::Buffer,
    terrain_index_buffer: wgpu::Buffer,
    terrain_index_count: u32,
    marker_vertex_buffer: wgpu::Buffer,
    marker_index_buffer: wgpu::Buffer,
    marker_index_count: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                params: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let background_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            surface_format,
            PipelineParts {
                label: "background_pipeline",
                source: shaders::background_shader(),
                vs: "vs_background",
                fs: "fs_background",
                buffers: &[],
                cull_mode: None,
                depth: depth_state(false, wgpu::CompareFunction::Always),
            },
        );

        let terrain_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            surface_format,
            PipelineParts {
                label: "terrain_pipeline",
                source: shaders::terrain_shader(),
                vs: "vs_terrain",
                fs: "fs_terrain",
                buffers: &[mesh_vertex_layout()],
                cull_mode: None,
                depth: depth_state(true, wgpu::CompareFunction::Less),
            },
        );

        let particle_pipeline = build_pipeline(
            device,
            &pipeline_layout,
            surface_format,
            PipelineParts {
                label: "particle_pipeline",
                source: shaders::particle_shader(),
                vs: "vs_particle",
                fs: "fs_particle",
                buffers: &[
                    mesh_vertex_layout(),
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![2 => Float32x4],
                    },
                ],
                cull_mode: Some(wgpu::Face::Back),
                depth: depth_state(true, wgpu::CompareFunction::Less),
            },
        );

        // Terrain mesh
        let terrain_verts = terrain_vertices(scene);
        let terrain_indices = scene.terrain().indices();
        let terrain_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_vertex_buffer"),
            contents: bytemuck::cast_slice(&terrain_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let terrain_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain_index_buffer"),
            contents: bytemuck::cast_slice(terrain_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let terrain_index_count = terrain_indices.len() as u32;

        let (marker_verts, marker_indices) = marker_mesh();
        let marker_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("marker_vertex_buffer"),
            contents: bytemuck::cast_slice(&marker_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let marker_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("marker_index_buffer"),
            contents: bytemuck::cast_slice(&marker_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let marker_index_count = marker_indices.len() as u32;

        // Instance buffer sized for the scene's fixed particle count
        let max_instances = scene.particles().len().max(1) as u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<ParticleInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (depth_texture, depth_view) = Self::create_depth_texture(device, width, height);

        tracing::debug!(
            terrain_triangles = terrain_index_count / 3,
            max_instances,
            "renderer resources created"
        );

        Self {
            background_pipeline,
            terrain_pipeline,
            particle_pipeline,
            uniform_buffer,
            uniform_bind_group,
            terrain_vertex_buffer,
            terrain_index_buffer,
            terrain_index_count,
            marker_vertex_buffer,
            marker_index_buffer,
            marker_index_count,
            instance_buffer,
            max_instances,
            depth_texture,
            depth_view,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture.destroy();
        let (texture, view) = Self::create_depth_texture(device, width, height);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    /// Render one frame of `scene` into `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        projection: &Projection,
    ) {
        let vp = view_projection(scene.camera_pose(), projection);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: vp.to_cols_array_2d(),
                params: [
                    scene.time() as f32,
                    scene.terrain().elevation(),
                    projection.aspect,
                    0.0,
                ],
            }),
        );

        let mut instances = particle_instances(scene);
        instances.truncate(self.max_instances as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            // Background
            pass.set_pipeline(&self.background_pipeline);
            pass.draw(0..3, 0..1);

            // Terrain
            pass.set_pipeline(&self.terrain_pipeline);
            pass.set_vertex_buffer(0, self.terrain_vertex_buffer.slice(..));
            pass.set_index_buffer(
                self.terrain_index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..self.terrain_index_count, 0, 0..1);

            // Particles
            if !instances.is_empty() {
                pass.set_pipeline(&self.particle_pipeline);
                pass.set_vertex_buffer(0, self.marker_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.marker_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.marker_index_count, 0, 0..instances.len() as u32);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Release GPU memory eagerly. Dropping the renderer afterwards is fine.
    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.terrain_vertex_buffer.destroy();
        self.terrain_index_buffer.destroy();
        self.marker_vertex_buffer.destroy();
        self.marker_index_buffer.destroy();
        self.instance_buffer.destroy();
        self.depth_texture.destroy();
        tracing::debug!("renderer resources destroyed");
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        (texture, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrascene_common::SceneConfig;

    fn scene() -> Scene {
        Scene::new(&SceneConfig {
            particle_count: 10,
            terrain_segments: 3,
            ..SceneConfig::default()
        })
    }

    #[test]
    fn marker_faces_point_outward() {
        let (verts, indices) = marker_mesh();
        assert_eq!(verts.len(), 6);
        assert_eq!(indices.len(), 24);
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| glam::Vec3::from(verts[tri[k] as usize].position));
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(centroid) > 0.0, "inward face {tri:?}");
        }
    }

    #[test]
    fn gpu_layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 80);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 16);
    }

    #[test]
    fn terrain_upload_mirrors_scene() {
        let scene = scene();
        let verts = terrain_vertices(&scene);
        assert_eq!(verts.len(), 16);
        assert_eq!(verts[5].position, scene.terrain().vertices()[5].position.to_array());
    }

    #[test]
    fn instances_follow_live_positions() {
        let mut scene = scene();
        scene.step(1.0);
        let instances = particle_instances(&scene);
        assert_eq!(instances.len(), 10);
        let p = scene.particles().positions()[3];
        assert_eq!(instances[3].position_size, [p.x, p.y, p.z, PARTICLE_SIZE]);
    }
}

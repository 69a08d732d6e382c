use crate::mesh::{self, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orrery_render::{NodeKind, SceneGraph};
use orrery_scene::{Geometry, Light, Material, MaterialParam};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    light_pos: [f32; 4],
    light_color: [f32; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    surface: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, material: &Material) -> Self {
        let cols = model.to_cols_array_2d();
        let unlit = matches!(material, Material::Basic(_));
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: material.color().to_rgba(material.alpha()),
            surface: [
                if unlit { 1.0 } else { 0.0 },
                material.param(MaterialParam::Metalness).unwrap_or(0.0),
                material.param(MaterialParam::Roughness).unwrap_or(1.0),
                0.0,
            ],
        }
    }

    fn is_transparent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// Instances sharing one geometry and blend mode.
#[derive(Debug)]
struct Batch {
    geometry: Geometry,
    transparent: bool,
    instances: Vec<InstanceData>,
}

/// Group every mesh node by geometry, opaque batches first.
fn collect_batches(graph: &SceneGraph) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for (handle, node) in graph.iter() {
        let NodeKind::Mesh {
            geometry, material, ..
        } = &node.kind
        else {
            continue;
        };
        let Some(model) = graph.world_matrix(handle) else {
            continue;
        };
        let instance = InstanceData::new(model, material);
        let transparent = instance.is_transparent();
        match batches
            .iter_mut()
            .find(|b| b.geometry == *geometry && b.transparent == transparent)
        {
            Some(batch) => batch.instances.push(instance),
            None => batches.push(Batch {
                geometry: *geometry,
                transparent,
                instances: vec![instance],
            }),
        }
    }
    batches.sort_by_key(|b| b.transparent);
    batches
}

/// Camera, ambient sum, first direct light, and fog packed for the shader.
fn scene_uniforms(graph: &SceneGraph) -> Uniforms {
    let env = &graph.environment;
    let camera = graph.camera();

    let mut ambient = Vec3::ZERO;
    let mut light_pos = [0.0; 4];
    let mut light_color = [0.0; 4];
    let mut has_key = false;
    for light in &env.lights {
        let [r, g, b, _] = light.color().to_rgba(1.0);
        let rgb = Vec3::new(r, g, b) * light.intensity();
        match light {
            Light::Ambient { .. } => ambient += rgb,
            _ if has_key => {}
            Light::Point {
                position, distance, ..
            } => {
                light_pos = [position.x, position.y, position.z, 1.0];
                light_color = [rgb.x, rgb.y, rgb.z, *distance];
                has_key = true;
            }
            Light::Directional {
                position, target, ..
            } => {
                let dir = *position - *target;
                light_pos = [dir.x, dir.y, dir.z, 2.0];
                light_color = [rgb.x, rgb.y, rgb.z, 0.0];
                has_key = true;
            }
            Light::Spot { position, .. } | Light::RectArea { position, .. } => {
                light_pos = [position.x, position.y, position.z, 1.0];
                light_color = [rgb.x, rgb.y, rgb.z, 0.0];
                has_key = true;
            }
        }
    }

    let (fog_color, fog_range) = match &env.fog {
        Some(fog) => {
            let [r, g, b, _] = fog.color.to_rgba(1.0);
            ([r, g, b, 1.0], [fog.near, fog.far, 0.0, 0.0])
        }
        None => ([0.0; 4], [0.0; 4]),
    };

    Uniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_pos: camera.position.extend(1.0).to_array(),
        ambient: ambient.extend(0.0).to_array(),
        light_pos,
        light_color,
        fog_color,
        fog_range,
    }
}

struct GpuMesh {
    geometry: Geometry,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Offscreen color and depth the scene pass draws into.
struct SceneTargets {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// wgpu renderer drawing a [`SceneGraph`] as instanced meshes.
///
/// The scene is drawn at its own resolution into an offscreen target, then
/// stretched over whatever surface view `render` is given, so the scene can
/// stay below the surface resolution on high-density displays.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u64,
    blit_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    targets: SceneTargets,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// `width` and `height` size the offscreen scene target, not the surface.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "opaque_pipeline",
            false,
        );
        let transparent_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            "transparent_pipeline",
            true,
        );

        let instance_capacity = 1024;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let blit_pipeline = Self::create_blit_pipeline(device, &blit_layout, surface_format);
        let targets = Self::create_targets(
            device,
            surface_format,
            &blit_layout,
            &blit_sampler,
            width,
            height,
        );

        Self {
            opaque_pipeline,
            transparent_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes: Vec::new(),
            instance_buffer,
            instance_capacity,
            blit_pipeline,
            blit_layout,
            blit_sampler,
            targets,
            surface_format,
        }
    }

    fn create_blit_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        label: &str,
        transparent: bool,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(if transparent {
                        wgpu::BlendState::ALPHA_BLENDING
                    } else {
                        wgpu::BlendState::REPLACE
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Planes and double-sided materials need both faces.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: !transparent,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Recreate the offscreen scene target at a new resolution.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = Self::create_targets(
            device,
            self.surface_format,
            &self.blit_layout,
            &self.blit_sampler,
            width,
            height,
        );
    }

    /// Resolution of the offscreen scene target.
    pub fn scene_size(&self) -> (u32, u32) {
        self.targets.size
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn mesh_index(&mut self, device: &wgpu::Device, geometry: &Geometry) -> usize {
        if let Some(i) = self.meshes.iter().position(|m| m.geometry == *geometry) {
            return i;
        }
        let data = mesh::tessellate(geometry);
        tracing::debug!(
            kind = geometry.kind(),
            vertices = data.vertices.len(),
            "uploading mesh"
        );
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.push(GpuMesh {
            geometry: *geometry,
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        });
        self.meshes.len() - 1
    }

    /// Render one frame of the graph from its current camera and stretch it
    /// over `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        graph: &SceneGraph,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&scene_uniforms(graph)),
        );

        let batches = collect_batches(graph);
        let instances: Vec<InstanceData> = batches
            .iter()
            .flat_map(|b| b.instances.iter().copied())
            .collect();
        if instances.len() as u64 > self.instance_capacity {
            self.instance_capacity = (instances.len() as u64).next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let draws: Vec<(usize, bool, std::ops::Range<u32>)> = {
            let mut start = 0u32;
            batches
                .iter()
                .map(|b| {
                    let end = start + b.instances.len() as u32;
                    let range = start..end;
                    start = end;
                    (self.mesh_index(device, &b.geometry), b.transparent, range)
                })
                .collect()
        };

        let [r, g, b, _] = graph.environment.background.clear_color().to_rgba(1.0);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (mesh_index, transparent, range) in draws {
                let mesh = &self.meshes[mesh_index];
                pass.set_pipeline(if transparent {
                    &self.transparent_pipeline
                } else {
                    &self.opaque_pipeline
                });
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, range);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.targets.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: capacity * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        blit_layout: &wgpu::BindGroupLayout,
        blit_sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> SceneTargets {
        let size = (width.max(1), height.max(1));
        let color = Self::create_target_texture(
            device,
            "scene_color_texture",
            size,
            color_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let depth = Self::create_target_texture(
            device,
            "depth_texture",
            size,
            wgpu::TextureFormat::Depth32Float,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(blit_sampler),
                },
            ],
        });
        tracing::debug!(width = size.0, height = size.1, "scene target resized");
        SceneTargets {
            color,
            depth,
            blit_bind_group,
            size,
        }
    }

    fn create_target_texture(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_render::Stage;
    use orrery_scene::presets;

    #[test]
    fn solar_system_batches_into_one_sphere_draw() {
        let session = Stage::build(&presets::solar_system(), SceneGraph::default()).unwrap();
        let batches = collect_batches(session.sink());
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].instances.len(), 8);
        assert!(!batches[0].transparent);
    }

    #[test]
    fn transparent_batches_draw_last() {
        let session = Stage::build(&presets::fog_boxes(), SceneGraph::default()).unwrap();
        let batches = collect_batches(session.sink());
        assert!(batches.iter().any(|b| b.transparent));
        assert!(batches.windows(2).all(|w| !w[0].transparent || w[1].transparent));
    }

    #[test]
    fn uniforms_pack_ambient_and_point_light() {
        let session = Stage::build(&presets::solar_system(), SceneGraph::default()).unwrap();
        let u = scene_uniforms(session.sink());
        assert_eq!(u.light_pos[3], 1.0);
        assert!((u.light_color[0] - 300.0).abs() < 1e-3);
        assert!((u.ambient[0] - 0.05).abs() < 1e-6);
        assert_eq!(u.fog_color[3], 0.0);
        assert_eq!(u.camera_pos[2], 40.0);
    }

    #[test]
    fn uniforms_enable_fog() {
        let session = Stage::build(&presets::fog_boxes(), SceneGraph::default()).unwrap();
        let u = scene_uniforms(session.sink());
        assert_eq!(u.fog_color[3], 1.0);
        assert!(u.fog_range[0] < u.fog_range[1]);
    }

    #[test]
    fn basic_material_is_unlit() {
        let instance = InstanceData::new(Mat4::IDENTITY, &Material::default());
        let expected = if matches!(Material::default(), Material::Basic(_)) {
            1.0
        } else {
            0.0
        };
        assert_eq!(instance.surface[0], expected);
        assert_eq!(instance.model_3, [0.0, 0.0, 0.0, 1.0]);
    }
}

use std::sync::{Arc, Mutex};

use eframe::egui;
use eframe::egui_wgpu;
use eframe::wgpu;
use eframe::wgpu::util::DeviceExt;

use crate::plot3d::gpu_types::{Line3DData, MeshVertex, SceneUniforms};
use crate::plot3d::mesh::MeshBatch;

/// Ambient term applied to every mesh fragment.
pub const AMBIENT_LIGHT: f32 = 0.6;

const SCENE_SHADER_SRC: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    color: vec4<f32>,
    resolution: vec2<f32>,
    ambient: f32,
    line_width: f32,
    mesh_info: vec4<u32>,
};

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var<storage, read> positions: array<vec4<f32>>;

// ---- Lit triangle meshes ----
// Storage holds the instance records (center, scale, color) followed by the
// unit mesh at `mesh_info.x`; both use three vec4 per entry.

struct MeshOutput {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) world: vec3<f32>,
};

@vertex
fn vs_mesh(
    @builtin(vertex_index) vert: u32,
    @builtin(instance_index) inst: u32,
) -> MeshOutput {
    let v = u.mesh_info.x + vert * 3u;
    let i = inst * 3u;
    let center = positions[i].xyz;
    let scale = positions[i + 1u].xyz;
    let world = center + positions[v].xyz * scale;

    // Inverse scale keeps normals outward under flattened or mirrored boxes.
    let safe_scale = select(scale, vec3<f32>(1.0), abs(scale) < vec3<f32>(1e-6));

    var out: MeshOutput;
    out.pos = u.view_proj * vec4<f32>(world, 1.0);
    out.normal = positions[v + 1u].xyz / safe_scale;
    out.color = positions[v + 2u] * positions[i + 2u];
    out.world = world;
    return out;
}

fn point_light(n: vec3<f32>, world: vec3<f32>, light: vec3<f32>, intensity: f32) -> f32 {
    return max(dot(n, normalize(light - world)), 0.0) * intensity;
}

@fragment
fn fs_mesh(frag: MeshOutput) -> @location(0) vec4<f32> {
    var n = frag.normal;
    let len = length(n);
    if len > 0.0001 {
        n = n / len;
    }
    // Light both sides of open surfaces.
    if dot(n, u.camera_pos.xyz - frag.world) < 0.0 {
        n = -n;
    }

    let diffuse = point_light(n, frag.world, vec3<f32>(10.0, 10.0, 10.0), 0.8)
        + point_light(n, frag.world, vec3<f32>(-10.0, -10.0, -10.0), 0.4);
    let shade = min(u.ambient + diffuse, 1.25);
    return vec4<f32>(min(frag.color.rgb * shade, vec3<f32>(1.0)), frag.color.a);
}

// ---- Grid lines (instanced camera-facing ribbon) ----

struct LineOutput {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(
    @builtin(instance_index) inst: u32,
    @builtin(vertex_index) vert: u32,
) -> LineOutput {
    // Storage holds pairs: [start, end, start, end, ...]
    let p0_world = vec4<f32>(positions[inst * 2u].xyz, 1.0);
    let p1_world = vec4<f32>(positions[inst * 2u + 1u].xyz, 1.0);

    let clip0 = u.view_proj * p0_world;
    let clip1 = u.view_proj * p1_world;

    // Convert to screen pixels.
    let ndc0 = clip0.xy / clip0.w;
    let ndc1 = clip1.xy / clip1.w;
    let screen0 = (ndc0 * 0.5 + 0.5) * u.resolution;
    let screen1 = (ndc1 * 0.5 + 0.5) * u.resolution;

    // Direction along the segment in screen space.
    let dir = screen1 - screen0;
    let len = length(dir);

    // Perpendicular direction for ribbon width.
    var perp: vec2<f32>;
    if len > 0.001 {
        perp = vec2<f32>(-dir.y, dir.x) / len * u.line_width * 0.5;
    } else {
        perp = vec2<f32>(0.0, u.line_width * 0.5);
    }

    // Build the quad: 6 vertices per segment (two triangles).
    // t=0 means endpoint 0, t=1 means endpoint 1. side = +/- 1.
    var t: f32;
    var side: f32;
    switch vert {
        case 0u: { t = 0.0; side =  1.0; }
        case 1u: { t = 0.0; side = -1.0; }
        case 2u: { t = 1.0; side =  1.0; }
        case 3u: { t = 0.0; side = -1.0; }
        case 4u: { t = 1.0; side = -1.0; }
        case 5u: { t = 1.0; side =  1.0; }
        default: { t = 0.0; side = 1.0; }
    }

    // Interpolate screen position along the segment.
    let base_screen = mix(screen0, screen1, t);
    let final_screen = base_screen + perp * side;

    // Convert back to NDC.
    let final_ndc = (final_screen / u.resolution) * 2.0 - vec2<f32>(1.0, 1.0);

    // Perspective-correct depth interpolation.
    // Interpolate 1/w linearly, then recover w and z.
    let inv_w0 = 1.0 / clip0.w;
    let inv_w1 = 1.0 / clip1.w;
    let inv_w = mix(inv_w0, inv_w1, t);
    let w = 1.0 / inv_w;

    // z/w also interpolates linearly in screen space, so interpolate z/w.
    let z_over_w_0 = clip0.z / clip0.w;
    let z_over_w_1 = clip1.z / clip1.w;
    let z_over_w = mix(z_over_w_0, z_over_w_1, t);
    let z = z_over_w * w;

    let out_clip = vec4<f32>(final_ndc * w, z, w);

    var out: LineOutput;
    out.pos = out_clip;
    out.color = u.color;
    return out;
}

@fragment
fn fs_line(
    @location(0) color: vec4<f32>,
) -> @location(0) vec4<f32> {
    return color;
}
"#;

const BLIT_SHADER_SRC: &str = r#"
struct BlitOutput {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(
    @builtin(vertex_index) vert: u32,
) -> BlitOutput {
    // Fullscreen quad: 6 vertices, two triangles.
    var positions = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    var uvs = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 0.0),
    );

    var out: BlitOutput;
    out.pos = vec4<f32>(positions[vert], 0.0, 1.0);
    out.uv = uvs[vert];
    return out;
}

@group(0) @binding(0) var t_color: texture_2d<f32>;
@group(0) @binding(1) var s_color: sampler;

@fragment
fn fs_blit(
    @location(0) uv: vec2<f32>,
) -> @location(0) vec4<f32> {
    return textureSample(t_color, s_color, uv);
}
"#;

/// Pipelines and layouts created once and kept in `CallbackResources`.
pub struct SceneResources {
    pub mesh_pipeline: wgpu::RenderPipeline,
    pub line_pipeline: wgpu::RenderPipeline,
    pub blit_pipeline: wgpu::RenderPipeline,
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
    pub blit_bind_group_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    /// The offscreen color texture must use this format to match the pipelines.
    pub target_format: wgpu::TextureFormat,
}

/// Created in `prepare()`, consumed in `paint()`.
struct BlitState {
    blit_bind_group: wgpu::BindGroup,
}

/// Offscreen targets, recreated only when the viewport size or format changes.
pub struct OffscreenTargets {
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

pub fn init_3d_resources(render_state: &egui_wgpu::RenderState) {
    let device = &render_state.device;
    let target_format = render_state.target_format;

    let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene3d_shader"),
        source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SRC.into()),
    });
    let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene3d_blit_shader"),
        source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SRC.into()),
    });

    // Uniform + storage, shared by the mesh and line pipelines.
    let scene_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene3d_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<SceneUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(16),
                    },
                    count: None,
                },
            ],
        });

    let blit_bind_group_layout =
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene3d_blit_bind_group_layout"),
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

    let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene3d_pipeline_layout"),
        bind_group_layouts: &[&scene_bind_group_layout],
        push_constant_ranges: &[],
    });
    let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene3d_blit_pipeline_layout"),
        bind_group_layouts: &[&blit_bind_group_layout],
        push_constant_ranges: &[],
    });

    // No culling: surfaces are open and negative bars flip their winding.
    let primitive = wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: wgpu::PolygonMode::Fill,
        conservative: false,
    };
    let multisample = wgpu::MultisampleState {
        count: 1,
        mask: !0,
        alpha_to_coverage_enabled: false,
    };
    let depth_stencil = wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    };

    let scene_pipeline = |label: &str, vs: &str, fs: &str| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&scene_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some(vs),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive,
            depth_stencil: Some(depth_stencil.clone()),
            multisample,
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some(fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        })
    };
    let mesh_pipeline = scene_pipeline("scene3d_mesh_pipeline", "vs_mesh", "fs_mesh");
    let line_pipeline = scene_pipeline("scene3d_line_pipeline", "vs_line", "fs_line");

    let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene3d_blit_pipeline"),
        layout: Some(&blit_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &blit_shader,
            entry_point: Some("vs_blit"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive,
        depth_stencil: None,
        multisample,
        fragment: Some(wgpu::FragmentState {
            module: &blit_shader,
            entry_point: Some("fs_blit"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("scene3d_blit_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    render_state
        .renderer
        .write()
        .callback_resources
        .insert(SceneResources {
            mesh_pipeline,
            line_pipeline,
            blit_pipeline,
            scene_bind_group_layout,
            blit_bind_group_layout,
            sampler,
            target_format,
        });
}

/// `vec4<f32>` slots per mesh vertex or instance record.
const SLOTS_PER_RECORD: usize = 3;

/// How many instances fit in one storage binding next to the unit mesh, or
/// `None` when the mesh alone is over the limit.
fn instances_per_draw(vertex_count: usize, limit_bytes: usize) -> Option<usize> {
    let record = std::mem::size_of::<MeshVertex>();
    let mesh_bytes = vertex_count * record;
    let room = limit_bytes.checked_sub(mesh_bytes)? / record;
    (room > 0).then_some(room)
}

/// Storage buffers must hold at least one `vec4<f32>`.
fn create_storage_buffer(device: &wgpu::Device, label: &str, data: &[u8]) -> wgpu::Buffer {
    let mut contents = data.to_vec();
    if contents.len() < 16 {
        contents.resize(16, 0);
    }
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: &contents,
        usage: wgpu::BufferUsages::STORAGE,
    })
}

fn scene_bind_group(
    device: &wgpu::Device,
    resources: &SceneResources,
    label: &str,
    uniforms: &SceneUniforms,
    storage: &[u8],
) -> wgpu::BindGroup {
    let storage_buf = create_storage_buffer(device, label, storage);
    let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(uniforms),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &resources.scene_bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: storage_buf.as_entire_binding(),
            },
        ],
    })
}

fn ensure_offscreen_targets(
    device: &wgpu::Device,
    callback_resources: &mut egui_wgpu::CallbackResources,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) {
    let stale = match callback_resources.get::<OffscreenTargets>() {
        Some(t) => t.width != width || t.height != height || t.format != format,
        None => true,
    };
    if !stale {
        return;
    }

    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let color_view = device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("scene3d_offscreen_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("scene3d_offscreen_depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default());

    callback_resources.insert(OffscreenTargets {
        color_view,
        depth_view,
        width,
        height,
        format,
    });
}

/// One frame of the 3D chart: lit meshes plus grid lines, rendered
/// offscreen and blitted into the egui rect.
pub struct SceneCallback {
    pub batches: Arc<[MeshBatch]>,
    pub lines: Vec<Line3DData>,
    pub uniforms_base: SceneUniforms,
    pub bg_color: [f32; 4],
    pub viewport_size: [u32; 2],
    blit_state: Mutex<Option<BlitState>>,
}

impl egui_wgpu::CallbackTrait for SceneCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(target_format) = callback_resources
            .get::<SceneResources>()
            .map(|r| r.target_format)
        else {
            return Vec::new();
        };

        let width = self.viewport_size[0].max(1);
        let height = self.viewport_size[1].max(1);
        ensure_offscreen_targets(device, callback_resources, width, height, target_format);

        let (Some(resources), Some(targets)) = (
            callback_resources.get::<SceneResources>(),
            callback_resources.get::<OffscreenTargets>(),
        ) else {
            return Vec::new();
        };

        let mut uniforms = self.uniforms_base;
        uniforms.resolution = [width as f32, height as f32];
        uniforms.ambient = AMBIENT_LIGHT;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene3d_offscreen_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.bg_color[0] as f64,
                            g: self.bg_color[1] as f64,
                            b: self.bg_color[2] as f64,
                            a: self.bg_color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);

            // Grid first so translucent meshes blend over it.
            for line in &self.lines {
                if line.segments.len() < 2 {
                    continue;
                }
                let mut line_uniforms = uniforms;
                line_uniforms.color = line.color;
                line_uniforms.line_width = line.line_width;
                let bind_group = scene_bind_group(
                    device,
                    resources,
                    "scene3d_line",
                    &line_uniforms,
                    bytemuck::cast_slice(&line.segments),
                );
                render_pass.set_pipeline(&resources.line_pipeline);
                render_pass.set_bind_group(0, &bind_group, &[]);
                render_pass.draw(0..6, 0..(line.segments.len() / 2) as u32);
            }

            let limit = device.limits().max_storage_buffer_binding_size as usize;
            render_pass.set_pipeline(&resources.mesh_pipeline);
            for batch in self.batches.iter() {
                if batch.vertices.is_empty() || batch.instances.is_empty() {
                    continue;
                }
                let Some(per_draw) = instances_per_draw(batch.vertices.len(), limit) else {
                    tracing::warn!(
                        "Skipping a {}-vertex mesh: larger than the {limit}-byte storage limit",
                        batch.vertices.len()
                    );
                    continue;
                };
                let unit_mesh: &[u8] = bytemuck::cast_slice(&batch.vertices);
                for chunk in batch.instances.chunks(per_draw) {
                    let mut mesh_uniforms = uniforms;
                    mesh_uniforms.mesh_info = [(chunk.len() * SLOTS_PER_RECORD) as u32, 0, 0, 0];
                    let mut storage = bytemuck::cast_slice::<_, u8>(chunk).to_vec();
                    storage.extend_from_slice(unit_mesh);
                    let bind_group =
                        scene_bind_group(device, resources, "scene3d_mesh", &mesh_uniforms, &storage);
                    render_pass.set_bind_group(0, &bind_group, &[]);
                    render_pass.draw(0..batch.vertices.len() as u32, 0..chunk.len() as u32);
                }
            }
        }

        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene3d_blit_bind_group"),
            layout: &resources.blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&resources.sampler),
                },
            ],
        });
        *self.blit_state.lock().unwrap() = Some(BlitState { blit_bind_group });

        Vec::new()
    }

    fn paint(
        &self,
        info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &egui_wgpu::CallbackResources,
    ) {
        let Some(resources) = callback_resources.get::<SceneResources>() else {
            return;
        };
        let state_guard = self.blit_state.lock().unwrap();
        let Some(state) = state_guard.as_ref() else {
            return;
        };

        let viewport = info.viewport_in_pixels();
        if viewport.width_px <= 0 || viewport.height_px <= 0 {
            return;
        }
        render_pass.set_viewport(
            viewport.left_px as f32,
            viewport.top_px as f32,
            viewport.width_px as f32,
            viewport.height_px as f32,
            0.0,
            1.0,
        );
        render_pass.set_pipeline(&resources.blit_pipeline);
        render_pass.set_bind_group(0, &state.blit_bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }
}

pub fn create_scene_paint_callback(
    rect: egui::Rect,
    batches: Arc<[MeshBatch]>,
    lines: Vec<Line3DData>,
    uniforms_base: SceneUniforms,
    bg_color: [f32; 4],
    viewport_size: [u32; 2],
) -> egui::PaintCallback {
    egui_wgpu::Callback::new_paint_callback(
        rect,
        SceneCallback {
            batches,
            lines,
            uniforms_base,
            bg_color,
            viewport_size,
            blit_state: Mutex::new(None),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_are_split_to_fit_the_binding() {
        let record = std::mem::size_of::<MeshVertex>();
        assert_eq!(instances_per_draw(36, 136 * record), Some(100));
        assert_eq!(instances_per_draw(36, 36 * record), None);
        assert_eq!(instances_per_draw(1152, 1024), None);
    }

    #[test]
    fn default_limit_leaves_room_for_large_sheets() {
        let limit = wgpu::Limits::default().max_storage_buffer_binding_size as usize;
        let per_draw = instances_per_draw(1152, limit).unwrap();
        assert!(per_draw > 1_000_000);
    }
}

use std::sync::Arc;

use id_arena::Arena;
use wgpu::{CommandEncoderDescriptor, PipelineCompilationOptions};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::{
    camera::CameraUniform,
    editor::EditorState,
    model::{render_model_instances, Instance, RenderModel, RENDER_MODEL_VBL},
    rendering::{imgui_renderer::ImguiRendererState, texture::DepthTexture},
    scene_graph::Scene,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    depth_texture: DepthTexture,
    mesh_pipeline: wgpu::RenderPipeline,
    render_models: Arena<RenderModel>,
    imgui_renderer: ImguiRendererState,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        editor: &EditorState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(size, &editor.camera);
        let camera_buffer = camera_uniform.create_buffer(&device);

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera bind group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let mesh_pipeline = create_mesh_pipeline(&device, &camera_bind_group_layout, surface_format);
        let depth_texture = DepthTexture::new(&device, &surface_config, "Depth Texture");
        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, surface_format, imgui_context);

        let background = editor.config.background_color;
        let clear_color = wgpu::Color {
            r: background.x as f64,
            g: background.y as f64,
            b: background.z as f64,
            a: 1.0,
        };

        Ok(Self {
            window: window.clone(),
            size,
            surface,
            device,
            queue,
            surface_config,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            depth_texture,
            mesh_pipeline,
            render_models: Arena::new(),
            imgui_renderer,
            clear_color,
        })
    }

    /// Create GPU buffers for any scene mesh that does not have them yet.
    /// Shapes spawn at runtime, so this runs every frame.
    fn sync_models(&mut self, scene: &mut Scene) {
        for (_id, scene_model) in &mut scene.models {
            if scene_model.render_model.is_some() {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            let render_model_id = self.render_models.alloc(render_model);
            scene_model.render_model = Some(render_model_id);
            log::info!(
                "Uploaded model {} with {} primitives",
                scene_model.name,
                scene_model.model.primitives.len()
            );
        }
    }

    fn gather_instances(&mut self, scene: &Scene) {
        for (_, render_model) in self.render_models.iter_mut() {
            render_model.instances.clear();
        }

        for (_, object) in scene.objects.iter() {
            let Some(model_id) = object.model_id else {
                continue;
            };
            let Some(render_model_id) = scene.models.get(model_id).and_then(|m| m.render_model)
            else {
                continue;
            };
            let Some(render_model) = self.render_models.get_mut(render_model_id) else {
                continue;
            };

            let world_matrix = *object.transform.get_world_matrix();
            render_model
                .instances
                .add(Instance::new(world_matrix, object.color));
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_texture.resize(&self.device, &self.surface_config);
        }
    }

    pub fn render(
        &mut self,
        editor: &mut EditorState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.camera_uniform.update(self.size, &editor.camera);
        self.camera_uniform.update_buffer(&self.queue, &self.camera_buffer);

        self.sync_models(&mut editor.scene);
        self.gather_instances(&editor.scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_texture.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for (_id, render_model) in self.render_models.iter() {
                if !render_model.instances.should_render() {
                    continue;
                }

                render_model_instances(&mut render_pass, &self.queue, render_model);
            }
        }

        self.imgui_renderer
            .render(&view, imgui_context, &self.device, &self.queue, &mut encoder);

        let command_buffer = encoder.finish();
        self.queue.submit([command_buffer]);

        output.present();

        Ok(())
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Mesh shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh pipeline layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[RENDER_MODEL_VBL, Instance::descriptor()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

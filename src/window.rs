use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    window::Window,
};

use crate::{config::EditorConfig, editor::EditorState, panel, rendering::renderer::Renderer};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    editor: EditorState,
    mouse_pos: Vec2,
    orbiting: bool,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn from_editor(editor: EditorState) -> Self {
        Self {
            renderer: None,
            editor,
            mouse_pos: Vec2::ZERO,
            orbiting: false,
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(&mut self, window: &Window) {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            &window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        self.imgui = Some(ImguiState { context, platform });
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window_attributes =
            Window::default_attributes().with_title(&self.editor.config.window_title);
        let window = event_loop.create_window(window_attributes).unwrap();
        self.setup_imgui(&window);

        let renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            &self.editor,
            &mut self.imgui.as_mut().unwrap().context,
        ))
        .unwrap();
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let imgui = self.imgui.as_mut().unwrap();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.renderer.as_mut().unwrap().resize(new_size);
            }
            WindowEvent::RedrawRequested => {
                let delta_time = self.last_frame.elapsed();
                let now = Instant::now();
                imgui.context.io_mut().update_delta_time(delta_time);
                self.last_frame = now;

                let renderer = self.renderer.as_mut().unwrap();
                renderer.window.request_redraw();

                imgui
                    .platform
                    .prepare_frame(imgui.context.io_mut(), &renderer.window)
                    .expect("Failed to prepare Imgui frame");

                let ui = imgui.context.new_frame();
                panel::draw_ui(ui, &mut self.editor);
                self.editor.update();

                match renderer.render(&mut self.editor, &mut imgui.context) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                let delta = new_pos - self.mouse_pos;
                self.mouse_pos = new_pos;

                if self.orbiting {
                    self.editor.orbit(delta.x, delta.y);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let resolution = self
                    .renderer
                    .as_ref()
                    .map(|renderer| Vec2::new(renderer.size.width as f32, renderer.size.height as f32));
                if let Some(resolution) = resolution {
                    if !imgui.context.io().want_capture_mouse {
                        self.editor.handle_click(self.mouse_pos, resolution);
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                self.orbiting =
                    state == ElementState::Pressed && !imgui.context.io().want_capture_mouse;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !imgui.context.io().want_capture_mouse {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                    };
                    self.editor.zoom(scroll);
                }
            }
            _ => (),
        }

        {
            let window = self.renderer.as_mut().unwrap().window.as_ref();
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                &window,
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let config = EditorConfig::from_env();
    let editor = EditorState::new(config).context("Failed to create editor state")?;
    let mut app = App::from_editor(editor);
    event_loop.run_app(&mut app)?;

    Ok(())
}

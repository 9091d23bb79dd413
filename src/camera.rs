use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;

use crate::picking::Ray;

const FOV_Y_DEGREES: f32 = 75.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn get_vp_matrix(&self, resolution: Vec2) -> Mat4 {
        let view = Mat4::look_at_lh(self.eye, self.target, self.up);
        let projection = Mat4::perspective_lh(
            FOV_Y_DEGREES.to_radians(),
            resolution.x / resolution.y,
            Z_NEAR,
            Z_FAR,
        );
        projection * view
    }

    /// World-space ray through a pixel. `pos` is in physical pixels with the
    /// origin at the top-left corner.
    pub fn screen_ray(&self, pos: Vec2, resolution: Vec2) -> Ray {
        let ndc = Vec2::new(
            pos.x / resolution.x * 2.0 - 1.0,
            1.0 - pos.y / resolution.y * 2.0,
        );

        let inverse_vp = self.get_vp_matrix(resolution).inverse();
        let near = inverse_vp.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse_vp.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));

        Ray {
            origin: near,
            dir: (far - near).normalize(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
}

impl CameraUniform {
    pub fn update(&mut self, resolution: winit::dpi::PhysicalSize<u32>, camera: &Camera) {
        self.view_proj =
            camera.get_vp_matrix(Vec2::new(resolution.width as f32, resolution.height as f32));
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

//! Procedural meshes for the editor's primitive shapes.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use thiserror::Error;

use crate::model::{ModelPrimitive, Vertex};

const SPHERE_RADIUS: f32 = 0.5;
const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;
const CUBE_SIZE: f32 = 1.0;
const CONE_RADIUS: f32 = 0.5;
const CONE_HEIGHT: f32 = 1.0;
const CYLINDER_RADIUS: f32 = 0.5;
const CYLINDER_HEIGHT: f32 = 1.0;
const RADIAL_SEGMENTS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Cube,
    Cone,
    Cylinder,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown shape kind: {0:?}")]
pub struct UnknownShapeError(pub String);

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Sphere,
        ShapeKind::Cube,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
    ];

    /// Wire and registry name.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cube => "cube",
            ShapeKind::Cone => "cone",
            ShapeKind::Cylinder => "cylinder",
        }
    }

    /// Capitalized name for UI labels and object names.
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cube => "Cube",
            ShapeKind::Cone => "Cone",
            ShapeKind::Cylinder => "Cylinder",
        }
    }

    pub fn mesh(&self) -> ModelPrimitive {
        match self {
            ShapeKind::Sphere => sphere(SPHERE_RADIUS, SPHERE_SEGMENTS, SPHERE_RINGS),
            ShapeKind::Cube => cube(CUBE_SIZE),
            ShapeKind::Cone => cone(CONE_RADIUS, CONE_HEIGHT, RADIAL_SEGMENTS),
            ShapeKind::Cylinder => cylinder(CYLINDER_RADIUS, CYLINDER_HEIGHT, RADIAL_SEGMENTS),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = UnknownShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" => Ok(ShapeKind::Sphere),
            "cube" => Ok(ShapeKind::Cube),
            "cone" => Ok(ShapeKind::Cone),
            "cylinder" => Ok(ShapeKind::Cylinder),
            _ => Err(UnknownShapeError(s.to_string())),
        }
    }
}

fn sphere(radius: f32, segments: u32, rings: u32) -> ModelPrimitive {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = phi.cos();
        let ring_radius = phi.sin();

        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());

            vertices.push(Vertex {
                position: normal * radius,
                normal,
            });
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            indices.extend_from_slice(&[current, current + 1, next]);
            indices.extend_from_slice(&[current + 1, next + 1, next]);
        }
    }

    ModelPrimitive { vertices, indices }
}

fn cube(size: f32) -> ModelPrimitive {
    let h = size * 0.5;

    // Each face gets its own vertices so face normals stay flat.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, right, up) in faces {
        let base = vertices.len() as u32;
        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            vertices.push(Vertex {
                position: (normal + right * u + up * v) * h,
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2]);
        indices.extend_from_slice(&[base, base + 2, base + 3]);
    }

    ModelPrimitive { vertices, indices }
}

fn cone(radius: f32, height: f32, segments: u32) -> ModelPrimitive {
    let h = height * 0.5;
    let slant = (radius * radius + height * height).sqrt();
    // Side normal tilts outward by the cone's half-angle.
    let normal_y = radius / slant;
    let normal_r = height / slant;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for seg in 0..=segments {
        let theta = 2.0 * PI * seg as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        let normal = Vec3::new(cos * normal_r, normal_y, sin * normal_r);

        vertices.push(Vertex {
            position: Vec3::new(cos * radius, -h, sin * radius),
            normal,
        });
        vertices.push(Vertex {
            position: Vec3::new(0.0, h, 0.0),
            normal,
        });
    }

    for seg in 0..segments {
        let base = seg * 2;
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    push_cap(&mut vertices, &mut indices, radius, -h, Vec3::NEG_Y, segments);

    ModelPrimitive { vertices, indices }
}

fn cylinder(radius: f32, height: f32, segments: u32) -> ModelPrimitive {
    let h = height * 0.5;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for seg in 0..=segments {
        let theta = 2.0 * PI * seg as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        let normal = Vec3::new(cos, 0.0, sin);

        vertices.push(Vertex {
            position: Vec3::new(cos * radius, -h, sin * radius),
            normal,
        });
        vertices.push(Vertex {
            position: Vec3::new(cos * radius, h, sin * radius),
            normal,
        });
    }

    for seg in 0..segments {
        let base = seg * 2;
        indices.extend_from_slice(&[base, base + 1, base + 2]);
        indices.extend_from_slice(&[base + 1, base + 3, base + 2]);
    }

    push_cap(&mut vertices, &mut indices, radius, h, Vec3::Y, segments);
    push_cap(&mut vertices, &mut indices, radius, -h, Vec3::NEG_Y, segments);

    ModelPrimitive { vertices, indices }
}

fn push_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    normal: Vec3,
    segments: u32,
) {
    let center = vertices.len() as u32;
    vertices.push(Vertex {
        position: Vec3::new(0.0, y, 0.0),
        normal,
    });

    for seg in 0..=segments {
        let theta = 2.0 * PI * seg as f32 / segments as f32;
        let (sin, cos) = theta.sin_cos();
        vertices.push(Vertex {
            position: Vec3::new(cos * radius, y, sin * radius),
            normal,
        });
    }

    for seg in 0..segments {
        indices.extend_from_slice(&[center, center + 1 + seg, center + 2 + seg]);
    }
}

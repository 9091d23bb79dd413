use std::collections::HashMap;

use generational_arena::Arena;
use glam::{Mat4, Quat, Vec3};
use rand::Rng;

use crate::model::Model;
use crate::primitives::ShapeKind;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: id_arena::Arena<SceneModel>,
    shape_models: HashMap<ShapeKind, SceneModelId>,
    next_object_index: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: id_arena::Arena::new(),
            shape_models: HashMap::new(),
            next_object_index: 0,
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.insert(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn contains_object(&self, id: ObjectId) -> bool {
        self.objects.get(id).is_some()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    /// Shared mesh for a shape kind, built on first use.
    pub fn model_for_shape(&mut self, kind: ShapeKind) -> SceneModelId {
        if let Some(&id) = self.shape_models.get(&kind) {
            return id;
        }

        let model = Model::new(kind.label(), vec![kind.mesh()])
            .expect("primitive meshes always have geometry");
        let id = self.add_model(SceneModel::new(model));
        self.shape_models.insert(kind, id);

        id
    }

    /// Spawn a primitive at a uniformly-random position within
    /// `[-extent, extent]` on each axis.
    pub fn spawn_shape(&mut self, kind: ShapeKind, extent: f32, rng: &mut impl Rng) -> ObjectId {
        let position = Vec3::new(
            rng.gen_range(-extent..=extent),
            rng.gen_range(-extent..=extent),
            rng.gen_range(-extent..=extent),
        );
        let color = random_color(rng);

        self.spawn_shape_at(kind, position, color)
    }

    pub fn spawn_shape_at(&mut self, kind: ShapeKind, position: Vec3, color: Vec3) -> ObjectId {
        let model_id = self.model_for_shape(kind);
        self.next_object_index += 1;

        let object = Object3D {
            name: format!("{} {}", kind.label(), self.next_object_index),
            transform: Transform::from_translation(position),
            color,
            model_id: Some(model_id),
            parent_id: None,
            child_ids: Vec::new(),
        };

        log::info!("Spawned {} at {:?}", object.name, position);
        self.add_object(object)
    }

    /// Remove an object, detaching it from its parent and promoting its
    /// children to root objects.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(id) else {
            return false;
        };

        if let Some(parent_id) = object.parent_id {
            if let Some(parent) = self.objects.get_mut(parent_id) {
                parent.child_ids.retain(|&child| child != id);
            }
        }

        for child_id in object.child_ids {
            if let Some(child) = self.objects.get_mut(child_id) {
                child.parent_id = None;
            }
            self.invalidate_object_hierarchy(child_id);
        }

        log::info!("Removed {}", object.name);
        true
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: f32) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn object_color(&self, object_id: ObjectId) -> Option<Vec3> {
        self.objects.get(object_id).map(|object| object.color)
    }

    pub fn set_object_color(&mut self, object_id: ObjectId, color: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.color = color;
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Random display color: full hue range at fixed saturation/value so every
/// shape stays clearly distinguishable from the red selection highlight.
fn random_color(rng: &mut impl Rng) -> Vec3 {
    let hue = rng.gen_range(0.0..360.0f32);
    let saturation = 0.45;
    let value = 0.9;

    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

use glam::Vec3;

use crate::scene_graph::scene::Scene;
use crate::scene_graph::scene_model::SceneModelId;
use crate::scene_graph::transform::Transform;

/// Generational index into the scene's object registry. A removed object's
/// id never resolves again, even after the slot is reused.
pub type ObjectId = generational_arena::Index;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    /// Solid display color; swapped for the highlight color while selected.
    pub color: Vec3,
    pub model_id: Option<SceneModelId>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::from_translation(Vec3::ZERO),
            color: Vec3::ONE,
            model_id: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}

//! Single-object selection with highlight color swapping.

use glam::Vec3;

use crate::scene_graph::{ObjectId, Scene};

pub const HIGHLIGHT_COLOR: Vec3 = Vec3::new(1.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy)]
struct Selected {
    id: ObjectId,
    original_color: Vec3,
}

/// At most one object is selected at a time. The id is a generational index,
/// so a selection that outlives its object resolves to nothing instead of a
/// recycled slot.
#[derive(Debug, Default)]
pub struct SelectionState {
    current: Option<Selected>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.current.map(|selected| selected.id)
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected() == Some(id)
    }

    /// Click-hit transition: restore the previous object's color, then cache
    /// and highlight the new one. Re-selecting the current object is a no-op
    /// so the cached color is never overwritten with the highlight.
    pub fn select(&mut self, scene: &mut Scene, id: ObjectId) {
        if self.is_selected(id) {
            return;
        }

        self.restore(scene);

        let Some(original_color) = scene.object_color(id) else {
            return;
        };

        scene.set_object_color(id, HIGHLIGHT_COLOR);
        self.current = Some(Selected { id, original_color });
    }

    /// Click-miss transition: restore and go idle.
    pub fn clear(&mut self, scene: &mut Scene) {
        self.restore(scene);
    }

    /// Drops a selection whose object no longer exists in the registry.
    pub fn validate(&mut self, scene: &Scene) {
        if let Some(selected) = self.current {
            if !scene.contains_object(selected.id) {
                self.current = None;
            }
        }
    }

    fn restore(&mut self, scene: &mut Scene) {
        if let Some(selected) = self.current.take() {
            // A missing object was removed while selected; nothing to restore.
            scene.set_object_color(selected.id, selected.original_color);
        }
    }
}

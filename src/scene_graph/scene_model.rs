use id_arena::Id;

use crate::model::{Model, RenderModelId};

pub type SceneModelId = Id<SceneModel>;

pub struct SceneModel {
    pub name: String,
    pub model: Model,
    /// Filled in by the renderer once GPU buffers exist for this mesh.
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(model: Model) -> Self {
        Self {
            name: model.name.clone(),
            model,
            render_model: None,
        }
    }
}

//! Property panel: cached widget values and their sync with the selection.

use glam::{EulerRot, Quat, Vec3};

use crate::editor::EditorState;
use crate::primitives::ShapeKind;
use crate::scene_graph::Transform;

const POSITION_RANGE: f32 = 5.0;
const ROTATION_RANGE: f32 = 180.0;
const SCALE_MIN: f32 = 0.1;
const SCALE_MAX: f32 = 3.0;

/// Widget-side cache of the selected object's transform. Pushed from the
/// selection on every transition, pulled into the object on widget change.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub position: Vec3,
    pub rotation_degrees: Vec3,
    pub scale: f32,
    pub prompt: String,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: 1.0,
            prompt: String::new(),
        }
    }
}

impl PanelState {
    /// Back to defaults (position 0, rotation 0, scale 1). The prompt text
    /// is not selection state and survives.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation_degrees = Vec3::ZERO;
        self.scale = 1.0;
    }

    pub fn load_from(&mut self, transform: &Transform) {
        self.position = transform.translation();

        let (x, y, z) = transform.rotation().to_euler(EulerRot::XYZ);
        self.rotation_degrees = Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees());

        self.scale = transform.scale();
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_degrees.x.to_radians(),
            self.rotation_degrees.y.to_radians(),
            self.rotation_degrees.z.to_radians(),
        )
    }
}

pub fn draw_ui(ui: &imgui::Ui, editor: &mut EditorState) {
    ui.window("Properties")
        .size([340.0, 430.0], imgui::Condition::FirstUseEver)
        .position([16.0, 16.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.text("Add shape:");
            for (i, kind) in ShapeKind::ALL.into_iter().enumerate() {
                if i > 0 {
                    ui.same_line();
                }
                if ui.button(kind.label()) {
                    editor.spawn(kind);
                }
            }

            ui.separator();
            ui.input_text("Prompt", &mut editor.panel.prompt).build();
            if ui.button("Generate") {
                editor.request_generation();
            }
            if editor.generator.in_flight() > 0 {
                ui.same_line();
                ui.text("Generating...");
            }

            ui.separator();
            match editor
                .selection
                .selected()
                .and_then(|id| editor.scene.get_object(id))
                .map(|object| object.name.clone())
            {
                Some(name) => ui.text(format!("Selected: {}", name)),
                None => ui.text("Nothing selected"),
            }

            let panel = &mut editor.panel;
            let mut changed = false;
            changed |= ui.slider("Position X", -POSITION_RANGE, POSITION_RANGE, &mut panel.position.x);
            changed |= ui.slider("Position Y", -POSITION_RANGE, POSITION_RANGE, &mut panel.position.y);
            changed |= ui.slider("Position Z", -POSITION_RANGE, POSITION_RANGE, &mut panel.position.z);
            changed |= ui.slider(
                "Rotation X",
                -ROTATION_RANGE,
                ROTATION_RANGE,
                &mut panel.rotation_degrees.x,
            );
            changed |= ui.slider(
                "Rotation Y",
                -ROTATION_RANGE,
                ROTATION_RANGE,
                &mut panel.rotation_degrees.y,
            );
            changed |= ui.slider(
                "Rotation Z",
                -ROTATION_RANGE,
                ROTATION_RANGE,
                &mut panel.rotation_degrees.z,
            );
            changed |= ui.slider("Scale", SCALE_MIN, SCALE_MAX, &mut panel.scale);

            if changed {
                editor.apply_panel();
            }

            if editor.selection.selected().is_some() {
                ui.separator();
                if ui.button("Remove selected") {
                    editor.remove_selected();
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reset_restores_defaults_but_keeps_the_prompt() {
        let mut panel = PanelState {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation_degrees: Vec3::new(10.0, 20.0, 30.0),
            scale: 2.5,
            prompt: "a shiny ball".to_string(),
        };

        panel.reset();

        assert_eq!(panel.position, Vec3::ZERO);
        assert_eq!(panel.rotation_degrees, Vec3::ZERO);
        assert_eq!(panel.scale, 1.0);
        assert_eq!(panel.prompt, "a shiny ball");
    }

    #[test]
    fn test_load_reflects_the_transform() {
        let mut transform = Transform::from_translation(Vec3::new(1.0, -2.0, 0.5));
        transform.set_scale(1.5);
        transform.set_rotation(Quat::from_rotation_y(90.0f32.to_radians()));

        let mut panel = PanelState::default();
        panel.load_from(&transform);

        assert_eq!(panel.position, Vec3::new(1.0, -2.0, 0.5));
        assert_relative_eq!(panel.scale, 1.5, epsilon = 1e-5);
        assert_relative_eq!(panel.rotation_degrees.y, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rotation_round_trips_through_euler_angles() {
        let original = Quat::from_euler(EulerRot::XYZ, 0.3, 0.5, -0.2);
        let mut transform = Transform::from_translation(Vec3::ZERO);
        transform.set_rotation(original);

        let mut panel = PanelState::default();
        panel.load_from(&transform);

        assert_relative_eq!(panel.rotation().angle_between(original), 0.0, epsilon = 1e-4);
    }
}

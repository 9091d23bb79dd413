use anyhow::Context;
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::camera_controller::OrbitCameraController;
use crate::config::EditorConfig;
use crate::generate::GeneratorClient;
use crate::panel::PanelState;
use crate::picking;
use crate::primitives::ShapeKind;
use crate::scene_graph::Scene;
use crate::selection::SelectionState;

/// The editor session: every piece of non-GPU state, owned in one place and
/// handed by reference to picking, selection and panel sync.
pub struct EditorState {
    pub config: EditorConfig,
    pub camera: Camera,
    pub controller: OrbitCameraController,
    pub scene: Scene,
    pub selection: SelectionState,
    pub panel: PanelState,
    pub generator: GeneratorClient,
    rng: StdRng,
}

impl EditorState {
    pub fn new(config: EditorConfig) -> anyhow::Result<Self> {
        let camera = Camera {
            eye: config.initial_camera_eye,
            target: config.camera_target,
            up: Vec3::Y,
        };
        let controller = OrbitCameraController::from_camera(&camera);
        let generator = GeneratorClient::new(config.generator_addr.clone())
            .context("Failed to create generator client")?;

        Ok(Self {
            config,
            camera,
            controller,
            scene: Scene::new(),
            selection: SelectionState::new(),
            panel: PanelState::default(),
            generator,
            rng: StdRng::from_entropy(),
        })
    }

    /// Per-frame update: drain finished generation requests, drop stale
    /// selections and refresh world transforms.
    pub fn update(&mut self) {
        while let Some(kind) = self.generator.poll() {
            self.spawn(kind);
        }

        self.selection.validate(&self.scene);
        self.scene.late_update();
    }

    pub fn spawn(&mut self, kind: ShapeKind) {
        self.scene
            .spawn_shape(kind, self.config.spawn_extent, &mut self.rng);
    }

    pub fn request_generation(&mut self) {
        let prompt = self.panel.prompt.trim();
        if prompt.is_empty() {
            return;
        }
        self.generator.request(prompt.to_string());
    }

    /// Viewport click: pick, update the selection, push it into the panel.
    pub fn handle_click(&mut self, pos: Vec2, resolution: Vec2) {
        self.scene.late_update();

        let ray = self.camera.screen_ray(pos, resolution);
        match picking::pick(&self.scene, &ray) {
            Some(hit) => self.selection.select(&mut self.scene, hit.object),
            None => self.selection.clear(&mut self.scene),
        }

        self.sync_panel();
    }

    /// Pull: write the panel's values into the selected object, if any.
    pub fn apply_panel(&mut self) {
        let Some(id) = self.selection.selected() else {
            return;
        };

        self.scene.set_object_translation(id, self.panel.position);
        self.scene.set_object_rotation(id, self.panel.rotation());
        self.scene.set_object_scale(id, self.panel.scale);
    }

    pub fn remove_selected(&mut self) {
        let Some(id) = self.selection.selected() else {
            return;
        };

        self.selection.clear(&mut self.scene);
        self.scene.remove_object(id);
        self.sync_panel();
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.controller.orbit(&mut self.camera, dx, dy);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.controller.zoom(&mut self.camera, delta);
    }

    /// Push: selected transform into the widgets, or defaults when idle.
    fn sync_panel(&mut self) {
        match self
            .selection
            .selected()
            .and_then(|id| self.scene.get_object_transform(id))
        {
            Some(transform) => self.panel.load_from(transform),
            None => self.panel.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::HIGHLIGHT_COLOR;
    use approx::assert_relative_eq;
    use glam::Quat;

    const RESOLUTION: Vec2 = Vec2::new(1280.0, 720.0);

    fn editor() -> EditorState {
        EditorState::new(EditorConfig::default()).unwrap()
    }

    fn center() -> Vec2 {
        RESOLUTION * 0.5
    }

    #[test]
    fn test_click_on_an_object_selects_it() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::ONE);

        editor.handle_click(center(), RESOLUTION);

        assert_eq!(editor.selection.selected(), Some(id));
        assert_eq!(editor.scene.object_color(id), Some(HIGHLIGHT_COLOR));
        assert_eq!(editor.panel.position, Vec3::ZERO);
        assert_eq!(editor.panel.scale, 1.0);
    }

    #[test]
    fn test_click_on_empty_space_restores_and_resets() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::new(0.2, 0.4, 0.6));

        editor.handle_click(center(), RESOLUTION);
        editor.panel.position = Vec3::new(3.0, 0.0, 0.0);
        editor.apply_panel();

        // Corner pixel misses everything near the origin.
        editor.handle_click(Vec2::ZERO, RESOLUTION);

        assert_eq!(editor.selection.selected(), None);
        assert_eq!(editor.scene.object_color(id), Some(Vec3::new(0.2, 0.4, 0.6)));
        assert_eq!(editor.panel.position, Vec3::ZERO);
        assert_eq!(editor.panel.rotation_degrees, Vec3::ZERO);
        assert_eq!(editor.panel.scale, 1.0);
    }

    #[test]
    fn test_panel_edits_without_a_selection_do_nothing() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Sphere, Vec3::new(1.0, 1.0, 0.0), Vec3::ONE);

        editor.panel.position = Vec3::new(-4.0, 2.0, 2.0);
        editor.panel.scale = 2.0;
        editor.apply_panel();

        let transform = editor.scene.get_object_transform(id).unwrap();
        assert_eq!(transform.translation(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(transform.scale(), 1.0);
    }

    #[test]
    fn test_panel_round_trip_leaves_the_transform_unchanged() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Cone, Vec3::new(0.0, 0.0, 1.0), Vec3::ONE);
        editor
            .scene
            .set_object_rotation(id, Quat::from_euler(glam::EulerRot::XYZ, 0.2, 0.4, 0.1));
        editor.scene.set_object_scale(id, 1.25);

        editor.handle_click(center(), RESOLUTION);
        assert_eq!(editor.selection.selected(), Some(id));

        let before = editor.scene.get_object_transform(id).unwrap().clone();
        editor.apply_panel();
        let after = editor.scene.get_object_transform(id).unwrap();

        assert_eq!(after.translation(), before.translation());
        assert_eq!(after.scale(), before.scale());
        assert_relative_eq!(
            after.rotation().angle_between(before.rotation()),
            0.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_panel_edits_move_the_selected_object() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::ONE);

        editor.handle_click(center(), RESOLUTION);
        editor.panel.position = Vec3::new(2.0, -1.0, 0.5);
        editor.panel.scale = 1.5;
        editor.apply_panel();

        let transform = editor.scene.get_object_transform(id).unwrap();
        assert_eq!(transform.translation(), Vec3::new(2.0, -1.0, 0.5));
        assert_eq!(transform.scale(), 1.5);
    }

    #[test]
    fn test_remove_selected_clears_everything() {
        let mut editor = editor();
        let id = editor
            .scene
            .spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::ONE);

        editor.handle_click(center(), RESOLUTION);
        editor.remove_selected();

        assert_eq!(editor.selection.selected(), None);
        assert!(!editor.scene.contains_object(id));
        assert_eq!(editor.scene.object_count(), 0);
        assert_eq!(editor.panel.scale, 1.0);
    }

    #[test]
    fn test_empty_prompt_sends_nothing() {
        let mut editor = editor();
        editor.panel.prompt = "   ".to_string();
        editor.request_generation();
        assert_eq!(editor.generator.in_flight(), 0);
    }

    #[test]
    fn test_generation_round_trip_spawns_exactly_one_cube() {
        use crate::generate::server;
        use tokio::net::TcpListener;

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        runtime.spawn(server::serve(listener));

        let config = EditorConfig {
            generator_addr: addr,
            ..Default::default()
        };
        let mut editor = EditorState::new(config).unwrap();
        editor.panel.prompt = "a big wooden box".to_string();
        editor.request_generation();

        let mut spawned = false;
        for _ in 0..500 {
            editor.update();
            if editor.scene.object_count() > 0 {
                spawned = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(spawned, "generation request never produced a shape");
        assert_eq!(editor.scene.object_count(), 1);
        let (_, object) = editor.scene.objects.iter().next().unwrap();
        assert!(object.name.starts_with("Cube"));
    }

    #[test]
    fn test_failed_generation_spawns_nothing() {
        use tokio::net::TcpListener;

        // Grab a port nothing will listen on.
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let config = EditorConfig {
            generator_addr: addr,
            ..Default::default()
        };
        let mut editor = EditorState::new(config).unwrap();
        editor.panel.prompt = "a cube please".to_string();
        editor.request_generation();

        for _ in 0..100 {
            editor.update();
            if editor.generator.in_flight() == 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        editor.update();
        assert_eq!(editor.scene.object_count(), 0);
    }
}

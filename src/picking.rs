//! Ray-based hit testing against the scene.

use glam::Vec3;

use crate::scene_graph::{ObjectId, Scene};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub object: ObjectId,
    pub distance: f32,
}

/// Nearest object whose world-space bounds the ray enters. Objects without a
/// mesh (group parents) are not pickable. World transforms must be up to
/// date; callers run the scene's update pass first.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<Hit> {
    let mut best: Option<Hit> = None;

    for (id, object) in scene.objects.iter() {
        let Some(model_id) = object.model_id else {
            continue;
        };
        let Some(scene_model) = scene.models.get(model_id) else {
            continue;
        };

        let world_matrix = *object.transform.get_world_matrix();
        let bounds = scene_model.model.bounds.transformed(&world_matrix);

        if let Some(distance) = bounds.intersect_ray(ray.origin, ray.dir) {
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(Hit {
                    object: id,
                    distance,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::ShapeKind;

    fn ray_down_z() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn test_pick_hits_the_object_on_the_ray() {
        let mut scene = Scene::new();
        let id = scene.spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::ONE);
        scene.late_update();

        let hit = pick(&scene, &ray_down_z()).expect("cube sits on the ray");
        assert_eq!(hit.object, id);
    }

    #[test]
    fn test_pick_misses_offset_objects() {
        let mut scene = Scene::new();
        scene.spawn_shape_at(ShapeKind::Cube, Vec3::new(4.0, 0.0, 0.0), Vec3::ONE);
        scene.late_update();

        assert!(pick(&scene, &ray_down_z()).is_none());
    }

    #[test]
    fn test_pick_returns_the_nearest_of_two() {
        let mut scene = Scene::new();
        let far = scene.spawn_shape_at(ShapeKind::Cube, Vec3::new(0.0, 0.0, -3.0), Vec3::ONE);
        let near = scene.spawn_shape_at(ShapeKind::Cube, Vec3::new(0.0, 0.0, 3.0), Vec3::ONE);
        scene.late_update();

        let hit = pick(&scene, &ray_down_z()).unwrap();
        assert_eq!(hit.object, near);
        assert_ne!(hit.object, far);
    }

    #[test]
    fn test_scaled_objects_grow_their_hit_area() {
        let mut scene = Scene::new();
        let id = scene.spawn_shape_at(ShapeKind::Cube, Vec3::ZERO, Vec3::ONE);

        let wide_ray = Ray {
            origin: Vec3::new(1.5, 0.0, 10.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        };

        scene.late_update();
        assert!(pick(&scene, &wide_ray).is_none());

        scene.set_object_scale(id, 4.0);
        scene.late_update();
        assert!(pick(&scene, &wide_ray).is_some());
    }

    #[test]
    fn test_meshless_parents_are_not_pickable() {
        let mut scene = Scene::new();
        let group = scene.add_object(Default::default());
        scene.late_update();

        assert!(pick(&scene, &ray_down_z()).is_none());
        assert!(scene.contains_object(group));
    }

    #[test]
    fn test_camera_ray_through_screen_center_picks_the_target() {
        use crate::camera::Camera;
        use glam::Vec2;

        let mut scene = Scene::new();
        let id = scene.spawn_shape_at(ShapeKind::Sphere, Vec3::ZERO, Vec3::ONE);
        scene.late_update();

        let camera = Camera {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        };
        let resolution = Vec2::new(1280.0, 720.0);
        let ray = camera.screen_ray(resolution * 0.5, resolution);

        let hit = pick(&scene, &ray).expect("center ray passes through the target");
        assert_eq!(hit.object, id);
    }
}

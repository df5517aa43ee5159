//! The two posable objects and their per-frame step, independent of any window.

use corelib::{
    CommandReceiver, CoreResult, Entity, FrameTransformBuilder, Governance, InteractionController,
    Mat4, MotionConfig, ProjectionConfig, Renderable, TransformState, World, command_queue,
};

pub struct Scene {
    world: World,
    head: Entity,
    body: Entity,
    frame: FrameTransformBuilder,
    commands: CommandReceiver,
}

impl Scene {
    /// Spawn head and body (both governed by pointer and zoom) and the controller
    /// that feeds them. `objects` are the renderer indices of head and body.
    pub fn new(
        motion: &MotionConfig,
        projection: ProjectionConfig,
        (width, height): (u32, u32),
        [head_object, body_object]: [usize; 2],
    ) -> CoreResult<(Self, InteractionController)> {
        motion.validate()?;
        let frame = FrameTransformBuilder::new(projection, width, height)?;
        let (tx, rx) = command_queue();

        let mut world = World::new();
        let head = world.spawn(
            TransformState::new(motion.head_rate)?.with_depth(motion.initial_depth),
            Some(Renderable {
                object: head_object,
            }),
            Governance::ALL,
        );
        let body = world.spawn(
            TransformState::new(motion.body_rate)?.with_depth(motion.initial_depth),
            Some(Renderable {
                object: body_object,
            }),
            Governance::ALL,
        );

        for (name, e) in [("head", head), ("body", body)] {
            if let Some(t) = world.transform(e) {
                log::info!("Spawned {name}: rate {}, depth {}", t.rate(), t.depth());
            }
        }

        let scene = Self {
            world,
            head,
            body,
            frame,
            commands: rx,
        };
        Ok((scene, InteractionController::new(motion, tx)))
    }

    #[inline]
    pub fn head(&self) -> Entity {
        self.head
    }

    #[inline]
    pub fn body(&self) -> Entity {
        self.body
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.frame.projection()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
    }

    /// Apply queued input, advance every transform once, and return
    /// (renderer object, model matrix) for each drawable.
    pub fn step(&mut self) -> Vec<(usize, Mat4)> {
        let applied = self.world.run_frame(&self.commands);
        if applied > 0 {
            log::trace!("Frame applied {applied} commands");
        }
        self.world
            .iter_renderables()
            .map(|(t, r)| (r.object, self.frame.model_matrix(t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Vec3;

    fn scene() -> (Scene, InteractionController) {
        Scene::new(
            &MotionConfig::default(),
            ProjectionConfig::default(),
            (800, 600),
            [0, 1],
        )
        .unwrap()
    }

    #[test]
    fn objects_start_at_initial_depth() {
        let (mut s, _c) = scene();
        let draws = s.step();
        assert_eq!(draws.len(), 2);
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(draws[0], (0, expected));
        assert_eq!(draws[1], (1, expected));
    }

    #[test]
    fn rates_come_from_motion_config() {
        let (s, _c) = scene();
        let rate = |e| s.world().transform(e).unwrap().rate();
        assert_eq!(rate(s.head()), MotionConfig::default().head_rate);
        assert_eq!(rate(s.body()), MotionConfig::default().body_rate);
    }

    #[test]
    fn head_leads_body_after_a_drag() {
        let (mut s, mut c) = scene();
        c.on_pointer_down(0.5, 0.0);
        s.step();
        let head = s.world().transform(s.head()).unwrap().angle_y();
        let body = s.world().transform(s.body()).unwrap().angle_y();
        assert!(head > body && body > 0.0, "head {head}, body {body}");
    }

    #[test]
    fn arrow_step_only_turns_the_body() {
        let (mut s, mut c) = scene();
        c.on_step(s.body(), 0, 1);
        for _ in 0..200 {
            s.step();
        }
        assert_eq!(s.world().transform(s.head()).unwrap().angle_y(), 0.0);
        let body = s.world().transform(s.body()).unwrap().angle_y();
        assert!((body - 15.0).abs() < 1e-3);
    }

    #[test]
    fn resize_changes_projection() {
        let (mut s, _c) = scene();
        let before = s.projection();
        s.resize(600, 800);
        assert_ne!(before, s.projection());
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let motion = MotionConfig {
            body_rate: 0.0,
            ..Default::default()
        };
        assert!(Scene::new(&motion, ProjectionConfig::default(), (1, 1), [0, 1]).is_err());
    }
}

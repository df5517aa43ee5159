//! Core types: math re-exports, transform state, gestures, projection.

pub use glam::{Mat4, Vec3, Vec4};

pub mod camera;
pub mod command;
pub mod config;
pub mod ecs;
pub mod error;
pub mod input;
pub mod transform;

pub use camera::FrameTransformBuilder;
pub use command::{CommandReceiver, CommandSender, Target, TransformCommand, command_queue};
pub use config::{MotionConfig, PinchConvention, ProjectionConfig};
pub use ecs::{Entity, Governance, Renderable, World};
pub use error::{CoreError, CoreResult};
pub use input::{InteractionController, PointerPhase, TouchTracker, normalize_pointer};
pub use transform::TransformState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_input_drives_the_frame_matrices() {
        let motion = MotionConfig::default();
        let (tx, rx) = command_queue();
        let mut controller = InteractionController::new(&motion, tx);
        let mut world = World::new();
        let head = world.spawn(
            TransformState::new(motion.head_rate)
                .unwrap()
                .with_depth(motion.initial_depth),
            Some(Renderable { object: 0 }),
            Governance::ALL,
        );
        let frame =
            FrameTransformBuilder::new(ProjectionConfig::default(), 1280, 720).unwrap();

        controller.on_pointer_down(0.5, 0.0);
        // Nothing moves until the frame step runs.
        assert_eq!(world.transform(head).unwrap().angle_y(), 0.0);

        world.run_frame(&rx);
        let state = world.transform(head).unwrap();
        assert!((state.angle_y() - 90.0 * motion.head_rate).abs() < 1e-4);

        let mvp = frame.mvp(state).to_cols_array();
        assert!(mvp.iter().all(|f| f.is_finite()));
    }
}

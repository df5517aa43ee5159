//! Pointer and pinch handling.
//!
//! The controller never touches a `TransformState`. It turns gestures into
//! [`TransformCommand`]s addressed to the governed objects and queues them for the
//! frame step, so it works the same whether it drives one object or several.

use crate::command::{CommandSender, Target, TransformCommand};
use crate::config::{MotionConfig, PinchConvention};
use crate::ecs::Entity;

/// Map a pixel position to [-1, 1] on both axes, origin at the center, Y up.
pub fn normalize_pointer(px: f32, py: f32, width: u32, height: u32) -> (f32, f32) {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    ((px / w) * 2.0 - 1.0, -((py / h) * 2.0 - 1.0))
}

/// Per touch-session gesture memory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureState {
    /// Two-finger distance of the previous pinch sample.
    pub pinch_baseline: Option<f32>,
    /// Last normalized position of the primary pointer.
    pub primary: Option<(f32, f32)>,
}

#[derive(Debug)]
pub struct InteractionController {
    rotation_scale: f32,
    pinch_sensitivity: f32,
    pinch_convention: PinchConvention,
    scroll_step: f32,
    step_degrees: f32,
    gesture: GestureState,
    commands: CommandSender,
}

impl InteractionController {
    pub fn new(config: &MotionConfig, commands: CommandSender) -> Self {
        Self {
            rotation_scale: config.rotation_scale,
            pinch_sensitivity: config.pinch_sensitivity,
            pinch_convention: config.pinch_convention,
            scroll_step: config.scroll_step,
            step_degrees: config.step_degrees,
            gesture: GestureState::default(),
            commands,
        }
    }

    #[inline]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> TransformCommand {
        self.single_pointer(x, y)
    }

    /// Dragging keeps re-targeting exactly like a fresh press. A move to the position
    /// already recorded for the primary pointer emits nothing, unless it follows a pinch.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> Option<TransformCommand> {
        if self.gesture.primary == Some((x, y)) && self.gesture.pinch_baseline.is_none() {
            return None;
        }
        Some(self.single_pointer(x, y))
    }

    fn single_pointer(&mut self, x: f32, y: f32) -> TransformCommand {
        self.gesture.pinch_baseline = None;
        self.gesture.primary = Some((x, y));
        self.emit(TransformCommand::Retarget {
            target: Target::Governed,
            angle_x: -y * self.rotation_scale,
            angle_y: x * self.rotation_scale,
        })
    }

    /// Two-pointer sample. The first sample after a reset only records the baseline.
    pub fn on_pinch(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Option<TransformCommand> {
        let distance = (x2 - x1).hypot(y2 - y1);
        if !distance.is_finite() {
            return None;
        }
        let previous = self.gesture.pinch_baseline.replace(distance)?;
        let delta = (distance - previous) * self.pinch_sensitivity * self.pinch_convention.sign();
        if delta == 0.0 {
            return None;
        }
        Some(self.emit(TransformCommand::Zoom {
            target: Target::Governed,
            delta,
        }))
    }

    /// Forget the pinch baseline; the next two-finger sample starts a new pinch.
    pub fn reset_pinch(&mut self) {
        self.gesture.pinch_baseline = None;
    }

    /// Pointer count changed. Dropping below two fingers forgets the pinch baseline.
    pub fn on_pointer_count(&mut self, count: usize) {
        if count < 2 {
            self.reset_pinch();
        }
        if count == 0 {
            self.gesture.primary = None;
        }
    }

    /// Wheel zoom; positive lines scroll away from the user and approach the object.
    pub fn on_scroll(&mut self, lines: f32) -> Option<TransformCommand> {
        if lines == 0.0 || !lines.is_finite() {
            return None;
        }
        Some(self.emit(TransformCommand::Zoom {
            target: Target::Governed,
            delta: lines * self.scroll_step,
        }))
    }

    /// Discrete rotation of one object, in whole steps about each axis.
    pub fn on_step(&mut self, entity: Entity, steps_x: i32, steps_y: i32) -> TransformCommand {
        self.emit(TransformCommand::Step {
            target: Target::Entity(entity),
            delta_x: steps_x as f32 * self.step_degrees,
            delta_y: steps_y as f32 * self.step_degrees,
        })
    }

    fn emit(&self, cmd: TransformCommand) -> TransformCommand {
        self.commands.send(cmd);
        cmd
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Started,
    Moved,
    Ended,
}

/// Turns raw multi-touch events (pixel coordinates) into controller calls.
#[derive(Clone, Debug, Default)]
pub struct TouchTracker {
    active: Vec<(u64, [f32; 2])>,
    width: u32,
    height: u32,
}

impl TouchTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            active: Vec::new(),
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.active.len()
    }

    /// Ids of the two touches that drive the pinch, if there are that many.
    fn pinch_pair(&self) -> Option<(u64, u64)> {
        match self.active.as_slice() {
            [(a, _), (b, _), ..] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn handle(
        &mut self,
        controller: &mut InteractionController,
        id: u64,
        phase: PointerPhase,
        x: f32,
        y: f32,
    ) -> Option<TransformCommand> {
        let before = self.active.len();
        let pair = self.pinch_pair();
        let slot = self.active.iter().position(|(tid, _)| *tid == id);
        match (phase, slot) {
            (PointerPhase::Ended, Some(i)) => {
                self.active.remove(i);
            }
            (PointerPhase::Ended, None) => {}
            (_, Some(i)) => self.active[i].1 = [x, y],
            (_, None) => self.active.push((id, [x, y])),
        }

        let count = self.active.len();
        if count != before {
            controller.on_pointer_count(count);
        }
        // A different pair of fingers must not be compared against the old distance.
        if self.pinch_pair() != pair {
            controller.reset_pinch();
        }
        if phase == PointerPhase::Ended {
            return None;
        }

        match self.active.as_slice() {
            [(_, [px, py])] => {
                let (nx, ny) = normalize_pointer(*px, *py, self.width, self.height);
                if before == 0 {
                    Some(controller.on_pointer_down(nx, ny))
                } else {
                    controller.on_pointer_move(nx, ny)
                }
            }
            [(_, [x1, y1]), (_, [x2, y2]), ..] => controller.on_pinch(*x1, *y1, *x2, *y2),
            [] => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandReceiver, command_queue};

    fn controller() -> (InteractionController, CommandReceiver) {
        let (tx, rx) = command_queue();
        (InteractionController::new(&MotionConfig::default(), tx), rx)
    }

    fn zoom_delta(cmd: Option<TransformCommand>) -> f32 {
        match cmd {
            Some(TransformCommand::Zoom { delta, .. }) => delta,
            other => panic!("expected zoom, got {other:?}"),
        }
    }

    #[test]
    fn normalization_inverts_y() {
        assert_eq!(normalize_pointer(0.0, 0.0, 200, 100), (-1.0, 1.0));
        assert_eq!(normalize_pointer(100.0, 50.0, 200, 100), (0.0, 0.0));
        assert_eq!(normalize_pointer(200.0, 100.0, 200, 100), (1.0, -1.0));
    }

    #[test]
    fn pointer_down_targets_scaled_angles() {
        let (mut c, rx) = controller();
        let cmd = c.on_pointer_down(0.5, 0.25);
        assert_eq!(
            cmd,
            TransformCommand::Retarget {
                target: Target::Governed,
                angle_x: -45.0,
                angle_y: 90.0
            }
        );
        assert_eq!(rx.drain().collect::<Vec<_>>(), vec![cmd]);
    }

    #[test]
    fn move_retargets_like_down() {
        let (mut c, _rx) = controller();
        let down = c.on_pointer_down(-0.2, 0.4);
        let moved = c.on_pointer_move(0.3, 0.4);
        assert_eq!(c.gesture().primary, Some((0.3, 0.4)));
        assert!(matches!(
            (down, moved),
            (
                TransformCommand::Retarget { angle_x: dx, .. },
                Some(TransformCommand::Retarget { angle_x: mx, .. })
            ) if dx == mx
        ));
    }

    #[test]
    fn move_to_recorded_position_is_skipped() {
        let (mut c, rx) = controller();
        c.on_pointer_down(0.1, 0.2);
        assert_eq!(c.on_pointer_move(0.1, 0.2), None);
        assert_eq!(rx.drain().count(), 1);

        // After a pinch the same position retargets again.
        c.on_pinch(0.0, 0.0, 10.0, 0.0);
        assert!(c.on_pointer_move(0.1, 0.2).is_some());
    }

    #[test]
    fn pinch_delta_is_distance_change_times_sensitivity() {
        let (mut c, _rx) = controller();
        assert_eq!(c.on_pinch(0.0, 0.0, 10.0, 0.0), None);
        let first = zoom_delta(c.on_pinch(0.0, 0.0, 15.0, 0.0));
        assert!((first - 5.0 * 0.01).abs() < 1e-6);

        let second = zoom_delta(c.on_pinch(0.0, 0.0, 20.0, 0.0));
        assert_eq!(first.signum(), second.signum());
        assert_eq!(c.gesture().pinch_baseline, Some(20.0));
    }

    #[test]
    fn shrinking_pinch_has_opposite_sign() {
        let (mut c, _rx) = controller();
        c.on_pinch(0.0, 0.0, 0.0, 20.0);
        assert!(zoom_delta(c.on_pinch(0.0, 0.0, 0.0, 10.0)) < 0.0);
    }

    #[test]
    fn receding_convention_flips_sign() {
        let (tx, _rx) = command_queue();
        let config = MotionConfig {
            pinch_convention: PinchConvention::SpreadRecedes,
            ..Default::default()
        };
        let mut c = InteractionController::new(&config, tx);
        c.on_pinch(0.0, 0.0, 10.0, 0.0);
        assert!(zoom_delta(c.on_pinch(0.0, 0.0, 15.0, 0.0)) < 0.0);
    }

    #[test]
    fn single_pointer_resets_pinch_baseline() {
        let (mut c, _rx) = controller();
        c.on_pinch(0.0, 0.0, 10.0, 0.0);
        c.on_pointer_move(0.0, 0.0);
        assert_eq!(c.gesture().pinch_baseline, None);
        // Next two-finger sample starts over instead of jumping by 490.
        assert_eq!(c.on_pinch(0.0, 0.0, 500.0, 0.0), None);
    }

    #[test]
    fn count_drop_resets_baseline() {
        let (mut c, _rx) = controller();
        c.on_pointer_down(0.1, 0.1);
        c.on_pinch(0.0, 0.0, 10.0, 0.0);
        c.on_pointer_count(1);
        assert_eq!(c.gesture().pinch_baseline, None);
        c.on_pointer_count(0);
        assert_eq!(c.gesture(), &GestureState::default());
    }

    #[test]
    fn step_addresses_one_entity() {
        let (mut c, _rx) = controller();
        assert_eq!(
            c.on_step(1, 0, -2),
            TransformCommand::Step {
                target: Target::Entity(1),
                delta_x: 0.0,
                delta_y: -30.0
            }
        );
    }

    #[test]
    fn scroll_zooms_by_step() {
        let (mut c, _rx) = controller();
        assert!((zoom_delta(c.on_scroll(2.0)) - 1.0).abs() < 1e-6);
        assert_eq!(c.on_scroll(0.0), None);
    }

    #[test]
    fn tracker_routes_one_and_two_fingers() {
        let (mut c, rx) = controller();
        let mut t = TouchTracker::new(100, 100);

        let down = t.handle(&mut c, 7, PointerPhase::Started, 100.0, 50.0);
        assert!(matches!(
            down,
            Some(TransformCommand::Retarget { angle_y, .. }) if angle_y == 180.0
        ));

        // Second finger: first pinch sample only sets the baseline.
        assert_eq!(t.handle(&mut c, 9, PointerPhase::Started, 100.0, 60.0), None);
        assert_eq!(t.active(), 2);
        let zoom = t.handle(&mut c, 9, PointerPhase::Moved, 100.0, 70.0);
        assert!((zoom_delta(zoom) - 0.1).abs() < 1e-6);

        // Lifting one finger resets the baseline; the remaining one drags.
        assert_eq!(t.handle(&mut c, 9, PointerPhase::Ended, 100.0, 70.0), None);
        assert_eq!(c.gesture().pinch_baseline, None);
        let drag = t.handle(&mut c, 7, PointerPhase::Moved, 50.0, 50.0);
        assert!(matches!(drag, Some(TransformCommand::Retarget { .. })));

        t.handle(&mut c, 7, PointerPhase::Ended, 50.0, 50.0);
        assert_eq!(t.active(), 0);
        assert_eq!(rx.drain().count(), 3);
    }

    #[test]
    fn tracker_restarts_pinch_when_the_pair_changes() {
        let (mut c, _rx) = controller();
        let mut t = TouchTracker::new(1000, 1000);
        t.handle(&mut c, 1, PointerPhase::Started, 0.0, 0.0);
        t.handle(&mut c, 2, PointerPhase::Started, 10.0, 0.0);
        t.handle(&mut c, 3, PointerPhase::Started, 500.0, 0.0);
        assert_eq!(c.gesture().pinch_baseline, Some(10.0));

        // Lifting finger 1 leaves 2 and 3 pinching, 490 px apart.
        t.handle(&mut c, 1, PointerPhase::Ended, 0.0, 0.0);
        assert_eq!(t.active(), 2);
        assert_eq!(c.gesture().pinch_baseline, None);
        assert_eq!(t.handle(&mut c, 3, PointerPhase::Moved, 500.0, 0.0), None);
        assert_eq!(c.gesture().pinch_baseline, Some(490.0));

        // Real movement of the new pair zooms from the new baseline.
        let zoom = t.handle(&mut c, 3, PointerPhase::Moved, 510.0, 0.0);
        assert!((zoom_delta(zoom) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn third_finger_keeps_the_pinch() {
        let (mut c, _rx) = controller();
        let mut t = TouchTracker::new(1000, 1000);
        t.handle(&mut c, 1, PointerPhase::Started, 0.0, 0.0);
        t.handle(&mut c, 2, PointerPhase::Started, 10.0, 0.0);
        t.handle(&mut c, 3, PointerPhase::Started, 500.0, 0.0);
        t.handle(&mut c, 3, PointerPhase::Ended, 500.0, 0.0);
        assert_eq!(c.gesture().pinch_baseline, Some(10.0));
    }
}

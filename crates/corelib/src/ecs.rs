//! Tiny ECS: World, Entity, components: TransformState + Renderable + Governance.

use crate::command::{CommandReceiver, Target, TransformCommand};
use crate::transform::TransformState;

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Index of the GPU-side object (mesh set + texture) an entity draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    pub object: usize,
}

/// Which controller-wide gestures an entity follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Governance {
    pub pointer: bool,
    pub zoom: bool,
}

impl Governance {
    pub const ALL: Self = Self {
        pointer: true,
        zoom: true,
    };
    pub const NONE: Self = Self {
        pointer: false,
        zoom: false,
    };
}

/// Very small ECS world with dense parallel arrays.
/// Only the frame step mutates transforms; input goes through the command queue.
#[derive(Default)]
pub struct World {
    transforms: Vec<TransformState>,
    renderables: Vec<Option<Renderable>>,
    governance: Vec<Governance>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with its transform, optional Renderable and gesture flags.
    pub fn spawn(&mut self, t: TransformState, r: Option<Renderable>, g: Governance) -> Entity {
        let id = self.transforms.len() as Entity;
        self.transforms.push(t);
        self.renderables.push(r);
        self.governance.push(g);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    #[inline]
    pub fn transform(&self, e: Entity) -> Option<&TransformState> {
        self.transforms.get(e as usize)
    }

    /// Iterate over (Transform, Renderable) pairs.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (&TransformState, &Renderable)> {
        self.transforms
            .iter()
            .zip(&self.renderables)
            .filter_map(|(t, r)| r.as_ref().map(|r| (t, r)))
    }

    /// Apply one command to every entity it addresses.
    pub fn apply(&mut self, cmd: TransformCommand) {
        let (target, is_zoom) = match cmd {
            TransformCommand::Retarget { target, .. } | TransformCommand::Step { target, .. } => {
                (target, false)
            }
            TransformCommand::Zoom { target, .. } => (target, true),
        };

        for (i, (t, g)) in self
            .transforms
            .iter_mut()
            .zip(&self.governance)
            .enumerate()
        {
            let hit = match target {
                Target::Governed => {
                    if is_zoom {
                        g.zoom
                    } else {
                        g.pointer
                    }
                }
                Target::Entity(e) => e as usize == i,
            };
            if !hit {
                continue;
            }
            match cmd {
                TransformCommand::Retarget {
                    angle_x, angle_y, ..
                } => t.set_target(angle_x, angle_y),
                TransformCommand::Zoom { delta, .. } => t.zoom(delta),
                TransformCommand::Step {
                    delta_x, delta_y, ..
                } => t.step(delta_x, delta_y),
            }
        }

        if let Target::Entity(e) = target {
            if e as usize >= self.transforms.len() {
                log::debug!("Command for unknown entity {e}: {cmd:?}");
            }
        }
    }

    /// System: advance every transform by one frame.
    pub fn system_advance_all(&mut self) {
        for t in &mut self.transforms {
            t.advance();
        }
    }

    /// The per-frame step: apply everything queued since the last frame, then advance.
    /// Returns the number of commands applied.
    pub fn run_frame(&mut self, commands: &CommandReceiver) -> usize {
        let mut applied = 0;
        for cmd in commands.drain() {
            self.apply(cmd);
            applied += 1;
        }
        self.system_advance_all();
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::command_queue;

    fn head_and_body() -> (World, Entity, Entity) {
        let mut w = World::new();
        let head = w.spawn(
            TransformState::new(0.2).unwrap().with_depth(-5.0),
            Some(Renderable { object: 0 }),
            Governance::ALL,
        );
        let body = w.spawn(
            TransformState::new(0.1).unwrap().with_depth(-5.0),
            Some(Renderable { object: 1 }),
            Governance::ALL,
        );
        (w, head, body)
    }

    #[test]
    fn governed_retarget_reaches_all_with_distinct_lag() {
        let (mut w, head, body) = head_and_body();
        let (tx, rx) = command_queue();
        tx.send(TransformCommand::Retarget {
            target: Target::Governed,
            angle_x: 0.0,
            angle_y: 100.0,
        });
        assert_eq!(w.run_frame(&rx), 1);

        assert!((w.transform(head).unwrap().angle_y() - 20.0).abs() < 1e-4);
        assert!((w.transform(body).unwrap().angle_y() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn step_touches_only_its_entity() {
        let (mut w, head, body) = head_and_body();
        w.apply(TransformCommand::Step {
            target: Target::Entity(body),
            delta_x: 0.0,
            delta_y: 15.0,
        });
        assert_eq!(w.transform(body).unwrap().target(), (0.0, 15.0));
        assert_eq!(w.transform(head).unwrap().target(), (0.0, 0.0));
    }

    #[test]
    fn zoom_respects_governance() {
        let mut w = World::new();
        let zoomed = w.spawn(TransformState::new(0.1).unwrap(), None, Governance::ALL);
        let fixed = w.spawn(
            TransformState::new(0.1).unwrap(),
            None,
            Governance {
                pointer: true,
                zoom: false,
            },
        );
        w.apply(TransformCommand::Zoom {
            target: Target::Governed,
            delta: 2.0,
        });
        assert_eq!(w.transform(zoomed).unwrap().depth(), 2.0);
        assert_eq!(w.transform(fixed).unwrap().depth(), 0.0);
    }

    #[test]
    fn frame_without_input_still_advances() {
        let (mut w, head, _) = head_and_body();
        let (_tx, rx) = command_queue();
        w.apply(TransformCommand::Retarget {
            target: Target::Governed,
            angle_x: 50.0,
            angle_y: 0.0,
        });
        assert_eq!(w.run_frame(&rx), 0);
        assert!(w.transform(head).unwrap().angle_x() > 0.0);
    }

    #[test]
    fn renderables_iterate_in_spawn_order() {
        let (mut w, _, _) = head_and_body();
        w.spawn(TransformState::new(1.0).unwrap(), None, Governance::NONE);
        let objects: Vec<usize> = w.iter_renderables().map(|(_, r)| r.object).collect();
        assert_eq!(objects, vec![0, 1]);
        assert_eq!(w.len(), 3);
    }
}

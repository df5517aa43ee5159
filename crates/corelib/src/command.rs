//! Single-writer hand-off between input handlers and the frame step.
//!
//! Input code only ever holds a [`CommandSender`]; the frame step owns the
//! [`CommandReceiver`] and is the only place a `TransformState` is mutated.

use std::sync::mpsc;

use crate::ecs::Entity;

/// Which objects a command addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Every object flagged for the corresponding gesture.
    Governed,
    Entity(Entity),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformCommand {
    Retarget { target: Target, angle_x: f32, angle_y: f32 },
    Zoom { target: Target, delta: f32 },
    Step { target: Target, delta_x: f32, delta_y: f32 },
}

#[derive(Clone, Debug)]
pub struct CommandSender(mpsc::Sender<TransformCommand>);

impl CommandSender {
    /// Fire-and-forget. A closed queue means the frame loop is gone; the command is dropped.
    pub fn send(&self, cmd: TransformCommand) {
        if self.0.send(cmd).is_err() {
            log::debug!("Frame loop closed, dropping {cmd:?}");
        }
    }
}

#[derive(Debug)]
pub struct CommandReceiver(mpsc::Receiver<TransformCommand>);

impl CommandReceiver {
    /// Everything queued so far, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = TransformCommand> + '_ {
        self.0.try_iter()
    }
}

pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (CommandSender(tx), CommandReceiver(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties_queue() {
        let (tx, rx) = command_queue();
        tx.send(TransformCommand::Zoom {
            target: Target::Governed,
            delta: 1.0,
        });
        tx.send(TransformCommand::Zoom {
            target: Target::Governed,
            delta: 2.0,
        });
        let deltas: Vec<f32> = rx
            .drain()
            .map(|c| match c {
                TransformCommand::Zoom { delta, .. } => delta,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(deltas, vec![1.0, 2.0]);
        assert_eq!(rx.drain().count(), 0);
    }

    #[test]
    fn senders_work_from_other_threads() {
        let (tx, rx) = command_queue();
        let remote = tx.clone();
        std::thread::spawn(move || {
            remote.send(TransformCommand::Step {
                target: Target::Entity(1),
                delta_x: 0.0,
                delta_y: 15.0,
            })
        })
        .join()
        .unwrap();
        assert_eq!(rx.drain().count(), 1);
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (tx, rx) = command_queue();
        drop(rx);
        tx.send(TransformCommand::Zoom {
            target: Target::Governed,
            delta: 1.0,
        });
    }
}

//! Transport-neutral seams between the route model and the map surface.
//!
//! The map surface talks to the model through [`InboundHandler`] and
//! receives commands through a [`CommandSink`]. Neither side knows whether
//! the other lives in-process, behind a queue, or across HTTP.

use std::collections::VecDeque;

use shared::{MapCommand, MapEvent};

/// Receives fire-and-forget notifications from the map surface.
///
/// The surface has already drawn the change; implementations keep the model
/// consistent with it and never reject an event.
pub trait InboundHandler {
    fn handle_event(&mut self, event: MapEvent);
}

/// Accepts commands destined for the map surface.
pub trait CommandSink {
    fn send(&mut self, command: MapCommand);

    /// Forget commands not yet delivered; called before a full replay.
    fn discard_pending(&mut self) {}
}

/// Pending commands kept for a surface that stopped polling. A surface that
/// falls this far behind has to request a full replay anyway.
pub const MAX_PENDING_COMMANDS: usize = 4096;

/// Buffers commands until the map surface collects them.
#[derive(Debug)]
pub struct CommandQueue {
    pending: VecDeque<MapCommand>,
    capacity: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::with_capacity(MAX_PENDING_COMMANDS)
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Take every pending command in issue order.
    pub fn drain(&mut self) -> Vec<MapCommand> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl CommandSink for CommandQueue {
    fn send(&mut self, command: MapCommand) {
        if self.pending.len() >= self.capacity {
            tracing::warn!(
                "map surface is not polling, dropping oldest of {} pending commands",
                self.pending.len()
            );
            self.pending.pop_front();
        }
        tracing::debug!("queued map command {command:?}");
        self.pending.push_back(command);
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

impl CommandSink for Vec<MapCommand> {
    fn send(&mut self, command: MapCommand) {
        self.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_issue_order() {
        let mut queue = CommandQueue::new();
        queue.send(MapCommand::ClearAllRoutes);
        queue.send(MapCommand::SetCurrentRoute { route_id: 0 });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                MapCommand::ClearAllRoutes,
                MapCommand::SetCurrentRoute { route_id: 0 }
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_oldest() {
        let mut queue = CommandQueue::with_capacity(2);
        for route_id in 0..3 {
            queue.send(MapCommand::SetCurrentRoute { route_id });
        }
        assert_eq!(
            queue.drain(),
            vec![
                MapCommand::SetCurrentRoute { route_id: 1 },
                MapCommand::SetCurrentRoute { route_id: 2 }
            ]
        );
    }

    #[test]
    fn discard_pending_empties_queue() {
        let mut queue = CommandQueue::new();
        queue.send(MapCommand::TogglePoi);
        queue.discard_pending();
        assert!(queue.is_empty());
    }
}

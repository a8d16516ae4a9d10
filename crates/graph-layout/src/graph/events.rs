use super::{Edge, NodeId};
use crossbeam::channel::{unbounded, Receiver, Sender};

/// Notification emitted by a [`Graph`](super::Graph) after each mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    EdgeAdded(Edge),
    EdgeRemoved(Edge),
    /// The payload of a node was replaced
    DataChanged(NodeId),
    /// Everything must be reloaded (the graph was cleared)
    Invalidated,
}

/// Fan-out list of event channels
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<GraphEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Receiver<GraphEvent> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    /// Send to every live receiver, forgetting the ones that were dropped
    pub(crate) fn notify(&mut self, event: GraphEvent) {
        self.senders.retain(|tx| tx.send(event).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

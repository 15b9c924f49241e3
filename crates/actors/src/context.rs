use std::sync::atomic::{AtomicBool, Ordering};

use crate::{actor::Actor, actor_ref::WeakActorRef};

/// Handed to every handler. Gives access to the actor's own address without
/// keeping its mailbox open.
pub struct Context<A: Actor> {
    myself: WeakActorRef<A>,
    stopped: AtomicBool,
}

impl<A: Actor> Context<A> {
    pub(crate) fn new(myself: WeakActorRef<A>) -> Self {
        Self {
            myself,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn myself(&self) -> WeakActorRef<A> {
        self.myself.clone()
    }

    /// Stops the actor after the current message. Messages still queued are
    /// dropped.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

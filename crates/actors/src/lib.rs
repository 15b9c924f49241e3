use std::panic::AssertUnwindSafe;

use actor::{Actor, SupervisionStrategy};
use actor_ref::ActorRef;
use context::Context;
use futures::FutureExt;
use mailbox::{bounded_mailbox, MailboxReceiver};

pub mod actor;
pub mod actor_ref;
pub mod context;
pub mod handler;
pub mod mailbox;

pub const DEFAULT_MAILBOX_SIZE: usize = 32;

/// Creates and runs an actor. If a handler panics, the actor is restarted,
/// resumed or stopped according to `Actor::on_fail()`.
pub fn run<A, F>(actor_factory: F) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn() -> A,
{
    run_with_capacity(DEFAULT_MAILBOX_SIZE, actor_factory)
}

/// Like [`run`], with an explicit mailbox size. Senders wait while the mailbox
/// is full.
pub fn run_with_capacity<A, F>(capacity: usize, actor_factory: F) -> ActorRef<A>
where
    A: Actor,
    F: 'static + Send + Fn() -> A,
{
    let (tx, mut rx) = bounded_mailbox(capacity.max(1));
    let actor_ref = ActorRef::new(tx);
    let context = Context::new(actor_ref.downgrade());
    let mut actor = actor_factory();

    // run actor
    tokio::spawn(async move {
        actor.on_start(&context);
        while let Some(mut message) = rx.recv().await {
            // handle message
            let result = AssertUnwindSafe(message.handle(&mut actor, &context))
                .catch_unwind()
                .await;
            // handler paniced?
            if let Err(why) = result {
                log::error!("actor paniced: {:?}", why);
                match actor.on_fail(why) {
                    SupervisionStrategy::Restart => {
                        actor.on_stop();
                        actor = actor_factory();
                        actor.on_start(&context);
                    }
                    SupervisionStrategy::Resume => {}
                    SupervisionStrategy::Stop => {
                        break;
                    }
                };
            }
            if context.is_stopped() {
                break;
            }
        }
        drop(rx);
        actor.on_stop();
    });

    actor_ref
}

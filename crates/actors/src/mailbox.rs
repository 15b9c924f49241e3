use std::fmt::Debug;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{handler::MessageHandler, Actor};

#[async_trait]
pub trait Mailbox<A>
where
    A: Actor,
{
    type Error: Debug;

    async fn send<M>(&self, message: M) -> Result<(), Self::Error>
    where
        M: MessageHandler<A> + 'static;
}

#[async_trait]
pub trait MailboxReceiver<A>
where
    A: Actor,
{
    async fn recv(&mut self) -> Option<Box<dyn MessageHandler<A>>>
    where
        A: Actor;
}

type Envelope<A> = Box<dyn MessageHandler<A>>;

pub struct BoundedMailbox<A>(mpsc::Sender<Envelope<A>>);

impl<A: Actor> Clone for BoundedMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> BoundedMailbox<A> {
    pub fn downgrade(&self) -> WeakMailbox<A> {
        WeakMailbox(self.0.downgrade())
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

#[async_trait]
impl<A> Mailbox<A> for BoundedMailbox<A>
where
    A: Actor,
{
    type Error = mpsc::error::SendError<Envelope<A>>;

    async fn send<M>(&self, message: M) -> Result<(), Self::Error>
    where
        M: MessageHandler<A> + 'static,
    {
        self.0.send(Box::new(message)).await?;
        Ok(())
    }
}

pub struct WeakMailbox<A>(mpsc::WeakSender<Envelope<A>>);

impl<A: Actor> Clone for WeakMailbox<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Actor> WeakMailbox<A> {
    pub fn upgrade(&self) -> Option<BoundedMailbox<A>> {
        self.0.upgrade().map(BoundedMailbox)
    }
}

pub struct BoundedMailboxReceiver<A>(mpsc::Receiver<Envelope<A>>);

#[async_trait]
impl<A> MailboxReceiver<A> for BoundedMailboxReceiver<A>
where
    A: Actor,
{
    async fn recv(&mut self) -> Option<Box<dyn MessageHandler<A>>>
    where
        A: Actor,
    {
        self.0.recv().await
    }
}

pub fn bounded_mailbox<A>(buffer: usize) -> (BoundedMailbox<A>, BoundedMailboxReceiver<A>)
where
    A: Actor,
{
    let (tx, rx) = mpsc::channel(buffer);
    (BoundedMailbox(tx), BoundedMailboxReceiver(rx))
}

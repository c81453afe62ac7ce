//! Async driver for the [`Channel`] state machine.
//!
//! [`TransportChannel`] spawns one actor task per view. The task owns the
//! [`Channel`], the current [`Link`] and the retry timer, and executes the
//! channel's actions with a [`Connector`]. The caller keeps a cheap handle and
//! an event receiver. Dropping the handle stops the task, which drops the link
//! and with it the socket.

use std::{future::Future, pin::Pin, sync::Arc};

use poker_proto::ClientMessage;
use thiserror::Error;
use tokio::{
    sync::mpsc,
    task::AbortHandle,
    time::{Sleep, sleep},
};

use crate::{Channel, ChannelAction, ChannelConfig, ChannelEvent, Endpoint, LinkId};

/// Transport errors.
///
/// Never returned to the view: the actor logs them and turns them into state
/// transitions.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint does not form a valid URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Established connection failed.
    #[error("stream error: {0}")]
    Stream(String),
}

/// Raw duplex text socket primitive.
///
/// Implementations open one connection per call and hand back a [`Link`].
/// When the remote side goes away the link's inbound queue must end.
pub trait Connector: Send + Sync + 'static {
    /// Open a link to `endpoint`.
    fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Link, TransportError>> + Send;
}

/// An open duplex text link.
///
/// Dropping the link aborts its I/O task, if it has one. [`Link::close`] lets
/// the task finish instead, so it can close the socket gracefully.
#[derive(Debug)]
pub struct Link {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
    task: Option<AbortHandle>,
}

impl Link {
    /// Link over a pair of queues.
    ///
    /// Frames written to the link go to `outbound`. The link ends once every
    /// sender feeding `inbound` is dropped.
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        inbound: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self { outbound, inbound, task: None }
    }

    /// Tie the lifetime of an I/O task to this link.
    #[must_use]
    pub fn with_task(mut self, task: AbortHandle) -> Self {
        self.task = Some(task);
        self
    }

    /// Close the outbound side and let the I/O task wind down.
    pub fn close(mut self) {
        self.task = None;
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Debug)]
enum Command {
    Connect(Endpoint),
    Disconnect,
    Send(String),
}

/// Handle to a running channel actor.
///
/// All methods are fire-and-forget. They never block and never fail: outcomes
/// are observed as [`ChannelEvent`]s.
#[derive(Debug)]
pub struct TransportChannel {
    commands: mpsc::UnboundedSender<Command>,
    task: AbortHandle,
}

impl TransportChannel {
    /// Spawn the actor on the current tokio runtime.
    ///
    /// Returns the handle and the receiver of channel events.
    pub fn spawn<C: Connector>(
        connector: C,
        config: ChannelConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            connector: Arc::new(connector),
            channel: Channel::new(config),
            commands: commands_rx,
            events: events_tx,
            opened_tx,
            opened_rx,
            opening: None,
            link: None,
            retry: None,
        };
        let task = tokio::spawn(actor.run()).abort_handle();

        (Self { commands: commands_tx, task }, events_rx)
    }

    /// Target the room at `endpoint`. No-op if already targeting it.
    pub fn connect(&self, endpoint: Endpoint) {
        self.command(Command::Connect(endpoint));
    }

    /// Close the connection, cancel retries and discard the pending message.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Send an intent now if open, otherwise keep it as the pending message.
    pub fn send(&self, message: &ClientMessage) {
        match message.encode() {
            Ok(text) => self.command(Command::Send(text)),
            Err(error) => tracing::error!(%error, kind = message.kind(), "dropping intent"),
        }
    }

    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!("channel actor stopped");
        }
    }
}

impl Drop for TransportChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

type Opened = (LinkId, Result<Link, TransportError>);

struct Actor<C> {
    connector: Arc<C>,
    channel: Channel,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    opened_tx: mpsc::UnboundedSender<Opened>,
    opened_rx: mpsc::UnboundedReceiver<Opened>,
    opening: Option<AbortHandle>,
    link: Option<(LinkId, Link)>,
    retry: Option<(LinkId, Pin<Box<Sleep>>)>,
}

enum Step {
    Command(Option<Command>),
    Opened(LinkId, Result<Link, TransportError>),
    Frame(LinkId, Option<String>),
    Retry(LinkId),
}

impl<C: Connector> Actor<C> {
    async fn run(mut self) {
        loop {
            let step = tokio::select! {
                biased;
                command = self.commands.recv() => Step::Command(command),
                Some((link, result)) = self.opened_rx.recv() => Step::Opened(link, result),
                (link, frame) = next_frame(&mut self.link) => Step::Frame(link, frame),
                link = retry_due(&mut self.retry) => Step::Retry(link),
            };

            let actions = match step {
                Step::Command(None) => break,
                Step::Command(Some(Command::Connect(endpoint))) => self.channel.connect(endpoint),
                Step::Command(Some(Command::Disconnect)) => self.channel.disconnect(),
                Step::Command(Some(Command::Send(text))) => self.channel.send(text),
                Step::Opened(link, _) if link != self.channel.link() => {
                    tracing::trace!(link = link.0, "discarding stale link");
                    Vec::new()
                },
                Step::Opened(link, Ok(opened)) => {
                    self.opening = None;
                    self.link = Some((link, opened));
                    self.channel.link_opened(link)
                },
                Step::Opened(link, Err(error)) => {
                    self.opening = None;
                    tracing::warn!(%error, link = link.0, "link failed to open");
                    self.channel.link_failed(link)
                },
                Step::Frame(link, Some(text)) => self.channel.frame_received(link, &text),
                Step::Frame(link, None) => {
                    tracing::info!(link = link.0, "link closed by remote");
                    self.link = None;
                    self.channel.link_closed(link)
                },
                Step::Retry(link) => {
                    self.retry = None;
                    self.channel.retry_elapsed(link)
                },
            };

            for action in actions {
                self.execute(action);
            }
        }

        self.close_link();
    }

    fn execute(&mut self, action: ChannelAction) {
        match action {
            ChannelAction::Open { endpoint, link } => {
                self.abort_opening();
                let connector = Arc::clone(&self.connector);
                let opened = self.opened_tx.clone();
                tracing::debug!(%endpoint, link = link.0, "opening link");
                let task = tokio::spawn(async move {
                    let result = connector.connect(&endpoint).await;
                    // Receiver lives as long as the actor.
                    let _ = opened.send((link, result));
                });
                self.opening = Some(task.abort_handle());
            },
            ChannelAction::Close => {
                self.abort_opening();
                self.retry = None;
                self.close_link();
            },
            ChannelAction::Transmit(text) => match &self.link {
                Some((link, open)) => {
                    if open.outbound.send(text).is_err() {
                        tracing::warn!(link = link.0, "link gone, intent lost");
                    }
                },
                None => tracing::warn!("transmit without link, intent lost"),
            },
            ChannelAction::ScheduleRetry { delay, link } => {
                self.retry = Some((link, Box::pin(sleep(delay))));
            },
            ChannelAction::Emit(event) => {
                if self.events.send(event).is_err() {
                    tracing::trace!("event receiver dropped");
                }
            },
        }
    }

    fn abort_opening(&mut self) {
        if let Some(task) = self.opening.take() {
            task.abort();
        }
    }

    fn close_link(&mut self) {
        if let Some((link, open)) = self.link.take() {
            tracing::debug!(link = link.0, "closing link");
            open.close();
        }
    }
}

async fn next_frame(link: &mut Option<(LinkId, Link)>) -> (LinkId, Option<String>) {
    match link {
        Some((id, open)) => (*id, open.inbound.recv().await),
        None => std::future::pending().await,
    }
}

async fn retry_due(retry: &mut Option<(LinkId, Pin<Box<Sleep>>)>) -> LinkId {
    match retry {
        Some((id, timer)) => {
            timer.as_mut().await;
            *id
        },
        None => std::future::pending().await,
    }
}

use crate::{config::Config, line::Line};

use crossbeam::channel::{Receiver, Sender};
use tracing::trace;

/// Cloneable producer handle feeding one dispatch loop.
///
/// All operations are non-blocking appends and are safe to call from any
/// number of threads. Enqueueing never fails: the handle keeps both queues
/// alive even after the dispatch loop has stopped, in which case lines
/// accumulate unsent (see [`Outbox::backlog`]).
#[derive(Clone, Debug)]
pub struct Outbox {
    priority_tx: Sender<Line>,
    normal_tx: Sender<Line>,
    priority_rx: Receiver<Line>,
    normal_rx: Receiver<Line>,
    channel: String,
    server_host: String,
}

impl Outbox {
    pub(crate) fn new(
        priority_tx: Sender<Line>,
        priority_rx: Receiver<Line>,
        normal_tx: Sender<Line>,
        normal_rx: Receiver<Line>,
        config: &Config,
    ) -> Self {
        Self {
            priority_tx,
            normal_tx,
            priority_rx,
            normal_rx,
            channel: config.channel.clone(),
            server_host: config.server_host.clone(),
        }
    }

    /// Queues `line` on the regular channel.
    pub fn send(&self, line: Line) {
        // Cannot fail: this handle holds a receiver for the channel.
        let _ = self.normal_tx.send(line);
    }

    /// Queues `line` on the priority channel, ahead of all regular traffic.
    pub fn send_priority(&self, line: Line) {
        let _ = self.priority_tx.send(line);
    }

    /// Queues a chat message addressed to the configured channel.
    ///
    /// Empty messages are dropped without error.
    pub fn send_chat(&self, text: &str) {
        if text.is_empty() {
            trace!("dropping empty chat message");
            return;
        }
        self.send(Line::privmsg(&self.channel, text));
    }

    /// Queues a keepalive `PING`, ahead of regular traffic.
    pub fn ping(&self) {
        self.send_priority(Line::ping(&self.server_host));
    }

    /// Queues a `PONG` keepalive reply, ahead of regular traffic.
    pub fn pong(&self) {
        self.send_priority(Line::pong(&self.server_host));
    }

    /// Number of lines queued but not yet handed to the transport.
    ///
    /// Both queues are unbounded, so a producer outrunning the rate limit
    /// grows this without bound. Lines queued after the dispatch loop has
    /// stopped also stay counted here.
    pub fn backlog(&self) -> usize {
        self.priority_rx.len() + self.normal_rx.len()
    }
}

use crate::{
    config::Config, line::Line, outbox::Outbox, shutdown::Shutdown, transport::Transmit,
};

use crossbeam::channel::{Receiver, TryRecvError, never, select_biased, unbounded};
use tracing::{debug, debug_span, error, info, trace};

use std::{
    thread,
    time::{Duration, Instant},
};

/// The dispatch loop for one connection.
///
/// Owns the consuming ends of both queues plus the transport, and is the
/// only writer. Each pass drains every queued priority line, then sends at
/// most one regular line once the rate limit has elapsed since the previous
/// one, then dozes until there is something to do. Runs until cancelled,
/// until every [`Outbox`] clone has been dropped and the queues are empty,
/// or until the transport fails.
#[derive(Debug)]
pub struct SendLoop<T> {
    transport: T,
    priority_rx: Receiver<Line>,
    normal_rx: Receiver<Line>,
    wake_rx: Receiver<()>,
    shutdown: Shutdown,
    tick_interval: Duration,
    pace: pace::Pacer,
}

impl<T: Transmit> SendLoop<T> {
    /// Creates a dispatch loop around `transport`, plus the [`Outbox`] that
    /// feeds it.
    pub fn new(transport: T, config: Config) -> (Self, Outbox) {
        let (priority_tx, priority_rx) = unbounded();
        let (normal_tx, normal_rx) = unbounded();
        let (shutdown, wake_rx) = Shutdown::new();
        let outbox = Outbox::new(
            priority_tx,
            priority_rx.clone(),
            normal_tx,
            normal_rx.clone(),
            &config,
        );
        let send_loop = Self {
            transport,
            priority_rx,
            normal_rx,
            wake_rx,
            shutdown,
            tick_interval: config.tick_interval,
            pace: pace::Pacer::new(config.rate_limit),
        };
        (send_loop, outbox)
    }

    /// A handle for requesting that the loop exit.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Runs the dispatch loop on the calling thread.
    ///
    /// Returns `Ok(())` after cancellation or once every [`Outbox`] clone
    /// has been dropped and the queues have been drained, and the transport
    /// error on the first failed write. Every exit is logged; once this
    /// returns, no further lines are taken from the queues.
    pub fn run(self) -> Result<(), T::Error> {
        let _span = debug_span!("send-loop").entered();
        debug!("started");
        match dispatch(self) {
            Ok(()) => {
                info!("send loop exited");
                Ok(())
            }
            Err(e) => {
                error!(%e, "send loop exited on transport failure");
                Err(e)
            }
        }
    }

    /// Runs the dispatch loop on a dedicated thread.
    ///
    /// The transport error, if any, is carried through the join handle.
    pub fn spawn(self) -> thread::JoinHandle<Result<(), T::Error>>
    where
        T: Send + 'static,
        T::Error: Send + 'static,
    {
        thread::spawn(move || self.run())
    }
}

fn dispatch<T: Transmit>(send_loop: SendLoop<T>) -> Result<(), T::Error> {
    let SendLoop {
        mut transport,
        priority_rx,
        normal_rx,
        wake_rx,
        shutdown,
        tick_interval,
        mut pace,
    } = send_loop;
    let mut priority_open = true;
    let mut normal_open = true;

    loop {
        if shutdown.is_cancelled() {
            debug!("shutdown requested");
            return Ok(());
        }

        // Drain every priority line visible in this pass.
        while priority_open {
            match priority_rx.try_recv() {
                Ok(line) => send_line(&mut transport, &line)?,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => priority_open = false,
            }
        }

        // At most one regular line per pass, and only once the rate limit
        // has elapsed since the previous one.
        if normal_open && pace.is_open(Instant::now()) {
            match normal_rx.try_recv() {
                Ok(line) => {
                    send_line(&mut transport, &line)?;
                    pace.record_send(Instant::now());
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => normal_open = false,
            }
        }

        if !priority_open && !normal_open {
            debug!("all producers disconnected");
            return Ok(());
        }

        // Doze until woken by cancellation, a priority line, a regular line
        // while the rate limit is open, or the timeout. The rate limit
        // re-opens exactly at the timeout; otherwise it is an idle tick.
        let wait = pace.remaining(Instant::now()).unwrap_or(tick_interval);
        let priority_arm = priority_open.then_some(&priority_rx);
        let normal_arm =
            (normal_open && pace.is_open(Instant::now())).then_some(&normal_rx);
        select_biased! {
            recv(wake_rx) -> _ => {}
            recv(priority_arm.unwrap_or(&never())) -> res => {
                let Ok(line) = res else {
                    priority_open = false;
                    continue;
                };
                send_line(&mut transport, &line)?;
            }
            recv(normal_arm.unwrap_or(&never())) -> res => {
                let Ok(line) = res else {
                    normal_open = false;
                    continue;
                };
                send_line(&mut transport, &line)?;
                pace.record_send(Instant::now());
            }
            default(wait) => {}
        }
    }
}

fn send_line<T: Transmit>(transport: &mut T, line: &Line) -> Result<(), T::Error> {
    transport.transmit(line)?;
    trace!(%line, "sent");
    Ok(())
}

/// Outbound pacing for the regular channel.
mod pace {
    use std::time::{Duration, Instant};

    /// Tracks the earliest instant the next regular line may be sent.
    #[derive(Debug)]
    pub(super) struct Pacer {
        interval: Duration,
        next_send: Option<Instant>,
    }

    impl Pacer {
        pub(super) fn new(interval: Duration) -> Self {
            Self {
                interval,
                next_send: None,
            }
        }

        /// Whether a regular line may be sent at `now`.
        pub(super) fn is_open(&self, now: Instant) -> bool {
            self.next_send.is_none_or(|next| now >= next)
        }

        /// Charges one regular send, closing the pacer for the interval.
        pub(super) fn record_send(&mut self, now: Instant) {
            self.next_send = Some(now + self.interval);
        }

        /// Time until the pacer opens, or `None` if it is already open.
        pub(super) fn remaining(&self, now: Instant) -> Option<Duration> {
            let next = self.next_send?;
            (now < next).then(|| next - now)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const INTERVAL: Duration = Duration::from_millis(1750);

        #[test]
        fn open_from_construction() {
            let pace = Pacer::new(INTERVAL);
            let now = Instant::now();
            assert!(pace.is_open(now));
            assert_eq!(pace.remaining(now), None);
        }

        #[test]
        fn closed_for_the_full_interval_after_a_send() {
            let mut pace = Pacer::new(INTERVAL);
            let now = Instant::now();
            pace.record_send(now);
            assert!(!pace.is_open(now));
            assert_eq!(pace.remaining(now), Some(INTERVAL));
            assert!(!pace.is_open(now + INTERVAL / 2));
            assert_eq!(pace.remaining(now + INTERVAL / 2), Some(INTERVAL / 2));
        }

        #[test]
        fn reopens_once_the_interval_has_elapsed() {
            let mut pace = Pacer::new(INTERVAL);
            let now = Instant::now();
            pace.record_send(now);
            assert!(pace.is_open(now + INTERVAL));
            assert_eq!(pace.remaining(now + INTERVAL), None);
        }

        #[test]
        fn each_send_pushes_the_deadline_forward() {
            let mut pace = Pacer::new(INTERVAL);
            let now = Instant::now();
            pace.record_send(now);
            pace.record_send(now + INTERVAL);
            assert!(!pace.is_open(now + INTERVAL + INTERVAL / 2));
            assert!(pace.is_open(now + INTERVAL * 2));
        }
    }
}

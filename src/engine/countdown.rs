use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownTick {
    /// Generation of the countdown that produced this tick.
    pub id: u64,
}

/// A running once-per-interval ticker. Dropping or cancelling the handle stops
/// the background thread before its next tick.
pub struct CountdownHandle {
    id: u64,
    _stop: Sender<()>,
}

impl CountdownHandle {
    /// Emit at most `ticks` ticks through `sink`, one per `interval`. The sink
    /// returns `false` when nobody is listening any more.
    pub fn start<F>(id: u64, ticks: u32, interval: Duration, mut sink: F) -> Self
    where
        F: FnMut(CountdownTick) -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        thread::spawn(move || {
            for _ in 0..ticks {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !sink(CountdownTick { id }) {
                            return;
                        }
                    }
                    // Sender dropped or explicit stop.
                    _ => return,
                }
            }
        });

        Self { id, _stop: stop_tx }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(self) {
        tracing::debug!(countdown = self.id, "countdown cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mpsc::Receiver<CountdownTick>) -> Vec<CountdownTick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = rx.recv_timeout(Duration::from_secs(2)) {
            ticks.push(tick);
        }
        ticks
    }

    #[test]
    fn emits_requested_number_of_ticks_then_stops() {
        let (tx, rx) = mpsc::channel();
        let handle = CountdownHandle::start(7, 3, Duration::from_millis(5), move |tick| {
            tx.send(tick).is_ok()
        });
        assert_eq!(handle.id(), 7);

        let ticks = drain(&rx);
        assert_eq!(ticks, vec![CountdownTick { id: 7 }; 3]);
    }

    #[test]
    fn cancel_stops_further_ticks() {
        let (tx, rx) = mpsc::channel();
        let handle = CountdownHandle::start(1, 1000, Duration::from_millis(5), move |tick| {
            tx.send(tick).is_ok()
        });

        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.cancel();

        // The sender side is owned by the ticker thread; once it exits the
        // channel disconnects well before all 1000 ticks.
        let rest = drain(&rx);
        assert!(rest.len() < 10, "ticks kept arriving: {}", rest.len());
    }
}

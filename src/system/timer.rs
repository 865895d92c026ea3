//! Periodic timer and monotonic clock.
//!
//! The keep-alive scheduler needs to fire once per keep-alive period, usually
//! from a hardware timer interrupt or a separate thread. That context must not
//! touch the client's packet buffer, so it only posts a [`Tick`]. The poll
//! loop later consumes the tick with [`Timer::take_tick`] and does the actual
//! protocol work on its own execution context.

use core::sync::atomic::{AtomicBool, Ordering};

/// A "period elapsed" signal shared between a timer context and the poll loop.
///
/// Only loads and stores are used, so this works on targets without
/// compare-and-swap. Two ticks posted before the poll loop consumes one
/// collapse into a single tick.
#[derive(Debug, Default)]
pub struct Tick(AtomicBool);

impl Tick {
    /// Create a signal with no tick pending.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Post a tick. Safe to call from an interrupt handler.
    pub fn post(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume a pending tick, returning whether there was one.
    pub fn take(&self) -> bool {
        if self.0.load(Ordering::Acquire) {
            self.0.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Discard any pending tick.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Clock plus periodic timer used by the MQTT client.
///
/// # Examples
///
/// A timer driven by a hardware interrupt that calls `TICK.post()`:
///
/// ```rust,no_run
/// use libmqtt::system::timer::{Tick, Timer};
///
/// static TICK: Tick = Tick::new();
///
/// struct HwTimer {
///     millis: u64,
/// }
///
/// impl Timer for HwTimer {
///     fn now_millis(&self) -> u64 {
///         self.millis
///     }
///     fn start(&mut self, _period_ms: u32) {
///         TICK.clear();
///         // program the hardware period here
///     }
///     fn stop(&mut self) {
///         // disable the interrupt here
///     }
///     fn take_tick(&mut self) -> bool {
///         TICK.take()
///     }
/// }
/// ```
pub trait Timer {
    /// Milliseconds from an arbitrary, monotonic origin.
    fn now_millis(&self) -> u64;

    /// Start (or restart) firing every `period_ms` milliseconds.
    fn start(&mut self, period_ms: u32);

    /// Stop firing. Pending ticks may be discarded.
    fn stop(&mut self);

    /// Consume the tick posted since the last call, if any.
    fn take_tick(&mut self) -> bool;

    /// Called between attempts while waiting on the transport.
    ///
    /// Implementations with a scheduler should yield here.
    fn pause(&mut self) {
        core::hint::spin_loop();
    }
}

#[cfg(feature = "std")]
pub use self::host::StdTimer;

#[cfg(feature = "std")]
mod host {
    use super::{Tick, Timer};
    use std::sync::Arc;
    use std::sync::mpsc::{self, RecvTimeoutError, Sender};
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    /// A [`Timer`] backed by a worker thread.
    ///
    /// The worker posts a [`Tick`] every period; [`Timer::stop`] wakes it up
    /// immediately instead of waiting for the current period to run out.
    #[derive(Debug)]
    pub struct StdTimer {
        epoch: Instant,
        tick: Arc<Tick>,
        worker: Option<(Sender<()>, JoinHandle<()>)>,
    }

    impl StdTimer {
        /// Create a stopped timer whose clock starts now.
        pub fn new() -> Self {
            Self {
                epoch: Instant::now(),
                tick: Arc::new(Tick::new()),
                worker: None,
            }
        }
    }

    impl Default for StdTimer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Timer for StdTimer {
        fn now_millis(&self) -> u64 {
            self.epoch.elapsed().as_millis() as u64
        }

        fn start(&mut self, period_ms: u32) {
            self.stop();
            let (stop_tx, stop_rx) = mpsc::channel::<()>();
            let tick = Arc::clone(&self.tick);
            let period = Duration::from_millis(u64::from(period_ms));
            let handle = thread::spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stop_rx.recv_timeout(period) {
                    tick.post();
                }
            });
            self.worker = Some((stop_tx, handle));
        }

        fn stop(&mut self) {
            if let Some((stop_tx, handle)) = self.worker.take() {
                drop(stop_tx);
                let _ = handle.join();
            }
            self.tick.clear();
        }

        fn take_tick(&mut self) -> bool {
            self.tick.take()
        }

        fn pause(&mut self) {
            thread::yield_now();
        }
    }

    impl Drop for StdTimer {
        fn drop(&mut self) {
            self.stop();
        }
    }
}

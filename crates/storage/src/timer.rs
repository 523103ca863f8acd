//! Single replaceable periodic timer
//!
//! `PeriodicTimer` runs one task on a background thread at a fixed period.
//! Scheduling again replaces the previous thread: the old thread is
//! signalled and joined before the new one starts, so at most one thread
//! ever runs the task.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use adcollector_storage::PeriodicTimer;
//!
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let timer = PeriodicTimer::new("housekeeper");
//! let counter = Arc::clone(&ticks);
//! timer
//!     .schedule(Duration::from_millis(10), move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//! timer.cancel();
//! assert!(!timer.is_armed());
//! ```

use adcollector_core::Result;
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

struct Signal {
    stop: Mutex<bool>,
    wake: Condvar,
}

struct Armed {
    signal: Arc<Signal>,
    handle: JoinHandle<()>,
    period: Duration,
}

/// Decrements the live-thread count when the timer thread exits
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Periodic background task with at most one live thread
pub struct PeriodicTimer {
    name: String,
    armed: Mutex<Option<Armed>>,
    live: Arc<AtomicUsize>,
}

impl PeriodicTimer {
    /// Create an unarmed timer; `name` becomes the thread name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            armed: Mutex::new(None),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Run `task` every `period`, replacing any previous schedule
    ///
    /// The first run happens one period from now. The task must not call
    /// back into this timer. A panicking run is logged and the next run
    /// still happens on schedule.
    pub fn schedule<F>(&self, period: Duration, task: F) -> Result<()>
    where
        F: Fn() + Send + 'static,
    {
        let mut armed = self.armed.lock();
        if let Some(previous) = armed.take() {
            stop(previous);
        }

        let signal = Arc::new(Signal {
            stop: Mutex::new(false),
            wake: Condvar::new(),
        });
        let thread_signal = Arc::clone(&signal);
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));
        let name = self.name.clone();

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                let _guard = guard;
                run(&name, &thread_signal, period, task);
            })?;

        debug!(
            target: "adcollector::housekeeper",
            timer = %self.name,
            period_ms = period.as_millis() as u64,
            "timer armed"
        );
        *armed = Some(Armed {
            signal,
            handle,
            period,
        });
        Ok(())
    }

    /// Stop the timer and wait for its thread to exit
    pub fn cancel(&self) {
        if let Some(previous) = self.armed.lock().take() {
            stop(previous);
        }
    }

    /// Check whether a schedule is active
    pub fn is_armed(&self) -> bool {
        self.armed.lock().is_some()
    }

    /// Period of the active schedule
    pub fn period(&self) -> Option<Duration> {
        self.armed.lock().as_ref().map(|a| a.period)
    }

    /// Number of timer threads currently alive
    pub fn live_threads(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn stop(armed: Armed) {
    {
        let mut stop = armed.signal.stop.lock();
        *stop = true;
        armed.signal.wake.notify_all();
    }
    // A task that drops the last owner of its timer cancels from inside the
    // timer thread; that thread exits on its own once the task returns.
    if armed.handle.thread().id() != thread::current().id() {
        let name = armed.handle.thread().name().unwrap_or("timer").to_string();
        if armed.handle.join().is_err() {
            error!(target: "adcollector::housekeeper", timer = %name, "timer thread panicked");
        }
    }
}

fn run<F: Fn()>(name: &str, signal: &Signal, period: Duration, task: F) {
    loop {
        let mut stop = signal.stop.lock();
        // A period too long to represent as a deadline waits for cancel only.
        match Instant::now().checked_add(period) {
            Some(deadline) => {
                while !*stop {
                    if signal.wake.wait_until(&mut stop, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*stop {
                    signal.wake.wait(&mut stop);
                }
            }
        }
        if *stop {
            return;
        }
        drop(stop);
        if panic::catch_unwind(AssertUnwindSafe(|| task())).is_err() {
            error!(target: "adcollector::housekeeper", timer = %name, "timer task panicked");
        }
    }
}

//! Progress notifications
//!
//! A write-only sink for `(message, current_round, total_rounds)` events.
//! Nothing a sink does can stop a research run: panicking closures are
//! caught, and a dropped channel receiver is ignored.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

/// One progress event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub message: String,
    pub current_round: usize,
    pub total_rounds: usize,
}

type ProgressFn = dyn Fn(&str, usize, usize) + Send + Sync;

#[derive(Clone, Default)]
enum Sink {
    #[default]
    Silent,
    Callback(Arc<ProgressFn>),
    Channel(UnboundedSender<ProgressUpdate>),
}

/// Where progress events go
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sink: Sink,
}

impl ProgressReporter {
    /// Discard all events
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(&str, usize, usize) + Send + Sync + 'static,
    {
        Self {
            sink: Sink::Callback(Arc::new(callback)),
        }
    }

    pub fn from_channel(sender: UnboundedSender<ProgressUpdate>) -> Self {
        Self {
            sink: Sink::Channel(sender),
        }
    }

    /// Deliver one event; never fails
    pub fn report(&self, message: &str, current_round: usize, total_rounds: usize) {
        trace!(message = %message, current_round, total_rounds, "Progress");

        match &self.sink {
            Sink::Silent => {}
            Sink::Callback(callback) => {
                let delivered =
                    catch_unwind(AssertUnwindSafe(|| callback(message, current_round, total_rounds)));
                if delivered.is_err() {
                    warn!(message = %message, "Progress callback panicked, continuing");
                }
            }
            Sink::Channel(sender) => {
                // Receiver gone means nobody is listening anymore
                let _ = sender.send(ProgressUpdate {
                    message: message.to_string(),
                    current_round,
                    total_rounds,
                });
            }
        }
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sink {
            Sink::Silent => "silent",
            Sink::Callback(_) => "callback",
            Sink::Channel(_) => "channel",
        };
        f.debug_struct("ProgressReporter").field("sink", &kind).finish()
    }
}

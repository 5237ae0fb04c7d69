use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Lifecycle of the live-poll loop
#[derive(Debug, Default)]
pub enum PollState {
    #[default]
    Stopped,
    Running {
        task: JoinHandle<()>,
        from: Option<DateTime<Utc>>,
    },
}

/// Fixed-period repeating task with cancel-before-replace semantics.
///
/// At most one loop exists per poller. [`start`](Self::start) aborts the
/// previous loop before spawning the next one, and dropping the poller aborts
/// whatever is running.
#[derive(Debug)]
pub struct LivePoller {
    period: Duration,
    state: PollState,
}

impl LivePoller {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: PollState::Stopped,
        }
    }

    /// Start polling from the fixed lower bound `from`.
    ///
    /// `tick` runs once per period, first one period after the call. Ticks run
    /// one after another, never overlapping; a slow tick delays the next one.
    pub fn start<F, Fut>(&mut self, from: Option<DateTime<Utc>>, tick: F)
    where
        F: Fn(Option<DateTime<Utc>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.stop() {
            tracing::debug!("Replacing running live poll");
        }

        let period = self.period;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tick(from).await;
            }
        });

        tracing::info!(
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            from = ?from,
            "Live polling started"
        );
        self.state = PollState::Running { task, from };
    }

    /// Cancel the running loop. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            PollState::Running { task, .. } => {
                task.abort();
                tracing::info!("Live polling stopped");
                true
            }
            PollState::Stopped => false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, PollState::Running { .. })
    }

    /// Lower bound of the running loop (`None` when stopped or unbounded).
    #[must_use]
    pub fn from_bound(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            PollState::Running { from, .. } => *from,
            PollState::Stopped => None,
        }
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        if let PollState::Running { task, .. } = &self.state {
            task.abort();
        }
    }
}

pub mod monitor;
pub mod poller;

pub use monitor::{display_value, run_status_monitor, TelemetryDisplay, PLACEHOLDER};
pub use poller::{LivePoller, PollState};

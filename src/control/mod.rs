//! Operator control path: setpoint edits and lamp reconciliation.

pub mod lamp;
pub mod settings;

pub use lamp::{authoritative_lamp_state, toggle_lamp, LampConfirmation, LampToggleOutcome};
pub use settings::{apply_setting, read_modify_write, SettingField};

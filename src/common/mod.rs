mod state;

pub use state::{AppState, Session};

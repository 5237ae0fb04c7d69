//! Mussel Dash - operator dashboard for the mussel farm rig
//!
//! This library exposes the core modules for testing and reuse.

pub mod backend;
pub mod charts;
pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod polling;
pub mod routes;
pub mod session;
pub mod timeconv;

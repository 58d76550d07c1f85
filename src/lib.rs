//! Norther OS session state: Directional Points, the Directional+ unlock,
//! the daily login bonus, themes and window toggles.

pub mod config;
pub mod core;
pub mod desktop;
pub mod status;
pub mod ui;

pub use crate::core::session::{SessionManager, UnlockOutcome};

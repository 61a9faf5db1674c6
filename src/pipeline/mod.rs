//! Pipeline entry points for monitor operations.
//!
//! - `Monitor::run`: check all sources and record changes
//! - `regenerate_report`: rebuild the dashboard from history
//! - `diff`: operator-facing line diff of page snapshots
//! - `report`: dashboard rendering

pub mod diff;
pub mod report;
mod run;

pub use report::{RenderOptions, render};
pub use run::{Monitor, regenerate_report};

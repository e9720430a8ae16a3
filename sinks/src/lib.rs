#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Sinks
//!
//! The two terminal consumers every domain service fans out to at the edge of the
//! graph: the generic, timestamp-prefixed [`historical::HistoricalDataService`]
//! journal writer, and the throttled [`gui::GuiService`].

pub mod gui;
pub mod historical;

pub use gui::GuiService;
pub use historical::{HistoricalDataService, HistoricalRecord};

/// Default journal file names.
pub const POSITIONS_FILE: &str = "positions.txt";
pub const RISK_FILE: &str = "risk.txt";
pub const EXECUTIONS_FILE: &str = "executions.txt";
pub const STREAMING_FILE: &str = "streaming.txt";
pub const INQUIRIES_FILE: &str = "allinquiries.txt";
pub const GUI_FILE: &str = "gui.txt";

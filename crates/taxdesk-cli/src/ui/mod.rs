//! UI primitives for the Taxdesk CLI.
//!
//! - **Context**: Terminal detection and output mode routing (json, plain, pretty)
//! - **Theme**: Badge tokens, color styles
//! - **Render**: Tables, headers, receipts, hints
//! - **Format**: String utilities (truncate, timestamps, on/off)

mod context;
pub mod format;
pub mod render;
pub mod theme;

pub use context::{OutputMode, UiContext, UiFlags};
pub use theme::Badge;

pub use render::{
    badge, blank_line, header, hint, kv, print, print_error, print_json, receipt, simple_table,
    table, Column,
};

pub use format::{format_datetime, on_off, truncate};

//! Command handlers, one module per command group.

pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod init;
pub mod maintenance;
pub mod misc;
pub mod navigation;
pub mod payments;
pub mod returns;
pub mod settings;

use crate::ui::{badge, print, Badge, OutputMode, UiContext};

/// Report a declined confirmation and build the error that ends the command.
pub(crate) fn cancelled(ui_ctx: &UiContext, action: &str) -> anyhow::Error {
    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(ui_ctx, &badge(ui_ctx, Badge::Warn, &format!("{} cancelled", action)));
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("status=cancelled");
        }
    }
    anyhow::anyhow!("{} cancelled", action)
}

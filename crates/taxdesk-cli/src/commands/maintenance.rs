use std::io::IsTerminal;
use std::path::Path;

use taxdesk_core::{KeyValueStore, SqliteStore};

use crate::app::{missing_store_message, AppContext};
use crate::cli::BackupArgs;
use crate::errors::CliError;
use crate::output::print_record;
use crate::ui::theme::{styled, styles};
use crate::ui::{badge, blank_line, hint, print, Badge, OutputMode};

use super::cancelled;

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let path = ctx.store_path()?;
    if !path.exists() {
        return Err(CliError::not_found(
            missing_store_message(&path),
            "Hint: Run `taxdesk init` to create a store.",
        )
        .into());
    }
    let store = SqliteStore::open(&path)?;
    let ui_ctx = ctx.ui_context();

    match store.check_integrity() {
        Ok(()) => {
            match ui_ctx.mode {
                OutputMode::Json => {
                    print_record(&serde_json::json!({ "status": "ok" }))?;
                }
                OutputMode::Pretty if !ctx.quiet() => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "All checks passed"));
                }
                OutputMode::Plain if !ctx.quiet() => {
                    println!("check=sqlite ok");
                    println!("check=slots ok");
                    println!("status=ok");
                }
                _ => {}
            }
            Ok(())
        }
        Err(err) => {
            match ui_ctx.mode {
                OutputMode::Json => {
                    print_record(&serde_json::json!({
                        "status": "failed",
                        "error": err.to_string(),
                    }))?;
                }
                OutputMode::Pretty => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Err, "Integrity check failed"));
                    eprintln!("Error: {}", err);
                }
                OutputMode::Plain => {
                    eprintln!("status=failed");
                    eprintln!("error={}", err);
                }
            }
            Err(CliError::IntegrityFailed(
                "Integrity check failed\nHint: Restore the store from a backup copy.".to_string(),
            )
            .into())
        }
    }
}

pub fn handle_backup(ctx: &AppContext, args: &BackupArgs) -> anyhow::Result<()> {
    let source = ctx.store_path()?;
    if !source.exists() {
        return Err(CliError::not_found(
            missing_store_message(&source),
            "Hint: Run `taxdesk init` to create a store.",
        )
        .into());
    }

    let ui_ctx = ctx.ui_context();
    if std::io::stdin().is_terminal() && !ctx.quiet() && !ui_ctx.mode.is_json() {
        let proceed = dialoguer::Confirm::new()
            .with_prompt(format!("Back up store to {}?", args.destination))
            .default(true)
            .interact()?;
        if !proceed {
            return Err(cancelled(&ui_ctx, "Backup"));
        }
    }

    let destination = Path::new(&args.destination);
    let bytes = taxdesk_core::fs::copy_atomic(&source, destination).map_err(|e| {
        anyhow::anyhow!(
            "Failed to back up {} to {}: {}",
            source.display(),
            destination.display(),
            e
        )
    })?;
    if bytes == 0 {
        return Err(anyhow::anyhow!("Backup failed: zero bytes written"));
    }

    match ui_ctx.mode {
        OutputMode::Json => print_record(&serde_json::json!({
            "status": "ok",
            "destination": args.destination,
            "bytes": bytes,
        }))?,
        OutputMode::Pretty if !ctx.quiet() => {
            print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Backup complete"));
            let context = format!("Path: {}  \u{00B7}  Size: {} bytes", args.destination, bytes);
            println!("{}", styled(&context, styles::dim(), ui_ctx.color));
            blank_line(&ui_ctx);
            print(&ui_ctx, &hint(&ui_ctx, "taxdesk check"));
        }
        OutputMode::Plain if !ctx.quiet() => {
            println!("status=ok");
            println!("destination={}", args.destination);
            println!("bytes={}", bytes);
        }
        _ => {}
    }
    Ok(())
}

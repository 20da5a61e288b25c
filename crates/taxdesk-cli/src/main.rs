//! Taxdesk CLI - a local, single-user tax-management workspace
//!
//! This is the command-line interface for Taxdesk. Every page action of the
//! dashboard is a subcommand; `taxdesk shell` drives navigation interactively.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use taxdesk_core::{TaxdeskError, VERSION};

use crate::app::AppContext;
use crate::cli::{
    Cli, Commands, DocumentsCommand, PaymentsCommand, ReturnsCommand, SettingsCommand,
};
use crate::commands::{
    activity, auth, dashboard, documents, init, maintenance, misc, navigation, payments, returns,
    settings,
};
use crate::constants::{env_vars, DEFAULT_LOG_FILTER};
use crate::errors::exit_code_for;
use crate::ui::print_error;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui_context();
        let (message, hint) = split_error(&e);
        print_error(&ui_ctx, &message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Diagnostics go to stderr, filtered by TAXDESK_LOG.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(env_vars::LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Separate an error's message from its hint, if any. The hint comes back
/// without its `Hint:` label.
fn split_error(err: &anyhow::Error) -> (String, Option<String>) {
    let text = err.to_string();
    let (message, hint) = match text.find("\nHint:") {
        Some(idx) => (text[..idx].to_string(), Some(text[idx + 1..].to_string())),
        None => {
            let hint = extract_error_hint(err, &text);
            (text, hint)
        }
    };
    let hint = hint.map(|h| h.trim_start_matches("Hint:").trim().to_string());
    (message, hint)
}

/// Contextual hints for common errors.
fn extract_error_hint(err: &anyhow::Error, message: &str) -> Option<String> {
    if let Some(core) = err.downcast_ref::<TaxdeskError>() {
        if core.is_retryable() {
            return Some("Hint: Please try again.".to_string());
        }
        if matches!(core, TaxdeskError::Unauthenticated) {
            return Some("Hint: Run `taxdesk login` to start a session.".to_string());
        }
        if matches!(core, TaxdeskError::InvalidTransition(_)) {
            return Some(
                "Hint: Strict transitions only move Pending \u{2192} In Review \u{2192} Completed."
                    .to_string(),
            );
        }
    }

    let lower = message.to_lowercase();
    if lower.contains("not found") {
        if lower.contains("invoice") {
            return Some("Hint: Run `taxdesk payments invoices` to see invoice IDs.".to_string());
        }
        if lower.contains("return") {
            return Some("Hint: Run `taxdesk returns list` to see return IDs.".to_string());
        }
        if lower.contains("document") {
            return Some("Hint: Run `taxdesk documents list` to see document IDs.".to_string());
        }
    }
    if lower.contains("failed to parse config") {
        return Some("Hint: Fix the file or rerun `taxdesk init --force`.".to_string());
    }
    None
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args)?,
        Some(Commands::Login(args)) => auth::handle_login(ctx, args)?,
        Some(Commands::Register(args)) => auth::handle_register(ctx, args)?,
        Some(Commands::Logout) => auth::handle_logout(ctx)?,
        Some(Commands::Whoami) => auth::handle_whoami(ctx)?,
        Some(Commands::Open(args)) => navigation::handle_open(ctx, args)?,
        Some(Commands::Shell) => navigation::handle_shell(ctx)?,
        Some(Commands::Dashboard) => dashboard::handle_dashboard(ctx)?,
        Some(Commands::Returns(command)) => match command {
            ReturnsCommand::List(args) => returns::handle_list(ctx, args)?,
            ReturnsCommand::Add(args) => returns::handle_add(ctx, args)?,
            ReturnsCommand::Edit(args) => returns::handle_edit(ctx, args)?,
            ReturnsCommand::Status(args) => returns::handle_status(ctx, args)?,
            ReturnsCommand::Delete(args) => returns::handle_delete(ctx, args)?,
        },
        Some(Commands::Documents(command)) => match command {
            DocumentsCommand::List(args) => documents::handle_list(ctx, args)?,
            DocumentsCommand::Upload(args) => documents::handle_upload(ctx, args)?,
            DocumentsCommand::Comment(args) => documents::handle_comment(ctx, args)?,
            DocumentsCommand::Delete(args) => documents::handle_delete(ctx, args)?,
        },
        Some(Commands::Payments(command)) => match command {
            PaymentsCommand::Invoices => payments::handle_invoices(ctx)?,
            PaymentsCommand::Receipts => payments::handle_receipts(ctx)?,
            PaymentsCommand::Create(args) => payments::handle_create(ctx, args)?,
            PaymentsCommand::Edit(args) => payments::handle_edit(ctx, args)?,
            PaymentsCommand::Pay(args) => payments::handle_pay(ctx, args)?,
            PaymentsCommand::Delete(args) => payments::handle_delete(ctx, args)?,
        },
        Some(Commands::Activity(args)) => activity::handle_activity(ctx, args)?,
        Some(Commands::Settings(command)) => match command {
            SettingsCommand::Profile => settings::handle_profile(ctx)?,
            SettingsCommand::SetProfile(args) => settings::handle_set_profile(ctx, args)?,
            SettingsCommand::Notifications => settings::handle_notifications(ctx)?,
            SettingsCommand::Notify(args) => settings::handle_notify(ctx, args)?,
            SettingsCommand::DeleteAccount(args) => settings::handle_delete_account(ctx, args)?,
        },
        Some(Commands::Check) => maintenance::handle_check(ctx)?,
        Some(Commands::Backup(args)) => maintenance::handle_backup(ctx, args)?,
        Some(Commands::Completions(args)) => misc::handle_completions(args)?,
        None => {
            println!("Taxdesk v{}", VERSION);
            println!("\nQuickstart:");
            println!("  taxdesk init");
            println!("  taxdesk register --email you@example.com --first-name Pat --last-name Lee");
            println!("  taxdesk returns add --type 1040 --year 2024");
            println!("  taxdesk payments pay INV-002 --method credit_card");
            println!("  taxdesk dashboard");
            println!("\nRun `taxdesk --help` for full usage.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CliError;

    #[test]
    fn test_split_error_moves_explicit_hint() {
        let err = anyhow::Error::new(CliError::not_found(
            "No store found at /tmp/x.db",
            "Hint: Run `taxdesk init` to create a store.",
        ));
        let (message, hint) = split_error(&err);
        assert_eq!(message, "No store found at /tmp/x.db");
        assert_eq!(hint.as_deref(), Some("Run `taxdesk init` to create a store."));
    }

    #[test]
    fn test_retryable_core_error_suggests_retry() {
        let err = anyhow::Error::new(TaxdeskError::Storage("disk full".to_string()));
        let (_, hint) = split_error(&err);
        assert_eq!(hint.as_deref(), Some("Please try again."));
    }

    #[test]
    fn test_unauthenticated_suggests_login() {
        let err = anyhow::Error::new(TaxdeskError::Unauthenticated);
        let (message, hint) = split_error(&err);
        assert_eq!(message, "Not logged in");
        assert!(hint.unwrap().contains("taxdesk login"));
    }

    #[test]
    fn test_missing_invoice_points_at_list() {
        let err = anyhow::Error::new(TaxdeskError::not_found("Invoice", "INV-404"));
        let (_, hint) = split_error(&err);
        assert!(hint.unwrap().contains("payments invoices"));
    }
}

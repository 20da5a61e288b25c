use taxdesk_core::settings::{NotificationKind, NotificationSettings, ProfileUpdate};

use crate::app::AppContext;
use crate::cli::{DeleteAccountArgs, NotifyArgs, SetProfileArgs};
use crate::errors::CliError;
use crate::helpers::{confirm, parse_choice, parse_on_off};
use crate::output::print_record;
use crate::ui::{format_datetime, kv, on_off, print, receipt, UiContext};

use super::cancelled;

pub fn handle_profile(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let settings = ws.settings()?;
    let profile = settings.profile();
    let name = settings.display_name();
    let initials = settings.initials();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&profile);
    }
    let updated = profile
        .updated_at
        .map(|dt| format_datetime(&dt, ui_ctx.timezone, ui_ctx.mode.is_pretty()))
        .unwrap_or_else(|| "never".to_string());
    print(&ui_ctx, &kv(&ui_ctx, "Name", &name));
    print(&ui_ctx, &kv(&ui_ctx, "Initials", &initials));
    print(&ui_ctx, &kv(&ui_ctx, "First Name", &profile.first_name));
    print(&ui_ctx, &kv(&ui_ctx, "Last Name", &profile.last_name));
    print(&ui_ctx, &kv(&ui_ctx, "Email", &profile.email));
    print(&ui_ctx, &kv(&ui_ctx, "Phone", &profile.phone));
    print(&ui_ctx, &kv(&ui_ctx, "Updated", &updated));
    Ok(())
}

pub fn handle_set_profile(ctx: &AppContext, args: &SetProfileArgs) -> anyhow::Result<()> {
    if args.first_name.is_none() && args.last_name.is_none() && args.phone.is_none() {
        return Err(CliError::invalid_input(
            "Nothing to update\nHint: Pass --first-name, --last-name, or --phone.",
        )
        .into());
    }
    let mut ws = ctx.open_workspace()?;
    let profile = ws.settings()?.save_profile(ProfileUpdate {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        phone: args.phone.clone(),
    })?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&profile);
    }
    if !ctx.quiet() {
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Profile saved",
                &[
                    ("First Name", &profile.first_name),
                    ("Last Name", &profile.last_name),
                    ("Phone", &profile.phone),
                ],
            ),
        );
    }
    Ok(())
}

pub fn handle_notifications(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let preferences = ws.settings()?.notification_settings();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&preferences);
    }
    print_preferences(&ui_ctx, &preferences);
    Ok(())
}

pub fn handle_notify(ctx: &AppContext, args: &NotifyArgs) -> anyhow::Result<()> {
    let kind: NotificationKind = parse_choice(&args.kind)?;
    let enabled = parse_on_off(&args.state)?;

    let mut ws = ctx.open_workspace()?;
    let preferences = ws.settings()?.set_notification(kind, enabled)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&preferences);
    }
    if !ctx.quiet() {
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Preference saved", &[(kind.label(), on_off(enabled))]),
        );
    }
    Ok(())
}

pub fn handle_delete_account(ctx: &AppContext, args: &DeleteAccountArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let email = ws.auth().require_user()?.email.clone();

    let ui_ctx = ctx.ui_context();
    let prompt = format!("Delete every record for {}? This cannot be undone.", email);
    if !confirm(&prompt, args.yes, ctx.quiet())? {
        return Err(cancelled(&ui_ctx, "Account deletion"));
    }
    ws.delete_account()?;

    if ui_ctx.mode.is_json() {
        return print_record(&serde_json::json!({ "status": "ok", "deleted": email }));
    }
    if !ctx.quiet() {
        print(&ui_ctx, &receipt(&ui_ctx, "Account deleted", &[("Email", &email)]));
    }
    Ok(())
}

fn print_preferences(ui_ctx: &UiContext, preferences: &NotificationSettings) {
    for kind in NotificationKind::ALL {
        print(ui_ctx, &kv(ui_ctx, kind.label(), on_off(preferences.get(kind))));
    }
}

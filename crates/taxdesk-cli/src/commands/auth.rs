use taxdesk_core::auth::{Credentials, Registration};

use crate::app::AppContext;
use crate::cli::{LoginArgs, RegisterArgs};
use crate::errors::CliError;
use crate::helpers::{can_prompt, password_or_prompt, text_or_prompt};
use crate::output::print_record;
use crate::ui::{badge, hint, kv, print, receipt, Badge};

pub fn handle_login(ctx: &AppContext, args: &LoginArgs) -> anyhow::Result<()> {
    let interactive = can_prompt(args.no_input);
    let email = text_or_prompt(args.email.as_deref(), "Email", interactive)?;
    let password = password_or_prompt(args.password.as_deref(), interactive)?;

    let mut ws = ctx.open_workspace()?;
    let user = ws.login(&Credentials::new(email, password), args.name.clone())?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&user);
    }
    if !ctx.quiet() {
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Logged in", &[("Email", &user.email), ("User", &user.id)]),
        );
    }
    Ok(())
}

pub fn handle_register(ctx: &AppContext, args: &RegisterArgs) -> anyhow::Result<()> {
    let interactive = can_prompt(args.no_input);
    let email = text_or_prompt(args.email.as_deref(), "Email", interactive)?;
    let password = password_or_prompt(args.password.as_deref(), interactive)?;
    let first_name = text_or_prompt(args.first_name.as_deref(), "First name", interactive)?;
    let last_name = text_or_prompt(args.last_name.as_deref(), "Last name", interactive)?;

    let mut ws = ctx.open_workspace()?;
    let user = ws.register(&Registration {
        credentials: Credentials::new(email, password),
        first_name,
        last_name,
    })?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&user);
    }
    if !ctx.quiet() {
        let name = user.display_name.clone().unwrap_or_default();
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Account created",
                &[("Email", &user.email), ("Name", &name)],
            ),
        );
    }
    Ok(())
}

pub fn handle_logout(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let was_logged_in = ws.auth().current_user().is_some();
    ws.logout()?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&serde_json::json!({
            "status": "ok",
            "was_logged_in": was_logged_in,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }
    if was_logged_in {
        print(&ui_ctx, &receipt(&ui_ctx, "Logged out", &[]));
    } else {
        print(&ui_ctx, &badge(&ui_ctx, Badge::Info, "Already logged out"));
    }
    Ok(())
}

pub fn handle_whoami(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let user = ws.auth().current_user().cloned().ok_or_else(|| {
        CliError::auth_failed_with_hint("Not logged in", "Hint: Run `taxdesk login` to start a session.")
    })?;
    let settings = ws.settings()?;
    let name = settings.display_name();
    let initials = settings.initials();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&serde_json::json!({
            "id": user.id,
            "email": user.email,
            "display_name": name,
            "initials": initials,
        }));
    }
    print(&ui_ctx, &kv(&ui_ctx, "Name", &name));
    print(&ui_ctx, &kv(&ui_ctx, "Initials", &initials));
    print(&ui_ctx, &kv(&ui_ctx, "Email", &user.email));
    print(&ui_ctx, &kv(&ui_ctx, "User", &user.id));
    if ui_ctx.mode.is_pretty() && !ctx.quiet() {
        print(&ui_ctx, &hint(&ui_ctx, "taxdesk dashboard  \u{00B7}  taxdesk logout"));
    }
    Ok(())
}

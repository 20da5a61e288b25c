use std::path::PathBuf;

use tracing::info;

use taxdesk_core::SqliteStore;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, TaxdeskConfig};
use crate::errors::CliError;
use crate::helpers::parse_timezone;
use crate::output::print_record;
use crate::ui::{blank_line, header, hint, print, receipt};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let store_path = match args.path.as_deref().or(ctx.cli().store.as_deref()) {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };
    let timezone = match args.timezone.as_deref() {
        Some(value) => parse_timezone(value)?,
        None => None,
    };

    if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!("Failed to create store directory {}: {}", parent.display(), e)
        })?;
    }
    let existed = store_path.exists();
    SqliteStore::open_or_create(&store_path)?;

    let config = TaxdeskConfig::new(store_path.clone(), args.strict_transitions, timezone);
    write_config(&config_path, &config)?;
    info!(store = %store_path.display(), config = %config_path.display(), "initialized");

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&serde_json::json!({
            "status": "ok",
            "store": store_path.display().to_string(),
            "config": config_path.display().to_string(),
            "created": !existed,
        }));
    }
    if ctx.quiet() {
        return Ok(());
    }

    let store_display = store_path.display().to_string();
    let config_display = config_path.display().to_string();
    let policy = if args.strict_transitions {
        "strict"
    } else {
        "permissive"
    };
    print(&ui_ctx, &header(&ui_ctx, "init", None));
    blank_line(&ui_ctx);
    let title = if existed {
        "Using existing store"
    } else {
        "Store created"
    };
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            title,
            &[
                ("Store", &store_display),
                ("Config", &config_display),
                ("Transitions", policy),
                ("Timezone", config.ui.timezone.as_deref().unwrap_or("UTC")),
            ],
        ),
    );
    blank_line(&ui_ctx);
    print(
        &ui_ctx,
        &hint(&ui_ctx, "taxdesk register  \u{00B7}  taxdesk login"),
    );
    Ok(())
}

use taxdesk_core::activity::{ActivityFilter, ActivityKind};

use crate::app::AppContext;
use crate::cli::ActivityArgs;
use crate::constants::DEFAULT_ACTIVITY_LIMIT;
use crate::helpers::parse_choice;
use crate::output::{activity_rows, print_record, ACTIVITY_COLUMNS};
use crate::ui::{blank_line, header, hint, print, simple_table};

pub fn handle_activity(ctx: &AppContext, args: &ActivityArgs) -> anyhow::Result<()> {
    let mut filter = ActivityFilter::new().limit(args.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT));
    if let Some(kind) = args.kind.as_deref() {
        filter = filter.kind(parse_choice::<ActivityKind>(kind)?);
    }
    if let Some(term) = args.search.as_deref() {
        filter = filter.search(term);
    }

    let mut ws = ctx.open_workspace()?;
    let now = ws.clock().now();
    let mut log = ws.activity()?;
    let entries = log.query(&filter);
    let counts = log.counts();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&entries);
    }

    if ui_ctx.mode.is_pretty() {
        let context = counts
            .iter()
            .map(|(kind, count)| format!("{} {}", count, kind.as_str()))
            .collect::<Vec<_>>()
            .join(" \u{00B7} ");
        print(&ui_ctx, &header(&ui_ctx, "activity", Some(&context)));
        blank_line(&ui_ctx);
    }
    if entries.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, &hint(&ui_ctx, "No activity matches."));
        }
        return Ok(());
    }
    print(
        &ui_ctx,
        &simple_table(&ui_ctx, &ACTIVITY_COLUMNS, &activity_rows(&ui_ctx, &entries, now)),
    );
    Ok(())
}

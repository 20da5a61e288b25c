use taxdesk_core::payments::format_currency;

use crate::app::AppContext;
use crate::output::{activity_rows, print_record, return_rows, ACTIVITY_COLUMNS, RETURN_COLUMNS};
use crate::ui::theme::{styled, styles};
use crate::ui::{blank_line, header, kv, print, simple_table};

pub fn handle_dashboard(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let now = ws.clock().now();
    let summary = ws.dashboard()?;
    let name = ws.settings()?.display_name();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&summary);
    }

    print(&ui_ctx, &header(&ui_ctx, "dashboard", Some(&name)));
    blank_line(&ui_ctx);

    let returns = format!(
        "{} total, {} pending, {} completed",
        summary.total_returns, summary.pending_returns, summary.completed_returns
    );
    let invoices = format!(
        "{} total ({}), {} unpaid ({})",
        summary.total_invoices,
        format_currency(summary.total_amount),
        summary.unpaid_invoices,
        format_currency(summary.unpaid_amount)
    );
    print(&ui_ctx, &kv(&ui_ctx, "Returns", &returns));
    print(&ui_ctx, &kv(&ui_ctx, "Invoices", &invoices));

    if ui_ctx.mode.is_pretty() {
        blank_line(&ui_ctx);
        println!("{}", styled("Recent returns", styles::bold(), ui_ctx.color));
        print(
            &ui_ctx,
            &simple_table(&ui_ctx, &RETURN_COLUMNS, &return_rows(&ui_ctx, &summary.recent_returns)),
        );
        blank_line(&ui_ctx);
        println!("{}", styled("Recent activity", styles::bold(), ui_ctx.color));
        print(
            &ui_ctx,
            &simple_table(
                &ui_ctx,
                &ACTIVITY_COLUMNS,
                &activity_rows(&ui_ctx, &summary.recent_activity, now),
            ),
        );
    }
    Ok(())
}

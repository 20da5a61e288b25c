use taxdesk_core::returns::{NewTaxReturn, ReturnStatus, TaxReturn, TaxReturnUpdate};

use crate::app::AppContext;
use crate::cli::{DeleteArgs, ReturnsAddArgs, ReturnsEditArgs, ReturnsListArgs, ReturnsStatusArgs};
use crate::helpers::{confirm, parse_choice};
use crate::output::{print_record, return_rows, return_status, RETURN_COLUMNS};
use crate::ui::{blank_line, header, hint, print, receipt, simple_table, UiContext};

use super::cancelled;

pub fn handle_list(ctx: &AppContext, args: &ReturnsListArgs) -> anyhow::Result<()> {
    let status = args
        .status
        .as_deref()
        .map(parse_choice::<ReturnStatus>)
        .transpose()?;

    let mut ws = ctx.open_workspace()?;
    let mut returns = ws.returns()?;
    let stats = returns.stats();
    let records = match status {
        Some(status) => returns.list_by_status(status),
        None => returns.list(),
    };

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&records);
    }

    if ui_ctx.mode.is_pretty() {
        let context = format!(
            "{} total \u{00B7} {} pending \u{00B7} {} in review \u{00B7} {} completed",
            stats.total, stats.pending, stats.in_review, stats.completed
        );
        print(&ui_ctx, &header(&ui_ctx, "returns", Some(&context)));
        blank_line(&ui_ctx);
    }
    if records.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, &hint(&ui_ctx, "No returns yet. Run `taxdesk returns add --type 1040 --year 2024`."));
        }
        return Ok(());
    }
    print(
        &ui_ctx,
        &simple_table(&ui_ctx, &RETURN_COLUMNS, &return_rows(&ui_ctx, &records)),
    );
    Ok(())
}

pub fn handle_add(ctx: &AppContext, args: &ReturnsAddArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let created = ws.returns()?.create(
        NewTaxReturn::new(args.return_type.clone(), args.year).with_documents(args.documents.clone()),
    )?;
    report(ctx, "Return created", &created)
}

pub fn handle_edit(ctx: &AppContext, args: &ReturnsEditArgs) -> anyhow::Result<()> {
    let documents = if args.clear_documents {
        Some(Vec::new())
    } else if args.documents.is_empty() {
        None
    } else {
        Some(args.documents.clone())
    };
    let update = TaxReturnUpdate {
        return_type: args.return_type.clone(),
        year: args.year,
        documents,
    };

    let mut ws = ctx.open_workspace()?;
    let updated = ws.returns()?.update(&args.id, update)?;
    report(ctx, "Return updated", &updated)
}

pub fn handle_status(ctx: &AppContext, args: &ReturnsStatusArgs) -> anyhow::Result<()> {
    let status: ReturnStatus = parse_choice(&args.status)?;
    let mut ws = ctx.open_workspace()?;
    let updated = ws.returns()?.change_status(&args.id, status)?;
    report(ctx, "Status updated", &updated)
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let mut returns = ws.returns()?;
    let record = returns.get(&args.id)?;

    let ui_ctx = ctx.ui_context();
    let prompt = format!("Delete {} return #{} ({})?", record.return_type, record.id, record.year);
    if !confirm(&prompt, args.yes, ctx.quiet())? {
        return Err(cancelled(&ui_ctx, "Delete"));
    }
    let removed = returns.delete(&args.id)?;
    report(ctx, "Return deleted", &removed)
}

fn report(ctx: &AppContext, title: &str, record: &TaxReturn) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(record);
    }
    if ctx.quiet() {
        return Ok(());
    }
    print(&ui_ctx, &return_receipt(&ui_ctx, title, record));
    Ok(())
}

fn return_receipt(ui_ctx: &UiContext, title: &str, record: &TaxReturn) -> String {
    let year = record.year.to_string();
    let status = return_status(ui_ctx, record.status);
    let documents = record.document_count.to_string();
    let updated = record.last_updated.to_string();
    receipt(
        ui_ctx,
        title,
        &[
            ("ID", &record.id),
            ("Type", &record.return_type),
            ("Year", &year),
            ("Status", &status),
            ("Documents", &documents),
            ("Updated", &updated),
        ],
    )
}

use taxdesk_core::payments::{format_currency, Invoice, NewInvoice, PaymentDetails, PaymentMethod};

use crate::app::AppContext;
use crate::cli::{DeleteArgs, InvoiceCreateArgs, InvoiceEditArgs, PayArgs};
use crate::helpers::{confirm, parse_amount, parse_choice, parse_date};
use crate::output::{
    invoice_rows, invoice_status, print_record, receipt_rows, INVOICE_COLUMNS, RECEIPT_COLUMNS,
};
use crate::ui::{blank_line, header, hint, print, receipt, simple_table, table};

use super::cancelled;

pub fn handle_invoices(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let mut payments = ws.payments()?;
    let stats = payments.stats();
    let invoices = payments.invoices();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&invoices);
    }
    if ui_ctx.mode.is_pretty() {
        let context = format!(
            "{} unpaid \u{00B7} {} outstanding \u{00B7} {} paid",
            stats.unpaid_invoices,
            format_currency(stats.unpaid_amount),
            format_currency(stats.paid_amount)
        );
        print(&ui_ctx, &header(&ui_ctx, "invoices", Some(&context)));
        blank_line(&ui_ctx);
    }
    if invoices.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, &hint(&ui_ctx, "No invoices."));
        }
        return Ok(());
    }
    print(
        &ui_ctx,
        &simple_table(&ui_ctx, &INVOICE_COLUMNS, &invoice_rows(&ui_ctx, &invoices)),
    );
    Ok(())
}

pub fn handle_receipts(ctx: &AppContext) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let receipts = ws.payments()?.receipts();

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&receipts);
    }
    if ui_ctx.mode.is_pretty() {
        let context = format!("{} total", receipts.len());
        print(&ui_ctx, &header(&ui_ctx, "receipts", Some(&context)));
        blank_line(&ui_ctx);
    }
    if receipts.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, &hint(&ui_ctx, "No receipts yet. Run `taxdesk payments pay <ID>`."));
        }
        return Ok(());
    }
    print(
        &ui_ctx,
        &table(&ui_ctx, &RECEIPT_COLUMNS, &receipt_rows(&receipts)),
    );
    Ok(())
}

pub fn handle_create(ctx: &AppContext, args: &InvoiceCreateArgs) -> anyhow::Result<()> {
    let new = NewInvoice {
        description: args.description.clone(),
        amount: parse_amount(&args.amount)?,
        due_date: parse_date(&args.due)?,
    };
    let mut ws = ctx.open_workspace()?;
    let invoice = ws.payments()?.create_invoice(new)?;
    report(ctx, "Invoice created", &invoice)
}

pub fn handle_edit(ctx: &AppContext, args: &InvoiceEditArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let invoice = ws.payments()?.update_invoice(&args.id, &args.description)?;
    report(ctx, "Invoice updated", &invoice)
}

pub fn handle_pay(ctx: &AppContext, args: &PayArgs) -> anyhow::Result<()> {
    let method: PaymentMethod = parse_choice(&args.method)?;
    let mut ws = ctx.open_workspace()?;
    let payment = ws.payments()?.pay_invoice(&args.id, PaymentDetails { method })?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&payment);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let amount = format_currency(payment.receipt.amount);
    let paid_on = payment.receipt.paid_on.to_string();
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            "Payment recorded",
            &[
                ("Invoice", &payment.invoice.id),
                ("Receipt", &payment.receipt.id),
                ("Amount", &amount),
                ("Method", payment.receipt.payment_method.label()),
                ("Paid On", &paid_on),
            ],
        ),
    );
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let mut payments = ws.payments()?;
    let invoice = payments.invoice(&args.id)?;

    let ui_ctx = ctx.ui_context();
    let prompt = format!(
        "Delete invoice {} ({}, {})?",
        invoice.id,
        invoice.description,
        format_currency(invoice.amount)
    );
    if !confirm(&prompt, args.yes, ctx.quiet())? {
        return Err(cancelled(&ui_ctx, "Delete"));
    }
    let removed = payments.delete_invoice(&args.id)?;
    report(ctx, "Invoice deleted", &removed)
}

fn report(ctx: &AppContext, title: &str, invoice: &Invoice) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(invoice);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let amount = format_currency(invoice.amount);
    let due = invoice.due_date.to_string();
    let status = invoice_status(&ui_ctx, invoice.status);
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            title,
            &[
                ("ID", &invoice.id),
                ("Description", &invoice.description),
                ("Amount", &amount),
                ("Due", &due),
                ("Status", &status),
            ],
        ),
    );
    Ok(())
}

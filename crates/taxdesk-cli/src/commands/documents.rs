use std::path::Path;

use taxdesk_core::documents::{format_file_size, Document, DocumentKind, UploadedFile};

use crate::app::AppContext;
use crate::cli::{DeleteArgs, DocumentsCommentArgs, DocumentsListArgs, DocumentsUploadArgs};
use crate::errors::CliError;
use crate::helpers::{confirm, guess_mime, parse_choice};
use crate::output::{document_rows, print_record, DOCUMENT_COLUMNS};
use crate::ui::{blank_line, header, hint, print, receipt, simple_table};

use super::cancelled;

pub fn handle_list(ctx: &AppContext, args: &DocumentsListArgs) -> anyhow::Result<()> {
    let kind = args
        .kind
        .as_deref()
        .map(parse_choice::<DocumentKind>)
        .transpose()?;

    let mut ws = ctx.open_workspace()?;
    let mut documents = ws.documents()?;
    let stats = documents.stats();
    let records = documents.search(args.search.as_deref().unwrap_or(""), kind);

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&records);
    }

    if ui_ctx.mode.is_pretty() {
        let context = format!(
            "{} files \u{00B7} {} pdf \u{00B7} {} docx \u{00B7} {} images \u{00B7} {}",
            stats.total,
            stats.pdf,
            stats.docx,
            stats.images,
            format_file_size(stats.total_size)
        );
        print(&ui_ctx, &header(&ui_ctx, "documents", Some(&context)));
        blank_line(&ui_ctx);
    }
    if records.is_empty() {
        if !ctx.quiet() {
            let message = if stats.total == 0 {
                "No documents yet. Run `taxdesk documents upload <FILE>`."
            } else {
                "No documents match the filter."
            };
            print(&ui_ctx, &hint(&ui_ctx, message));
        }
        return Ok(());
    }
    print(
        &ui_ctx,
        &simple_table(&ui_ctx, &DOCUMENT_COLUMNS, &document_rows(&ui_ctx, &records)),
    );
    Ok(())
}

pub fn handle_upload(ctx: &AppContext, args: &DocumentsUploadArgs) -> anyhow::Result<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for file in &args.files {
        files.push(describe_file(Path::new(file), args.mime.as_deref())?);
    }

    let mut ws = ctx.open_workspace()?;
    let uploaded = ws.documents()?.upload(files)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(&uploaded);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let title = match uploaded.len() {
        1 => "Document uploaded".to_string(),
        n => format!("{} documents uploaded", n),
    };
    print(&ui_ctx, &receipt(&ui_ctx, &title, &[]));
    print(
        &ui_ctx,
        &simple_table(&ui_ctx, &DOCUMENT_COLUMNS, &document_rows(&ui_ctx, &uploaded)),
    );
    Ok(())
}

pub fn handle_comment(ctx: &AppContext, args: &DocumentsCommentArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let updated = ws.documents()?.update_comments(&args.id, &args.comments)?;
    report(ctx, "Comments saved", &updated)
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let mut ws = ctx.open_workspace()?;
    let mut documents = ws.documents()?;
    let name = documents
        .list()
        .into_iter()
        .find(|d| d.id == args.id)
        .map(|d| d.name)
        .unwrap_or_else(|| args.id.clone());

    let ui_ctx = ctx.ui_context();
    if !confirm(&format!("Delete {}?", name), args.yes, ctx.quiet())? {
        return Err(cancelled(&ui_ctx, "Delete"));
    }
    let removed = documents.delete(&args.id)?;
    report(ctx, "Document deleted", &removed)
}

/// Name, MIME type, and size of a local file.
fn describe_file(path: &Path, mime: Option<&str>) -> anyhow::Result<UploadedFile> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        CliError::not_found(
            format!("Cannot read {}: {}", path.display(), e),
            "Hint: Check the file path.",
        )
    })?;
    if !metadata.is_file() {
        return Err(CliError::invalid_input(format!("{} is not a file", path.display())).into());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime.unwrap_or_else(|| guess_mime(path));
    Ok(UploadedFile::new(name, mime, metadata.len()))
}

fn report(ctx: &AppContext, title: &str, document: &Document) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        return print_record(document);
    }
    if ctx.quiet() {
        return Ok(());
    }
    let size = format_file_size(document.size);
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            title,
            &[
                ("ID", &document.id),
                ("Name", &document.name),
                ("Type", document.kind.as_str()),
                ("Size", &size),
                ("Comments", &document.comments),
            ],
        ),
    );
    Ok(())
}

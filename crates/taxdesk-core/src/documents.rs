//! Document library page.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::{ActivityKind, NewActivity};
use crate::collections::{get_collection, update_collection};
use crate::error::{Result, TaxdeskError};
use crate::storage::{KeyValueStore, Slot};
use crate::workspace::Page;

/// Source label for files uploaded straight into the library.
pub const STANDALONE_SOURCE: &str = "Standalone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Docx,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [DocumentKind::Pdf, DocumentKind::Image, DocumentKind::Docx];

    /// Classify by MIME type. Anything that is neither PDF nor image is filed as docx.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.contains("pdf") {
            DocumentKind::Pdf
        } else if mime.contains("image") {
            DocumentKind::Image
        } else {
            DocumentKind::Docx
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image => "image",
            DocumentKind::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = TaxdeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "image" | "images" => Ok(DocumentKind::Image),
            "docx" | "doc" => Ok(DocumentKind::Docx),
            _ => Err(TaxdeskError::InvalidInput(format!(
                "Unknown document type \"{}\" (expected pdf, image, docx)",
                s
            ))),
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    pub upload_date: NaiveDate,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub source: String,
}

/// A file handed to [`Documents::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total: usize,
    pub pdf: usize,
    pub docx: usize,
    pub images: usize,
    pub total_size: u64,
}

impl DocumentStats {
    pub fn from_documents(documents: &[Document]) -> Self {
        let count = |kind| documents.iter().filter(|d| d.kind == kind).count();
        Self {
            total: documents.len(),
            pdf: count(DocumentKind::Pdf),
            docx: count(DocumentKind::Docx),
            images: count(DocumentKind::Image),
            total_size: documents.iter().map(|d| d.size).sum(),
        }
    }
}

/// Render a byte count as `0 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Case-insensitive match on name or comments, optionally narrowed to one kind.
pub fn matches(document: &Document, term: &str, kind: Option<DocumentKind>) -> bool {
    if let Some(kind) = kind {
        if document.kind != kind {
            return false;
        }
    }
    let term = term.trim().to_lowercase();
    term.is_empty()
        || document.name.to_lowercase().contains(&term)
        || document.comments.to_lowercase().contains(&term)
}

fn position(documents: &[Document], id: &str) -> Result<usize> {
    documents
        .iter()
        .position(|d| d.id == id)
        .ok_or_else(|| TaxdeskError::not_found("Document", id))
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..9].to_string()
}

/// The document library for the logged-in user.
pub struct Documents<'a, S: KeyValueStore> {
    page: Page<'a, S>,
}

impl<'a, S: KeyValueStore> Documents<'a, S> {
    pub(crate) fn new(page: Page<'a, S>) -> Self {
        Self { page }
    }

    /// All documents in upload order.
    pub fn list(&mut self) -> Vec<Document> {
        get_collection(&mut *self.page.store, Slot::Documents, Vec::new)
    }

    pub fn search(&mut self, term: &str, kind: Option<DocumentKind>) -> Vec<Document> {
        self.list()
            .into_iter()
            .filter(|d| matches(d, term, kind))
            .collect()
    }

    pub fn stats(&mut self) -> DocumentStats {
        DocumentStats::from_documents(&self.list())
    }

    /// Append a batch of files. The whole batch is one write and one activity.
    pub fn upload(&mut self, files: Vec<UploadedFile>) -> Result<Vec<Document>> {
        if files.is_empty() {
            return Err(TaxdeskError::InvalidInput("No files selected".to_string()));
        }
        if files.iter().any(|f| f.name.trim().is_empty()) {
            return Err(TaxdeskError::InvalidInput("File name is required".to_string()));
        }
        let clock = self.page.clock;
        let today = clock.today();

        let added = update_collection(
            &mut *self.page.store,
            Slot::Documents,
            Vec::new,
            |documents: &mut Vec<Document>| {
                let mut millis = clock.millis();
                let mut added = Vec::with_capacity(files.len());
                for file in files {
                    let id = loop {
                        let candidate = format!("{}{}", millis, random_suffix());
                        if !documents.iter().any(|d| d.id == candidate) {
                            break candidate;
                        }
                        millis += 1;
                    };
                    let document = Document {
                        id,
                        kind: DocumentKind::from_mime(&file.mime_type),
                        name: file.name,
                        size: file.size,
                        upload_date: today,
                        comments: String::new(),
                        source: STANDALONE_SOURCE.to_string(),
                    };
                    documents.push(document.clone());
                    added.push(document);
                }
                Ok(added)
            },
        )?;

        let details = match added.as_slice() {
            [only] => format!("Uploaded {}", only.name),
            many => format!("Uploaded {} files", many.len()),
        };
        self.page
            .log(NewActivity::new(ActivityKind::Document, "Document Uploaded", details));
        Ok(added)
    }

    pub fn update_comments(&mut self, id: &str, comments: &str) -> Result<Document> {
        let updated = update_collection(
            &mut *self.page.store,
            Slot::Documents,
            Vec::new,
            |documents: &mut Vec<Document>| {
                let index = position(documents, id)?;
                documents[index].comments = comments.to_string();
                Ok(documents[index].clone())
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Document,
            "Document Updated",
            format!("Comments updated on {}", updated.name),
        ));
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Document> {
        let removed = update_collection(
            &mut *self.page.store,
            Slot::Documents,
            Vec::new,
            |documents: &mut Vec<Document>| {
                let index = position(documents, id)?;
                Ok(documents.remove(index))
            },
        )?;

        self.page.log(NewActivity::new(
            ActivityKind::Document,
            "Document Deleted",
            format!("{} was deleted", removed.name),
        ));
        Ok(removed)
    }
}

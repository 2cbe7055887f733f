//! Plain-text extraction from uploaded documents.
//!
//! The format is chosen from the file extension. Parsing is CPU bound and
//! some parsers panic on hostile input, so [`extract_document`] runs it on the
//! blocking pool and turns a panic into [`ExtractError::Corrupt`].

mod docx;
mod pdf;
mod table;
mod text;

use bytes::Bytes;
use log::{ info, warn };
use thiserror::Error;

pub const SUPPORTED_FORMATS: &str = "PDF, DOCX, CSV, XLSX, XLS, TXT, MD";

/// Rows of a spreadsheet or CSV included in the prompt.
pub const TABLE_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("File {filename} has an unsupported format (.{extension}). Supported formats: PDF, DOCX, CSV, XLSX, XLS, TXT, MD")]
    Unsupported {
        filename: String,
        extension: String,
    },

    #[error("Could not extract text from {filename}: {reason}")]
    Corrupt {
        filename: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Docx,
    Pdf,
    Csv,
    Spreadsheet,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => String::new(),
        };
        match extension.as_str() {
            "txt" | "md" => Ok(DocumentFormat::Text),
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            "csv" => Ok(DocumentFormat::Csv),
            "xlsx" | "xls" => Ok(DocumentFormat::Spreadsheet),
            _ => Err(ExtractError::Unsupported { filename: filename.to_string(), extension }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Text => "text",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Csv => "csv",
            DocumentFormat::Spreadsheet => "spreadsheet",
        }
    }

    fn label(&self, filename: &str) -> String {
        match self {
            DocumentFormat::Text => format!("[Text Content - {}]", filename),
            DocumentFormat::Docx => format!("[Document Content - {}]", filename),
            DocumentFormat::Pdf => format!("[PDF Content - {}]", filename),
            DocumentFormat::Csv | DocumentFormat::Spreadsheet => format!("[Data from {}]", filename),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    /// Size of the upload in bytes.
    pub size: usize,
}

impl ExtractedDocument {
    /// Labelled block as it appears in the upstream prompt.
    pub fn render(&self) -> String {
        if self.size == 0 {
            return format!("[Empty file: {}]", self.filename);
        }
        if self.text.trim().is_empty() {
            // e.g. a scanned PDF with no text layer
            return format!("{}\n(no extractable text)", self.format.label(&self.filename));
        }
        format!("{}\n{}", self.format.label(&self.filename), self.text)
    }
}

pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    let format = DocumentFormat::from_filename(filename)?;
    if bytes.is_empty() {
        warn!("Empty file: {}", filename);
        return Ok(ExtractedDocument { filename: filename.to_string(), format, text: String::new(), size: 0 });
    }

    info!("Processing {} as {} ({} bytes)", filename, format.as_str(), bytes.len());
    let corrupt = |reason: String| ExtractError::Corrupt { filename: filename.to_string(), reason };
    let text = match format {
        DocumentFormat::Text => text::decode(bytes),
        DocumentFormat::Docx => docx::extract(bytes).map_err(corrupt)?,
        DocumentFormat::Pdf => pdf::extract(bytes).map_err(corrupt)?,
        DocumentFormat::Csv => table::csv_preview(bytes, TABLE_PREVIEW_ROWS).map_err(corrupt)?,
        DocumentFormat::Spreadsheet => table::spreadsheet_preview(bytes, TABLE_PREVIEW_ROWS).map_err(corrupt)?,
    };

    Ok(ExtractedDocument { filename: filename.to_string(), format, text, size: bytes.len() })
}

/// [`extract_text`] on the blocking pool.
pub async fn extract_document(filename: String, bytes: Bytes) -> Result<ExtractedDocument, ExtractError> {
    let name = filename.clone();
    match tokio::task::spawn_blocking(move || extract_text(&filename, &bytes)).await {
        Ok(result) => result,
        Err(e) => Err(ExtractError::Corrupt { filename: name, reason: format!("extraction aborted: {}", e) }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_extension_case_insensitively() {
        assert_eq!(DocumentFormat::from_filename("Report.PDF").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("notes.md").unwrap(), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_filename("a.b.xls").unwrap(), DocumentFormat::Spreadsheet);
    }

    #[test]
    fn unsupported_extension_lists_supported_formats() {
        let err = DocumentFormat::from_filename("photo.png").unwrap_err();
        assert_eq!(
            err.to_string(),
            "File photo.png has an unsupported format (.png). Supported formats: PDF, DOCX, CSV, XLSX, XLS, TXT, MD"
        );
        assert!(matches!(DocumentFormat::from_filename("legacy.doc"), Err(ExtractError::Unsupported { .. })));
        assert!(matches!(DocumentFormat::from_filename("README"), Err(ExtractError::Unsupported { .. })));
    }

    #[test]
    fn empty_file_renders_placeholder() {
        let doc = extract_text("empty.txt", b"").unwrap();
        assert_eq!(doc.render(), "[Empty file: empty.txt]");
    }

    #[test]
    fn document_without_text_is_not_called_empty() {
        let scanned = ExtractedDocument {
            filename: "scan.pdf".into(),
            format: DocumentFormat::Pdf,
            text: String::new(),
            size: 48_213,
        };
        assert_eq!(scanned.render(), "[PDF Content - scan.pdf]\n(no extractable text)");

        let blank = extract_text("blank.txt", b"  \n ").unwrap();
        assert_eq!(blank.render(), "[Text Content - blank.txt]\n(no extractable text)");
    }

    #[test]
    fn text_file_is_labelled() {
        let doc = extract_text("listing.txt", b"3 bedroom flat in Lekki").unwrap();
        assert_eq!(doc.render(), "[Text Content - listing.txt]\n3 bedroom flat in Lekki");
    }

    #[test]
    fn garbage_pdf_is_corrupt() {
        let err = extract_text("broken.pdf", b"this is not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Corrupt { ref filename, .. } if filename == "broken.pdf"));
    }

    #[tokio::test]
    async fn blocking_extraction_returns_document() {
        let doc = extract_document("a.csv".into(), Bytes::from_static(b"city,price\nAbuja,100\n")).await.unwrap();
        assert_eq!(doc.format, DocumentFormat::Csv);
        assert!(doc.text.contains("Abuja"));
    }
}

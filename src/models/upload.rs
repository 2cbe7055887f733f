use serde::{ Deserialize, Serialize };
use utoipa::ToSchema;

/// Multipart form accepted by `POST /api/chat/upload`. Only used for the API docs.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// One or more documents (pdf, docx, csv, xlsx, xls, txt, md).
    #[schema(value_type = Vec<String>)]
    pub files: Vec<Vec<u8>>,
    /// The question or instruction that goes with the files.
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FileSummary {
    pub filename: String,
    pub format: String,
    /// Characters of text extracted from the file.
    pub characters: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResult {
    pub response: String,
    pub model: String,
    pub tokens_used: u64,
    pub files: Vec<FileSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub data: UploadResult,
}

impl UploadResponse {
    pub fn success(data: UploadResult) -> Self {
        Self {
            status: "success".to_string(),
            message: "Files processed successfully".to_string(),
            data,
        }
    }
}

use std::panic;

pub fn extract(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed files instead of returning an error.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("PDF parser failed on malformed input".to_string()),
    }
}

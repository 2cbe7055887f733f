use serde::Deserialize;
use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

const DEFAULT_SYSTEM_PROMPT: &str = "You are NERA, a professional real estate AI assistant. \
Always answer in a clear, structured way.

For property listings:
- List the key features one per line
- Give each section a clear heading
- Format prices with thousands separators (e.g., \u{20a6}50,000,000)
- Use tables for comparisons when relevant

For analysis:
- Start with a brief summary
- Use numbered lists for steps or recommendations
- End with clear next steps or recommendations

For output format:
- Write the response as a formal real estate report in plain text. Do not use Markdown, \
asterisks, hashtags, or special characters like '###'. Use headings in all caps and separate \
sections with line breaks. Tables should be written in plain text with clear spacing.";

const DEFAULT_UPLOAD_PROMPT: &str = "You are NERA, a Nigerian real estate AI assistant. \
Analyze the following message and attached files, then provide detailed insights about the \
Nigerian real estate market. Be specific about locations, prices, and trends.

For output format:
- Write the response as a formal real estate report in plain text. Do not use Markdown, \
asterisks, hashtags, or special characters like '###'. Use headings in all caps and separate \
sections with line breaks. Tables should be written in plain text with clear spacing.

USER MESSAGE: {message}

Provide a well-structured response with clear sections. If the message includes property data, \
analyze it and provide insights. If there are any questions, answer them thoroughly. If the \
files contain data, summarize the key points and relate them to the Nigerian real estate context.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template '{0}' is missing the {{message}} placeholder")]
    MissingPlaceholder(&'static str),
    #[error("Prompt file IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Prompts wrapped around every upstream call. Either field may be omitted
/// from the JSON file, in which case the built-in text is used.
#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default = "default_upload_analysis")]
    pub upload_analysis: String,
}

fn default_system() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_upload_analysis() -> String {
    DEFAULT_UPLOAD_PROMPT.to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: default_system(),
            upload_analysis: default_upload_analysis(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.upload_analysis.contains("{message}") {
            return Err(PromptError::MissingPlaceholder("upload_analysis"));
        }
        Ok(())
    }

    /// Fills the upload template with the user's message and extracted file text.
    pub fn upload_prompt(&self, message: &str, attachments: &[String]) -> String {
        let mut full_message = message.trim().to_string();
        if !attachments.is_empty() {
            full_message.push_str("\n\nAttached files content:\n");
            full_message.push_str(&attachments.join("\n\n"));
        }
        self.upload_analysis.replace("{message}", &full_message)
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let file_content = fs::read_to_string(&path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompts from {}", path.as_ref().display());
    Ok(config)
}

/// Loads the prompt file when one is configured, otherwise the built-in prompts.
pub fn load_or_default(path: Option<&str>) -> Result<PromptConfig, PromptError> {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => load_prompts(p),
        None => Ok(PromptConfig::default()),
    }
}

use std::sync::Arc;

use log::{ debug, info };

use crate::config::prompt::PromptConfig;
use crate::extract::ExtractedDocument;
use crate::llm::chat::{ ChatClient, Completion, CompletionOptions, ProviderError };
use crate::models::chat::{ Message, Role };

const CREATOR_QUESTIONS: [&str; 2] = ["who built you", "who created you"];

/// Sits between the HTTP handlers and the upstream provider: adds the
/// system prompt, answers the creator question locally and builds the
/// document-analysis prompt.
pub struct ChatRelay {
    client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
    creator: Option<String>,
}

impl ChatRelay {
    pub fn new(client: Arc<dyn ChatClient>, prompts: Arc<PromptConfig>, creator: Option<String>) -> Self {
        let creator = creator.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        Self { client, prompts, creator }
    }

    pub fn client(&self) -> &Arc<dyn ChatClient> {
        &self.client
    }

    fn canned_reply(&self, messages: &[Message]) -> Option<Message> {
        let creator = self.creator.as_ref()?;
        let last = messages.last()?.content.to_lowercase();
        if CREATOR_QUESTIONS.iter().any(|q| last.contains(q)) {
            return Some(Message::assistant(format!("I was created by {}.", creator)));
        }
        None
    }

    /// Relays a validated, non-empty conversation and wraps the reply.
    pub async fn reply(&self, messages: &[Message]) -> Result<Message, ProviderError> {
        if let Some(reply) = self.canned_reply(messages) {
            info!("Answering creator question locally");
            return Ok(reply);
        }

        let mut upstream = Vec::with_capacity(messages.len() + 1);
        if !self.prompts.system.trim().is_empty() {
            upstream.push(Message::new(Role::System, self.prompts.system.clone()));
        }
        upstream.extend_from_slice(messages);

        let completion = self.client.complete(&upstream, &CompletionOptions::chat()).await?;
        Ok(Message::assistant(completion.content))
    }

    /// Asks the provider to analyse `documents` in light of the user's message.
    pub async fn analyse_documents(
        &self,
        message: &str,
        documents: &[ExtractedDocument]
    ) -> Result<Completion, ProviderError> {
        let attachments: Vec<String> = documents.iter().map(ExtractedDocument::render).collect();
        let prompt = self.prompts.upload_prompt(message, &attachments);
        info!("Analysing {} file(s), prompt is {} chars", documents.len(), prompt.chars().count());
        debug!("Upload prompt: {:.300}", prompt);

        let messages = [Message::new(Role::User, prompt)];
        self.client.complete(&messages, &CompletionOptions::document_analysis()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_text;
    use crate::llm::LlmType;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(Vec<Message>, CompletionOptions)>>,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn complete(
            &self,
            messages: &[Message],
            options: &CompletionOptions
        ) -> Result<Completion, ProviderError> {
            self.calls.lock().unwrap().push((messages.to_vec(), options.clone()));
            Ok(Completion { content: "ok".into(), model: "test-model".into(), tokens_used: 7 })
        }

        async fn check(&self) -> Result<(), ProviderError> {
            Ok(())
        }

        fn get_provider(&self) -> LlmType {
            LlmType::OpenRouter
        }

        fn get_model(&self) -> String {
            "test-model".into()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    fn relay(creator: Option<&str>) -> (Arc<RecordingClient>, ChatRelay) {
        let client = Arc::new(RecordingClient::default());
        let prompts = Arc::new(PromptConfig {
            system: "SYSTEM".into(),
            upload_analysis: "ANALYSE: {message}".into(),
        });
        let relay = ChatRelay::new(client.clone(), prompts, creator.map(str::to_string));
        (client, relay)
    }

    #[tokio::test]
    async fn system_prompt_is_prepended() {
        let (client, relay) = relay(None);
        let reply = relay.reply(&[Message::new(Role::User, "Hello")]).await.unwrap();
        assert_eq!(reply, Message::assistant("ok"));

        let calls = client.calls.lock().unwrap();
        let (messages, options) = &calls[0];
        assert_eq!(messages[0], Message::new(Role::System, "SYSTEM"));
        assert_eq!(messages[1], Message::new(Role::User, "Hello"));
        assert_eq!(options.max_tokens, 1500);
    }

    #[tokio::test]
    async fn creator_question_skips_upstream() {
        let (client, relay) = relay(Some("Henshaw Michael Ewa"));
        let reply = relay.reply(&[Message::new(Role::User, "So, WHO BUILT YOU?")]).await.unwrap();
        assert_eq!(reply.content, "I was created by Henshaw Michael Ewa.");
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creator_question_is_relayed_when_unset() {
        let (client, relay) = relay(None);
        relay.reply(&[Message::new(Role::User, "who created you")]).await.unwrap();
        assert_eq!(client.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn documents_become_single_user_prompt() {
        let (client, relay) = relay(None);
        let doc = extract_text("notes.txt", b"3 plots in Epe").unwrap();
        let completion = relay.analyse_documents("Is this a good deal?", &[doc]).await.unwrap();
        assert_eq!(completion.tokens_used, 7);

        let calls = client.calls.lock().unwrap();
        let (messages, options) = &calls[0];
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(
            messages[0].content,
            "ANALYSE: Is this a good deal?\n\nAttached files content:\n[Text Content - notes.txt]\n3 plots in Epe"
        );
        assert_eq!(options.max_tokens, 2000);
    }
}

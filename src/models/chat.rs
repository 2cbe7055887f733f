use serde::{ Serialize, Deserialize };
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A full conversation, resent by the caller on every request.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.messages.is_empty() {
            return Err("No messages provided".to_string());
        }
        if let Some(index) = self.messages.iter().position(|m| m.content.trim().is_empty()) {
            return Err(format!("Message {} has empty content", index));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_use_lowercase_names() {
        let msg: Message = serde_json::from_value(json!({"role": "system", "content": "x"})).unwrap();
        assert_eq!(msg.role, Role::System);
        assert_eq!(serde_json::to_value(Message::assistant("hi")).unwrap()["role"], "assistant");
    }

    #[test]
    fn unknown_role_fails_to_deserialize() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "robot", "content": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_conversation_is_invalid() {
        let req = ChatRequest { messages: vec![] };
        assert_eq!(req.validate(), Err("No messages provided".to_string()));
    }

    #[test]
    fn blank_content_is_invalid() {
        let req = ChatRequest {
            messages: vec![Message::new(Role::User, "hello"), Message::new(Role::User, "   ")],
        };
        assert_eq!(req.validate(), Err("Message 1 has empty content".to_string()));
    }

    #[test]
    fn well_formed_conversation_is_valid() {
        let req: ChatRequest = serde_json::from_value(
            json!({"messages": [{"role": "user", "content": "Hello"}]})
        ).unwrap();
        assert!(req.validate().is_ok());
    }
}

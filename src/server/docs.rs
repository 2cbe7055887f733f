use utoipa::OpenApi;

use super::api;
use crate::models::chat::{ ChatRequest, ChatResponse, Message, Role };
use crate::models::upload::{ FileSummary, UploadForm, UploadResponse, UploadResult };

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NERA Chat Service",
        description = "Relays chat conversations and uploaded documents to an upstream chat-completion provider"
    ),
    paths(api::root_handler, api::health_handler, api::chat_handler, api::upload_handler),
    components(
        schemas(Role, Message, ChatRequest, ChatResponse, UploadForm, FileSummary, UploadResult, UploadResponse)
    ),
    tags(
        (name = "chat", description = "Conversation relay"),
        (name = "service", description = "Health and service information")
    )
)]
pub struct ApiDoc;

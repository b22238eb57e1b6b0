mod chat;
mod namespace;

pub use chat::{ChatConfig, ChatService, DEFAULT_REWRITE_TEMPLATE, DEFAULT_SYNTHESIS_TEMPLATE};
pub use namespace::NamespaceService;

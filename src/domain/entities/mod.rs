mod chunk;
mod conversation;
mod document;
mod embedding;

pub use chunk::{chunk_pages, ChunkConfig, ChunkMetadata, DocumentChunk};
pub use conversation::{format_history, ConversationTurn, TurnRole};
pub use document::{NamespaceHandle, PageText, RetrievedContext};
pub use embedding::Embedding;

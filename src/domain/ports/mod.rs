mod chat_store;
mod document_loader;
mod document_storage;
mod embedding;
mod llm;
mod vector_index;

pub use chat_store::ChatStore;
pub use document_loader::DocumentLoader;
pub use document_storage::DocumentStorage;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use vector_index::VectorIndex;

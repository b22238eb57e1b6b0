pub mod chat_store;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod storage;
pub mod vector_index;

pub use chat_store::{create_pool, InMemoryChatStore, RedisChatStore, RedisPool};
pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::OpenAiEmbedding;
pub use llm::OpenAiLlm;
pub use loader::HttpPdfLoader;
pub use storage::HttpDocumentStorage;
pub use vector_index::{InMemoryVectorIndex, QdrantVectorIndex};

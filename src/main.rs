use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfchat::api::{create_router, AppState};
use pdfchat::application::{ChatService, NamespaceService};
use pdfchat::infrastructure::{
    create_pool, AppConfig, HttpDocumentStorage, HttpPdfLoader, OpenAiEmbedding, OpenAiLlm,
    QdrantVectorIndex, RedisChatStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,pdfchat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let app_config = AppConfig::from_env()?;
    let config = &app_config.config;

    let redis_pool = create_pool(&config.redis_url)?;
    info!("Redis pool initialized");

    let http = reqwest::Client::new();
    let storage = Arc::new(HttpDocumentStorage::new(
        http.clone(),
        config.storage_base_url.clone(),
    ));
    let loader = Arc::new(HttpPdfLoader::with_client(http));
    let embedding = Arc::new(OpenAiEmbedding::from_config(&config.embedding));
    let index = Arc::new(QdrantVectorIndex::new(
        &config.qdrant_url,
        config.embedding.dimension,
    )?);
    info!("Qdrant client initialized");

    let namespaces = Arc::new(NamespaceService::new(
        storage,
        loader,
        embedding.clone(),
        index.clone(),
        config.chunking.clone(),
        Duration::from_secs(config.ingest_timeout_seconds),
    ));
    let chat_store = Arc::new(RedisChatStore::new(redis_pool.clone()));
    let llm = Arc::new(OpenAiLlm::new(&config.llm.model));
    let chat = Arc::new(ChatService::new(
        namespaces.clone(),
        chat_store,
        embedding,
        index,
        llm,
        app_config.chat_config(),
    ));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let state = AppState::new(chat, namespaces, redis_pool, app_config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

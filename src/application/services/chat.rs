use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::application::services::NamespaceService;
use crate::application::timeout::bounded;
use crate::domain::{
    format_history,
    ports::{ChatStore, EmbeddingService, LlmService, VectorIndex},
    ConversationTurn, DomainError, NamespaceHandle, RetrievedContext,
};

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub top_k: usize,
    /// Most recent turns fed to the rewriter and synthesizer. Older turns
    /// stay persisted but are not included in prompts.
    pub max_history_turns: usize,
    /// Rewrite template; `{history}` and `{question}` are substituted.
    pub rewrite_template: String,
    /// Synthesis system template; `{context}` is substituted.
    pub synthesis_template: String,
    pub llm_timeout: Duration,
    pub retrieval_timeout: Duration,
    pub store_timeout: Duration,
}

pub const DEFAULT_REWRITE_TEMPLATE: &str = "Given the conversation below, rewrite the follow-up \
question as a standalone question that can be understood without the conversation. Resolve any \
pronouns or references against the conversation. Return only the rewritten question.\n\n\
Conversation:\n{history}\n\nFollow-up question: {question}";

pub const DEFAULT_SYNTHESIS_TEMPLATE: &str = "You are an assistant answering questions about a \
document. Answer the user's question using only the context below. If the context does not \
contain the information needed, say that you do not have enough information to answer. Do not \
make up an answer.\n\nContext:\n{context}";

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            max_history_turns: 20,
            rewrite_template: DEFAULT_REWRITE_TEMPLATE.to_string(),
            synthesis_template: DEFAULT_SYNTHESIS_TEMPLATE.to_string(),
            llm_timeout: Duration::from_secs(60),
            retrieval_timeout: Duration::from_secs(15),
            store_timeout: Duration::from_secs(10),
        }
    }
}

/// Per-question pipeline: history, rewrite, retrieve, synthesize, persist.
pub struct ChatService {
    namespaces: Arc<NamespaceService>,
    chat_store: Arc<dyn ChatStore>,
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmService>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(
        namespaces: Arc<NamespaceService>,
        chat_store: Arc<dyn ChatStore>,
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmService>,
        config: ChatConfig,
    ) -> Self {
        Self {
            namespaces,
            chat_store,
            embedding,
            index,
            llm,
            config,
        }
    }

    /// The sole public operation consumed by the UI layer. The human turn is
    /// persisted before synthesis begins and is never rolled back: a failure
    /// later in the pipeline leaves a dangling unanswered question, which is
    /// a valid resumable state.
    #[instrument(skip(self, question))]
    pub async fn ask_question(
        &self,
        document_id: &str,
        owner_id: &str,
        question: &str,
    ) -> Result<String, DomainError> {
        let handle = self.namespaces.ensure_namespace(document_id).await?;

        let history = self.recent_history(document_id, owner_id).await?;
        debug!(turns = history.len(), "history loaded");

        bounded(
            self.config.store_timeout,
            "human turn append",
            self.chat_store
                .append(document_id, owner_id, ConversationTurn::human(question)),
        )
        .await?;

        let standalone = self.rewrite_query(question, &history).await?;
        let retrieved = self.retrieve(&handle, &standalone).await?;
        debug!(results = retrieved.len(), "context retrieved");

        let answer = self.synthesize(&retrieved, &history, question).await?;

        bounded(
            self.config.store_timeout,
            "assistant turn append",
            self.chat_store
                .append(document_id, owner_id, ConversationTurn::assistant(&answer)),
        )
        .await?;

        info!(document_id, "question answered");
        Ok(answer)
    }

    /// Full turn list for the external UI, oldest first.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        bounded(
            self.config.store_timeout,
            "history list",
            self.chat_store.list(document_id, owner_id),
        )
        .await
    }

    async fn recent_history(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<ConversationTurn>, DomainError> {
        let mut turns = self.history(document_id, owner_id).await?;
        if turns.len() > self.config.max_history_turns {
            turns = turns.split_off(turns.len() - self.config.max_history_turns);
        }
        Ok(turns)
    }

    /// Rewrites the question into a standalone query. With no prior turns
    /// there is nothing to resolve, so the question passes through verbatim
    /// without a generation call.
    async fn rewrite_query(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String, DomainError> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let prompt = self
            .config
            .rewrite_template
            .replace("{history}", &format_history(history))
            .replace("{question}", question);

        let rewritten = bounded(
            self.config.llm_timeout,
            "query rewrite",
            self.llm.complete(&prompt),
        )
        .await?;

        Ok(rewritten.trim().to_string())
    }

    async fn retrieve(
        &self,
        handle: &NamespaceHandle,
        query: &str,
    ) -> Result<Vec<RetrievedContext>, DomainError> {
        let query_embedding = bounded(
            self.config.retrieval_timeout,
            "query embedding",
            self.embedding.embed(query),
        )
        .await?;

        bounded(
            self.config.retrieval_timeout,
            "similarity search",
            self.index
                .query(handle.document_id(), &query_embedding, self.config.top_k),
        )
        .await
    }

    async fn synthesize(
        &self,
        retrieved: &[RetrievedContext],
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, DomainError> {
        let context = retrieved
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = self.config.synthesis_template.replace("{context}", &context);

        let prompt = if history.is_empty() {
            question.to_string()
        } else {
            format!(
                "Previous conversation:\n{}\n\nCurrent question: {}",
                format_history(history),
                question
            )
        };

        bounded(
            self.config.llm_timeout,
            "answer synthesis",
            self.llm.complete_with_system(&system, &prompt),
        )
        .await
    }
}

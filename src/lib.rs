//! Chat-with-PDF service: per-document retrieval-augmented question
//! answering with multi-turn conversational context.
//!
//! The pipeline per question: load history, persist the human turn, rewrite
//! the question into a standalone query, retrieve similar chunks from the
//! document's embedding namespace, synthesize a grounded answer, persist the
//! assistant turn. Namespaces are populated lazily, once per document.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

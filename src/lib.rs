//! # ragkit
//!
//! An embeddable retrieval-augmented generation engine: chunking, pluggable
//! embeddings, exact vector search, and prompt assembly.
//!
//! ## Overview
//!
//! The core is the retrieval engine — [`RecursiveChunker`],
//! [`EmbeddingProvider`], [`VectorIndex`], and the [`Retriever`] that binds
//! them into a two-phase workflow: ingestion (chunk → embed → index) and
//! retrieval (embed → search). Document loading, prompt templating, and
//! generation are boundary traits ([`DocumentLoader`], [`ContextAssembler`],
//! [`GenerativeModel`]) with reference implementations; [`RagChain`] wires
//! the whole pipeline together for grounded question answering.
//!
//! Every collaborator is an explicit value passed by `Arc` — there are no
//! process-wide singletons.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{Document, Query, Retriever, RetrieverConfig};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrieverConfig::builder().chunk_size(2000).overlap(100).build()?)
//!     .embedding_provider(Arc::new(my_embedder))
//!     .build()?;
//!
//! let report = retriever.ingest(&[Document::new("script.txt", text)]).await;
//! let results = retriever.retrieve(&Query::new("What is Bran's age?", 10)).await?;
//! ```
//!
//! ## Features
//!
//! - Offset-accurate recursive chunking with overlap
//! - Exact brute-force k-nearest-neighbor search (cosine, Euclidean, dot)
//! - Deterministic ranking: stable scores, insertion-order tie-breaks
//! - Per-document atomic ingestion with collected failures
//! - Cooperative cancellation and per-call provider deadlines
//! - Version-tagged index snapshots
//! - `ollama` feature: embedding and streamed generation against a local
//!   Ollama server

pub mod chain;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod registry;
pub mod retriever;
pub mod template;

pub use chain::{ChainResponse, RagChain};
pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RetrieverConfig, RetrieverConfigBuilder};
pub use document::{Document, Fragment, MetadataFilter, Query, ScoredFragment};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result, UnavailableReason};
pub use index::{InMemoryIndex, IndexSnapshot, Metric, VectorIndex};
pub use loader::{DocumentLoader, StaticLoader};
pub use model::{GenerativeModel, TokenStream};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaEmbeddingProvider, OllamaGenerator};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use retriever::{IngestFailure, IngestReport, Retriever, RetrieverBuilder};
pub use template::{ContextAssembler, DEFAULT_TEMPLATE, PromptTemplate, StuffAssembler};

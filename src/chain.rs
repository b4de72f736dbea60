//! End-to-end answer chain: retrieve → assemble → generate.
//!
//! [`RagChain`] composes a [`Retriever`] with the external collaborators —
//! a [`ContextAssembler`] and a [`GenerativeModel`] — so applications can
//! ask a question and get a grounded answer, streamed or whole. The chain
//! owns no retrieval logic of its own; it forwards the retriever's results
//! into the assembler and the assembled prompt into the model.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit::{RagChain, StuffAssembler};
//!
//! let chain = RagChain::new(retriever, Arc::new(StuffAssembler::default()), Arc::new(model));
//! let response = chain.answer_with_context("What is Bran's age?").await?;
//! println!("{}", response.answer);
//! ```

use std::sync::Arc;

use tracing::info;

use crate::document::{Query, ScoredFragment};
use crate::error::Result;
use crate::model::{GenerativeModel, TokenStream};
use crate::retriever::Retriever;
use crate::template::ContextAssembler;

/// A grounded answer together with the context that produced it.
#[derive(Debug)]
pub struct ChainResponse {
    /// The model's answer text.
    pub answer: String,
    /// The retrieved fragments handed to the assembler, best first.
    pub context: Vec<ScoredFragment>,
}

/// Composes retrieval, prompt assembly, and generation.
pub struct RagChain {
    retriever: Arc<Retriever>,
    assembler: Arc<dyn ContextAssembler>,
    model: Arc<dyn GenerativeModel>,
}

impl RagChain {
    /// Create a chain from its three collaborators.
    pub fn new(
        retriever: Arc<Retriever>,
        assembler: Arc<dyn ContextAssembler>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self { retriever, assembler, model }
    }

    /// Return a reference to the underlying retriever.
    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Retrieve context for `question` and build the prompt for it.
    async fn prompt_for(&self, question: &str) -> Result<(String, Vec<ScoredFragment>)> {
        let query = Query::new(question, self.retriever.config().top_k);
        let context = self.retriever.retrieve(&query).await?;
        let prompt = self.assembler.assemble(&context, question);
        info!(
            model = self.model.name(),
            context_fragments = context.len(),
            prompt_len = prompt.len(),
            "prompt assembled"
        );
        Ok((prompt, context))
    }

    /// Answer a question with the configured default top-k.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let (prompt, _) = self.prompt_for(question).await?;
        self.model.generate(&prompt).await
    }

    /// Answer a question, returning the retrieved context alongside the
    /// answer for citation.
    pub async fn answer_with_context(&self, question: &str) -> Result<ChainResponse> {
        let (prompt, context) = self.prompt_for(question).await?;
        let answer = self.model.generate(&prompt).await?;
        Ok(ChainResponse { answer, context })
    }

    /// Answer a question as a lazy token stream.
    ///
    /// The model's stream is passed through untouched; nothing is buffered
    /// beyond the token in flight.
    pub async fn answer_stream(&self, question: &str) -> Result<TokenStream> {
        let (prompt, _) = self.prompt_for(question).await?;
        self.model.generate_stream(&prompt).await
    }
}

//! Prompt templates and context assembly.
//!
//! The [`ContextAssembler`] boundary turns retrieved fragments into the
//! prompt text handed to a generative model. [`StuffAssembler`] is the
//! reference implementation: it stuffs fragments into a local, versioned
//! [`PromptTemplate`] under a context budget. Template selection is a
//! configuration choice made by the caller, never by the retrieval engine.

use crate::document::ScoredFragment;
use crate::error::{RagError, Result};

/// Placeholder substituted with the assembled context.
const CONTEXT_SLOT: &str = "{context}";

/// Placeholder substituted with the user's question.
const QUESTION_SLOT: &str = "{question}";

/// The template shipped with the crate, under the name `ragkit/grounded-answer@v1`.
pub const DEFAULT_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to
make up an answer. Keep the answer as concise as possible.

{context}

Question: {question}

Helpful Answer:";

/// A local, versioned prompt template with `{context}` and `{question}`
/// placeholders.
///
/// Templates are plain configuration values; nothing is fetched from a
/// remote hub at run time.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    name: String,
    body: String,
}

impl PromptTemplate {
    /// Create a template from a versioned name (for example
    /// `myapp/support@v2`) and a body.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the body is missing the
    /// `{context}` or `{question}` placeholder.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let body = body.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !body.contains(slot) {
                return Err(RagError::InvalidConfig(format!(
                    "prompt template '{name}' is missing the {slot} placeholder"
                )));
            }
        }
        Ok(Self { name, body })
    }

    /// The versioned template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitute both placeholders and return the prompt text.
    pub fn render(&self, context: &str, question: &str) -> String {
        self.body.replace(CONTEXT_SLOT, context).replace(QUESTION_SLOT, question)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        // DEFAULT_TEMPLATE carries both placeholders.
        Self { name: "ragkit/grounded-answer@v1".into(), body: DEFAULT_TEMPLATE.into() }
    }
}

/// Formats retrieved fragments and a query into prompt text.
///
/// A pure formatting boundary: implementations never reach into retrieval
/// or generation concerns.
pub trait ContextAssembler: Send + Sync {
    /// Build the prompt text for the given retrieval results and question.
    fn assemble(&self, results: &[ScoredFragment], question: &str) -> String;
}

/// Assembles a prompt by concatenating fragment texts into a template.
///
/// Fragments are taken in retrieval order and separated by blank lines;
/// once adding another whole fragment would exceed `max_context_bytes`,
/// the rest are dropped.
#[derive(Debug, Clone)]
pub struct StuffAssembler {
    template: PromptTemplate,
    max_context_bytes: usize,
}

impl StuffAssembler {
    /// Create an assembler around the given template and context budget.
    pub fn new(template: PromptTemplate, max_context_bytes: usize) -> Self {
        Self { template, max_context_bytes }
    }

    /// The template this assembler renders into.
    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}

impl Default for StuffAssembler {
    fn default() -> Self {
        Self { template: PromptTemplate::default(), max_context_bytes: 8_000 }
    }
}

impl ContextAssembler for StuffAssembler {
    fn assemble(&self, results: &[ScoredFragment], question: &str) -> String {
        let mut context = String::new();
        for result in results {
            let separator = if context.is_empty() { 0 } else { 2 };
            if context.len() + separator + result.fragment.text.len() > self.max_context_bytes {
                break;
            }
            if separator > 0 {
                context.push_str("\n\n");
            }
            context.push_str(&result.fragment.text);
        }
        self.template.render(&context, question)
    }
}

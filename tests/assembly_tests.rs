//! Prompt template, context assembly, answer chain, loader, and registry
//! surface tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use ragkit::{
    ContextAssembler, Document, DocumentLoader, EmbeddingProvider, Fragment, GenerativeModel,
    PromptTemplate, ProviderRegistry, RagChain, RagError, Result, Retriever, RetrieverConfig,
    ScoredFragment, StaticLoader, StuffAssembler, TokenStream,
};

const DIM: usize = 8;

#[derive(Debug)]
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIM];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIM] += f32::from(b) / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Streams the prompt back, token by token.
struct EchoModel;

#[async_trait]
impl GenerativeModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream> {
        let tokens: Vec<Result<String>> =
            prompt.split_inclusive(' ').map(|t| Ok(t.to_string())).collect();
        Ok(Box::pin(futures::stream::iter(tokens)))
    }
}

fn scored(text: &str) -> ScoredFragment {
    ScoredFragment {
        fragment: Fragment {
            text: text.to_string(),
            source_id: "doc".to_string(),
            start: 0,
            end: text.len(),
            metadata: HashMap::new(),
        },
        score: 1.0,
    }
}

#[test]
fn template_requires_both_placeholders() {
    assert!(matches!(
        PromptTemplate::new("t@v1", "only {context} here"),
        Err(RagError::InvalidConfig(_))
    ));
    assert!(matches!(
        PromptTemplate::new("t@v1", "only {question} here"),
        Err(RagError::InvalidConfig(_))
    ));
    assert!(PromptTemplate::new("t@v1", "{context} and {question}").is_ok());
}

#[test]
fn template_renders_both_slots() {
    let template = PromptTemplate::new("t@v1", "C: {context}\nQ: {question}").unwrap();
    assert_eq!(template.render("the facts", "the ask"), "C: the facts\nQ: the ask");
}

#[test]
fn default_template_is_usable() {
    let template = PromptTemplate::default();
    let prompt = template.render("some context", "some question");
    assert!(prompt.contains("some context"));
    assert!(prompt.contains("some question"));
    assert_eq!(template.name(), "ragkit/grounded-answer@v1");
}

#[test]
fn assembler_joins_fragments_in_order() {
    let template = PromptTemplate::new("t@v1", "{context}|{question}").unwrap();
    let assembler = StuffAssembler::new(template, 1000);
    let prompt = assembler.assemble(&[scored("first"), scored("second")], "q");
    assert_eq!(prompt, "first\n\nsecond|q");
}

#[test]
fn assembler_never_exceeds_its_context_budget() {
    let template = PromptTemplate::new("t@v1", "{context}|{question}").unwrap();
    let assembler = StuffAssembler::new(template, 9);
    // "aaaa" fits; adding "\n\nbbbb" would need 10 bytes total.
    let prompt = assembler.assemble(&[scored("aaaa"), scored("bbbb")], "q");
    assert_eq!(prompt, "aaaa|q");
}

fn chain() -> RagChain {
    let retriever = Retriever::builder()
        .config(RetrieverConfig::builder().chunk_size(60).overlap(10).top_k(4).build().unwrap())
        .embedding_provider(Arc::new(HashEmbedder))
        .build()
        .unwrap();
    RagChain::new(Arc::new(retriever), Arc::new(StuffAssembler::default()), Arc::new(EchoModel))
}

#[tokio::test]
async fn chain_feeds_retrieved_context_into_the_model() {
    let chain = chain();
    chain
        .retriever()
        .ingest(&[Document::new(
            "story.txt",
            "The direwolf pups were found in the snow. Each child took one home.",
        )])
        .await;

    let answer = chain.answer("Who found the pups?").await.unwrap();
    // EchoModel returns the prompt: it must embed the retrieved context
    // and the question.
    assert!(answer.contains("direwolf"));
    assert!(answer.contains("Who found the pups?"));
}

#[tokio::test]
async fn chain_returns_the_context_it_used() {
    let chain = chain();
    chain
        .retriever()
        .ingest(&[Document::new("story.txt", "A short tale about a quiet harbor town.")])
        .await;

    let response = chain.answer_with_context("What is the tale about?").await.unwrap();
    assert!(!response.context.is_empty());
    for result in &response.context {
        assert!(response.answer.contains(&result.fragment.text));
    }
}

#[tokio::test]
async fn chain_streams_without_reordering_tokens() {
    let chain = chain();
    chain
        .retriever()
        .ingest(&[Document::new("story.txt", "A short tale about a quiet harbor town.")])
        .await;

    let whole = chain.answer("What is the tale about?").await.unwrap();
    let mut stream = chain.answer_stream("What is the tale about?").await.unwrap();
    let mut streamed = String::new();
    while let Some(token) = stream.next().await {
        streamed.push_str(&token.unwrap());
    }
    assert_eq!(streamed, whole);
}

#[tokio::test]
async fn chain_answers_from_an_empty_index() {
    let chain = chain();
    let answer = chain.answer("Anything at all?").await.unwrap();
    assert!(answer.contains("Anything at all?"));
}

#[tokio::test]
async fn static_loader_resolves_sources_in_order() {
    let loader = StaticLoader::new(vec![
        Document::new("a.txt", "alpha"),
        Document::new("b.txt", "beta"),
    ]);

    let docs = loader.load(&["b.txt".into(), "a.txt".into()]).await.unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.source_id.as_str()).collect();
    assert_eq!(ids, ["b.txt", "a.txt"]);

    let err = loader.load(&["missing.txt".into()]).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidConfig(_)));
}

#[test]
fn registry_creates_registered_providers_by_name() {
    let mut registry = ProviderRegistry::new();
    registry.register("hash", || Ok(Arc::new(HashEmbedder)));
    registry.register("alias", || Ok(Arc::new(HashEmbedder)));

    let provider = registry.create("hash").unwrap();
    assert_eq!(provider.dimensions(), DIM);
    assert_eq!(registry.names(), ["alias", "hash"]);

    let err = registry.create("unknown").unwrap_err();
    assert!(matches!(err, RagError::InvalidConfig(_)));
}

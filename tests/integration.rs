//! End-to-end tests: config file → source items → contexts → grounded answer.

use groundwork::config::load_config;
use groundwork::embedding::ProviderVectorizer;
use groundwork::grounding::Grounder;
use groundwork::hooks::limit_context_size;
use groundwork::ingest::{ContextBuilder, KeywordArgs};
use groundwork::logging;
use groundwork::models::SourceItem;
use groundwork_core::context::RagMultiDocumentContext;
use groundwork_core::fingerprint::{annotation_key, corpus_key};
use groundwork_core::sentence::SimpleSentenceSplitter;
use groundwork_core::vector::CosineSimilarity;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn write_config(body: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("groundwork.toml");
    fs::write(&path, body).unwrap();
    (tmp, path)
}

fn tickets() -> Vec<SourceItem> {
    vec![
        SourceItem::new(
            "zendesk",
            "1001",
            "The customer reported that the nightly export job fails with a timeout. \
             Support raised the export timeout to thirty minutes and the job recovered.",
        )
        .with_url("https://support.example.com/tickets/1001")
        .with_link_text("Ticket 1001"),
        SourceItem::new(
            "zendesk",
            "1002",
            "Billing asked whether the annual invoice can be split into quarterly payments. \
             Finance approved quarterly invoicing for the customer starting next year.",
        )
        .with_url("https://support.example.com/tickets/1002")
        .with_link_text("Ticket 1002"),
    ]
}

const CONFIG: &str = r#"
[retrieval]
min_similarity = 0.8
source_min_words = 5
min_coverage = 0.5

[embedding]
provider = "hashing"
model = "hashing-v1"
dims = 256
max_concurrency = 4

[logging]
filter = "groundwork=debug,groundwork_core=debug"
"#;

#[tokio::test]
async fn test_answer_is_cited_against_ingested_tickets() {
    let (_tmp, path) = write_config(CONFIG);
    let config = load_config(&path).unwrap();
    logging::init(&config.logging).unwrap();

    let vectorizer = Arc::new(ProviderVectorizer::from_config(&config.embedding).unwrap());
    let builder = ContextBuilder::new(&config.retrieval.params(), vectorizer.clone());

    let contexts = builder
        .document_contexts(&tickets(), "zendesk", "Ticket", &KeywordArgs::default())
        .await;
    assert!(contexts.iter().all(|c| c.is_vectorized()));

    let contexts = limit_context_size(&contexts, config.retrieval.context_chars).to_vec();
    let multi = RagMultiDocumentContext::new("What happened with the export job?", "", contexts);
    assert!(multi.combined_document().starts_with("Ticket:\nThe customer reported"));

    let answered = multi.update_response(
        "Support raised the export timeout to thirty minutes and the job recovered. \
         Finance approved quarterly invoicing for the customer starting next year.",
    );

    let answer = Grounder::from_config(&config.retrieval)
        .ground(&answered, &SimpleSentenceSplitter, &CosineSimilarity, vectorizer.as_ref())
        .await;

    assert!(!answer.suppressed);
    assert_eq!(answer.result.annotation_coverage, 1.0);
    assert_eq!(answer.result.citations.len(), 2);
    assert_eq!(answer.result.citations[0].document_id.as_deref(), Some("1001"));
    assert_eq!(answer.result.citations[1].document_id.as_deref(), Some("1002"));
    assert_eq!(
        answer.result.annotated_content,
        "Support raised the export timeout to thirty minutes and the job recovered [1]. \
         Finance approved quarterly invoicing for the customer starting next year [2]."
    );
    assert_eq!(
        answered.links(),
        vec![
            "[Ticket 1001](https://support.example.com/tickets/1001)",
            "[Ticket 1002](https://support.example.com/tickets/1002)"
        ]
    );
}

#[tokio::test]
async fn test_keyword_trimming_flows_into_contexts() {
    let (_tmp, path) = write_config(&format!("{CONFIG}\n"));
    let config = load_config(&path).unwrap();
    let vectorizer = Arc::new(ProviderVectorizer::from_config(&config.embedding).unwrap());
    let builder = ContextBuilder::new(&config.retrieval.params(), vectorizer);

    let args = KeywordArgs::parse(Some("invoice, timeout"), Some(60), None);
    let contexts = builder
        .document_contexts(&tickets(), "zendesk", "Ticket", &args)
        .await;

    let multi = RagMultiDocumentContext::new("prompt", "", contexts);
    assert_eq!(multi.keyword_matches(), vec!["invoice", "timeout"]);
    for context in multi.individual_contexts() {
        assert!(context.document().chars().count() < 150);
    }
}

#[tokio::test]
async fn test_disabled_provider_degrades_to_uncited_answers() {
    let (_tmp, path) = write_config("[retrieval]\nmin_coverage = 0.5\n");
    let config = load_config(&path).unwrap();
    let vectorizer = Arc::new(ProviderVectorizer::from_config(&config.embedding).unwrap());
    let builder = ContextBuilder::new(&config.retrieval.params(), vectorizer.clone());

    let contexts = builder
        .document_contexts(&tickets(), "zendesk", "Ticket", &KeywordArgs::default())
        .await;
    assert_eq!(contexts.len(), 2);
    assert!(contexts.iter().all(|c| !c.is_vectorized()));

    let answered = RagMultiDocumentContext::new("prompt", "", contexts)
        .update_response("The export job recovered after the timeout change.");
    let answer = Grounder::from_config(&config.retrieval)
        .ground(&answered, &SimpleSentenceSplitter, &CosineSimilarity, vectorizer.as_ref())
        .await;

    assert!(answer.suppressed);
    assert_eq!(answer.result.annotation_coverage, 0.0);
    assert!(answer.result.citations.is_empty());
}

#[tokio::test]
async fn test_context_budget_and_cache_keys() {
    let (_tmp, path) = write_config(&format!(
        "{}\n",
        CONFIG.replace("min_coverage = 0.5", "min_coverage = 0.5\ncontext_chars = 200")
    ));
    let config = load_config(&path).unwrap();
    assert_eq!(config.retrieval.context_chars, 200);

    let vectorizer = Arc::new(ProviderVectorizer::from_config(&config.embedding).unwrap());
    let builder = ContextBuilder::new(&config.retrieval.params(), vectorizer);
    let contexts = builder
        .document_contexts(&tickets(), "zendesk", "Ticket", &KeywordArgs::default())
        .await;

    let limited = limit_context_size(&contexts, config.retrieval.context_chars);
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id(), Some("1001"));

    let corpus = corpus_key(&contexts);
    assert_eq!(corpus, corpus_key(&contexts));
    assert_ne!(corpus, corpus_key(limited));
    assert_eq!(
        annotation_key("answer", &corpus, 0.8, 3),
        annotation_key("answer", &corpus, 0.8, 3)
    );
}

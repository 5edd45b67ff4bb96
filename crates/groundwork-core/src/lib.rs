//! # Groundwork Core
//!
//! The retrieval-context engine behind Groundwork: everything between raw
//! retrieved text and a cited, coverage-scored answer.
//!
//! This crate contains no tokio, network, filesystem or database
//! dependencies. Every operation is a pure function over immutable values,
//! except the [`vectorizer::SentenceVectorizer`] boundary which the
//! application supplies.
//!
//! ```text
//! raw text ─▶ trim ─▶ sentence ─▶ vectorizer ─▶ RagDocumentContext
//!                                                      │
//!                          limit ◀─────────────────────┘
//!                            │
//!                            ▼
//!                 LLM answer ─▶ annotate ─▶ AnnotationResult
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`vector`] | Embedding vectors and cosine similarity |
//! | [`sentence`] | Sentence splitting |
//! | [`vectorizer`] | The embedding boundary trait |
//! | [`trim`] | Keyword-window document trimming |
//! | [`limit`] | Character-budget list limiting |
//! | [`context`] | Single- and multi-document RAG contexts |
//! | [`annotate`] | Citation annotation and coverage scoring |
//! | [`keywords`] | Keyword list parsing |
//! | [`fingerprint`] | Content hashes for memoising pure outputs |

pub mod annotate;
pub mod context;
pub mod error;
pub mod fingerprint;
pub mod keywords;
pub mod limit;
pub mod params;
pub mod sentence;
pub mod trim;
pub mod vector;
pub mod vectorizer;

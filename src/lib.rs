//! # Groundwork
//!
//! Retrieval contexts for LLM tools, with sentence-level citations and
//! grounding coverage for the answers.
//!
//! The pure engine lives in [`groundwork_core`]; this crate wires it to
//! configuration, logging and embedding providers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │ SourceItem  │──▶│ ContextBuilder       │──▶│ size hook    │──▶ model
//! │ (tool data) │   │ trim+split+vectorize │   │ (char budget)│
//! └─────────────┘   └──────────────────────┘   └──────────────┘
//!                                                     │
//!                         answer ─▶ Grounder ─▶ cited answer / suppressed
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`models`] | Source item type |
//! | [`embedding`] | Embedding providers and the provider-backed vectorizer |
//! | [`ingest`] | Source item → document context pipeline |
//! | [`hooks`] | Context size limiting |
//! | [`grounding`] | Answer annotation and coverage-based suppression |

pub mod config;
pub mod embedding;
pub mod grounding;
pub mod hooks;
pub mod ingest;
pub mod logging;
pub mod models;

pub use groundwork_core;

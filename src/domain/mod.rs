//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, state machine trait)
//! - `conversation` - Canonical messages, payload normalization and transcripts
//! - `evaluation` - Evaluation metrics and scoring requests
//! - `session` - Conversation session lifecycle, events and effects

pub mod conversation;
pub mod evaluation;
pub mod foundation;
pub mod session;

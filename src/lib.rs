//! Conversation Coach - voice practice session core.
//!
//! Runs one spoken practice conversation from microphone permission to a
//! saved evaluation: normalizes transport payloads into messages, formats
//! the transcript, enforces the time-limit warning, drives the session
//! state machine, and persists the scored result.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

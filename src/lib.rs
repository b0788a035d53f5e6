//! BrainDump - LLM orchestration and action extraction
//!
//! This crate turns free-form user input (text, audio, image) into a
//! structured list of actionable items by prompting a two-tier remote
//! model and normalizing its reply into the typed action schema.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

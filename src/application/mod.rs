//! Application layer - the orchestrator facade consumed by the API layer.

mod brain_dump;

pub use brain_dump::{BrainDumpService, ProcessError};

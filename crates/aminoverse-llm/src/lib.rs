//! aminoverse-llm: AI text completion for AminoVerse.
//! The backend layer makes one stateless completion call; the assistant layer
//! builds the protein-specific prompts and turns replies into program data.

pub mod assistant;
pub mod backend;

pub use assistant::{AiSuggestion, ProteinAssistant};
pub use backend::{build_backend, LlmBackend, LlmError, LlmRequest, LlmResponse};

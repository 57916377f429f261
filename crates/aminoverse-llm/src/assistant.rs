//! Protein-specific prompts on top of a single completion call.
//!
//! `refine_query` is the one place where free-form model output becomes structured
//! data. It never fails: an unusable reply degrades to a suggestion echoing the
//! user's own input.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::backend::{LlmBackend, LlmError, LlmRequest};

pub const NO_DESCRIPTION: &str = "No description provided.";

/// Structured reading of a user's protein query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub protein_name: String,
    #[serde(default)]
    pub alternative_names: Vec<String>,
    #[serde(default)]
    pub uniprot_ids: Vec<String>,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    NO_DESCRIPTION.to_string()
}

impl AiSuggestion {
    /// Degraded suggestion used whenever the model reply cannot be parsed.
    pub fn fallback(user_text: &str) -> Self {
        Self {
            protein_name: user_text.to_string(),
            alternative_names: Vec::new(),
            uniprot_ids: Vec::new(),
            description: default_description(),
        }
    }
}

pub fn refine_prompt(user_text: &str) -> String {
    format!(
        r#"A researcher is looking up a protein and typed: "{user_text}"

Work out what they mean and answer with:
1. the most likely protein name
2. common alternative names or gene symbols
3. UniProt accessions, if you know them (optional)
4. one or two sentences on what the protein does

Reply with a JSON object only, using exactly these keys: "protein_name", "alternative_names", "uniprot_ids", "description"."#
    )
}

pub fn analysis_prompt(protein_name: &str, canonical_id: &str) -> String {
    format!(
        r#"Write a detailed overview of the protein {protein_name} (UniProt accession {canonical_id}).

Cover:
1. Main biological functions
2. Associated diseases and medical relevance
3. Key structural features
4. Evolutionary significance
5. Why it matters in current research

Use markdown headers and bullet points. Be concise and scientifically accurate."#
    )
}

/// Flatten a message history into one prompt.
///
/// Messages are assumed to alternate user/assistant starting with the user; the
/// role label is taken from the position only. The last message is the question.
pub fn conversation_prompt(messages: &[String]) -> String {
    let (question, history) = match messages.split_last() {
        Some((last, rest)) => (last.as_str(), rest),
        None => ("", &[][..]),
    };

    let transcript = history
        .iter()
        .enumerate()
        .map(|(i, msg)| {
            let role = if i % 2 == 0 { "User" } else { "Assistant" };
            format!("{}: {}", role, msg)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let preamble = "You are an assistant specialising in protein biology.";
    let closing = "Give a helpful, scientifically accurate answer about this protein or biology question.";

    if transcript.is_empty() {
        format!("{preamble}\n\nUser's question: {question}\n\n{closing}")
    } else {
        format!(
            "{preamble}\n\nConversation so far:\n{transcript}\n\nUser's latest question: {question}\n\n{closing}"
        )
    }
}

/// Parse a model reply into a suggestion. A reply wrapped in a single Markdown
/// code fence is unwrapped first; anything else must be the bare JSON object.
pub fn parse_suggestion(reply: &str) -> Option<AiSuggestion> {
    let body = strip_code_fence(reply.trim());
    serde_json::from_str(body).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    match inner.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => inner.trim(),
    }
}

/// Prompt builder and reply handling around one LLM backend.
#[derive(Clone)]
pub struct ProteinAssistant {
    backend: Arc<dyn LlmBackend>,
    max_tokens: u32,
    temperature: f32,
}

impl ProteinAssistant {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend, max_tokens: 2048, temperature: 0.2 }
    }

    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// One stateless completion of a single user prompt.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let req = LlmRequest::new(prompt).with_generation(self.max_tokens, self.temperature);

        match self.backend.complete(req).await {
            Ok(resp) => {
                debug!(
                    model = %resp.model,
                    prompt_tokens = resp.prompt_tokens,
                    completion_tokens = resp.completion_tokens,
                    "LLM completion"
                );
                Ok(resp.content)
            }
            Err(e) => {
                warn!(model = self.backend.model_id(), error = %e, "LLM completion failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn refine_query(&self, user_text: &str) -> AiSuggestion {
        let reply = match self.complete(&refine_prompt(user_text)).await {
            Ok(r) => r,
            Err(_) => return AiSuggestion::fallback(user_text),
        };

        parse_suggestion(&reply).unwrap_or_else(|| {
            debug!("Model reply was not a suggestion object, using fallback");
            AiSuggestion::fallback(user_text)
        })
    }

    /// Free-text write-up, returned unmodified.
    #[instrument(skip(self))]
    pub async fn analyze(&self, protein_name: &str, canonical_id: &str) -> Result<String, LlmError> {
        self.complete(&analysis_prompt(protein_name, canonical_id)).await
    }

    /// Answer the last message given the full history; nothing is kept between calls.
    #[instrument(skip(self, messages), fields(turns = messages.len()))]
    pub async fn converse(&self, messages: &[String]) -> Result<String, LlmError> {
        self.complete(&conversation_prompt(messages)).await
    }
}

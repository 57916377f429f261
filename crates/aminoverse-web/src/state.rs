//! Shared application state for the web server.

use std::sync::Arc;

use aminoverse_common::{AminoverseError, SandboxClient};
use aminoverse_config::Config;
use aminoverse_llm::{build_backend, ProteinAssistant};
use aminoverse_sources::{AlphaFoldClient, ChemblClient, UniprotClient};

/// Shared state injected into every Axum handler. Read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    pub uniprot: UniprotClient,
    pub alphafold: AlphaFoldClient,
    pub chembl: ChemblClient,
    pub assistant: ProteinAssistant,
}

impl AppState {
    pub fn new(
        uniprot: UniprotClient,
        alphafold: AlphaFoldClient,
        chembl: ChemblClient,
        assistant: ProteinAssistant,
    ) -> Self {
        Self { uniprot, alphafold, chembl, assistant }
    }

    /// Build every adapter from the loaded configuration, sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, AminoverseError> {
        let sources = &config.sources;

        let mut client = SandboxClient::with_timeout(sources.timeout())?;
        for domain in &sources.extra_allowed_domains {
            client.allow_domain(domain);
        }

        let uniprot = UniprotClient::with_base_url(client.clone(), &sources.uniprot_base_url)
            .with_organism(sources.organism_id)
            .with_search_size(sources.search_size);
        let alphafold = AlphaFoldClient::with_base_url(client.clone(), &sources.alphafold_base_url);
        let chembl = ChemblClient::with_base_url(client.clone(), &sources.chembl_base_url)
            .with_limits(sources.target_limit, sources.activity_limit);

        let backend = build_backend(&config.llm, client);
        let assistant = ProteinAssistant::new(backend)
            .with_generation(config.llm.max_tokens, config.llm.temperature);

        Ok(Self::new(uniprot, alphafold, chembl, assistant))
    }
}

pub type SharedState = Arc<AppState>;

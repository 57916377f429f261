use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::AminoverseError;

/// An HTTP client that only allows requests to approved domains.
/// Every upstream adapter and LLM backend goes through one of these.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of biology databases and AI endpoints.
    pub fn new() -> Result<Self, AminoverseError> {
        Self::with_timeout(None)
    }

    /// Same as [`SandboxClient::new`], with an optional whole-request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, AminoverseError> {
        let mut allowlist = HashSet::new();
        let domains = [
            "rest.uniprot.org",                  // UniProtKB
            "alphafold.ebi.ac.uk",               // AlphaFold DB (API + files)
            "www.ebi.ac.uk",                     // ChEMBL
            "generativelanguage.googleapis.com", // Gemini
            "localhost",                         // Ollama / local LLMs
            "127.0.0.1",                         // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let mut builder = ClientBuilder::new();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| AminoverseError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Check exact match or if it's a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// GET builder for an allowed URL.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, AminoverseError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    /// POST builder for an allowed URL.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, AminoverseError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    fn check(&self, url: &str) -> Result<(), AminoverseError> {
        if self.is_allowed(url) {
            return Ok(());
        }
        tracing::warn!(url = url, "Blocked request to non-allowlisted host");
        Err(AminoverseError::Security(format!(
            "Network capabilities capped: domain not in allowlist for URL {}",
            url
        )))
    }
}

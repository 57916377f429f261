//! Configuration loading for AminoVerse.
//! Reads aminoverse.toml from the current directory or the path in AMINOVERSE_CONFIG.
//! Every section is optional; a missing file yields the defaults.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "bool_true")]
    pub cors_permissive: bool,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 5000 }
fn bool_true()    -> bool   { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: bool_true(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_uniprot_url")]
    pub uniprot_base_url: String,
    #[serde(default = "default_alphafold_url")]
    pub alphafold_base_url: String,
    #[serde(default = "default_chembl_url")]
    pub chembl_base_url: String,
    /// NCBI taxonomy id the UniProt search is restricted to.
    #[serde(default = "default_organism_id")]
    pub organism_id: u32,
    #[serde(default = "default_search_size")]
    pub search_size: u32,
    #[serde(default = "default_target_limit")]
    pub target_limit: u32,
    #[serde(default = "default_activity_limit")]
    pub activity_limit: u32,
    /// Whole-request timeout; `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub extra_allowed_domains: Vec<String>,
    // Accepted but unused: none of the upstreams require a key today.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub uniprot_api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub chembl_api_key: Option<SecretString>,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

fn default_uniprot_url()   -> String { "https://rest.uniprot.org".to_string() }
fn default_alphafold_url() -> String { "https://alphafold.ebi.ac.uk".to_string() }
fn default_chembl_url()    -> String { "https://www.ebi.ac.uk/chembl/api/data".to_string() }
fn default_organism_id()   -> u32    { 9606 }
fn default_search_size()   -> u32    { 5 }
fn default_target_limit()  -> u32    { 5 }
fn default_activity_limit() -> u32   { 30 }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            uniprot_base_url: default_uniprot_url(),
            alphafold_base_url: default_alphafold_url(),
            chembl_base_url: default_chembl_url(),
            organism_id: default_organism_id(),
            search_size: default_search_size(),
            target_limit: default_target_limit(),
            activity_limit: default_activity_limit(),
            timeout_secs: None,
            extra_allowed_domains: Vec::new(),
            uniprot_api_key: None,
            chembl_api_key: None,
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Gemini,
    OpenaiCompatible,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Provider default when absent.
    pub base_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model()   -> String { "gemini-2.0-flash".to_string() }
fn default_max_tokens()  -> u32    { 2048 }
fn default_temperature() -> f32    { 0.2 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_llm_model(),
            base_url: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// API key from the config file, else AMINOVERSE_LLM_API_KEY, else GEMINI_API_KEY.
    pub fn resolved_api_key(&self) -> Option<SecretString> {
        if let Some(ref key) = self.api_key {
            return Some(SecretString::from(key.expose_secret()));
        }
        ["AMINOVERSE_LLM_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .map(SecretString::from)
    }
}


impl Config {
    /// Load configuration from aminoverse.toml.
    /// Checks AMINOVERSE_CONFIG env var first, then current directory.
    /// A `.env` file, if present, is loaded into the environment beforehand.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("AMINOVERSE_CONFIG")
            .unwrap_or_else(|_| "aminoverse.toml".to_string());

        if !Path::new(&path).exists() {
            tracing::info!("No config file at {}, using defaults", path);
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

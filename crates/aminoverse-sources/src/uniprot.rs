//! UniProtKB REST client.
//!
//! UniProt is the reference database for protein sequence and function.
//! This adapter covers two operations:
//!   - resolve: free-text protein/gene name → canonical accession (e.g. "p53" → "P04637")
//!   - get_function: name → simplified function record of the top hit
//!
//! API docs: https://www.uniprot.org/help/api
//! Endpoint: https://rest.uniprot.org/uniprotkb
//!
//! The search is restricted to one organism (human by default). When it fails at the
//! transport level two fallbacks run in order: a direct accession fetch when the query
//! looks like an accession, then a search on exact gene name.

use std::sync::OnceLock;

use aminoverse_common::{AminoverseError, Lookup, SandboxClient};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::de::{lenient, lenient_seq};

pub const UNIPROT_API_URL: &str = "https://rest.uniprot.org";

const FUNCTION_PLACEHOLDER: &str = "Function information not available";
pub const NO_RESULTS: &str = "No protein information found";
pub const NO_ACCESSION: &str = "Could not determine UniProt ID";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub results: Vec<UniprotEntry>,
}

/// One UniProtKB entry, reduced to the fields this service reads.
/// Every nested field is optional and shape-tolerant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniprotEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub primary_accession: Option<String>,
    #[serde(default, rename = "uniProtkbId", alias = "id", deserialize_with = "lenient")]
    pub entry_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub protein_description: ProteinDescription,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub genes: Vec<Gene>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "lenient")]
    pub organism: Organism,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinDescription {
    #[serde(default, deserialize_with = "lenient")]
    pub recommended_name: Option<ProteinName>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub submission_names: Vec<ProteinName>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinName {
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: Option<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextValue {
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    #[serde(default, deserialize_with = "lenient")]
    pub gene_name: Option<GeneName>,
}

/// `geneName` is documented as `{value}`; older payloads carry lists of values or bare strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeneName {
    Many(Vec<GeneNameItem>),
    Single(TextValue),
    Plain(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeneNameItem {
    Text(TextValue),
    Plain(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub texts: Vec<TextValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organism {
    #[serde(default, deserialize_with = "lenient")]
    pub scientific_name: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl TextValue {
    fn text(&self) -> Option<&str> {
        non_empty(&self.value)
    }
}

impl ProteinName {
    fn text(&self) -> Option<&str> {
        self.full_name.as_ref().and_then(TextValue::text)
    }
}

impl UniprotEntry {
    pub fn accession(&self) -> Option<&str> {
        non_empty(&self.primary_accession)
    }

    pub fn recommended_name(&self) -> Option<&str> {
        self.protein_description.recommended_name.as_ref().and_then(ProteinName::text)
    }

    /// Recommended name, else the first submission name.
    pub fn display_name(&self) -> Option<&str> {
        self.recommended_name().or_else(|| {
            self.protein_description.submission_names.first().and_then(ProteinName::text)
        })
    }

    /// Display name, falling back to the entry name (e.g. "P53_HUMAN").
    pub fn name(&self) -> String {
        self.display_name()
            .or_else(|| non_empty(&self.entry_name))
            .unwrap_or_default()
            .to_string()
    }

    pub fn gene_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for gene in &self.genes {
            match &gene.gene_name {
                Some(GeneName::Single(v)) => names.extend(v.text().map(String::from)),
                Some(GeneName::Plain(s)) if !s.is_empty() => names.push(s.clone()),
                Some(GeneName::Many(items)) => {
                    for item in items {
                        match item {
                            GeneNameItem::Text(v) => names.extend(v.text().map(String::from)),
                            GeneNameItem::Plain(s) if !s.is_empty() => names.push(s.clone()),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        names
    }

    /// First text of the first FUNCTION comment.
    pub fn function_text(&self) -> Option<&str> {
        self.comments
            .iter()
            .filter(|c| c.comment_type.as_deref() == Some("FUNCTION"))
            .find_map(|c| c.texts.first().and_then(TextValue::text))
    }

    pub fn to_function_record(&self) -> FunctionRecord {
        FunctionRecord {
            id: self.accession().unwrap_or_default().to_string(),
            name: self.name(),
            function: self.function_text().unwrap_or(FUNCTION_PLACEHOLDER).to_string(),
            gene_names: self.gene_names(),
            organism: non_empty(&self.organism.scientific_name).unwrap_or_default().to_string(),
        }
    }
}

// ── Domain records ────────────────────────────────────────────────────────────

/// Simplified function record. Fields default to empty/placeholder values, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub id: String,
    pub name: String,
    pub function: String,
    pub gene_names: Vec<String>,
    pub organism: String,
}

/// Outcome of the resolution step. `found` is true iff `canonical_id` is present and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierResolution {
    pub found: bool,
    pub canonical_id: Option<String>,
    /// Recommended full name of the top hit; submission names are not used here.
    pub display_name: Option<String>,
    pub error: Option<String>,
}

impl IdentifierResolution {
    /// Resolution from the top hit of a search outcome.
    pub fn from_search(results: &Lookup<Vec<UniprotEntry>>) -> Self {
        match results {
            Lookup::Found(entries) => match entries.first() {
                None => Self::unresolved(NO_RESULTS),
                Some(entry) => match entry.accession() {
                    Some(acc) => Self::resolved(entry, acc),
                    None => Self::unresolved(NO_ACCESSION),
                },
            },
            Lookup::NotFound(msg) | Lookup::Failed(msg) => Self::unresolved(msg.as_str()),
        }
    }

    fn resolved(entry: &UniprotEntry, accession: &str) -> Self {
        Self {
            found: true,
            canonical_id: Some(accession.to_string()),
            display_name: entry.recommended_name().map(String::from),
            error: None,
        }
    }

    fn unresolved(error: impl Into<String>) -> Self {
        Self {
            found: false,
            canonical_id: None,
            display_name: None,
            error: Some(error.into()),
        }
    }

    /// Canonical id, only when resolution succeeded.
    pub fn canonical_id(&self) -> Option<&str> {
        self.canonical_id.as_deref().filter(|id| self.found && !id.is_empty())
    }
}

/// Function record of the top hit of a search outcome.
pub fn function_from_search(results: Lookup<Vec<UniprotEntry>>) -> Lookup<FunctionRecord> {
    results.and_then(|entries| match entries.first() {
        Some(entry) => Lookup::Found(entry.to_function_record()),
        None => Lookup::not_found(NO_RESULTS),
    })
}

/// True when `query` plausibly is a UniProt accession rather than a name.
pub fn looks_like_accession(query: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})$")
            .unwrap()
    });

    let mut chars = query.chars();
    let leading_alpha = query.chars().count() >= 5
        && chars.next().is_some_and(char::is_alphabetic)
        && chars.next().is_some_and(char::is_alphabetic);

    leading_alpha || re.is_match(&query.to_ascii_uppercase())
}

// ── Client ────────────────────────────────────────────────────────────────────

/// UniProtKB client for identifier resolution and function lookup.
#[derive(Debug, Clone)]
pub struct UniprotClient {
    client: SandboxClient,
    base_url: String,
    organism_id: u32,
    search_size: u32,
}

impl UniprotClient {
    pub fn new(client: SandboxClient) -> Self {
        Self::with_base_url(client, UNIPROT_API_URL)
    }

    pub fn with_base_url(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            organism_id: 9606,
            search_size: 5,
        }
    }

    pub fn with_organism(mut self, organism_id: u32) -> Self {
        self.organism_id = organism_id;
        self
    }

    pub fn with_search_size(mut self, size: u32) -> Self {
        self.search_size = size;
        self
    }

    /// Search with fallbacks. Only a transport failure of the organism-scoped
    /// search triggers the fallbacks; an empty result list is a valid answer.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Lookup<Vec<UniprotEntry>> {
        let scoped = format!("{} AND organism_id:{}", query, self.organism_id);
        let primary_err = match self.run_search(&scoped).await {
            Ok(resp) => return Lookup::Found(resp.results),
            Err(e) => e,
        };
        warn!(error = %primary_err, "UniProt search failed, trying fallbacks");

        if looks_like_accession(query) {
            match self.fetch_entry(query).await {
                Ok(Some(entry)) => {
                    debug!(accession = query, "Resolved by direct accession fetch");
                    return Lookup::Found(vec![entry]);
                }
                Ok(None) => debug!(accession = query, "Direct accession fetch found nothing"),
                Err(e) => debug!(error = %e, "Direct accession fetch failed"),
            }
        }

        match self.run_search(&format!("gene:{}", query)).await {
            Ok(resp) => Lookup::Found(resp.results),
            Err(e) => {
                warn!(error = %e, "UniProt gene-name fallback failed");
                Lookup::failed(format!("Error querying UniProt API: {}", primary_err))
            }
        }
    }

    /// Resolve a free-text name to a canonical accession using the top search hit.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> IdentifierResolution {
        IdentifierResolution::from_search(&self.search(query).await)
    }

    /// Function record of the top search hit.
    #[instrument(skip(self))]
    pub async fn get_function(&self, name: &str) -> Lookup<FunctionRecord> {
        function_from_search(self.search(name).await)
    }

    async fn run_search(&self, query: &str) -> Result<SearchResponse, AminoverseError> {
        let url = format!("{}/uniprotkb/search", self.base_url);
        let size = self.search_size.to_string();

        debug!(query = query, "Searching UniProt");

        let resp = self.client
            .get(&url)?
            .query(&[("query", query), ("format", "json"), ("size", size.as_str())])
            .send()
            .await?
            .error_for_status()?;

        Ok(resp.json().await?)
    }

    /// Direct entry fetch; anything but a 200 is `None`.
    async fn fetch_entry(&self, accession: &str) -> Result<Option<UniprotEntry>, AminoverseError> {
        let url = format!("{}/uniprotkb/{}", self.base_url, accession);

        let resp = self.client.get(&url)?.send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Ok(None);
        }

        Ok(Some(resp.json().await?))
    }
}

//! AlphaFold DB client: prediction metadata and PDB model download.
//!
//! Endpoint: https://alphafold.ebi.ac.uk/api/prediction/{accession}
//!
//! The prediction endpoint answers with a JSON list of model records. Anything else
//! (an error object, a bare dict) is reported as an unexpected shape.

use aminoverse_common::{Lookup, SandboxClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::de::lenient;

pub const ALPHAFOLD_API_URL: &str = "https://alphafold.ebi.ac.uk";

pub const STRUCTURE_NOT_FOUND: &str = "Protein structure not found in AlphaFold database";
const UNEXPECTED_SHAPE: &str = "Unexpected structure data format";
pub const NO_PDB_URL: &str = "No PDB URL available in AlphaFold data";

/// One AlphaFold model record. Known fields are typed; the rest are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetadata {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub uniprot_accession: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub gene: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub organism_scientific_name: Option<String>,
    /// Mean pLDDT over the model, 0–100.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub global_metric_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pdb_url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cif_url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model_created_date: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl PredictionMetadata {
    fn pdb_url(&self) -> Option<&str> {
        self.pdb_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Downloaded PDB-format model text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdbFile {
    pub pdb_data: String,
}

/// Classify a prediction payload: a list of records, or an unexpected shape.
pub fn parse_prediction(body: Value) -> Lookup<Vec<PredictionMetadata>> {
    match body {
        Value::Array(items) => {
            let records: Result<Vec<PredictionMetadata>, _> =
                items.into_iter().map(serde_json::from_value).collect();
            match records {
                Ok(records) => Lookup::Found(records),
                Err(_) => Lookup::failed(UNEXPECTED_SHAPE),
            }
        }
        Value::Object(map) => match map.get("error").and_then(Value::as_str) {
            Some(msg) => Lookup::failed(msg),
            None => Lookup::failed(UNEXPECTED_SHAPE),
        },
        _ => Lookup::failed(UNEXPECTED_SHAPE),
    }
}

/// AlphaFold DB client.
#[derive(Debug, Clone)]
pub struct AlphaFoldClient {
    client: SandboxClient,
    base_url: String,
}

impl AlphaFoldClient {
    pub fn new(client: SandboxClient) -> Self {
        Self::with_base_url(client, ALPHAFOLD_API_URL)
    }

    pub fn with_base_url(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Prediction metadata for a UniProt accession.
    #[instrument(skip(self))]
    pub async fn get_prediction(&self, accession: &str) -> Lookup<Vec<PredictionMetadata>> {
        let url = format!("{}/api/prediction/{}", self.base_url, accession);

        debug!(accession = accession, "Fetching AlphaFold prediction");

        let resp = match self.client.get(&url) {
            Ok(req) => req.send().await,
            Err(e) => return Lookup::failed(format!("Error querying AlphaFold API: {}", e)),
        };

        let resp = match resp {
            Ok(r) if r.status() == reqwest::StatusCode::NOT_FOUND => {
                info!(accession = accession, "No AlphaFold model");
                return Lookup::not_found(STRUCTURE_NOT_FOUND);
            }
            Ok(r) => r.error_for_status(),
            Err(e) => Err(e),
        };

        let body = match resp {
            Ok(r) => r.json::<Value>().await,
            Err(e) => Err(e),
        };

        match body {
            Ok(body) => parse_prediction(body),
            Err(e) => {
                warn!(error = %e, "AlphaFold request failed");
                Lookup::failed(format!("Error querying AlphaFold API: {}", e))
            }
        }
    }

    /// Download the PDB file named by the first metadata record.
    /// An empty slice is an error; no request is made.
    #[instrument(skip(self, metadata), fields(records = metadata.len()))]
    pub async fn fetch_structure_file(&self, metadata: &[PredictionMetadata]) -> Lookup<PdbFile> {
        let Some(url) = metadata.first().and_then(PredictionMetadata::pdb_url) else {
            return Lookup::failed(NO_PDB_URL);
        };

        debug!(url = url, "Downloading AlphaFold PDB");

        match self.download(url).await {
            Ok(pdb_data) => Lookup::Found(PdbFile { pdb_data }),
            Err(e) => {
                warn!(error = %e, "AlphaFold PDB download failed");
                Lookup::failed(format!("Error fetching AlphaFold PDB: {}", e))
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String, aminoverse_common::AminoverseError> {
        let text = self.client
            .get(url)?
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_list_keeps_unknown_fields() {
        let parsed = parse_prediction(json!([{
            "entryId": "AF-P04637-F1",
            "uniprotAccession": "P04637",
            "globalMetricValue": 75.06,
            "pdbUrl": "https://alphafold.ebi.ac.uk/files/AF-P04637-F1-model_v4.pdb",
            "latestVersion": 4
        }]));

        let records = parsed.found().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].global_metric_value, Some(75.06));
        assert_eq!(records[0].extra.get("latestVersion"), Some(&json!(4)));

        let round = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(round["entryId"], "AF-P04637-F1");
        assert_eq!(round["latestVersion"], 4);
        assert!(round.get("cifUrl").is_none());
    }

    #[test]
    fn test_parse_error_object() {
        let parsed = parse_prediction(json!({"error": "upstream says no"}));
        assert_eq!(parsed, Lookup::Failed("upstream says no".to_string()));
    }

    #[test]
    fn test_parse_unexpected_shapes() {
        for body in [json!({"entryId": "AF-X"}), json!("text"), json!(null), json!([1, 2])] {
            assert_eq!(parse_prediction(body), Lookup::Failed(UNEXPECTED_SHAPE.to_string()));
        }
    }

    #[test]
    fn test_parse_empty_list_is_found() {
        assert_eq!(parse_prediction(json!([])), Lookup::Found(vec![]));
    }

    #[tokio::test]
    async fn test_fetch_without_url_is_error() {
        let fetcher = AlphaFoldClient::new(SandboxClient::new().unwrap());
        let result = fetcher.fetch_structure_file(&[PredictionMetadata::default()]).await;
        assert_eq!(result, Lookup::Failed(NO_PDB_URL.to_string()));
    }
}

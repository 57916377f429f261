//! Shared fixtures for AminoVerse tests: canned upstream payloads, a wiremock
//! helper that serves them, and an LLM backend with a scripted reply.

use std::sync::{Arc, Mutex};

use aminoverse_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const P53_ACCESSION: &str = "P04637";
pub const P53_NAME: &str = "Cellular tumor antigen p53";
pub const P53_TARGET: &str = "CHEMBL4096";
pub const PDB_PATH: &str = "/files/AF-P04637-F1-model_v4.pdb";
pub const PDB_TEXT: &str = "HEADER    TUMOR SUPPRESSOR\nATOM      1  N   MET A   1      -6.180  12.458 -28.296  1.00 34.12           N\nEND\n";

// ── Upstream payloads ─────────────────────────────────────────────────────────

pub fn uniprot_p53_entry() -> Value {
    json!({
        "entryType": "UniProtKB reviewed (Swiss-Prot)",
        "primaryAccession": P53_ACCESSION,
        "uniProtkbId": "P53_HUMAN",
        "organism": { "scientificName": "Homo sapiens", "taxonId": 9606 },
        "proteinDescription": {
            "recommendedName": { "fullName": { "value": P53_NAME } }
        },
        "genes": [{ "geneName": { "value": "TP53" } }],
        "comments": [{
            "commentType": "FUNCTION",
            "texts": [{ "value": "Multifunctional transcription factor that induces cell cycle arrest, DNA repair or apoptosis." }]
        }]
    })
}

pub fn uniprot_p53_search() -> Value {
    json!({ "results": [uniprot_p53_entry()] })
}

pub fn uniprot_empty_search() -> Value {
    json!({ "results": [] })
}

/// Prediction list whose PDB link points back at `base_url`.
pub fn alphafold_p53_prediction(base_url: &str) -> Value {
    json!([{
        "entryId": "AF-P04637-F1",
        "gene": "TP53",
        "uniprotAccession": P53_ACCESSION,
        "organismScientificName": "Homo sapiens",
        "globalMetricValue": 75.06,
        "pdbUrl": format!("{}{}", base_url, PDB_PATH),
        "cifUrl": format!("{}/files/AF-P04637-F1-model_v4.cif", base_url),
        "modelCreatedDate": "2022-06-01",
        "latestVersion": 4
    }])
}

pub fn chembl_p53_targets() -> Value {
    json!({
        "page_meta": { "limit": 5, "offset": 0, "total_count": 2 },
        "targets": [
            {
                "target_chembl_id": P53_TARGET,
                "pref_name": "Cellular tumor antigen p53",
                "organism": "Homo sapiens",
                "target_type": "SINGLE PROTEIN"
            },
            {
                "target_chembl_id": "CHEMBL3883314",
                "pref_name": "p53-binding protein Mdm-2",
                "organism": "Homo sapiens",
                "target_type": "PROTEIN-PROTEIN INTERACTION"
            }
        ]
    })
}

/// Three activities: two informative, one bare identifier that gets dropped.
pub fn chembl_p53_activities() -> Value {
    json!({
        "activities": [
            {
                "molecule_chembl_id": "CHEMBL1096",
                "molecule_pref_name": "NUTLIN-3",
                "standard_type": "IC50",
                "standard_value": "90.0",
                "standard_units": "nM",
                "target_organism": "Homo sapiens",
                "assay_description": "Inhibition of p53-MDM2 interaction"
            },
            {
                "molecule_chembl_id": "CHEMBL2105717",
                "standard_type": "Kd",
                "standard_value": 1.2
            },
            {
                "molecule_chembl_id": "CHEMBL25",
                "molecule_pref_name": null,
                "standard_type": null,
                "standard_value": null
            }
        ]
    })
}

// ── Mock upstreams ────────────────────────────────────────────────────────────

/// Serve the p53 happy path for all three databases from one mock server.
/// Point every client's base URL at `server.uri()`.
pub async fn mount_p53_upstreams(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/uniprotkb/search"))
        .and(query_param("query", "p53 AND organism_id:9606"))
        .respond_with(ResponseTemplate::new(200).set_body_json(uniprot_p53_search()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/prediction/{}", P53_ACCESSION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(alphafold_p53_prediction(&server.uri())))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(PDB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PDB_TEXT))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/target/search"))
        .and(query_param("q", "p53"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chembl_p53_targets()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/activity"))
        .and(query_param("target_chembl_id", P53_TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_json(chembl_p53_activities()))
        .mount(server)
        .await;
}

// ── Scripted LLM ──────────────────────────────────────────────────────────────

/// LLM backend that answers every request with the same reply (or the same
/// failure) and records the prompts it was sent.
pub struct ScriptedBackend {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { reply: Some(reply.into()), prompts: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { reply: None, prompts: Mutex::new(Vec::new()) })
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(req.prompt);
        }

        match &self.reply {
            Some(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "scripted".to_string(),
                prompt_tokens: 0,
                completion_tokens: 0,
            }),
            None => Err(LlmError::Unavailable("scripted failure".to_string())),
        }
    }

    fn model_id(&self) -> &str { "scripted" }
}

//! Response shaping: turns adapter outcomes into the JSON envelopes the API serves.
//!
//! Per-source misses never fail a response here; they become inline `{"error": ...}`
//! markers through `Lookup`'s serialization. Only the handlers decide on 404s.

use aminoverse_common::Lookup;
use aminoverse_sources::uniprot::{function_from_search, IdentifierResolution};
use aminoverse_sources::{
    AlphaFoldClient, ChemblClient, DrugAssociations, FunctionRecord, PdbFile, PredictionMetadata,
    UniprotClient,
};
use serde::Serialize;
use tracing::{debug, warn};

pub const NO_STRUCTURE: &str = "No structure available";

/// Qualitative model confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `score` is normalised to 0..1.
    pub fn from_score(score: f64) -> Self {
        if score > 0.9 {
            Self::High
        } else if score > 0.7 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confidence {
    pub score: f64,
    pub tier: ConfidenceTier,
}

impl Confidence {
    /// From the first record's mean pLDDT (0-100). `None` without a score.
    pub fn from_metadata(records: &[PredictionMetadata]) -> Option<Self> {
        let plddt = records.first()?.global_metric_value?;
        let score = plddt / 100.0;
        Some(Self { score, tier: ConfidenceTier::from_score(score) })
    }
}

/// Prediction metadata plus the downloaded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureData {
    pub structure_metadata: Vec<PredictionMetadata>,
    pub pdb_data: Lookup<PdbFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
}

impl StructureData {
    pub fn new(structure_metadata: Vec<PredictionMetadata>, pdb_data: Lookup<PdbFile>) -> Self {
        let confidence = Confidence::from_metadata(&structure_metadata);
        Self { structure_metadata, pdb_data, confidence }
    }
}

/// Body of `GET /api/protein/{name}/structure`. A structure miss is flattened
/// into an `error` key next to the resolved identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureResponse {
    pub protein_name: String,
    pub uniprot_id: String,
    #[serde(flatten)]
    pub structure: Lookup<StructureData>,
}

/// Body of `GET /api/protein/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinInfo {
    pub protein: String,
    pub function: Lookup<FunctionRecord>,
}

/// Body of `GET /api/protein/{name}/drugs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugResponse {
    pub protein_name: String,
    pub drug_associations: Lookup<DrugAssociations>,
}

/// Body of `GET /api/protein/{name}/analysis`. `analysis` is null when the model is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub protein_name: String,
    pub uniprot_id: String,
    pub analysis: Option<String>,
}

/// Body of `GET /api/protein/{name}/report`: every source, each one data or an inline error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinReport {
    pub protein: String,
    pub function: Lookup<FunctionRecord>,
    pub structure: Lookup<StructureResponse>,
    pub drug_associations: Lookup<DrugAssociations>,
}

/// Prediction lookup, then the PDB download for the first record.
pub async fn fetch_structure(alphafold: &AlphaFoldClient, accession: &str) -> Lookup<StructureData> {
    match alphafold.get_prediction(accession).await {
        Lookup::Found(records) if records.is_empty() => Lookup::failed(NO_STRUCTURE),
        Lookup::Found(records) => {
            let pdb = alphafold.fetch_structure_file(&records).await;
            Lookup::Found(StructureData::new(records, pdb))
        }
        Lookup::NotFound(msg) => Lookup::NotFound(msg),
        Lookup::Failed(msg) => Lookup::Failed(msg),
    }
}

/// All sources for one protein, fetched one after another.
///
/// The UniProt search runs once; its top hit supplies both the function record
/// and the accession for the structure lookup. A resolution failure marks only
/// the structure section.
pub async fn build_report(
    uniprot: &UniprotClient,
    alphafold: &AlphaFoldClient,
    chembl: &ChemblClient,
    name: &str,
) -> ProteinReport {
    let search = uniprot.search(name).await;
    let resolution = IdentifierResolution::from_search(&search);
    let function = function_from_search(search);

    let structure = match resolution.canonical_id() {
        Some(accession) => Lookup::Found(StructureResponse {
            protein_name: name.to_string(),
            uniprot_id: accession.to_string(),
            structure: fetch_structure(alphafold, accession).await,
        }),
        None => {
            let reason = resolution.error.unwrap_or_default();
            warn!(protein = name, reason = %reason, "Skipping structure section");
            Lookup::failed(reason)
        }
    };

    let drug_associations = chembl.get_drug_associations(name).await;

    debug!(
        protein = name,
        function = function.is_found(),
        structure = structure.is_found(),
        drugs = drug_associations.is_found(),
        "Report assembled"
    );

    ProteinReport {
        protein: name.to_string(),
        function,
        structure,
        drug_associations,
    }
}

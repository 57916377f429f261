//! Per-protein endpoints. Each one sequences the adapters it needs; only a failed
//! identifier resolution becomes a 404, every other miss is reported inline.

use aminoverse_sources::uniprot::NO_ACCESSION;
use aminoverse_sources::IdentifierResolution;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::report::{
    build_report, fetch_structure, AnalysisResponse, DrugResponse, ProteinInfo, ProteinReport,
    StructureResponse,
};
use crate::state::SharedState;

const NOT_IN_UNIPROT: &str = "Could not find protein in UniProt";

/// Resolve `name` or fail the request with a 404.
async fn resolve_or_404(state: &SharedState, name: &str) -> Result<IdentifierResolution, ApiError> {
    let resolution = state.uniprot.resolve(name).await;
    if resolution.canonical_id().is_some() {
        return Ok(resolution);
    }

    let reason = resolution.error.as_deref().unwrap_or_default();
    warn!(protein = name, reason = reason, "Identifier resolution failed");

    let message = if reason == NO_ACCESSION { NO_ACCESSION } else { NOT_IN_UNIPROT };
    Err(ApiError::NotFound(message.to_string()))
}

/// GET /api/protein/{name}
pub async fn protein_info(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<ProteinInfo> {
    let function = state.uniprot.get_function(&name).await;
    Json(ProteinInfo { protein: name, function })
}

/// GET /api/protein/{name}/structure
pub async fn protein_structure(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<StructureResponse>, ApiError> {
    let resolution = resolve_or_404(&state, &name).await?;
    let uniprot_id = resolution.canonical_id().unwrap_or_default().to_string();

    let structure = fetch_structure(&state.alphafold, &uniprot_id).await;
    if let Some(msg) = structure.error_message() {
        info!(protein = %name, uniprot_id = %uniprot_id, error = msg, "No structure for protein");
    }

    Ok(Json(StructureResponse {
        protein_name: name,
        uniprot_id,
        structure,
    }))
}

/// GET /api/protein/{name}/drugs
pub async fn protein_drugs(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<DrugResponse> {
    let drug_associations = state.chembl.get_drug_associations(&name).await;
    Json(DrugResponse { protein_name: name, drug_associations })
}

/// GET /api/protein/{name}/analysis
pub async fn protein_analysis(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let resolution = resolve_or_404(&state, &name).await?;
    let uniprot_id = resolution.canonical_id().unwrap_or_default().to_string();
    let protein_name = resolution.display_name.unwrap_or(name);

    // A model failure is reported as a null analysis, not as an error status.
    let analysis = state.assistant.analyze(&protein_name, &uniprot_id).await.ok();

    Ok(Json(AnalysisResponse { protein_name, uniprot_id, analysis }))
}

/// GET /api/protein/{name}/report
pub async fn protein_report(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Json<ProteinReport> {
    Json(build_report(&state.uniprot, &state.alphafold, &state.chembl, &name).await)
}

//! ChEMBL API client.
//!
//! ChEMBL is a database of bioactive molecules with drug-like properties.
//! Drug associations for a protein are a two-step chained lookup:
//!   1. target search by free-text protein name (top 5 candidates)
//!   2. activities recorded against the first target (up to 30)
//!
//! API docs: https://chembl.gitbook.io/chembl-interface-documentation/web-resources/chembl-api
//! Endpoint: https://www.ebi.ac.uk/chembl/api/data

use aminoverse_common::{AminoverseError, Lookup, SandboxClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::de::{lenient_seq, lenient_text};

pub const CHEMBL_API_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";

const NO_TARGETS: &str = "No target information found in ChEMBL";
const NO_TARGET_ID: &str = "Could not find ChEMBL target ID";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TargetSearchResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub targets: Vec<TargetHit>,
}

/// Target search hit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetHit {
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_chembl_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pref_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub organism: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub activities: Vec<ActivityRecord>,
}

/// Activity record as ChEMBL returns it. `standard_value` arrives as a string or a number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub molecule_chembl_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub molecule_pref_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub molecule_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub standard_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub standard_value: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub standard_units: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target_organism: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub assay_description: Option<String>,
}

// ── Domain records ────────────────────────────────────────────────────────────

/// One molecule tested against the target. Only fields with data are serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugEntry {
    pub molecule_chembl_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    /// Value and units, e.g. "12.5 nM".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_organism: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assay_description: Option<String>,
}

impl DrugEntry {
    /// Reshape an activity. `None` when it has no molecule id or nothing beyond it.
    pub fn from_activity(activity: &ActivityRecord) -> Option<Self> {
        let molecule_chembl_id = activity.molecule_chembl_id.clone()?;

        let activity_value = activity.standard_value.as_ref().map(|v| match &activity.standard_units {
            Some(units) => format!("{} {}", v, units),
            None => v.clone(),
        });

        let entry = Self {
            molecule_chembl_id,
            molecule_name: activity.molecule_pref_name.clone().or_else(|| activity.molecule_name.clone()),
            activity_type: activity.standard_type.clone(),
            activity_value,
            target_organism: activity.target_organism.clone(),
            assay_description: activity.assay_description.clone(),
        };

        entry.is_informative().then_some(entry)
    }

    fn is_informative(&self) -> bool {
        self.molecule_name.is_some()
            || self.activity_type.is_some()
            || self.activity_value.is_some()
            || self.target_organism.is_some()
            || self.assay_description.is_some()
    }
}

/// Drug associations for the first matching ChEMBL target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugAssociations {
    pub target_chembl_id: String,
    pub target_name: String,
    pub drugs: Vec<DrugEntry>,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// ChEMBL client for target and activity data.
#[derive(Debug, Clone)]
pub struct ChemblClient {
    client: SandboxClient,
    base_url: String,
    target_limit: u32,
    activity_limit: u32,
}

impl ChemblClient {
    pub fn new(client: SandboxClient) -> Self {
        Self::with_base_url(client, CHEMBL_API_URL)
    }

    pub fn with_base_url(client: SandboxClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            target_limit: 5,
            activity_limit: 30,
        }
    }

    pub fn with_limits(mut self, target_limit: u32, activity_limit: u32) -> Self {
        self.target_limit = target_limit;
        self.activity_limit = activity_limit;
        self
    }

    /// Search targets by free-text protein name.
    #[instrument(skip(self))]
    pub async fn search_targets(&self, protein_name: &str) -> Result<Vec<TargetHit>, AminoverseError> {
        let url = format!("{}/target/search", self.base_url);
        let limit = self.target_limit.to_string();

        debug!(query = protein_name, "Searching ChEMBL targets");

        let resp: TargetSearchResponse = self.client
            .get(&url)?
            .query(&[("q", protein_name), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.targets)
    }

    /// Fetch activities recorded against a target.
    #[instrument(skip(self))]
    pub async fn fetch_activities(&self, target_chembl_id: &str) -> Result<Vec<ActivityRecord>, AminoverseError> {
        let url = format!("{}/activity", self.base_url);
        let limit = self.activity_limit.to_string();

        debug!(target = target_chembl_id, "Fetching target activities");

        let resp: ActivityResponse = self.client
            .get(&url)?
            .query(&[
                ("target_chembl_id", target_chembl_id),
                ("limit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.activities)
    }

    /// Target search, then activities for the first target, reshaped into drug entries.
    #[instrument(skip(self))]
    pub async fn get_drug_associations(&self, protein_name: &str) -> Lookup<DrugAssociations> {
        let targets = match self.search_targets(protein_name).await {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "ChEMBL target search failed");
                return Lookup::failed(format!("Error querying ChEMBL API: {}", e));
            }
        };

        let Some(target) = targets.first() else {
            return Lookup::not_found(NO_TARGETS);
        };
        let Some(target_id) = target.target_chembl_id.as_deref() else {
            return Lookup::failed(NO_TARGET_ID);
        };

        let activities = match self.fetch_activities(target_id).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, target = target_id, "ChEMBL activity query failed");
                return Lookup::failed(format!("Error fetching drug association data: {}", e));
            }
        };

        let drugs: Vec<DrugEntry> = activities.iter().filter_map(DrugEntry::from_activity).collect();
        debug!(activities = activities.len(), kept = drugs.len(), "Shaped drug entries");

        Lookup::Found(DrugAssociations {
            target_chembl_id: target_id.to_string(),
            target_name: target.pref_name.clone().unwrap_or_default(),
            drugs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn activity(value: serde_json::Value) -> ActivityRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_bare_identifier_is_dropped() {
        let a = activity(json!({
            "molecule_chembl_id": "CHEMBL25",
            "molecule_pref_name": null,
            "standard_type": "",
            "standard_value": null
        }));
        assert_eq!(DrugEntry::from_activity(&a), None);
    }

    #[test]
    fn test_malformed_activity_does_not_hide_the_rest() {
        let resp: ActivityResponse = serde_json::from_value(json!({
            "activities": [null, { "molecule_chembl_id": "CHEMBL1096", "standard_type": "IC50" }]
        }))
        .unwrap();
        assert_eq!(resp.activities.len(), 1);

        let entry = DrugEntry::from_activity(&resp.activities[0]).unwrap();
        assert_eq!(entry.molecule_chembl_id, "CHEMBL1096");
    }

    #[test]
    fn test_missing_identifier_is_dropped() {
        let a = activity(json!({ "standard_type": "IC50", "standard_value": "3.0" }));
        assert_eq!(DrugEntry::from_activity(&a), None);
    }

    #[test]
    fn test_only_present_fields_are_kept() {
        let a = activity(json!({
            "molecule_chembl_id": "CHEMBL939",
            "molecule_pref_name": "GEFITINIB",
            "standard_type": "IC50",
            "standard_value": "3.0",
            "standard_units": "nM"
        }));
        let entry = DrugEntry::from_activity(&a).unwrap();
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "molecule_chembl_id": "CHEMBL939",
                "molecule_name": "GEFITINIB",
                "activity_type": "IC50",
                "activity_value": "3.0 nM"
            })
        );
    }

    #[test]
    fn test_single_optional_field_is_enough() {
        let a = activity(json!({
            "molecule_chembl_id": "CHEMBL1",
            "assay_description": "Inhibition of EGFR"
        }));
        let entry = DrugEntry::from_activity(&a).unwrap();
        assert_eq!(entry.assay_description.as_deref(), Some("Inhibition of EGFR"));
        assert_eq!(entry.activity_value, None);
    }

    #[test]
    fn test_numeric_value_without_units() {
        let a = activity(json!({ "molecule_chembl_id": "CHEMBL2", "standard_value": 0 }));
        let entry = DrugEntry::from_activity(&a).unwrap();
        assert_eq!(entry.activity_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_legacy_molecule_name_field() {
        let a = activity(json!({ "molecule_chembl_id": "CHEMBL3", "molecule_name": "ASPIRIN" }));
        let entry = DrugEntry::from_activity(&a).unwrap();
        assert_eq!(entry.molecule_name.as_deref(), Some("ASPIRIN"));
    }
}

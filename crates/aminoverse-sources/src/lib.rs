//! Upstream adapters, one per public biology database.
//!
//! Each client wraps one REST API and hands back typed records through
//! [`Lookup`](aminoverse_common::Lookup); nothing here returns `Err` to the caller.
//!
//!   UniprotClient:   identifier resolution and protein function (rest.uniprot.org)
//!   AlphaFoldClient: structure-prediction metadata and PDB download (alphafold.ebi.ac.uk)
//!   ChemblClient:    target search and bioactivity records (www.ebi.ac.uk/chembl)

mod de;

pub mod alphafold;
pub mod chembl;
pub mod uniprot;

pub use alphafold::{AlphaFoldClient, PdbFile, PredictionMetadata};
pub use chembl::{ChemblClient, DrugAssociations, DrugEntry};
pub use uniprot::{FunctionRecord, IdentifierResolution, UniprotClient, UniprotEntry};

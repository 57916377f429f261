//! aminoverse-web: HTTP API for AminoVerse.
//! Exposes one endpoint per capability:
//!   - protein function, structure, drug associations and a combined report
//!   - AI analysis, query refinement and conversation
//!   - liveness and capability listing

pub mod error;
pub mod handlers;
pub mod report;
pub mod router;
pub mod state;

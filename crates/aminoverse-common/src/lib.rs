//! aminoverse-common: Shared types, errors, and the HTTP client used across all AminoVerse crates.

pub mod error;
pub mod lookup;
pub mod sandbox;

// Re-export commonly used types
pub use error::{AminoverseError, Result};
pub use lookup::Lookup;
pub use sandbox::SandboxClient;

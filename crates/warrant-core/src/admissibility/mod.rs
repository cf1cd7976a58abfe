//! Admissibility: the per-statement judgment pipeline.
//!
//! A cleaned utterance flows through extraction ([`extractor`]), modality
//! detection ([`modality`]), ground scoping ([`matcher`]), license
//! derivation ([`license`]), and axiom checking ([`axioms`]). The shared
//! pattern tables live in [`patterns`].

pub mod axioms;
pub mod extractor;
pub mod license;
pub mod matcher;
pub mod modality;
pub mod patterns;

pub use axioms::{AxiomChecker, AxiomOutcome};
pub use extractor::StatementExtractor;
pub use license::{LicenseDeriver, LicenseMode};
pub use matcher::GroundMatcher;
pub use modality::ModalityDetector;

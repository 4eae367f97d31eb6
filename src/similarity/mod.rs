//! Structural similarity between extraction components and the ontology.

pub mod analysis;
pub mod matrix;

pub use analysis::{AnalysisSummary, ComponentAnalyzer, ComponentScore};
pub use matrix::{rmsd, score_component, DistanceMatrices};

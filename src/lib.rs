//! # ontoval
//!
//! Validation of automatically extracted keyword relationships against a
//! curated term hierarchy.
//!
//! Two questions are answered:
//!
//! - **Structure**: do connected groups of related keywords sit as close
//!   together in the ontology as they do in the extraction graph? Each
//!   component is aligned to ontology terms and scored by the RMSD between
//!   its two pairwise distance matrices.
//! - **Significance**: does a keyword set hit the ontology more often than
//!   random draws from the same corpus would? A Monte Carlo test answers
//!   this per set, and a parallel sweep runs it over every parameter value
//!   of a keyword-selection policy.

pub mod errors;
pub mod graph;
pub mod io;
pub mod ontology;
pub mod significance;
pub mod similarity;
pub mod sweep;
pub mod types;

// Re-export commonly used types
pub use errors::{Result, ValidationError};
pub use types::{
    AnalysisConfig, Candidate, RunConfig, ScoreRecord, SignificanceConfig, SweepConfig,
    SweepPolicy, TextEncoding,
};

// Re-export main functionality
pub use graph::{connected_components, shortest_distance, Graph};
pub use ontology::{
    align, bigram_closure, expand_ontology_terms, Descriptor, Hierarchy, OntologyTerm,
    TermAlignment, TermCounts,
};
pub use significance::{evaluate, p_value, run_trials, BackgroundCorpus, EvaluationInputs};
pub use similarity::{rmsd, score_component, AnalysisSummary, ComponentAnalyzer, ComponentScore};
pub use sweep::{FrequencyTable, SweepRunner, TermStatistics};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

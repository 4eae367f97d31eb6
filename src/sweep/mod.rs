//! Parameter sweep: frequency statistics, candidate generation and the
//! parallel evaluation of every candidate.

pub mod candidates;
pub mod frequency;
pub mod runner;

pub use candidates::{candidates, ThresholdScan, TopN};
pub use frequency::{FrequencyTable, TermScore, TermStatistics};
pub use runner::{join_all, SweepRunner, TaskHandle};

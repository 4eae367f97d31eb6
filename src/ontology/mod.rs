//! Ontology side of the comparison: term alignment and the hierarchy graph.

pub mod alignment;
pub mod hierarchy;

pub use alignment::{
    align, bigram_closure, distinct_words, expand_ontology_terms, word_permutations,
    OntologyTerm, TermAlignment, DEFAULT_MAX_PERMUTATION_LEN,
};
pub use hierarchy::{Descriptor, Hierarchy, TermCounts, ONTOLOGY_ROOT};

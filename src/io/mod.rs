//! File formats: input loaders and report writers.

pub mod loaders;
pub mod report;

pub use loaders::{
    decode_latin1, format_edge_list, load_corpus, load_descriptors, load_edge_list,
    load_frequency_table, load_ontology_terms, load_term_counts, load_term_list, load_term_set,
    parse_descriptors, parse_identified_terms, parse_term_list, read_text, sections_to_edges,
    write_text,
};
pub use report::{
    format_component_report, format_informative, format_sweep_report, to_json, SWEEP_HEADER,
};

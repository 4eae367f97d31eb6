//! Readers for every input file the tool consumes

use crate::errors::{Result, ValidationError};
use crate::graph::Graph;
use crate::ontology::{Descriptor, OntologyTerm, TermCounts};
use crate::significance::BackgroundCorpus;
use crate::sweep::FrequencyTable;
use crate::types::TextEncoding;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// Raw Text
// ============================================================================

/// Read a whole file in the given encoding
pub fn read_text(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ValidationError::io(path, &e))?;
    let text = match encoding {
        TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| ValidationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?,
        TextEncoding::Latin1 => decode_latin1(&bytes),
    };
    debug!(path = %path.display(), bytes = text.len(), "input read");
    Ok(text)
}

/// ISO-8859-1 decoding: each byte is the code point of the same value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Write a text file
pub fn write_text(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, text).map_err(|e| ValidationError::io(path, &e))
}

// ============================================================================
// Graphs
// ============================================================================

/// Load a tab-separated edge list into a graph
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<Graph> {
    let text = read_text(path, TextEncoding::Utf8)?;
    Graph::from_edge_list(&text)
}

/// Edges between consecutive terms of each section.
///
/// Sections are separated by lines starting with `=` or `*`. A trailing
/// section without a closing separator is included.
pub fn sections_to_edges(text: &str) -> Vec<(String, String)> {
    fn flush(section: &mut Vec<&str>, edges: &mut Vec<(String, String)>) {
        edges.extend(
            section
                .windows(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string())),
        );
        section.clear();
    }

    let mut edges = Vec::new();
    let mut section: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.starts_with('=') || line.starts_with('*') {
            flush(&mut section, &mut edges);
        } else {
            section.push(line.trim_end_matches('\r'));
        }
    }
    flush(&mut section, &mut edges);

    edges
}

/// Render edges in edge-list format
pub fn format_edge_list(edges: &[(String, String)]) -> String {
    edges
        .iter()
        .map(|(a, b)| format!("{}\t{}\n", a, b))
        .collect()
}

// ============================================================================
// Term Lists
// ============================================================================

/// Non-blank lines, trimmed
pub fn parse_term_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `identifier,term` rows; the term keeps any further commas
pub fn parse_identified_terms(text: &str) -> Result<Vec<OntologyTerm>> {
    let mut terms = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (id, term) = line.split_once(',').ok_or_else(|| {
            ValidationError::format(idx + 1, "expected 'identifier,term'")
        })?;
        let (id, term) = (id.trim(), term.trim());
        if id.is_empty() || term.is_empty() {
            return Err(ValidationError::format(
                idx + 1,
                "identifier and term must be non-empty",
            ));
        }
        terms.push(OntologyTerm::new(id, term));
    }
    Ok(terms)
}

/// Load ontology terms, either bare or as `identifier,term` rows
pub fn load_ontology_terms(
    path: impl AsRef<Path>,
    encoding: TextEncoding,
    identified: bool,
) -> Result<Vec<OntologyTerm>> {
    let text = read_text(path, encoding)?;
    if identified {
        parse_identified_terms(&text)
    } else {
        Ok(parse_term_list(&text)
            .into_iter()
            .map(OntologyTerm::bare)
            .collect())
    }
}

/// Load a newline-delimited list, keeping order and repeats
pub fn load_term_list(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<Vec<String>> {
    Ok(parse_term_list(&read_text(path, encoding)?))
}

/// Load a newline-delimited list as a set
pub fn load_term_set(
    path: impl AsRef<Path>,
    encoding: TextEncoding,
) -> Result<FxHashSet<String>> {
    Ok(load_term_list(path, encoding)?.into_iter().collect())
}

/// Load the background corpus
pub fn load_corpus(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<BackgroundCorpus> {
    Ok(BackgroundCorpus::new(load_term_list(path, encoding)?))
}

// ============================================================================
// Descriptors & Counts
// ============================================================================

/// `identifier\tname\tgraph_positions` rows; positions may be absent
pub fn parse_descriptors(text: &str) -> Result<Vec<Descriptor>> {
    let mut descriptors = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t').map(str::trim);
        let id = fields.next().unwrap_or_default();
        let name = fields.next().ok_or_else(|| {
            ValidationError::format(idx + 1, "expected 'identifier<TAB>name<TAB>positions'")
        })?;
        if id.is_empty() {
            return Err(ValidationError::format(idx + 1, "empty identifier"));
        }
        let positions = fields.next().unwrap_or_default();
        descriptors.push(Descriptor::new(id, name, positions));
    }
    Ok(descriptors)
}

/// Load descriptors from a tab-separated file
pub fn load_descriptors(path: impl AsRef<Path>) -> Result<Vec<Descriptor>> {
    parse_descriptors(&read_text(path, TextEncoding::Utf8)?)
}

/// Count identifier occurrences in a document-rows file
pub fn load_term_counts<S: AsRef<str>>(
    path: impl AsRef<Path>,
    known: impl IntoIterator<Item = S>,
) -> Result<TermCounts> {
    let text = read_text(path, TextEncoding::Utf8)?;
    Ok(TermCounts::from_document_rows(known, &text))
}

/// Load a frequency table with its header line
pub fn load_frequency_table(path: impl AsRef<Path>) -> Result<FrequencyTable> {
    FrequencyTable::parse(&read_text(path, TextEncoding::Utf8)?)
}

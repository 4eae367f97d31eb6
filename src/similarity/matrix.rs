//! Paired distance matrices and their RMSD
//!
//! Both matrices are flat row-major sequences over the same aligned-term
//! order, self-pairs included, so entry `i` of one is always comparable to
//! entry `i` of the other.

use crate::errors::{Result, ValidationError};
use crate::graph::{shortest_distance, Graph};
use crate::ontology::TermAlignment;
use serde::Serialize;

/// Extraction-side and ontology-side distances over one aligned term set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrices {
    /// Aligned terms, in matrix index order
    pub terms: Vec<String>,
    /// Ontology identifier of each aligned term
    pub ids: Vec<String>,
    /// Distances inside the extraction component
    pub extraction: Vec<usize>,
    /// Distances inside the ontology graph
    pub ontology: Vec<usize>,
}

impl DistanceMatrices {
    /// Side length of the square matrices
    pub fn side(&self) -> usize {
        self.terms.len()
    }

    /// RMSD between the two matrices
    pub fn rmsd(&self) -> Result<f64> {
        rmsd(&self.extraction, &self.ontology)
    }

    /// Every ordered pair with its two distances, in matrix order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, usize, usize)> + '_ {
        let n = self.side();
        (0..n * n).map(move |k| {
            (
                self.terms[k / n].as_str(),
                self.terms[k % n].as_str(),
                self.extraction[k],
                self.ontology[k],
            )
        })
    }
}

/// Build the paired distance matrices for one component.
///
/// For every ordered pair `(t0, t1)` of `aligned_terms` (self-pairs
/// included) the extraction distance is measured in `component` and the
/// ontology distance between the terms' identifiers in `ontology_graph`.
/// Terms without an identifier stand for themselves.
pub fn score_component(
    component: &Graph,
    ontology_graph: &Graph,
    aligned_terms: &[String],
    alignment: &TermAlignment,
) -> Result<DistanceMatrices> {
    let ids: Vec<String> = aligned_terms
        .iter()
        .map(|t| alignment.id_of(t).unwrap_or(t.as_str()).to_string())
        .collect();

    let n = aligned_terms.len();
    let mut extraction = Vec::with_capacity(n * n);
    let mut ontology = Vec::with_capacity(n * n);

    for (t0, id0) in aligned_terms.iter().zip(&ids) {
        for (t1, id1) in aligned_terms.iter().zip(&ids) {
            extraction.push(shortest_distance(component, t0, t1)?);
            ontology.push(shortest_distance(ontology_graph, id0, id1)?);
        }
    }

    Ok(DistanceMatrices {
        terms: aligned_terms.to_vec(),
        ids,
        extraction,
        ontology,
    })
}

/// Root-mean-square deviation between two square pairwise distance matrices.
///
/// The squared differences are halved (each unordered pair appears twice)
/// and averaged over the `len - n` off-diagonal entries.
pub fn rmsd(matrix_a: &[usize], matrix_b: &[usize]) -> Result<f64> {
    if matrix_a.len() != matrix_b.len() {
        return Err(ValidationError::dimension_mismatch(
            matrix_a.len(),
            matrix_b.len(),
        ));
    }

    let len = matrix_a.len();
    let n = (len as f64).sqrt().round() as usize;
    if n * n != len || len == n {
        return Err(ValidationError::DegenerateMatrix { len });
    }

    let sum_sq: f64 = matrix_a
        .iter()
        .zip(matrix_b)
        .map(|(&a, &b)| {
            let diff = a as f64 - b as f64;
            diff * diff
        })
        .sum();

    Ok((sum_sq / 2.0 / (len - n) as f64).sqrt())
}

//! Component-level structural comparison against the ontology
//!
//! Each connected component of the extraction graph is aligned to the
//! ontology, scored with paired distance matrices, and accepted as a
//! structural match when its RMSD stays under the configured tolerance.

use crate::errors::Result;
use crate::graph::{connected_components, Graph};
use crate::ontology::{align, TermAlignment};
use crate::similarity::matrix::{score_component, DistanceMatrices};
use crate::types::AnalysisConfig;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, info};

/// Scoring outcome for one component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentScore {
    /// Discovery index of the component
    pub index: usize,
    /// Nodes in the component
    pub node_count: usize,
    pub matrices: DistanceMatrices,
    pub rmsd: f64,
    /// RMSD below tolerance
    pub accepted: bool,
}

impl ComponentScore {
    /// Aligned terms, in matrix order
    pub fn terms(&self) -> &[String] {
        &self.matrices.terms
    }

    /// Distinct ontology identifiers covered by the component
    pub fn distinct_ids(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.matrices
            .ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Result of analysing every component of an extraction graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisSummary {
    /// Components found in the extraction graph
    pub total_components: usize,
    /// Components with more than one term or permutation match
    pub multi_match_components: usize,
    /// Largest match count in any component
    pub max_match: usize,
    /// Discovery index of the component with `max_match`
    pub max_match_component: Option<usize>,
    /// Components that reached scoring, in discovery order
    pub scored: Vec<ComponentScore>,
}

impl AnalysisSummary {
    /// Scored components accepted as structural matches
    pub fn accepted(&self) -> impl Iterator<Item = &ComponentScore> {
        self.scored.iter().filter(|s| s.accepted)
    }
}

/// Compares extraction components to the ontology graph
#[derive(Debug)]
pub struct ComponentAnalyzer<'a> {
    config: AnalysisConfig,
    alignment: &'a TermAlignment,
    ontology_graph: &'a Graph,
}

impl<'a> ComponentAnalyzer<'a> {
    /// Create an analyzer over a prepared alignment set and ontology graph
    pub fn new(config: AnalysisConfig, alignment: &'a TermAlignment, ontology_graph: &'a Graph) -> Self {
        Self {
            config,
            alignment,
            ontology_graph,
        }
    }

    /// Split `extraction_graph` into components and score each one.
    ///
    /// Components are scored in parallel; any scoring error aborts the run.
    pub fn analyze(&self, extraction_graph: &Graph) -> Result<AnalysisSummary> {
        let _span = tracing::info_span!("component_analysis").entered();

        let components = connected_components(extraction_graph);
        info!(
            nodes = extraction_graph.node_count(),
            components = components.len(),
            "extraction graph split into components"
        );

        let mut summary = AnalysisSummary {
            total_components: components.len(),
            ..Default::default()
        };

        for (index, component) in components.iter().enumerate() {
            let matches = self.alignment.match_count(component.labels());
            if matches > 1 {
                summary.multi_match_components += 1;
                if matches > summary.max_match {
                    summary.max_match = matches;
                    summary.max_match_component = Some(index);
                }
            }
        }

        let scored: Vec<Option<ComponentScore>> = components
            .par_iter()
            .enumerate()
            .map(|(index, component)| self.score(index, component))
            .collect::<Result<_>>()?;
        summary.scored = scored.into_iter().flatten().collect();

        info!(
            multi_match = summary.multi_match_components,
            max_match = summary.max_match,
            scored = summary.scored.len(),
            accepted = summary.accepted().count(),
            "component analysis finished"
        );

        Ok(summary)
    }

    /// Score one component, or `None` when it carries no signal.
    ///
    /// Aligned terms whose identifier is missing from the ontology graph, or
    /// present only as an isolated node, are dropped. A component needs at
    /// least two aligned terms covering at least two distinct identifiers to
    /// be scored.
    pub fn score(&self, index: usize, component: &Graph) -> Result<Option<ComponentScore>> {
        let aligned: Vec<String> = align(component.labels(), self.alignment)
            .into_iter()
            .filter(|term| {
                let id = self.alignment.id_of(term).unwrap_or(term.as_str());
                let linked = self
                    .ontology_graph
                    .get_node_id(id)
                    .is_some_and(|node| !self.ontology_graph.neighbors(node).is_empty());
                if !linked {
                    debug!(component = index, term = %term, id, "aligned term has no linked ontology node");
                }
                linked
            })
            .collect();

        if aligned.len() < 2 {
            return Ok(None);
        }

        let distinct_ids: FxHashSet<&str> = aligned
            .iter()
            .map(|t| self.alignment.id_of(t).unwrap_or(t.as_str()))
            .collect();
        if distinct_ids.len() < 2 {
            debug!(component = index, "aligned terms collapse to a single identifier");
            return Ok(None);
        }

        let matrices = score_component(component, self.ontology_graph, &aligned, self.alignment)?;
        let rmsd = matrices.rmsd()?;
        let accepted = rmsd < self.config.rmsd_tolerance;
        debug!(component = index, terms = aligned.len(), rmsd, accepted, "component scored");

        Ok(Some(ComponentScore {
            index,
            node_count: component.node_count(),
            matrices,
            rmsd,
            accepted,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{expand_ontology_terms, Descriptor, Hierarchy, OntologyTerm};

    fn ontology() -> (TermAlignment, Graph) {
        let terms = vec![
            OntologyTerm::new("X", "heart"),
            OntologyTerm::new("Y", "heart disease"),
            OntologyTerm::new("Z", "heart failure"),
            OntologyTerm::new("W", "tumor"),
        ];
        let graph = Graph::from_edges([("X", "Y"), ("Y", "Z"), ("X", "W")]);
        (expand_ontology_terms(&terms), graph)
    }

    #[test]
    fn test_matching_chain_is_accepted() {
        let (alignment, graph) = ontology();
        let extraction = Graph::from_edges([
            ("heart", "disease heart"),
            ("disease heart", "heart failure"),
            ("gene", "protein"),
        ]);

        let analyzer = ComponentAnalyzer::new(AnalysisConfig::default(), &alignment, &graph);
        let summary = analyzer.analyze(&extraction).unwrap();

        assert_eq!(summary.total_components, 2);
        assert_eq!(summary.multi_match_components, 1);
        assert_eq!(summary.scored.len(), 1);

        let score = &summary.scored[0];
        assert_eq!(score.rmsd, 0.0);
        assert!(score.accepted);
        assert_eq!(score.distinct_ids(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_far_apart_terms_rejected_with_low_tolerance() {
        let (alignment, graph) = ontology();
        // Adjacent in extraction, three levels apart in the ontology
        let extraction = Graph::from_edges([("tumor", "failure heart")]);

        let config = AnalysisConfig::default().with_rmsd_tolerance(1.0);
        let analyzer = ComponentAnalyzer::new(config, &alignment, &graph);
        let summary = analyzer.analyze(&extraction).unwrap();

        // One pair off by 2 levels: sqrt((2² + 2²) / 2 / 2)
        let score = &summary.scored[0];
        assert!((score.rmsd - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(!score.accepted);
        assert_eq!(summary.accepted().count(), 0);
    }

    #[test]
    fn test_single_alias_component_skipped() {
        let (alignment, graph) = ontology();
        let extraction = Graph::from_edges([("heart disease", "disease heart")]);

        let analyzer = ComponentAnalyzer::new(AnalysisConfig::default(), &alignment, &graph);
        let summary = analyzer.analyze(&extraction).unwrap();

        assert_eq!(summary.multi_match_components, 1);
        assert!(summary.scored.is_empty());
    }

    #[test]
    fn test_terms_without_ontology_node_dropped() {
        let terms = vec![OntologyTerm::bare("heart"), OntologyTerm::bare("orphan")];
        let alignment = expand_ontology_terms(&terms);
        let graph = Graph::from_edges([("heart", "lung")]);
        let extraction = Graph::from_edges([("heart", "orphan")]);

        let analyzer = ComponentAnalyzer::new(AnalysisConfig::default(), &alignment, &graph);
        let component = &connected_components(&extraction)[0];
        assert!(analyzer.score(0, component).unwrap().is_none());
    }

    #[test]
    fn test_isolated_ontology_node_dropped() {
        let terms = vec![
            OntologyTerm::new("D1", "heart diseases"),
            OntologyTerm::new("D2", "heart failure"),
            OntologyTerm::new("D3", "female"),
        ];
        let alignment = expand_ontology_terms(&terms);
        let mut graph = Graph::from_edges([("__root__", "D1"), ("D1", "D2")]);
        graph.get_or_create_node("D3");
        let extraction = Graph::from_edges([
            ("heart diseases", "heart failure"),
            ("heart failure", "female"),
        ]);

        let analyzer = ComponentAnalyzer::new(AnalysisConfig::default(), &alignment, &graph);
        let summary = analyzer.analyze(&extraction).unwrap();

        assert_eq!(summary.scored.len(), 1);
        let score = &summary.scored[0];
        assert_eq!(score.distinct_ids(), vec!["D1", "D2"]);
        assert_eq!(score.rmsd, 0.0);
    }

    #[test]
    fn test_descriptor_without_position_does_not_abort_analysis() {
        let hierarchy = Hierarchy::new(vec![
            Descriptor::new("D1", "Heart Diseases", "C14.280"),
            Descriptor::new("D2", "Heart Failure", "C14.280.434"),
            Descriptor::new("D3", "Female", ""),
        ]);
        let terms: Vec<OntologyTerm> = hierarchy
            .descriptors()
            .iter()
            .map(|d| OntologyTerm::new(d.id.clone(), d.name.to_lowercase()))
            .collect();
        let alignment = expand_ontology_terms(&terms);
        let graph = hierarchy.ontology_graph();
        let extraction = Graph::from_edges([
            ("heart diseases", "heart failure"),
            ("heart failure", "female"),
        ]);

        let analyzer = ComponentAnalyzer::new(AnalysisConfig::default(), &alignment, &graph);
        let summary = analyzer.analyze(&extraction).unwrap();

        assert_eq!(summary.scored.len(), 1);
        assert_eq!(summary.scored[0].distinct_ids(), vec!["D1", "D2"]);
        assert!(summary.scored[0].accepted);
    }
}

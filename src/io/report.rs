//! Tabular and JSON reports

use crate::errors::Result;
use crate::ontology::Hierarchy;
use crate::similarity::{AnalysisSummary, ComponentScore};
use crate::types::ScoreRecord;
use serde::Serialize;
use std::fmt::Write;

/// Header row of the sweep report
pub const SWEEP_HEADER: &str =
    "threshold\tpval\tresult_intersect_len\tresult_len\trand_inter_mean_len\trand_inter_max";

/// One row per record, in the given order
pub fn format_sweep_report(records: &[ScoreRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(SWEEP_HEADER);
    out.push('\n');
    for r in records {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.threshold, r.p_value, r.observed_overlap, r.candidate_size, r.random_mean, r.random_max
        );
    }
    out
}

/// Display name of an ontology identifier, falling back to the identifier
fn display_name<'a>(id: &'a str, hierarchy: Option<&'a Hierarchy>) -> &'a str {
    hierarchy.and_then(|h| h.name_of(id)).unwrap_or(id)
}

fn format_component(out: &mut String, score: &ComponentScore, hierarchy: Option<&Hierarchy>) {
    let _ = writeln!(
        out,
        "# component {}\tnodes {}\trmsd {:.4}",
        score.index, score.node_count, score.rmsd
    );
    let _ = writeln!(out, "terms\t{}", score.terms().join("\t"));

    let names: Vec<&str> = score
        .distinct_ids()
        .into_iter()
        .map(|id| display_name(id, hierarchy))
        .collect();
    let _ = writeln!(out, "ontology\t{}", names.join("\t"));

    for (t0, t1, extraction, ontology) in score.matrices.pairs() {
        if t0 != t1 {
            let _ = writeln!(out, "{}\t{}\t{}\t{}", t0, t1, extraction, ontology);
        }
    }
}

/// Accepted components with their terms, ontology names and pairwise
/// distances (extraction, then ontology)
pub fn format_component_report(summary: &AnalysisSummary, hierarchy: Option<&Hierarchy>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# components {}\tmulti_match {}\tmax_match {}\taccepted {}",
        summary.total_components,
        summary.multi_match_components,
        summary.max_match,
        summary.accepted().count()
    );
    for score in summary.accepted() {
        out.push('\n');
        format_component(&mut out, score, hierarchy);
    }
    out
}

/// Informative identifiers with their names, one per line
pub fn format_informative(ids: &[&str], hierarchy: &Hierarchy) -> String {
    ids.iter()
        .map(|id| format!("{}\t{}\n", id, display_name(id, Some(hierarchy))))
        .collect()
}

/// Pretty-printed JSON for any report value
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

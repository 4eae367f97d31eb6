//! Term alignment between extracted phrases and ontology terms
//!
//! Extracted terms are often reordered or partial renderings of multi-word
//! ontology concepts ("disease heart" for "heart disease"). Every multi-word
//! ontology term is therefore expanded into all orderings of 2 to 4 of its
//! distinct words, and each ordering maps back to the identifier of the term
//! it came from. When two terms produce the same ordering, the later term's
//! identifier wins.

use rustc_hash::{FxHashMap, FxHashSet};

/// Longest word permutation generated by [`expand_ontology_terms`]
pub const DEFAULT_MAX_PERMUTATION_LEN: usize = 4;

/// An ontology term with its canonical identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyTerm {
    pub id: String,
    pub term: String,
}

impl OntologyTerm {
    /// Create a new term
    pub fn new(id: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
        }
    }

    /// A term that serves as its own identifier
    pub fn bare(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            id: term.clone(),
            term,
        }
    }
}

/// The set of alignable strings built from an ontology term list
#[derive(Debug, Clone, Default)]
pub struct TermAlignment {
    /// Ontology terms exactly as listed
    terms: FxHashSet<String>,
    /// Word permutations of multi-word terms
    permuted: FxHashSet<String>,
    /// Alignable string -> canonical identifier
    term_to_id: FxHashMap<String, String>,
}

impl TermAlignment {
    /// Build the alignment set, permuting up to `max_len` words
    pub fn with_max_len(terms: &[OntologyTerm], max_len: usize) -> Self {
        let mut alignment = Self::default();

        for entry in terms {
            alignment.terms.insert(entry.term.clone());
            alignment
                .term_to_id
                .insert(entry.term.clone(), entry.id.clone());

            let words = distinct_words(&entry.term);
            if words.len() < 2 {
                continue;
            }
            for k in 2..=max_len.min(words.len()) {
                for permutation in word_permutations(&words, k) {
                    alignment
                        .term_to_id
                        .insert(permutation.clone(), entry.id.clone());
                    alignment.permuted.insert(permutation);
                }
            }
        }

        alignment
    }

    /// Check if a string matches a listed term or one of its permutations
    pub fn contains(&self, text: &str) -> bool {
        self.terms.contains(text) || self.permuted.contains(text)
    }

    /// Check if a string is a listed term
    pub fn contains_term(&self, text: &str) -> bool {
        self.terms.contains(text)
    }

    /// Check if a string is a generated permutation
    pub fn contains_permutation(&self, text: &str) -> bool {
        self.permuted.contains(text)
    }

    /// Canonical identifier for an alignable string
    pub fn id_of(&self, text: &str) -> Option<&str> {
        self.term_to_id.get(text).map(String::as_str)
    }

    /// Number of listed terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of generated permutations
    pub fn permutation_count(&self) -> usize {
        self.permuted.len()
    }

    /// Listed-term matches plus permutation matches among `nodes`.
    ///
    /// A node that is both a listed term and a permutation counts twice.
    pub fn match_count<'a>(&self, nodes: impl IntoIterator<Item = &'a str>) -> usize {
        nodes
            .into_iter()
            .map(|n| usize::from(self.terms.contains(n)) + usize::from(self.permuted.contains(n)))
            .sum()
    }
}

/// Expand ontology terms into the alignment set with permutations of
/// length 2, 3 and 4.
pub fn expand_ontology_terms(terms: &[OntologyTerm]) -> TermAlignment {
    TermAlignment::with_max_len(terms, DEFAULT_MAX_PERMUTATION_LEN)
}

/// Component nodes that appear in the alignment set.
///
/// Keeps the component's order and drops repeats.
pub fn align<'a>(
    component_nodes: impl IntoIterator<Item = &'a str>,
    alignment: &TermAlignment,
) -> Vec<String> {
    let mut seen = FxHashSet::default();
    component_nodes
        .into_iter()
        .filter(|node| alignment.contains(node) && seen.insert(*node))
        .map(str::to_string)
        .collect()
}

/// Two-word orderings of every multi-word reference term.
///
/// Single-word terms contribute nothing, and the listed terms themselves
/// are not carried over.
pub fn bigram_closure<S: AsRef<str>>(reference: impl IntoIterator<Item = S>) -> FxHashSet<String> {
    let mut closure = FxHashSet::default();
    for term in reference {
        let words = distinct_words(term.as_ref());
        if words.len() > 1 {
            closure.extend(word_permutations(&words, 2));
        }
    }
    closure
}

/// Whitespace-split words with repeats removed, first occurrence kept
pub fn distinct_words(text: &str) -> Vec<&str> {
    let mut seen = FxHashSet::default();
    text.split_whitespace().filter(|w| seen.insert(*w)).collect()
}

/// All ordered selections of `k` distinct positions from `words`, joined
/// by single spaces, in lexicographic index order.
pub fn word_permutations(words: &[&str], k: usize) -> Vec<String> {
    let mut out = Vec::new();
    if k == 0 || k > words.len() {
        return out;
    }

    let mut used = vec![false; words.len()];
    let mut current = Vec::with_capacity(k);
    permute(words, k, &mut used, &mut current, &mut out);
    out
}

fn permute<'a>(
    words: &[&'a str],
    k: usize,
    used: &mut [bool],
    current: &mut Vec<&'a str>,
    out: &mut Vec<String>,
) {
    if current.len() == k {
        out.push(current.join(" "));
        return;
    }
    for i in 0..words.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(words[i]);
        permute(words, k, used, current, out);
        current.pop();
        used[i] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_permutations_counts() {
        let words = ["a", "b", "c", "d"];
        assert_eq!(word_permutations(&words, 2).len(), 12);
        assert_eq!(word_permutations(&words, 3).len(), 24);
        assert_eq!(word_permutations(&words, 4).len(), 24);
        assert!(word_permutations(&words, 5).is_empty());
        assert_eq!(word_permutations(&["x", "y"], 2), vec!["x y", "y x"]);
    }

    #[test]
    fn test_distinct_words_keeps_first() {
        assert_eq!(distinct_words("cell  cell wall cell"), vec!["cell", "wall"]);
    }

    #[test]
    fn test_expand_heart_disease() {
        let terms = vec![OntologyTerm::new("D006331", "heart disease")];
        let alignment = expand_ontology_terms(&terms);

        assert!(alignment.contains("disease heart"));
        assert_eq!(alignment.id_of("disease heart"), Some("D006331"));
        assert_eq!(alignment.id_of("heart disease"), Some("D006331"));
        assert!(alignment.contains_term("heart disease"));
        assert!(!alignment.contains_term("disease heart"));
    }

    #[test]
    fn test_expand_caps_at_four_words() {
        let terms = vec![OntologyTerm::bare("a b c d e")];
        let alignment = expand_ontology_terms(&terms);

        // 5P2 + 5P3 + 5P4 = 20 + 60 + 120
        assert_eq!(alignment.permutation_count(), 200);
        assert!(alignment.contains("e d c b"));
        assert!(!alignment.contains("e d c b a"));
    }

    #[test]
    fn test_repeated_words_not_expanded() {
        let terms = vec![OntologyTerm::bare("cell cell")];
        let alignment = expand_ontology_terms(&terms);

        assert_eq!(alignment.permutation_count(), 0);
        assert!(alignment.contains("cell cell"));
    }

    #[test]
    fn test_later_term_wins_collision() {
        let terms = vec![
            OntologyTerm::new("X1", "blood cell count"),
            OntologyTerm::new("X2", "cell blood"),
        ];
        let alignment = expand_ontology_terms(&terms);

        assert_eq!(alignment.id_of("cell blood"), Some("X2"));
        assert_eq!(alignment.id_of("blood cell"), Some("X2"));
        assert_eq!(alignment.id_of("count cell blood"), Some("X1"));
    }

    #[test]
    fn test_align_keeps_component_order() {
        let terms = vec![
            OntologyTerm::bare("heart"),
            OntologyTerm::bare("lung cancer"),
        ];
        let alignment = expand_ontology_terms(&terms);
        let nodes = ["protein", "cancer lung", "heart", "cancer lung", "gene"];

        assert_eq!(align(nodes, &alignment), vec!["cancer lung", "heart"]);
    }

    #[test]
    fn test_match_count_counts_both_sets() {
        let terms = vec![OntologyTerm::bare("a b"), OntologyTerm::bare("b a")];
        let alignment = expand_ontology_terms(&terms);

        assert_eq!(alignment.match_count(["a b", "z"]), 2);
    }

    #[test]
    fn test_bigram_closure() {
        let closure = bigram_closure(["renal cell carcinoma", "kidney"]);

        assert_eq!(closure.len(), 6);
        assert!(closure.contains("carcinoma renal"));
        assert!(!closure.contains("kidney"));
        assert!(!closure.contains("renal cell carcinoma"));
    }
}

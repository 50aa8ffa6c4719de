//! Matrix building: two-mode accumulation and one-mode projection.
//!
//! Consumes filtered statements plus the label sets from the extractor and
//! produces a weighted [`Matrix`] under a qualifier-aggregation and
//! normalization scheme.
//!
//! ## Aggregation
//!
//! | Mode | Two-mode cell | One-mode cell (per shared value) |
//! |------|---------------|----------------------------------|
//! | `Ignore` | statement count | +1 co-occurrence |
//! | `Combine` | nominal combination code | — |
//! | `Subtract` | signed count / qualifier sum | congruence - conflict |
//! | `Congruence` | — | qualifier proximity |
//! | `Conflict` | — | qualifier distance |
//!
//! Division by zero anywhere (isolated node, empty row) yields weight 0.0,
//! never NaN and never an error.

use hashbrown::HashMap;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::filter::value_of;
use crate::model::{Document, DocumentId, Matrix, Statement, VariableValue};
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Which kind of network the builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkMode {
    /// Rows and columns index the same node set (var1 × var1 via var2).
    OneMode,
    /// Rows index var1, columns index var2.
    #[default]
    TwoMode,
    /// No matrix; filtered statements are exported as rows.
    EventList,
}

/// How qualifier values fold into edge weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualifierAggregation {
    /// Qualifier disregarded; plain counts.
    #[default]
    Ignore,
    /// Two-mode only: cell holds a nominal code for the *combination* of
    /// qualifier values observed, not a count.
    Combine,
    /// Two-mode: positive minus negative counts (integer qualifiers sum
    /// their signed values). One-mode: congruence minus conflict, two
    /// passes subtracted after normalization.
    Subtract,
    /// One-mode only: qualifier agreement per shared second-variable value.
    Congruence,
    /// One-mode only: qualifier disagreement per shared value.
    Conflict,
}

/// Weight rescaling applied after aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    #[default]
    None,
    /// Two-mode: divide each cell by the row entity's statement activity.
    Activity,
    /// Two-mode: divide each cell by the column entity's statement activity.
    Prominence,
    /// One-mode: divide by the mean incident activity, then rescale the
    /// whole matrix into [0, 1].
    AverageActivity,
    /// One-mode: co-occurrence / (activity_i + activity_k - co-occurrence).
    Jaccard,
    /// One-mode: weight / sqrt(activity_i × activity_k).
    Cosine,
}

/// Inputs shared by both construction modes. Borrowed: the builder never
/// mutates statements or documents.
pub struct MatrixBuilder<'a> {
    pub statements: &'a [Statement],
    pub documents: &'a HashMap<DocumentId, Document>,
    pub variable1: &'a str,
    pub variable1_document_field: bool,
    pub variable2: &'a str,
    pub variable2_document_field: bool,
    pub qualifier: Option<&'a str>,
    pub qualifier_document_field: bool,
    pub aggregation: QualifierAggregation,
    pub normalization: Normalization,
}

// ============================================================================
// Shared accumulation
// ============================================================================

/// One statement resolved against the label indices.
struct Incidence {
    row: usize,
    col: usize,
    /// Qualifier level if present (bools map to 0/1).
    level: Option<i64>,
}

impl<'a> MatrixBuilder<'a> {
    /// Resolve statements to `(row, col, level)` triples; statements whose
    /// values fall outside the label sets are skipped (can happen when the
    /// caller narrows the labels after filtering).
    fn incidences(&self, rows: &[String], cols: &[String]) -> Vec<Incidence> {
        let row_idx: HashMap<&str, usize> =
            rows.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
        let col_idx: HashMap<&str, usize> =
            cols.iter().enumerate().map(|(j, l)| (l.as_str(), j)).collect();

        self.statements
            .iter()
            .filter_map(|s| {
                let v1 = value_of(s, self.documents, self.variable1, self.variable1_document_field)?;
                let v2 = value_of(s, self.documents, self.variable2, self.variable2_document_field)?;
                let row = *row_idx.get(v1.as_str())?;
                let col = *col_idx.get(v2.as_str())?;
                let level = self
                    .qualifier
                    .and_then(|q| s.value(q))
                    .and_then(VariableValue::qualifier_level);
                Some(Incidence { row, col, level })
            })
            .collect()
    }

    /// True when the qualifier variable is boolean in the data. Mixed or
    /// absent qualifiers are treated as integer scales.
    fn qualifier_is_binary(&self) -> bool {
        let Some(q) = self.qualifier else { return false };
        let mut saw_bool = false;
        for s in self.statements {
            match s.value(q) {
                Some(VariableValue::Bool(_)) => saw_bool = true,
                Some(VariableValue::Int(_)) => return false,
                _ => {}
            }
        }
        saw_bool
    }

    /// Statement activity per label (count of statements carrying the label
    /// on `variable`). Used by normalization and by the GraphML exporter.
    pub fn activity(&self, labels: &[String], variable: &str, document_field: bool) -> Vec<usize> {
        let idx: HashMap<&str, usize> =
            labels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
        let mut counts = vec![0usize; labels.len()];
        for s in self.statements {
            if let Some(v) = value_of(s, self.documents, variable, document_field) {
                if let Some(&i) = idx.get(v.as_str()) {
                    counts[i] += 1;
                }
            }
        }
        counts
    }

    // ========================================================================
    // Two-mode construction
    // ========================================================================

    /// Build the two-mode matrix (rows = var1, cols = var2).
    pub fn two_mode(&self, row_labels: Vec<String>, col_labels: Vec<String>) -> Result<Matrix> {
        let incidences = self.incidences(&row_labels, &col_labels);
        let (nr, nc) = (row_labels.len(), col_labels.len());
        let mut weights = Array2::<f64>::zeros((nr, nc));

        match self.aggregation {
            QualifierAggregation::Ignore => {
                for inc in &incidences {
                    weights[[inc.row, inc.col]] += 1.0;
                }
            }
            QualifierAggregation::Subtract => {
                let binary = self.qualifier_is_binary();
                for inc in &incidences {
                    let Some(level) = inc.level else { continue };
                    let delta = if binary {
                        if level > 0 { 1.0 } else { -1.0 }
                    } else {
                        level as f64
                    };
                    weights[[inc.row, inc.col]] += delta;
                }
            }
            QualifierAggregation::Combine => {
                weights = combine_codes(&incidences, nr, nc);
            }
            QualifierAggregation::Congruence | QualifierAggregation::Conflict => {
                return Err(Error::InvalidSpec(format!(
                    "{:?} aggregation is one-mode only",
                    self.aggregation
                )));
            }
        }

        if self.aggregation != QualifierAggregation::Combine {
            self.normalize_two_mode(&mut weights, &row_labels, &col_labels)?;
        }

        debug!(rows = nr, cols = nc, "two-mode matrix built");
        Ok(Matrix { row_labels, col_labels, weights, one_mode: false, symmetric: false })
    }

    fn normalize_two_mode(
        &self,
        weights: &mut Array2<f64>,
        rows: &[String],
        cols: &[String],
    ) -> Result<()> {
        match self.normalization {
            Normalization::None => Ok(()),
            Normalization::Activity => {
                let act = self.activity(rows, self.variable1, self.variable1_document_field);
                for ((i, _), w) in weights.indexed_iter_mut() {
                    *w = safe_div(*w, act[i] as f64);
                }
                Ok(())
            }
            Normalization::Prominence => {
                let act = self.activity(cols, self.variable2, self.variable2_document_field);
                for ((_, j), w) in weights.indexed_iter_mut() {
                    *w = safe_div(*w, act[j] as f64);
                }
                Ok(())
            }
            other => Err(Error::InvalidSpec(format!(
                "{other:?} normalization is one-mode only"
            ))),
        }
    }

    // ========================================================================
    // One-mode projection
    // ========================================================================

    /// Project var1 × var1 through the shared second variable. Output is
    /// symmetric with a zero diagonal for every aggregation mode.
    pub fn one_mode(&self, node_labels: Vec<String>, via_labels: &[String]) -> Result<Matrix> {
        if matches!(self.aggregation, QualifierAggregation::Combine) {
            return Err(Error::InvalidSpec(
                "combine aggregation is two-mode only".into(),
            ));
        }

        let incidences = self.incidences(&node_labels, via_labels);
        let n = node_labels.len();
        let binary = self.qualifier_is_binary();

        // Per node: which second-variable values it touches, and at which
        // qualifier levels. BTree containers keep accumulation deterministic.
        let mut presence: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        let mut levels: Vec<BTreeMap<usize, BTreeSet<i64>>> = vec![BTreeMap::new(); n];
        for inc in &incidences {
            presence[inc.row].insert(inc.col);
            if let Some(level) = inc.level {
                levels[inc.row].entry(inc.col).or_default().insert(level);
            }
        }

        let mut weights = match self.aggregation {
            QualifierAggregation::Subtract => {
                // Two independent passes, each normalized before subtraction.
                let mut congruent =
                    self.one_mode_pass(&presence, &levels, binary, PairScore::Congruence);
                let mut conflicting =
                    self.one_mode_pass(&presence, &levels, binary, PairScore::Conflict);
                self.normalize_one_mode(&mut congruent, &presence);
                self.normalize_one_mode(&mut conflicting, &presence);
                congruent - conflicting
            }
            QualifierAggregation::Ignore => {
                let mut w = self.one_mode_pass(&presence, &levels, binary, PairScore::CoOccurrence);
                self.normalize_one_mode(&mut w, &presence);
                w
            }
            QualifierAggregation::Congruence => {
                let mut w = self.one_mode_pass(&presence, &levels, binary, PairScore::Congruence);
                self.normalize_one_mode(&mut w, &presence);
                w
            }
            QualifierAggregation::Conflict => {
                let mut w = self.one_mode_pass(&presence, &levels, binary, PairScore::Conflict);
                self.normalize_one_mode(&mut w, &presence);
                w
            }
            QualifierAggregation::Combine => unreachable!("rejected above"),
        };

        // Self-ties excluded by definition.
        for i in 0..n {
            weights[[i, i]] = 0.0;
        }

        debug!(nodes = n, "one-mode matrix built");
        Ok(Matrix {
            col_labels: node_labels.clone(),
            row_labels: node_labels,
            weights,
            one_mode: true,
            symmetric: true,
        })
    }

    /// Accumulate one symmetric scoring pass over all node pairs.
    fn one_mode_pass(
        &self,
        presence: &[BTreeSet<usize>],
        levels: &[BTreeMap<usize, BTreeSet<i64>>],
        binary: bool,
        score: PairScore,
    ) -> Array2<f64> {
        let n = presence.len();
        let mut weights = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for k in (i + 1)..n {
                let mut acc = 0.0;
                for &v in presence[i].intersection(&presence[k]) {
                    acc += match score {
                        PairScore::CoOccurrence => 1.0,
                        PairScore::Congruence | PairScore::Conflict => {
                            let qi = levels[i].get(&v);
                            let qk = levels[k].get(&v);
                            match (qi, qk) {
                                (Some(a), Some(b)) => level_score(a, b, binary, score),
                                // No qualifier on either side: nothing to
                                // agree or disagree about.
                                _ => 0.0,
                            }
                        }
                    };
                }
                weights[[i, k]] = acc;
                weights[[k, i]] = acc;
            }
        }
        weights
    }

    fn normalize_one_mode(&self, weights: &mut Array2<f64>, presence: &[BTreeSet<usize>]) {
        let n = presence.len();
        let activity: Vec<f64> = presence.iter().map(|p| p.len() as f64).collect();
        match self.normalization {
            Normalization::None => {}
            Normalization::AverageActivity => {
                for i in 0..n {
                    for k in 0..n {
                        let mean = (activity[i] + activity[k]) / 2.0;
                        weights[[i, k]] = safe_div(weights[[i, k]], mean);
                    }
                }
                // Rescale the whole matrix into [0, 1].
                let max = weights.iter().fold(0.0_f64, |m, w| m.max(w.abs()));
                if max > 0.0 {
                    weights.mapv_inplace(|w| w / max);
                }
            }
            Normalization::Jaccard => {
                for i in 0..n {
                    for k in 0..n {
                        let shared = presence[i].intersection(&presence[k]).count() as f64;
                        weights[[i, k]] =
                            safe_div(weights[[i, k]], activity[i] + activity[k] - shared);
                    }
                }
            }
            Normalization::Cosine => {
                for i in 0..n {
                    for k in 0..n {
                        weights[[i, k]] =
                            safe_div(weights[[i, k]], (activity[i] * activity[k]).sqrt());
                    }
                }
            }
            // Two-mode-only schemes leave one-mode weights unscaled; the
            // pipeline rejects these combinations before building.
            Normalization::Activity | Normalization::Prominence => {}
        }
    }
}

// ============================================================================
// Scoring helpers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairScore {
    CoOccurrence,
    Congruence,
    Conflict,
}

/// Score the qualifier-level sets of two nodes at one shared value.
///
/// Averaged over the level pairs so a single shared value never contributes
/// more than 1.0, keeping Jaccard and cosine weights inside [0, 1].
fn level_score(a: &BTreeSet<i64>, b: &BTreeSet<i64>, binary: bool, score: PairScore) -> f64 {
    let pairs = (a.len() * b.len()) as f64;
    if pairs == 0.0 {
        return 0.0;
    }
    let mut acc = 0.0;
    for &x in a {
        for &y in b {
            let delta = (x - y).abs() as f64;
            acc += match score {
                PairScore::Congruence => {
                    if binary {
                        if x == y { 1.0 } else { 0.0 }
                    } else {
                        1.0 / (1.0 + delta)
                    }
                }
                PairScore::Conflict => {
                    if binary {
                        if x == y { 0.0 } else { 1.0 }
                    } else {
                        delta
                    }
                }
                PairScore::CoOccurrence => 1.0,
            };
        }
    }
    acc / pairs
}

/// Nominal combination codes for two-mode `Combine` aggregation: 0 for empty
/// cells, otherwise the 1-based rank of the cell's distinct qualifier-level
/// set among all combinations observed in the matrix. A binary qualifier
/// yields three codes ("only 0", "only 1", "both").
fn combine_codes(incidences: &[Incidence], nr: usize, nc: usize) -> Array2<f64> {
    let mut cell_sets: BTreeMap<(usize, usize), BTreeSet<i64>> = BTreeMap::new();
    for inc in incidences {
        let set = cell_sets.entry((inc.row, inc.col)).or_default();
        if let Some(level) = inc.level {
            set.insert(level);
        }
    }

    let combinations: BTreeSet<BTreeSet<i64>> = cell_sets.values().cloned().collect();
    let rank: BTreeMap<&BTreeSet<i64>, usize> = combinations
        .iter()
        .enumerate()
        .map(|(i, c)| (c, i + 1))
        .collect();

    let mut weights = Array2::<f64>::zeros((nr, nc));
    for ((i, j), set) in &cell_sets {
        weights[[*i, *j]] = rank[set] as f64;
    }
    weights
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

// ============================================================================
// Tests
// ============================================================================

//! Result of a backbone partition run.

use serde::Serialize;
use std::collections::BTreeSet;

/// Frozen outcome of a backbone optimization run.
///
/// `backbone_set` and `redundant_set` partition `node_labels` exactly:
/// disjoint by construction, union equals the full node set. A canceled run
/// still freezes the best partition seen up to the cancellation point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneResult {
    pub node_labels: Vec<String>,
    pub backbone_set: BTreeSet<String>,
    pub redundant_set: BTreeSet<String>,
    pub penalty: f64,
    pub iterations_run: usize,
    /// Best-so-far spectral distance per iteration; non-increasing.
    pub distance_history: Vec<f64>,
    /// Spectral distance of the frozen (best) partition.
    pub spectral_distance: f64,
}

impl BackboneResult {
    /// Partition sanity: disjoint sets covering all node labels.
    pub fn is_partition(&self) -> bool {
        self.backbone_set.is_disjoint(&self.redundant_set)
            && self.backbone_set.len() + self.redundant_set.len() == self.node_labels.len()
            && self
                .node_labels
                .iter()
                .all(|l| self.backbone_set.contains(l) || self.redundant_set.contains(l))
    }
}

//! Label extraction: ordered, deduplicated node label sets.
//!
//! Labels come from the filtered statements by default. With isolates
//! enabled they instead come from the full universe, so matrix dimensions
//! stay identical across differently filtered exports (needed to merge or
//! compare time slices).

use hashbrown::HashMap;
use std::collections::BTreeSet;

use crate::filter::value_of;
use crate::model::{Document, DocumentId, Statement};

/// Distinct labels of `variable`, lexicographically sorted, empty values
/// skipped.
///
/// With `include_isolates` the scan covers `all_statements` restricted to
/// `statement_type_id` (and, for document fields, every document), not just
/// the filtered set.
#[allow(clippy::too_many_arguments)]
pub fn extract_labels(
    filtered: &[Statement],
    all_statements: &[Statement],
    documents: &HashMap<DocumentId, Document>,
    variable: &str,
    document_field: bool,
    statement_type_id: u64,
    include_isolates: bool,
) -> Vec<String> {
    let mut labels: BTreeSet<String> = BTreeSet::new();

    if include_isolates && document_field {
        labels.extend(
            documents
                .values()
                .filter_map(|d| d.field(variable))
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
        );
    } else {
        let scan: &[Statement] = if include_isolates { all_statements } else { filtered };
        labels.extend(
            scan.iter()
                .filter(|s| s.statement_type_id == statement_type_id)
                .filter_map(|s| value_of(s, documents, variable, document_field)),
        );
    }

    labels.into_iter().collect()
}

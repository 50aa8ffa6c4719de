//! Statement filtering: time range, exclusion lists, duplicate collapsing.
//!
//! The first pipeline stage. Works purely on in-memory snapshots; yields a
//! (possibly empty) statement sequence, never an error: an empty result is
//! the pipeline's job to surface as [`crate::Error::EmptyFilterResult`].

use chrono::{DateTime, Datelike, Utc};
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeSet;
use tracing::debug;

use crate::model::{Document, DocumentId, Statement};

// ============================================================================
// Configuration
// ============================================================================

/// How statements with an identical `(var1, var2, qualifier)` triple are
/// collapsed. First occurrence wins, ordered by `(time, id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Duplicates {
    /// Keep every statement.
    #[default]
    Include,
    /// Collapse within the same document.
    Document,
    /// Collapse within the same ISO calendar week.
    Week,
    /// Collapse within the same calendar month.
    Month,
    /// Collapse within the same calendar year.
    Year,
    /// Collapse across the whole filtered range.
    AcrossRange,
}

/// Per-field exclusion lists. A statement is dropped when its value on any
/// listed field matches a listed value.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSpec {
    pub authors: BTreeSet<String>,
    pub sources: BTreeSet<String>,
    pub sections: BTreeSet<String>,
    pub types: BTreeSet<String>,
    /// variable name → excluded values (short-text and qualifier variables).
    pub values: HashMap<String, BTreeSet<String>>,
}

impl ExclusionSpec {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.sources.is_empty()
            && self.sections.is_empty()
            && self.types.is_empty()
            && self.values.values().all(BTreeSet::is_empty)
    }
}

/// Full filter configuration. All knobs are explicit; there is no ambient
/// "current coder" or "active connection" anywhere in the core.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub statement_type_id: u64,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub variable1: String,
    pub variable1_document_field: bool,
    pub variable2: String,
    pub variable2_document_field: bool,
    pub qualifier: Option<String>,
    pub qualifier_document_field: bool,
    pub duplicates: Duplicates,
    pub exclusions: ExclusionSpec,
    /// Network exports drop statements missing var1/var2/qualifier values;
    /// event-list export keeps them.
    pub require_non_empty: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            statement_type_id: 0,
            start: None,
            stop: None,
            variable1: String::new(),
            variable1_document_field: false,
            variable2: String::new(),
            variable2_document_field: false,
            qualifier: None,
            qualifier_document_field: false,
            duplicates: Duplicates::Include,
            exclusions: ExclusionSpec::default(),
            require_non_empty: true,
        }
    }
}

// ============================================================================
// Value resolution
// ============================================================================

/// Resolve a variable's string value for a statement, looking at the
/// statement's own slots or at its document's metadata fields.
pub fn value_of(
    statement: &Statement,
    documents: &HashMap<DocumentId, Document>,
    variable: &str,
    document_field: bool,
) -> Option<String> {
    if document_field {
        documents
            .get(&statement.document_id)
            .and_then(|d| d.field(variable))
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    } else {
        statement.label_of(variable)
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Apply the whole filter: type, time range, exclusions, non-empty
/// requirement, duplicate collapsing. Deterministic: output order is
/// `(time, id)`.
pub fn filter(
    statements: &[Statement],
    documents: &HashMap<DocumentId, Document>,
    spec: &FilterSpec,
) -> Vec<Statement> {
    let mut kept: Vec<Statement> = statements
        .iter()
        .filter(|s| s.statement_type_id == spec.statement_type_id)
        .filter(|s| spec.start.map_or(true, |t| s.time >= t))
        .filter(|s| spec.stop.map_or(true, |t| s.time <= t))
        .filter(|s| !is_excluded(s, documents, &spec.exclusions))
        .filter(|s| !spec.require_non_empty || has_required_values(s, documents, spec))
        .cloned()
        .collect();

    kept.sort_by_key(|s| (s.time, s.id));

    let collapsed = collapse_duplicates(kept, documents, spec);
    debug!(
        statement_type_id = spec.statement_type_id,
        surviving = collapsed.len(),
        "statement filter done"
    );
    collapsed
}

fn is_excluded(
    statement: &Statement,
    documents: &HashMap<DocumentId, Document>,
    exclusions: &ExclusionSpec,
) -> bool {
    if let Some(doc) = documents.get(&statement.document_id) {
        if exclusions.authors.contains(&doc.author)
            || exclusions.sources.contains(&doc.source)
            || exclusions.sections.contains(&doc.section)
            || exclusions.types.contains(&doc.kind)
        {
            return true;
        }
    }
    statement.values.iter().any(|rv| {
        exclusions
            .values
            .get(rv.variable.as_str())
            .is_some_and(|set| set.contains(&rv.value.label()))
    })
}

fn has_required_values(
    statement: &Statement,
    documents: &HashMap<DocumentId, Document>,
    spec: &FilterSpec,
) -> bool {
    if value_of(statement, documents, &spec.variable1, spec.variable1_document_field).is_none() {
        return false;
    }
    if value_of(statement, documents, &spec.variable2, spec.variable2_document_field).is_none() {
        return false;
    }
    match &spec.qualifier {
        Some(q) => value_of(statement, documents, q, spec.qualifier_document_field).is_some(),
        None => true,
    }
}

/// Window key under which duplicate triples collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Window {
    Document(DocumentId),
    Week(i32, u32),
    Month(i32, u32),
    Year(i32),
    Range,
}

fn window_of(statement: &Statement, duplicates: Duplicates) -> Option<Window> {
    match duplicates {
        Duplicates::Include => None,
        Duplicates::Document => Some(Window::Document(statement.document_id)),
        Duplicates::Week => {
            let iso = statement.time.iso_week();
            Some(Window::Week(iso.year(), iso.week()))
        }
        Duplicates::Month => Some(Window::Month(statement.time.year(), statement.time.month())),
        Duplicates::Year => Some(Window::Year(statement.time.year())),
        Duplicates::AcrossRange => Some(Window::Range),
    }
}

fn collapse_duplicates(
    sorted: Vec<Statement>,
    documents: &HashMap<DocumentId, Document>,
    spec: &FilterSpec,
) -> Vec<Statement> {
    if spec.duplicates == Duplicates::Include {
        return sorted;
    }
    let mut seen: HashSet<(Window, String, String, String)> = HashSet::new();
    sorted
        .into_iter()
        .filter(|s| {
            let Some(window) = window_of(s, spec.duplicates) else {
                return true;
            };
            let v1 = value_of(s, documents, &spec.variable1, spec.variable1_document_field)
                .unwrap_or_default();
            let v2 = value_of(s, documents, &spec.variable2, spec.variable2_document_field)
                .unwrap_or_default();
            let q = spec
                .qualifier
                .as_ref()
                .and_then(|qv| value_of(s, documents, qv, spec.qualifier_document_field))
                .unwrap_or_default();
            seen.insert((window, v1, v2, q))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use chrono::TimeZone;
    use smallvec::smallvec;

    fn entity(label: &str) -> VariableValue {
        VariableValue::Entity(EntityRef {
            id: EntityId(0),
            label: label.into(),
            color: "#cccccc".into(),
        })
    }

    fn stmt(id: u64, doc: u64, day: u32, v1: &str, v2: &str, q: bool) -> Statement {
        stmt_at(id, doc, 2009, 7, day, v1, v2, q)
    }

    fn stmt_at(
        id: u64,
        doc: u64,
        year: i32,
        month: u32,
        day: u32,
        v1: &str,
        v2: &str,
        q: bool,
    ) -> Statement {
        Statement {
            id: StatementId(id),
            statement_type_id: 1,
            document_id: DocumentId(doc),
            time: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
            coder_id: CoderId(1),
            values: smallvec![
                RoleValue { variable: "person".into(), value: entity(v1) },
                RoleValue { variable: "concept".into(), value: entity(v2) },
                RoleValue { variable: "agreement".into(), value: VariableValue::Bool(q) },
            ],
        }
    }

    fn doc(id: u64, author: &str) -> Document {
        Document {
            id: DocumentId(id),
            title: format!("doc {id}"),
            author: author.into(),
            source: "wire".into(),
            section: "politics".into(),
            kind: "newspaper".into(),
            notes: String::new(),
            time: Utc.with_ymd_and_hms(2009, 7, 1, 0, 0, 0).unwrap(),
        }
    }

    fn spec() -> FilterSpec {
        FilterSpec {
            statement_type_id: 1,
            variable1: "person".into(),
            variable2: "concept".into(),
            qualifier: Some("agreement".into()),
            ..FilterSpec::default()
        }
    }

    fn docs(list: Vec<Document>) -> HashMap<DocumentId, Document> {
        list.into_iter().map(|d| (d.id, d)).collect()
    }

    #[test]
    fn time_range_is_inclusive() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true), stmt(2, 1, 15, "A", "Y", true)];
        let documents = docs(vec![doc(1, "ann")]);
        let mut s = spec();
        s.start = Some(Utc.with_ymd_and_hms(2009, 7, 1, 0, 0, 0).unwrap());
        s.stop = Some(Utc.with_ymd_and_hms(2009, 7, 1, 12, 0, 0).unwrap());
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, StatementId(1));
    }

    #[test]
    fn excluded_author_drops_statement() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true), stmt(2, 2, 1, "B", "X", true)];
        let documents = docs(vec![doc(1, "ann"), doc(2, "bob")]);
        let mut s = spec();
        s.exclusions.authors.insert("bob".into());
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label_of("person").as_deref(), Some("A"));
    }

    #[test]
    fn excluded_entity_value_drops_statement() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true), stmt(2, 1, 1, "B", "X", true)];
        let documents = docs(vec![doc(1, "ann")]);
        let mut s = spec();
        s.exclusions
            .values
            .entry("person".into())
            .or_default()
            .insert("B".into());
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn per_document_duplicates_collapse_to_first() {
        // Two identical (A, X, +) in one document; distinct triple survives.
        let statements = vec![
            stmt(1, 1, 1, "A", "X", true),
            stmt(2, 1, 2, "A", "X", true),
            stmt(3, 1, 2, "A", "Y", false),
        ];
        let documents = docs(vec![doc(1, "ann")]);
        let mut s = spec();
        s.duplicates = Duplicates::Document;
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, StatementId(1));
    }

    #[test]
    fn duplicates_in_different_documents_survive_document_mode() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true), stmt(2, 2, 1, "A", "X", true)];
        let documents = docs(vec![doc(1, "ann"), doc(2, "bob")]);
        let mut s = spec();
        s.duplicates = Duplicates::Document;
        assert_eq!(filter(&statements, &documents, &s).len(), 2);
    }

    #[test]
    fn month_window_collapses_across_documents() {
        // Same triple twice in July across two documents, once in August.
        let statements = vec![
            stmt_at(1, 1, 2009, 7, 1, "A", "X", true),
            stmt_at(2, 2, 2009, 7, 20, "A", "X", true),
            stmt_at(3, 3, 2009, 8, 1, "A", "X", true),
        ];
        let documents = docs(vec![doc(1, "ann"), doc(2, "bob"), doc(3, "ann")]);
        let mut s = spec();
        s.duplicates = Duplicates::Month;
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, StatementId(1));
        assert_eq!(out[1].id, StatementId(3));
    }

    #[test]
    fn year_window_resets_at_the_year_boundary() {
        let statements = vec![
            stmt_at(1, 1, 2009, 3, 1, "A", "X", true),
            stmt_at(2, 2, 2009, 11, 5, "A", "X", true),
            stmt_at(3, 3, 2010, 1, 2, "A", "X", true),
        ];
        let documents = docs(vec![doc(1, "ann"), doc(2, "bob"), doc(3, "ann")]);
        let mut s = spec();
        s.duplicates = Duplicates::Year;
        let out = filter(&statements, &documents, &s);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, StatementId(1));
        assert_eq!(out[1].id, StatementId(3));
    }

    #[test]
    fn across_range_collapses_everywhere() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true), stmt(2, 2, 20, "A", "X", true)];
        let documents = docs(vec![doc(1, "ann"), doc(2, "bob")]);
        let mut s = spec();
        s.duplicates = Duplicates::AcrossRange;
        assert_eq!(filter(&statements, &documents, &s).len(), 1);
    }

    #[test]
    fn empty_result_is_a_plain_empty_vec() {
        let statements = vec![stmt(1, 1, 1, "A", "X", true)];
        let documents = docs(vec![doc(1, "ann")]);
        let mut s = spec();
        s.statement_type_id = 99;
        assert!(filter(&statements, &documents, &s).is_empty());
    }

    #[test]
    fn event_list_mode_keeps_statements_with_missing_values() {
        let mut incomplete = stmt(1, 1, 1, "A", "X", true);
        incomplete.values.retain(|rv| rv.variable != "concept");
        let statements = vec![incomplete];
        let documents = docs(vec![doc(1, "ann")]);

        let mut strict = spec();
        strict.require_non_empty = true;
        assert!(filter(&statements, &documents, &strict).is_empty());

        let mut lax = spec();
        lax.require_non_empty = false;
        assert_eq!(filter(&statements, &documents, &lax).len(), 1);
    }
}

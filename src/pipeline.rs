//! Export pipeline: configuration validation and stage orchestration.
//!
//! Validates the whole configuration surface *before* touching data
//! (configuration errors are named and actionable), then runs
//! Filter → Labels → Builder synchronously. The backbone optimizer is
//! deliberately not driven here: the caller owns that loop (see
//! [`crate::backbone`]).

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use tracing::info;

use crate::backbone::{BackboneOptimizer, BackboneSpec};
use crate::builder::{MatrixBuilder, NetworkMode, Normalization, QualifierAggregation};
use crate::filter::{filter, Duplicates, ExclusionSpec, FilterSpec};
use crate::labels::extract_labels;
use crate::model::{Document, DocumentId, Matrix, Statement};
use crate::source::StatementSource;
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// The full configuration surface of one export run. Every knob is an
/// explicit field; the engine holds no ambient state.
#[derive(Debug, Clone)]
pub struct ExportSpec {
    pub statement_type_id: u64,
    pub mode: NetworkMode,
    pub variable1: String,
    pub variable1_document_field: bool,
    pub variable2: String,
    pub variable2_document_field: bool,
    pub qualifier: Option<String>,
    pub qualifier_document_field: bool,
    pub aggregation: QualifierAggregation,
    pub normalization: Normalization,
    pub duplicates: Duplicates,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub exclusions: ExclusionSpec,
    /// Use the full universe for labels, so dimensions stay stable across
    /// differently filtered exports.
    pub include_isolates: bool,
    /// Present when a backbone run will follow; validated up front.
    pub backbone: Option<BackboneSpec>,
}

impl Default for ExportSpec {
    fn default() -> Self {
        Self {
            statement_type_id: 0,
            mode: NetworkMode::TwoMode,
            variable1: String::new(),
            variable1_document_field: false,
            variable2: String::new(),
            variable2_document_field: false,
            qualifier: None,
            qualifier_document_field: false,
            aggregation: QualifierAggregation::Ignore,
            normalization: Normalization::None,
            duplicates: Duplicates::Include,
            start: None,
            stop: None,
            exclusions: ExclusionSpec::default(),
            include_isolates: false,
            backbone: None,
        }
    }
}

/// Output of a pipeline run: the matrix plus the statement activity of each
/// label (GraphML nodes carry it), and the filtered statements that produced
/// the weights.
#[derive(Debug, Clone)]
pub struct NetworkExport {
    pub matrix: Matrix,
    pub row_activity: Vec<usize>,
    pub col_activity: Vec<usize>,
    pub statements: Vec<Statement>,
}

impl NetworkExport {
    /// Set up the backbone optimizer for this matrix. The pipeline has
    /// already validated the mode combination.
    pub fn backbone_optimizer(&self, spec: BackboneSpec) -> Result<BackboneOptimizer> {
        BackboneOptimizer::new(&self.matrix, spec)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Validated export configuration, ready to run against a source.
pub struct ExportPipeline {
    spec: ExportSpec,
}

impl ExportPipeline {
    /// Validate the configuration. Every rejection here is a user-facing,
    /// actionable condition; nothing is computed yet.
    pub fn new(spec: ExportSpec) -> Result<Self> {
        if spec.variable1.is_empty() || spec.variable2.is_empty() {
            return Err(Error::InvalidSpec("variable 1 and variable 2 must be set".into()));
        }
        if spec.variable1 == spec.variable2
            && spec.variable1_document_field == spec.variable2_document_field
        {
            return Err(Error::SameVariables(spec.variable1.clone()));
        }
        if spec.qualifier.is_none() && spec.aggregation != QualifierAggregation::Ignore {
            return Err(Error::InvalidSpec(format!(
                "{:?} aggregation needs a qualifier variable",
                spec.aggregation
            )));
        }

        match spec.mode {
            NetworkMode::OneMode => {
                if matches!(spec.aggregation, QualifierAggregation::Combine) {
                    return Err(Error::UnsupportedCombination(
                        "combine aggregation is only defined for two-mode networks".into(),
                    ));
                }
                if matches!(spec.normalization, Normalization::Activity | Normalization::Prominence)
                {
                    return Err(Error::UnsupportedCombination(format!(
                        "{:?} normalization is only defined for two-mode networks",
                        spec.normalization
                    )));
                }
            }
            NetworkMode::TwoMode => {
                if matches!(
                    spec.aggregation,
                    QualifierAggregation::Congruence | QualifierAggregation::Conflict
                ) {
                    return Err(Error::UnsupportedCombination(format!(
                        "{:?} aggregation is only defined for one-mode networks",
                        spec.aggregation
                    )));
                }
                if matches!(
                    spec.normalization,
                    Normalization::AverageActivity | Normalization::Jaccard | Normalization::Cosine
                ) {
                    return Err(Error::UnsupportedCombination(format!(
                        "{:?} normalization is only defined for one-mode networks",
                        spec.normalization
                    )));
                }
            }
            NetworkMode::EventList => {}
        }

        if spec.backbone.is_some() {
            if spec.mode != NetworkMode::OneMode {
                return Err(Error::UnsupportedCombination(
                    "backbone extraction needs a one-mode network".into(),
                ));
            }
            if !spec.include_isolates {
                return Err(Error::UnsupportedCombination(
                    "backbone extraction needs isolates included for stable dimensions".into(),
                ));
            }
        }

        Ok(Self { spec })
    }

    /// Run Filter → Labels → Builder. Fails with `EmptyFilterResult` when
    /// nothing survives the filter; the caller decides whether to relax it.
    pub fn run<S: StatementSource>(&self, source: &S) -> Result<NetworkExport> {
        let spec = &self.spec;
        if spec.mode == NetworkMode::EventList {
            return Err(Error::InvalidSpec(
                "event lists have no matrix; use run_event_list()".into(),
            ));
        }

        let (filtered, all_statements, documents) = self.filter_stage(source, true)?;
        if filtered.is_empty() {
            return Err(Error::EmptyFilterResult { statement_type_id: spec.statement_type_id });
        }

        let row_labels = extract_labels(
            &filtered,
            &all_statements,
            &documents,
            &spec.variable1,
            spec.variable1_document_field,
            spec.statement_type_id,
            spec.include_isolates,
        );
        let col_labels = extract_labels(
            &filtered,
            &all_statements,
            &documents,
            &spec.variable2,
            spec.variable2_document_field,
            spec.statement_type_id,
            spec.include_isolates,
        );

        let builder = MatrixBuilder {
            statements: &filtered,
            documents: &documents,
            variable1: &spec.variable1,
            variable1_document_field: spec.variable1_document_field,
            variable2: &spec.variable2,
            variable2_document_field: spec.variable2_document_field,
            qualifier: spec.qualifier.as_deref(),
            qualifier_document_field: spec.qualifier_document_field,
            aggregation: spec.aggregation,
            normalization: spec.normalization,
        };

        let row_activity =
            builder.activity(&row_labels, &spec.variable1, spec.variable1_document_field);
        let col_activity =
            builder.activity(&col_labels, &spec.variable2, spec.variable2_document_field);

        let matrix = match spec.mode {
            NetworkMode::OneMode => builder.one_mode(row_labels, &col_labels)?,
            NetworkMode::TwoMode => builder.two_mode(row_labels, col_labels)?,
            NetworkMode::EventList => unreachable!("rejected above"),
        };
        // One-mode matrices index both dimensions by var1.
        let col_activity = if matrix.one_mode { row_activity.clone() } else { col_activity };

        info!(
            rows = matrix.row_labels.len(),
            cols = matrix.col_labels.len(),
            statements = filtered.len(),
            one_mode = matrix.one_mode,
            "network export built"
        );

        Ok(NetworkExport { matrix, row_activity, col_activity, statements: filtered })
    }

    /// The event-list branch: filtering without the non-empty requirement,
    /// no matrix.
    pub fn run_event_list<S: StatementSource>(&self, source: &S) -> Result<Vec<Statement>> {
        let (filtered, _, _) = self.filter_stage(source, false)?;
        if filtered.is_empty() {
            return Err(Error::EmptyFilterResult { statement_type_id: self.spec.statement_type_id });
        }
        Ok(filtered)
    }

    #[allow(clippy::type_complexity)]
    fn filter_stage<S: StatementSource>(
        &self,
        source: &S,
        require_non_empty: bool,
    ) -> Result<(Vec<Statement>, Vec<Statement>, HashMap<DocumentId, Document>)> {
        let spec = &self.spec;
        let statements = source.statements(spec.statement_type_id)?;
        let documents: HashMap<DocumentId, Document> =
            source.documents()?.into_iter().map(|d| (d.id, d)).collect();
        // The full universe is only needed for isolate labels.
        let all_statements =
            if spec.include_isolates { source.all_statements()? } else { Vec::new() };

        let filter_spec = FilterSpec {
            statement_type_id: spec.statement_type_id,
            start: spec.start,
            stop: spec.stop,
            variable1: spec.variable1.clone(),
            variable1_document_field: spec.variable1_document_field,
            variable2: spec.variable2.clone(),
            variable2_document_field: spec.variable2_document_field,
            qualifier: spec.qualifier.clone(),
            qualifier_document_field: spec.qualifier_document_field,
            duplicates: spec.duplicates,
            exclusions: spec.exclusions.clone(),
            require_non_empty,
        };

        let filtered = filter(&statements, &documents, &filter_spec);
        Ok((filtered, all_statements, documents))
    }
}

// ============================================================================
// Tests
// ============================================================================

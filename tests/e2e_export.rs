//! End-to-end tests for the serializer shapes: pipeline output rendered to
//! CSV, UCINET DL, GraphML, and backbone results to JSON/XML.

use chrono::{TimeZone, Utc};
use dna_rs::export::{
    write_backbone_json, write_backbone_xml, write_event_list_csv, write_matrix_csv,
    write_matrix_dl, write_matrix_graphml,
};
use dna_rs::{
    BackboneSpec, Duplicates, ExportPipeline, ExportSpec, MemorySource, NetworkMode,
    QualifierAggregation, StatementSource,
};
use dna_rs::{CoderId, Document, DocumentId, EntityId, EntityRef, RoleValue, Statement,
    StatementId, VariableValue};
use hashbrown::HashMap;
use smallvec::smallvec;

fn entity(label: &str) -> VariableValue {
    VariableValue::Entity(EntityRef { id: EntityId(0), label: label.into(), color: String::new() })
}

fn stmt(id: u64, actor: &str, concept: &str, agree: bool) -> Statement {
    Statement {
        id: StatementId(id),
        statement_type_id: 1,
        document_id: DocumentId(1),
        time: Utc.with_ymd_and_hms(2009, 7, 1, 10, 0, 0).unwrap(),
        coder_id: CoderId(1),
        values: smallvec![
            RoleValue { variable: "organization".into(), value: entity(actor) },
            RoleValue { variable: "concept".into(), value: entity(concept) },
            RoleValue { variable: "agreement".into(), value: VariableValue::Bool(agree) },
        ],
    }
}

fn source() -> MemorySource {
    let statements = vec![
        stmt(1, "A", "X", true),
        stmt(2, "A", "X", true),
        stmt(3, "A", "Y", false),
        stmt(4, "B", "X", true),
    ];
    let documents = vec![Document {
        id: DocumentId(1),
        title: "article \"one\"".into(),
        author: "ann".into(),
        source: "wire".into(),
        section: "politics".into(),
        kind: "news".into(),
        notes: String::new(),
        time: Utc.with_ymd_and_hms(2009, 7, 1, 0, 0, 0).unwrap(),
    }];
    MemorySource::new(statements, documents)
}

fn spec() -> ExportSpec {
    ExportSpec {
        statement_type_id: 1,
        variable1: "organization".into(),
        variable2: "concept".into(),
        qualifier: Some("agreement".into()),
        ..ExportSpec::default()
    }
}

#[test]
fn test_csv_round_numbers() {
    let export = ExportPipeline::new(spec()).unwrap().run(&source()).unwrap();
    let mut buf = Vec::new();
    write_matrix_csv(&export.matrix, &mut buf).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out.lines().next(), Some("\"\";\"X\";\"Y\""));
    assert!(out.contains("\"A\";2;1"));
    assert!(out.contains("\"B\";1;0"));
}

#[test]
fn test_dl_block_structure() {
    let export = ExportPipeline::new(spec()).unwrap().run(&source()).unwrap();
    let mut buf = Vec::new();
    write_matrix_dl(&export.matrix, &mut buf).unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert!(out.starts_with("DL\n"));
    assert!(out.contains("NR = 2, NC = 2"));
    assert!(out.contains("ROW LABELS:"));
    assert!(out.contains("DATA:"));
}

#[test]
fn test_graphml_carries_activity_and_weight() {
    let export = ExportPipeline::new(spec()).unwrap().run(&source()).unwrap();
    let mut buf = Vec::new();
    write_matrix_graphml(&export.matrix, &export.row_activity, &export.col_activity, &mut buf)
        .unwrap();
    let out = String::from_utf8(buf).unwrap();
    // A has 3 statements, B has 1; X carries 3, Y carries 1.
    assert!(out.contains(r#"<data key="activity">3</data>"#));
    assert!(out.contains(r#"<data key="weight">2</data>"#));
    assert_eq!(out.matches("<node ").count(), 4);
    assert_eq!(out.matches("<edge ").count(), 3); // (B, Y) is zero, omitted
}

#[test]
fn test_backbone_json_and_xml_agree() {
    let mut s = spec();
    s.mode = NetworkMode::OneMode;
    s.aggregation = QualifierAggregation::Ignore;
    s.include_isolates = true;
    let backbone = BackboneSpec { penalty: 0.1, iterations: 100, seed: 5 };
    s.backbone = Some(backbone);
    let export = ExportPipeline::new(s).unwrap().run(&source()).unwrap();
    let result = export.backbone_optimizer(backbone).unwrap().run();

    let mut json_buf = Vec::new();
    write_backbone_json(&result, &mut json_buf).unwrap();
    let value: serde_json::Value =
        serde_json::from_slice(&json_buf).unwrap();
    assert_eq!(value["iterationsRun"], 100);
    assert_eq!(value["penalty"], 0.1);
    assert_eq!(
        value["backboneSet"].as_array().unwrap().len()
            + value["redundantSet"].as_array().unwrap().len(),
        result.node_labels.len()
    );

    let mut xml_buf = Vec::new();
    write_backbone_xml(&result, &mut xml_buf).unwrap();
    let xml = String::from_utf8(xml_buf).unwrap();
    assert!(xml.contains("<iterationsRun>100</iterationsRun>"));
    assert_eq!(xml.matches("<node>").count(), result.node_labels.len());
    assert_eq!(xml.matches("<distance ").count(), 100);
}

#[test]
fn test_event_list_keeps_every_statement() {
    let mut s = spec();
    s.mode = NetworkMode::EventList;
    s.duplicates = Duplicates::Include;
    let pipeline = ExportPipeline::new(s).unwrap();
    let statements = pipeline.run_event_list(&source()).unwrap();

    let documents: HashMap<DocumentId, Document> = source()
        .documents()
        .unwrap()
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let mut buf = Vec::new();
    write_event_list_csv(
        &statements,
        &documents,
        &["organization", "concept", "agreement"],
        &mut buf,
    )
    .unwrap();
    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out.lines().count(), 5); // header + 4 statements
    assert!(out.contains("article \"\"one\"\"")); // CSV quote escaping
    assert!(out.contains("\"organization\""));
    assert!(out.contains(";\"A\";\"X\";\"1\""));
}

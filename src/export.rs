//! Network serialization: render a Matrix or BackboneResult to the wire.
//!
//! Writers over any `W: Write`; the host decides where bytes go.
//!
//! | Output | Format |
//! |--------|--------|
//! | Matrix | CSV, UCINET DL (fullmatrix), GraphML |
//! | BackboneResult | JSON, XML |
//! | Event list | CSV (one row per filtered statement) |

use hashbrown::HashMap;
use std::io::Write;

use crate::model::{BackboneResult, Document, DocumentId, Matrix, Statement};
use crate::Result;

// ============================================================================
// Matrix: CSV
// ============================================================================

/// CSV: column labels as header, row label in the first cell of each line.
pub fn write_matrix_csv<W: Write>(matrix: &Matrix, writer: &mut W) -> Result<()> {
    write!(writer, "\"\"")?;
    for label in &matrix.col_labels {
        write!(writer, ";\"{}\"", csv_escape(label))?;
    }
    writeln!(writer)?;
    for (i, label) in matrix.row_labels.iter().enumerate() {
        write!(writer, "\"{}\"", csv_escape(label))?;
        for j in 0..matrix.col_labels.len() {
            write!(writer, ";{}", matrix.weights[[i, j]])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn csv_escape(value: &str) -> String {
    value.replace('"', "\"\"")
}

// ============================================================================
// Matrix: UCINET DL
// ============================================================================

/// UCINET DL, fullmatrix format. One-mode matrices advertise `N =`; two-mode
/// matrices advertise `NR =` / `NC =`.
pub fn write_matrix_dl<W: Write>(matrix: &Matrix, writer: &mut W) -> Result<()> {
    writeln!(writer, "DL")?;
    if matrix.one_mode {
        writeln!(writer, "N = {}", matrix.row_labels.len())?;
    } else {
        writeln!(writer, "NR = {}, NC = {}", matrix.row_labels.len(), matrix.col_labels.len())?;
    }
    writeln!(writer, "FORMAT = FULLMATRIX DIAGONAL PRESENT")?;
    writeln!(writer, "ROW LABELS:")?;
    for label in &matrix.row_labels {
        writeln!(writer, "\"{}\"", label)?;
    }
    if !matrix.one_mode {
        writeln!(writer, "COLUMN LABELS:")?;
        for label in &matrix.col_labels {
            writeln!(writer, "\"{}\"", label)?;
        }
    }
    writeln!(writer, "DATA:")?;
    for i in 0..matrix.row_labels.len() {
        let row: Vec<String> =
            (0..matrix.col_labels.len()).map(|j| matrix.weights[[i, j]].to_string()).collect();
        writeln!(writer, "{}", row.join(" "))?;
    }
    Ok(())
}

// ============================================================================
// Matrix: GraphML
// ============================================================================

/// GraphML. Nodes carry their statement activity as an attribute, edges
/// carry the cell weight; zero-weight edges are omitted. One-mode output is
/// undirected over the upper triangle; two-mode output is a directed
/// bipartite graph (row nodes → column nodes).
pub fn write_matrix_graphml<W: Write>(
    matrix: &Matrix,
    row_activity: &[usize],
    col_activity: &[usize],
    writer: &mut W,
) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#
    )?;
    writeln!(
        writer,
        r#"  <key id="label" for="node" attr.name="label" attr.type="string"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="activity" for="node" attr.name="activity" attr.type="int"/>"#
    )?;
    writeln!(
        writer,
        r#"  <key id="weight" for="edge" attr.name="weight" attr.type="double"/>"#
    )?;
    let edgedefault = if matrix.one_mode { "undirected" } else { "directed" };
    writeln!(writer, r#"  <graph id="G" edgedefault="{edgedefault}">"#)?;

    for (i, label) in matrix.row_labels.iter().enumerate() {
        let activity = row_activity.get(i).copied().unwrap_or(0);
        writeln!(writer, r#"    <node id="r{i}">"#)?;
        writeln!(writer, r#"      <data key="label">{}</data>"#, xml_escape(label))?;
        writeln!(writer, r#"      <data key="activity">{activity}</data>"#)?;
        writeln!(writer, r#"    </node>"#)?;
    }
    if !matrix.one_mode {
        for (j, label) in matrix.col_labels.iter().enumerate() {
            let activity = col_activity.get(j).copied().unwrap_or(0);
            writeln!(writer, r#"    <node id="c{j}">"#)?;
            writeln!(writer, r#"      <data key="label">{}</data>"#, xml_escape(label))?;
            writeln!(writer, r#"      <data key="activity">{activity}</data>"#)?;
            writeln!(writer, r#"    </node>"#)?;
        }
    }

    for i in 0..matrix.row_labels.len() {
        let start = if matrix.one_mode { i + 1 } else { 0 };
        for j in start..matrix.col_labels.len() {
            let weight = matrix.weights[[i, j]];
            if weight == 0.0 {
                continue;
            }
            let target = if matrix.one_mode { format!("r{j}") } else { format!("c{j}") };
            writeln!(writer, r#"    <edge source="r{i}" target="{target}">"#)?;
            writeln!(writer, r#"      <data key="weight">{weight}</data>"#)?;
            writeln!(writer, r#"    </edge>"#)?;
        }
    }

    writeln!(writer, "  </graph>")?;
    writeln!(writer, "</graphml>")?;
    Ok(())
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// BackboneResult: JSON / XML
// ============================================================================

/// JSON document with `backboneSet`, `redundantSet`, `penalty`,
/// `iterationsRun`, `spectralDistance`, `distanceHistory`.
pub fn write_backbone_json<W: Write>(result: &BackboneResult, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// XML document carrying the same fields as the JSON shape.
pub fn write_backbone_xml<W: Write>(result: &BackboneResult, writer: &mut W) -> Result<()> {
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, "<backbone>")?;
    writeln!(writer, "  <penalty>{}</penalty>", result.penalty)?;
    writeln!(writer, "  <iterationsRun>{}</iterationsRun>", result.iterations_run)?;
    writeln!(
        writer,
        "  <spectralDistance>{}</spectralDistance>",
        result.spectral_distance
    )?;
    writeln!(writer, "  <backboneSet>")?;
    for label in &result.backbone_set {
        writeln!(writer, "    <node>{}</node>", xml_escape(label))?;
    }
    writeln!(writer, "  </backboneSet>")?;
    writeln!(writer, "  <redundantSet>")?;
    for label in &result.redundant_set {
        writeln!(writer, "    <node>{}</node>", xml_escape(label))?;
    }
    writeln!(writer, "  </redundantSet>")?;
    writeln!(writer, "  <distanceHistory>")?;
    for (t, d) in result.distance_history.iter().enumerate() {
        writeln!(writer, r#"    <distance t="{}">{}</distance>"#, t + 1, d)?;
    }
    writeln!(writer, "  </distanceHistory>")?;
    writeln!(writer, "</backbone>")?;
    Ok(())
}

// ============================================================================
// Event list: CSV
// ============================================================================

/// One CSV row per statement, joined to its document metadata, with one
/// column per requested statement variable. No non-empty requirement:
/// missing values render as empty cells.
pub fn write_event_list_csv<W: Write>(
    statements: &[Statement],
    documents: &HashMap<DocumentId, Document>,
    variables: &[&str],
    writer: &mut W,
) -> Result<()> {
    write!(writer, "\"id\";\"time\";\"document\";\"author\";\"source\";\"section\";\"type\"")?;
    for variable in variables {
        write!(writer, ";\"{}\"", csv_escape(variable))?;
    }
    writeln!(writer)?;

    for s in statements {
        let doc = documents.get(&s.document_id);
        let field = |f: fn(&Document) -> &str| doc.map(f).unwrap_or("");
        write!(
            writer,
            "{};\"{}\";\"{}\";\"{}\";\"{}\";\"{}\";\"{}\"",
            s.id,
            s.time.to_rfc3339(),
            csv_escape(field(|d| &d.title)),
            csv_escape(field(|d| &d.author)),
            csv_escape(field(|d| &d.source)),
            csv_escape(field(|d| &d.section)),
            csv_escape(field(|d| &d.kind)),
        )?;
        for variable in variables {
            let value = s.label_of(variable).unwrap_or_default();
            write!(writer, ";\"{}\"", csv_escape(&value))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

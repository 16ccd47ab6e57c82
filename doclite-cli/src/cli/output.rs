// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use doclite::store::Row;
use doclite::{Document, Value};
use std::sync::Arc;

use super::commands::OutputFormat;

/// Result formatter for the supported output formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format hydrated documents
    pub fn format_documents(documents: &[Arc<dyn Document>], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::documents_table(documents),
            OutputFormat::Json => Self::to_pretty_json(serde_json::json!({
                "status": "success",
                "documents": documents.iter().map(|d| d.to_json()).collect::<Vec<_>>(),
                "count": documents.len(),
            })),
        }
    }

    /// Format raw node rows
    pub fn format_rows(rows: &[Row], columns: &[String], format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::rows_table(rows, columns),
            OutputFormat::Json => Self::to_pretty_json(serde_json::json!({
                "status": "success",
                "columns": columns,
                "rows": rows.iter().map(|row| Self::row_to_json(row, columns)).collect::<Vec<_>>(),
                "count": rows.len(),
            })),
        }
    }

    fn documents_table(documents: &[Arc<dyn Document>]) -> String {
        if documents.is_empty() {
            return format!("{}\n", "No documents found".yellow());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Documents".bold().green()));
        output.push_str(&format!("Documents returned: {}\n\n", documents.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            ["uuid", "path", "type", "locale", "content"]
                .iter()
                .map(|h| Cell::new(h).fg(Color::Green))
                .collect::<Vec<_>>(),
        );

        for document in documents {
            let content = match document.to_json() {
                serde_json::Value::Object(mut map) => map
                    .remove("properties")
                    .or_else(|| map.remove("content"))
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            };
            table.add_row(vec![
                document.uuid().to_string(),
                document.path().to_string(),
                document.document_type().to_string(),
                document.locale().unwrap_or("-").to_string(),
                content,
            ]);
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn rows_table(rows: &[Row], columns: &[String]) -> String {
        if rows.is_empty() {
            return format!("{}\n", "No results found".yellow());
        }

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Query Results".bold().green()));
        output.push_str(&format!("Rows returned: {}\n\n", rows.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);

        let mut header = vec![Cell::new("nodes").fg(Color::Green)];
        header.extend(columns.iter().map(|c| Cell::new(c).fg(Color::Green)));
        header.push(Cell::new("score").fg(Color::Green));
        table.set_header(header);

        for row in rows {
            let mut cells = vec![Self::nodes_to_string(row)];
            cells.extend(columns.iter().map(|c| {
                row.get_value(c)
                    .map(Self::value_to_string)
                    .unwrap_or_else(|| "NULL".to_string())
            }));
            cells.push(format!("{:.1}", row.score));
            table.add_row(cells);
        }

        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    fn nodes_to_string(row: &Row) -> String {
        row.nodes()
            .iter()
            .map(|(selector, node)| match selector {
                Some(selector) => format!("{}: {}", selector, node.path),
                None => node.path.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn row_to_json(row: &Row, columns: &[String]) -> serde_json::Value {
        let nodes: serde_json::Map<String, serde_json::Value> = row
            .nodes()
            .iter()
            .map(|(selector, node)| {
                (
                    selector.unwrap_or("node").to_string(),
                    serde_json::json!({ "uuid": node.uuid, "path": node.path }),
                )
            })
            .collect();
        let values: serde_json::Map<String, serde_json::Value> = columns
            .iter()
            .map(|c| {
                (
                    c.clone(),
                    row.get_value(c).map(Value::to_json).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();
        serde_json::json!({ "nodes": nodes, "values": values, "score": row.score })
    }

    /// Convert a Value to a display string
    fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "NULL".to_string(),
            Value::Array(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(Self::value_to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            other => other.to_string(),
        }
    }

    fn to_pretty_json(value: serde_json::Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}".to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclite::{GenericDocument, Node};
    use std::collections::BTreeMap;

    fn document() -> Arc<dyn Document> {
        let mut properties = BTreeMap::new();
        properties.insert("title".to_string(), Value::from("Home"));
        Arc::new(GenericDocument {
            uuid: "home".to_string(),
            path: "/cmf/home".to_string(),
            document_type: "sulu:page".to_string(),
            locale: Some("en".to_string()),
            properties,
        })
    }

    #[test]
    fn test_documents_json() {
        let output = ResultFormatter::format_documents(&[document()], OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["documents"][0]["path"], "/cmf/home");
        assert_eq!(json["documents"][0]["properties"]["title"], "Home");
    }

    #[test]
    fn test_documents_table() {
        let output = ResultFormatter::format_documents(&[document()], OutputFormat::Table);
        assert!(output.contains("/cmf/home"));
        assert!(output.contains("Home"));
        assert!(ResultFormatter::format_documents(&[], OutputFormat::Table)
            .contains("No documents found"));
    }

    #[test]
    fn test_rows_json() {
        let row = Row::single(Arc::new(Node::with_uuid("/cmf/home", "home")))
            .with_value("title", Value::from("Home"));
        let output =
            ResultFormatter::format_rows(&[row], &["title".to_string()], OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["rows"][0]["nodes"]["node"]["uuid"], "home");
        assert_eq!(json["rows"][0]["values"]["title"], "Home");
    }
}

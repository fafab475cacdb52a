// mermaid diagrams from a schema description or a query plan

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Schema description as produced by the introspection scripts. Every field
/// is optional so partial dumps still render.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Table {
    pub columns: Vec<Column>,
    pub primary_key: Vec<KeyColumn>,
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Column {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyColumn {
    pub column: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForeignKey {
    pub references_table: Option<String>,
}

/// One node of an EXPLAIN-style plan tree.
///
/// `details` is free-form: strings render as is, other scalars through their
/// json text, `null` as nothing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanNode {
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    #[serde(deserialize_with = "present")]
    pub details: Option<Value>,
    pub children: Option<Vec<PlanNode>>,
}

// keeps an explicit `null` as Some(Null) so the key still counts as present
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl PlanNode {
    /// True only for a node without any keys, i.e. `{}`.
    pub fn is_empty(&self) -> bool {
        self.node_type.is_none() && self.details.is_none() && self.children.is_none()
    }

    fn details_text(&self) -> String {
        match &self.details {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl Table {
    fn references(&self) -> impl Iterator<Item = &str> {
        self.foreign_keys
            .iter()
            .filter_map(|fk| fk.references_table.as_deref())
    }
}

/// Entity relationship diagram.
///
/// With a filter, the listed tables plus every table they reference are
/// rendered; names missing from the schema are skipped.
pub fn generate_erd(schema: &Schema, filter: Option<&[String]>) -> String {
    let rendered: BTreeSet<&str> = match filter {
        Some(names) => {
            let mut set: BTreeSet<&str> = names.iter().map(String::as_str).collect();
            for name in names {
                if let Some(table) = schema.tables.get(name) {
                    set.extend(table.references());
                }
            }
            set
        }
        None => schema.tables.keys().map(String::as_str).collect(),
    };

    let mut lines = vec!["erDiagram".to_string()];

    for name in &rendered {
        let Some(table) = schema.tables.get(*name) else {
            continue;
        };
        for target in table.references() {
            if rendered.contains(&target) {
                lines.push(format!(
                    "    {} ||--o{{ {} : references",
                    name.to_uppercase(),
                    target.to_uppercase()
                ));
            }
        }
    }

    for name in &rendered {
        let Some(table) = schema.tables.get(*name) else {
            continue;
        };
        lines.push(format!("\n    {} {{", name.to_uppercase()));

        let keys: BTreeSet<&str> = table
            .primary_key
            .iter()
            .filter_map(|pk| pk.column.as_deref())
            .collect();

        for col in &table.columns {
            let col_name = col.name.as_deref().unwrap_or("unknown");
            let col_type = col.data_type.as_deref().unwrap_or("unknown");
            if keys.contains(&col_name) {
                lines.push(format!("        {col_type} {col_name} PK"));
            } else {
                lines.push(format!("        {col_type} {col_name}"));
            }
        }

        lines.push("    }".to_string());
    }

    lines.join("\n")
}

/// Foreign key flow between tables. Focused on `table` when it exists in the
/// schema, otherwise every relationship whose target is known.
pub fn generate_lineage(schema: &Schema, table: Option<&str>) -> String {
    let mut lines = vec!["graph LR".to_string()];

    match table.and_then(|name| schema.tables.get_key_value(name)) {
        Some((name, focus)) => {
            let focus_upper = name.to_uppercase();

            // upstream: what this table points at
            for target in focus.references() {
                lines.push(format!("    {} -->|FK| {focus_upper}", target.to_uppercase()));
            }

            // downstream: who points at this table
            for (other, info) in &schema.tables {
                if other == name {
                    continue;
                }
                for _ in info.references().filter(|target| *target == name.as_str()) {
                    lines.push(format!("    {focus_upper} -->|FK| {}", other.to_uppercase()));
                }
            }
        }
        None => {
            for (name, info) in &schema.tables {
                for target in info.references() {
                    if schema.tables.contains_key(target) {
                        lines.push(format!(
                            "    {} -->|FK| {}",
                            target.to_uppercase(),
                            name.to_uppercase()
                        ));
                    }
                }
            }
        }
    }

    lines.join("\n")
}

/// Top-down plan tree, one node per plan step. A missing or `{}` plan gives
/// the header alone.
pub fn generate_query_plan(plan: Option<&PlanNode>) -> String {
    let mut lines = vec!["graph TD".to_string()];
    if let Some(plan) = plan.filter(|plan| !plan.is_empty()) {
        let mut next_id = 0;
        add_plan_node(plan, None, &mut next_id, &mut lines);
    }
    lines.join("\n")
}

fn add_plan_node(node: &PlanNode, parent: Option<&str>, next_id: &mut usize, lines: &mut Vec<String>) {
    let id = format!("node_{next_id}");
    *next_id += 1;

    let node_type = node.node_type.as_deref().unwrap_or("Unknown");
    lines.push(format!("    {id}[{node_type}<br/>{}]", node.details_text()));

    if let Some(parent) = parent {
        lines.push(format!("    {parent} --> {id}"));
    }

    for child in node.children.iter().flatten() {
        add_plan_node(child, Some(&id), next_id, lines);
    }
}

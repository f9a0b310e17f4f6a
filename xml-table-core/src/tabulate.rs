//! Whole-document tabulation: one rectangular table per distinct tag.
//!
//! Every element below the root is visited once in document pre-order. Each
//! distinct tag gets a [`Table`] whose column set is the first-seen-ordered
//! union of the flattened columns of all its instances, so every row has the
//! same width. Two meta tables describe the root element and summarize every
//! tag with its placement and instance count.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::flatten::{flatten, FlatRow};
use crate::tree::XmlNode;

/// Name of the meta table holding the root tag and its attributes.
pub const ROOT_TABLE: &str = "00_ROOT";
/// Name of the meta table listing every tag with placement and count.
pub const SUMMARY_TABLE: &str = "01_SUMMARY";

/// Where a tag occurs relative to the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Only as an immediate child of the root.
    Direct,
    /// Only deeper than the root's children.
    Nested,
    /// At both depths.
    Both,
}

impl Placement {
    fn from_flags(direct: bool, nested: bool) -> Self {
        match (direct, nested) {
            (true, true) => Placement::Both,
            (true, false) => Placement::Direct,
            _ => Placement::Nested,
        }
    }

    /// True when at least one instance is a root child.
    pub fn is_direct(self) -> bool {
        matches!(self, Placement::Direct | Placement::Both)
    }

    pub fn label(self) -> &'static str {
        match self {
            Placement::Direct => "direct",
            Placement::Nested => "nested",
            Placement::Both => "both",
        }
    }
}

/// A rectangular table of string cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Source tag, absent for meta tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    pub count: usize,
}

/// Per-tag line of the document summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSummary {
    pub tag: String,
    pub placement: Placement,
    pub count: usize,
}

/// The root element's tag and attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootInfo {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

/// Result of tabulating a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tabulation {
    pub root: RootInfo,
    pub summary: Vec<TagSummary>,
    /// Tables keyed by file-safe, unique table name.
    pub tables: BTreeMap<String, Table>,
}

impl Tabulation {
    /// Look up the table built for a source tag.
    pub fn table_for_tag(&self, tag: &str) -> Option<&Table> {
        self.tables
            .values()
            .find(|table| table.tag.as_deref() == Some(tag))
    }
}

#[derive(Default)]
struct TagInstances<'a> {
    nodes: Vec<&'a XmlNode>,
    direct: bool,
    nested: bool,
}

/// Tabulate every element below `root`.
pub fn tabulate(root: &XmlNode) -> Tabulation {
    let mut by_tag: BTreeMap<&str, TagInstances<'_>> = BTreeMap::new();

    let mut stack: Vec<(&XmlNode, usize)> = root.children.iter().rev().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        let entry = by_tag.entry(node.tag.as_str()).or_default();
        entry.nodes.push(node);
        if depth == 1 {
            entry.direct = true;
        } else {
            entry.nested = true;
        }
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }

    let summary: Vec<TagSummary> = by_tag
        .iter()
        .map(|(tag, inst)| TagSummary {
            tag: (*tag).to_string(),
            placement: Placement::from_flags(inst.direct, inst.nested),
            count: inst.nodes.len(),
        })
        .collect();

    let root_info = RootInfo {
        tag: root.tag.clone(),
        attributes: root.attributes.clone(),
    };

    let mut tables = BTreeMap::new();
    tables.insert(ROOT_TABLE.to_string(), root_table(&root_info));
    tables.insert(SUMMARY_TABLE.to_string(), summary_table(&summary));

    let mut used: HashSet<String> = tables.keys().cloned().collect();
    for (tag, inst) in &by_tag {
        let name = unique_table_name(tag, &mut used);
        let mut table = build_table(&inst.nodes);
        table.tag = Some((*tag).to_string());
        table.placement = Some(Placement::from_flags(inst.direct, inst.nested));
        tables.insert(name, table);
    }

    Tabulation {
        root: root_info,
        summary,
        tables,
    }
}

/// Flatten each instance and pad every row to the union of columns.
pub fn build_table(instances: &[&XmlNode]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut flat: Vec<FlatRow> = Vec::with_capacity(instances.len());

    for node in instances {
        let row = flatten(node);
        for column in row.columns() {
            if seen.insert(column.to_string()) {
                columns.push(column.to_string());
            }
        }
        flat.push(row);
    }

    let rows = flat
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).unwrap_or("").to_string())
                .collect()
        })
        .collect();

    Table {
        tag: None,
        columns,
        rows,
        placement: None,
        count: instances.len(),
    }
}

/// Map a tag onto `[A-Za-z0-9_.-]` and make it unique among `used`.
fn unique_table_name(tag: &str, used: &mut HashSet<String>) -> String {
    let base: String = tag
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut candidate = base.clone();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn root_table(root: &RootInfo) -> Table {
    let mut rows = vec![vec!["tag".to_string(), root.tag.clone()]];
    rows.extend(
        root.attributes
            .iter()
            .map(|(k, v)| vec![k.clone(), v.clone()]),
    );
    Table {
        tag: None,
        columns: vec!["Property".to_string(), "Value".to_string()],
        count: rows.len(),
        rows,
        placement: None,
    }
}

fn summary_table(summary: &[TagSummary]) -> Table {
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|s| {
            vec![
                s.tag.clone(),
                s.placement.label().to_string(),
                s.count.to_string(),
            ]
        })
        .collect();
    Table {
        tag: None,
        columns: vec![
            "Element Tag".to_string(),
            "Placement".to_string(),
            "Count".to_string(),
        ],
        count: rows.len(),
        rows,
        placement: None,
    }
}

//! Schema-less flattening of one XML subtree into a single table row.
//!
//! Attributes of the element become columns, singular children are folded in
//! recursively under a `tag.` prefix, and repeated siblings are collapsed into
//! multi-valued cells joined with [`MULTI_VALUE_SEPARATOR`]. Repeated siblings
//! are only followed one level further down; anything deeper is dropped. The
//! result is a display aid, not a lossless encoding of the tree.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::tree::XmlNode;

/// Separator placed between the values of repeated siblings in one cell.
pub const MULTI_VALUE_SEPARATOR: &str = " | ";
/// Column key used for an element's trimmed text content.
pub const TEXT_COLUMN: &str = "_text";
/// Attribute values longer than this many characters are truncated.
pub const TRUNCATE_THRESHOLD: usize = 500;
/// Number of characters kept from a truncated value.
pub const TRUNCATE_KEEP: usize = 200;
/// Suffix appended to truncated values.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// An ordered column-path → value mapping built from one element.
///
/// Columns keep the order in which they were first written. Writing an
/// existing column replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    cells: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into `column`.
    pub fn insert(&mut self, column: String, value: String) {
        if let Some(&pos) = self.index.get(&column) {
            self.cells[pos].1 = value;
            return;
        }
        self.index.insert(column.clone(), self.cells.len());
        self.cells.push((column, value));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .map(|&pos| self.cells[pos].1.as_str())
    }

    /// Column names in first-write order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(column, _)| column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for FlatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Flatten `node` into one row.
pub fn flatten(node: &XmlNode) -> FlatRow {
    let mut row = FlatRow::new();
    flatten_into(node, "", &mut row);
    row
}

/// Shorten over-long attribute values so tables stay scannable.
pub fn display_value(value: &str) -> String {
    match value.char_indices().nth(TRUNCATE_THRESHOLD) {
        Some(_) => {
            let cut = value
                .char_indices()
                .nth(TRUNCATE_KEEP)
                .map(|(idx, _)| idx)
                .unwrap_or(value.len());
            format!("{}{}", &value[..cut], TRUNCATION_MARKER)
        }
        None => value.to_string(),
    }
}

fn flatten_into(node: &XmlNode, prefix: &str, row: &mut FlatRow) {
    for (key, value) in &node.attributes {
        row.insert(format!("{prefix}{key}"), display_value(value));
    }
    if let Some(text) = trimmed_text(node) {
        row.insert(format!("{prefix}{TEXT_COLUMN}"), text.to_string());
    }

    for (tag, members) in group_by_tag(node.children.iter()) {
        let child_prefix = format!("{prefix}{tag}.");
        match members.as_slice() {
            [single] => flatten_into(single, &child_prefix, row),
            _ => {
                flatten_group(&members, &child_prefix, row);
                let grandchildren =
                    group_by_tag(members.iter().copied().flat_map(|m| m.children.iter()));
                for (grand_tag, grand_members) in grandchildren {
                    flatten_group(&grand_members, &format!("{child_prefix}{grand_tag}."), row);
                }
            }
        }
    }
}

/// Collapse a set of same-tag siblings into multi-valued columns.
///
/// Instances lacking a key are skipped in that key's cell. Text is only used
/// when no instance carries any attribute.
fn flatten_group(members: &[&XmlNode], prefix: &str, row: &mut FlatRow) {
    let mut keys: Vec<&str> = Vec::new();
    for member in members {
        for (key, _) in &member.attributes {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    if keys.is_empty() {
        let texts: Vec<&str> = members.iter().filter_map(|m| trimmed_text(m)).collect();
        if !texts.is_empty() {
            row.insert(
                format!("{prefix}{TEXT_COLUMN}"),
                texts.join(MULTI_VALUE_SEPARATOR),
            );
        }
        return;
    }

    for key in keys {
        let values: Vec<String> = members
            .iter()
            .filter_map(|m| m.attr(key))
            .map(display_value)
            .collect();
        row.insert(format!("{prefix}{key}"), values.join(MULTI_VALUE_SEPARATOR));
    }
}

/// Group nodes by tag, keeping first-seen tag order and document order
/// within each group.
fn group_by_tag<'a>(nodes: impl Iterator<Item = &'a XmlNode>) -> Vec<(&'a str, Vec<&'a XmlNode>)> {
    let mut groups: Vec<(&'a str, Vec<&'a XmlNode>)> = Vec::new();
    for node in nodes {
        match groups.iter_mut().find(|(tag, _)| *tag == node.tag) {
            Some((_, members)) => members.push(node),
            None => groups.push((node.tag.as_str(), vec![node])),
        }
    }
    groups
}

fn trimmed_text(node: &XmlNode) -> Option<&str> {
    node.text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{display_value, flatten, TRUNCATION_MARKER};
    use crate::parse;

    fn cells(xml: &str) -> Vec<(String, String)> {
        let node = parse(xml.as_bytes()).expect("parse");
        flatten(&node)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_element_yields_empty_row() {
        assert!(flatten(&parse(b"<x/>").expect("parse")).is_empty());
    }

    #[test]
    fn attributes_then_text_then_children() {
        let got = cells(r#"<host name="web" comment="dmz">primary<mvia_address address="10.0.0.5"/></host>"#);
        assert_eq!(
            got,
            pairs(&[
                ("name", "web"),
                ("comment", "dmz"),
                ("_text", "primary"),
                ("mvia_address.address", "10.0.0.5"),
            ])
        );
    }

    #[test]
    fn singular_children_recurse_with_prefix() {
        let got = cells(r#"<a><b x="1"><c y="2"><d z="3"/></c></b></a>"#);
        assert_eq!(
            got,
            pairs(&[("b.x", "1"), ("b.c.y", "2"), ("b.c.d.z", "3")])
        );
    }

    #[test]
    fn grouped_children_join_present_values_only() {
        let got = cells(
            r#"<group name="g"><ne_list ref="A"/><ne_list/><ne_list ref="B" extra="e"/></group>"#,
        );
        assert_eq!(
            got,
            pairs(&[("name", "g"), ("ne_list.ref", "A | B"), ("ne_list.extra", "e")])
        );
    }

    #[test]
    fn grouped_children_without_attributes_fall_back_to_text() {
        let got = cells(r#"<dns><server> 1.1.1.1 </server><server>8.8.8.8</server><server/></dns>"#);
        assert_eq!(got, pairs(&[("server._text", "1.1.1.1 | 8.8.8.8")]));
    }

    #[test]
    fn grandchildren_of_groups_flatten_one_level_only() {
        let got = cells(
            r#"<p><e n="1"><m v="a"><deep k="x"/></m></e><e n="2"><m v="b"/></e></p>"#,
        );
        assert_eq!(got, pairs(&[("e.n", "1 | 2"), ("e.m.v", "a | b")]));
    }

    #[test]
    fn flattening_is_deterministic() {
        let node = parse(
            br#"<r a="1"><x k="1"/><x k="2"/><y><z t="q"/></y>text</r>"#,
        )
        .expect("parse");
        assert_eq!(flatten(&node), flatten(&node));
        let first: Vec<String> = flatten(&node).columns().map(str::to_string).collect();
        let second: Vec<String> = flatten(&node).columns().map(str::to_string).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn long_values_are_truncated_with_marker() {
        let long = "a".repeat(600);
        let shown = display_value(&long);
        assert_eq!(shown.len(), 200 + TRUNCATION_MARKER.len());
        assert!(shown.ends_with(TRUNCATION_MARKER));
        assert_eq!(display_value("short"), "short");
        assert_eq!(display_value(&"b".repeat(500)), "b".repeat(500));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let long = "é".repeat(501);
        let shown = display_value(&long);
        assert!(shown.starts_with(&"é".repeat(200)));
        assert!(shown.ends_with(TRUNCATION_MARKER));
    }
}

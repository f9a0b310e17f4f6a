use std::path::PathBuf;

use pretty_assertions::assert_eq;
use xml_table_core::{parse_file, tabulate, Placement, ROOT_TABLE, SUMMARY_TABLE};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn tabulates_every_tag_of_the_export() {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    let tab = tabulate(&root);

    assert!(tab.tables.contains_key(ROOT_TABLE));
    assert!(tab.tables.contains_key(SUMMARY_TABLE));
    for summary in &tab.summary {
        let table = tab.table_for_tag(&summary.tag).expect("table per tag");
        assert_eq!(table.count, summary.count);
        assert_eq!(table.rows.len(), summary.count);
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
    }
}

#[test]
fn host_table_merges_nested_and_flat_addresses() {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    let tab = tabulate(&root);
    let hosts = tab.table_for_tag("host").expect("host table");

    assert_eq!(
        hosts.columns,
        vec!["name", "comment", "mvia_address.address", "address"]
    );
    assert_eq!(hosts.placement, Some(Placement::Direct));
    assert_eq!(
        hosts.rows[0],
        vec!["Sales Laptop #12", "sales floor", "10.0.0.5", ""]
    );
    assert_eq!(hosts.rows[2], vec!["Legacy Printer", "", "", "10.0.0.9"]);
}

#[test]
fn group_members_become_multi_valued_cells() {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    let tab = tabulate(&root);
    let groups = tab.table_for_tag("group").expect("group table");

    assert_eq!(groups.columns, vec!["name", "ne_list.ref"]);
    assert_eq!(
        groups.rows[0],
        vec!["Web Servers", "WebSrv | DNS (TCP) | GhostObj | WebSrv"]
    );
    // single member is a singular child, not a group
    assert_eq!(groups.rows[1], vec!["Forward Group", "Late Host"]);
}

#[test]
fn deep_policy_tags_are_nested() {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    let tab = tabulate(&root);
    let rule_entry = tab
        .summary
        .iter()
        .find(|s| s.tag == "rule_entry")
        .expect("rule_entry summary");
    assert_eq!(rule_entry.placement, Placement::Nested);
    assert_eq!(rule_entry.count, 2);
}

#[test]
fn tabulation_is_repeatable() {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    assert_eq!(tabulate(&root), tabulate(&root));
}

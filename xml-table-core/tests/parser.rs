use std::fs;
use std::path::PathBuf;

use xml_table_core::{parse, parse_file, ParseError};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_attributes_empty_and_nested_elements() {
    let node = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "generic_import_export");
    assert_eq!(node.attr("build"), Some("11070"));

    let host = node.get_child("host").expect("host should exist");
    assert_eq!(host.attr("name"), Some("Sales Laptop #12"));
    let address = host.get_child("mvia_address").expect("nested address");
    assert_eq!(address.attr("address"), Some("10.0.0.5"));

    let group = node
        .get_children("group")
        .into_iter()
        .find(|g| g.attr("name") == Some("Web Servers"))
        .expect("group should exist");
    assert_eq!(group.get_children("ne_list").len(), 4);
}

#[test]
fn finds_deep_elements_in_document_order() {
    let node = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse should succeed");
    let names: Vec<&str> = node
        .iter_tag("host")
        .filter_map(|h| h.attr("name"))
        .collect();
    assert_eq!(
        names,
        vec![
            "Sales Laptop #12",
            "WebSrv",
            "Legacy Printer",
            "No Address",
            "Late Host"
        ]
    );
    assert_eq!(node.iter_tag("rule_entry").count(), 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(&fixture("fixtures/does-not-exist.xml")).expect_err("should fail");
    assert!(matches!(err, ParseError::Io(_)));
}

#[test]
fn truncated_document_fails_without_partial_tree() {
    let err = parse(b"<generic_import_export><host name=\"a\"/><host").expect_err("should fail");
    assert!(!err.to_string().is_empty());
}

#[test]
fn parses_file_with_declaration_comments_and_cdata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("export.xml");
    fs::write(
        &path,
        "<?xml version=\"1.0\"?>\n<!-- exported -->\n<generic_import_export>\
         <host name=\"A\"><![CDATA[note <1>]]></host></generic_import_export>",
    )
    .expect("write");

    let node = parse_file(&path).expect("parse");
    let host = node.get_child("host").expect("host");
    assert_eq!(host.text.as_deref(), Some("note <1>"));
}

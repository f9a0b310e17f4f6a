use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use fpfg_convert::extract::{extract_objects, ExtractOptions, Extraction};
use fpfg_convert::push::{PushSession, SessionState};
use fpfg_convert::push_report::OutcomeKind;
use fpfg_convert::record::{Category, ObjectRecord};
use fpfg_convert::store::{ConnectionInfo, RemoteObjectStore, StoreError, StoreResponse};
use pretty_assertions::assert_eq;
use serde_json::Value;
use xml_table_core::{parse, parse_file};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn extract(options: &ExtractOptions) -> Extraction {
    let root = parse_file(&fixture("fixtures/smc-export.xml")).expect("parse");
    extract_objects(&root, options)
}

/// Records every call; existing names per category are preloaded.
#[derive(Default)]
struct RecordingStore {
    existing: BTreeMap<Category, BTreeSet<String>>,
    created: Vec<(Category, Value)>,
    updated: Vec<(Category, String)>,
}

impl RemoteObjectStore for RecordingStore {
    fn test_connection(&mut self) -> Result<ConnectionInfo, StoreError> {
        Ok(ConnectionInfo::default())
    }

    fn list_existing(&mut self, category: Category) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.existing.get(&category).cloned().unwrap_or_default())
    }

    fn create(&mut self, category: Category, payload: &Value) -> Result<StoreResponse, StoreError> {
        self.created.push((category, payload.clone()));
        Ok(StoreResponse {
            status: 200,
            body: String::new(),
        })
    }

    fn update(
        &mut self,
        category: Category,
        name: &str,
        _payload: &Value,
    ) -> Result<StoreResponse, StoreError> {
        self.updated.push((category, name.to_string()));
        Ok(StoreResponse {
            status: 204,
            body: String::new(),
        })
    }
}

#[test]
fn host_with_nested_address_becomes_host_mask_address() {
    let extraction = extract(&ExtractOptions::default());
    let ObjectRecord::Host(host) = &extraction.records(Category::Hosts)[0] else {
        panic!("expected host");
    };
    assert_eq!(host.name, "Sales_Laptop_12");
    assert_eq!(host.subnet(), "10.0.0.5 255.255.255.255");
}

#[test]
fn network_prefix_becomes_netmask() {
    let extraction = extract(&ExtractOptions::default());
    let networks = extraction.records(Category::Networks);
    assert_eq!(networks.len(), 1);
    let ObjectRecord::Network(net) = &networks[0] else {
        panic!("expected network");
    };
    assert_eq!(net.address, Ipv4Addr::new(192, 168, 1, 0));
    assert_eq!(net.netmask, Ipv4Addr::new(255, 255, 255, 0));
}

#[test]
fn group_members_resolve_locally_and_through_builtins() {
    let extraction = extract(&ExtractOptions::default());
    let ObjectRecord::AddressGroup(group) = &extraction.records(Category::NetGroups)[0] else {
        panic!("expected group");
    };
    assert_eq!(group.members, vec!["WebSrv", "DNS"]);
    assert_eq!(group.skipped_refs, vec!["GhostObj"]);

    let names: Vec<&str> = extraction
        .records(Category::NetGroups)
        .iter()
        .map(|r| r.name())
        .collect();
    assert_eq!(names, vec!["Web_Servers", "Forward_Group"]);
}

#[test]
fn address_range_splits_into_start_and_end() {
    let extraction = extract(&ExtractOptions::default());
    let ObjectRecord::AddressRange(range) = &extraction.records(Category::AddrRanges)[0] else {
        panic!("expected range");
    };
    assert_eq!(range.start_ip, Ipv4Addr::new(10, 1, 1, 10));
    assert_eq!(range.end_ip, Ipv4Addr::new(10, 1, 1, 20));
}

#[test]
fn existing_objects_are_updated_not_created() {
    let extraction = extract(&ExtractOptions::default());
    let mut store = RecordingStore::default();
    store
        .existing
        .insert(Category::Hosts, BTreeSet::from(["WebSrv".to_string()]));

    let mut session = PushSession::new(store);
    session.connect().expect("connect");
    let report = session.push(&extraction).expect("push");
    assert_eq!(session.state(), SessionState::Idle);

    let web = report
        .category(Category::Hosts)
        .expect("hosts")
        .outcomes
        .iter()
        .find(|o| o.name == "WebSrv")
        .expect("WebSrv outcome");
    assert_eq!(web.kind, OutcomeKind::Ok);
    assert_eq!(web.code, Some(204));

    let store = session.into_store();
    assert_eq!(store.updated, vec![(Category::Hosts, "WebSrv".to_string())]);
    assert!(store
        .created
        .iter()
        .all(|(_, payload)| payload["name"] != "WebSrv"));
}

#[test]
fn full_push_reports_every_record_in_dependency_order() {
    let extraction = extract(&ExtractOptions::default());
    let mut session = PushSession::new(RecordingStore::default());
    session.connect().expect("connect");
    let report = session.push(&extraction).expect("push");

    let order: Vec<Category> = report.categories.iter().map(|c| c.category).collect();
    assert_eq!(
        order,
        vec![
            Category::Hosts,
            Category::Networks,
            Category::AddrRanges,
            Category::NetGroups,
            Category::Services,
            Category::ServiceGroups,
        ]
    );
    // 11 objects plus one skip per unresolved group member
    assert_eq!(report.totals.ok, 11);
    assert_eq!(report.totals.skip, 2);
    assert_eq!(report.totals.error, 0);

    let skipped: Vec<&str> = report
        .filter(OutcomeKind::Skip)
        .into_iter()
        .map(|(_, o)| o.name.as_str())
        .collect();
    assert_eq!(skipped, vec!["GhostObj", "Missing Svc"]);

    let store = session.into_store();
    let (_, service) = store
        .created
        .iter()
        .find(|(c, p)| *c == Category::Services && p["name"] == "Web_Range")
        .expect("Web_Range created");
    assert_eq!(service["tcp-portrange"], "8000-8090");
    assert_eq!(service["comment"], "dev servers");
}

#[test]
fn icmp_service_is_pushed_before_the_group_that_uses_it() {
    let root = parse(
        br#"<generic_import_export>
            <gen_service_group name="Diag">
                <service_ref ref="My Ping"/>
                <service_ref ref="Ping"/>
            </gen_service_group>
            <service_icmp name="My Ping" icmp_type="8"/>
        </generic_import_export>"#,
    )
    .expect("parse");
    let extraction = extract_objects(&root, &ExtractOptions::default());

    let mut session = PushSession::new(RecordingStore::default());
    session.connect().expect("connect");
    let report = session.push(&extraction).expect("push");
    assert_eq!(report.totals.ok, 2);
    assert_eq!(report.totals.skip, 0);

    let store = session.into_store();
    let created: Vec<(Category, &str)> = store
        .created
        .iter()
        .map(|(c, p)| (*c, p["name"].as_str().unwrap_or_default()))
        .collect();
    assert_eq!(
        created,
        vec![(Category::Services, "My_Ping"), (Category::ServiceGroups, "Diag")]
    );
    assert_eq!(store.created[0].1["protocol"], "ICMP");
    assert_eq!(store.created[0].1["icmptype"], 8);
    assert_eq!(
        store.created[1].1["member"],
        serde_json::json!([{ "name": "My_Ping" }, { "name": "PING" }])
    );
}

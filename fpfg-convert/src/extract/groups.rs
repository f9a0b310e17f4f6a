use xml_table_core::XmlNode;

use super::canonical_name;
use crate::names::NameRegistry;
use crate::record::{GroupRecord, ObjectRecord};
use crate::resolve::{resolve_members, Resolver};

pub(super) fn extract_address_groups(
    root: &XmlNode,
    registry: &NameRegistry,
    resolver: &Resolver<'_>,
) -> Vec<ObjectRecord> {
    extract_groups(root, "group", "ne_list", registry, resolver)
        .into_iter()
        .map(ObjectRecord::AddressGroup)
        .collect()
}

pub(super) fn extract_service_groups(
    root: &XmlNode,
    registry: &NameRegistry,
    resolver: &Resolver<'_>,
) -> Vec<ObjectRecord> {
    extract_groups(root, "gen_service_group", "service_ref", registry, resolver)
        .into_iter()
        .map(ObjectRecord::ServiceGroup)
        .collect()
}

/// Groups whose direct `member_tag@ref` children resolve to at least one
/// member.
fn extract_groups(
    root: &XmlNode,
    group_tag: &str,
    member_tag: &str,
    registry: &NameRegistry,
    resolver: &Resolver<'_>,
) -> Vec<GroupRecord> {
    let mut out = Vec::new();
    for node in root.iter_tag(group_tag) {
        let orig = node.attr_trimmed("name");
        if orig.is_empty() {
            continue;
        }
        let refs = node
            .get_children(member_tag)
            .into_iter()
            .map(|member| member.attr_trimmed("ref"));
        let (members, skipped_refs) = resolve_members(resolver, refs);
        if members.is_empty() {
            tracing::debug!(group = orig, skipped = skipped_refs.len(), "group has no members");
            continue;
        }

        out.push(GroupRecord {
            name: canonical_name(registry, group_tag, orig),
            orig_name: orig.to_string(),
            members,
            skipped_refs,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_table_core::parse;

    use super::{extract_address_groups, extract_service_groups};
    use crate::builtins::default_builtin_table;
    use crate::extract::{build_registry, Namespace};
    use crate::record::ObjectRecord;
    use crate::resolve::Resolver;

    const DOC: &[u8] = br#"<generic_import_export>
        <host name="WebSrv"><mvia_address address="192.168.10.10"/></host>
        <host name="A"/><host name="B"/><host name="C"/>
        <group name="Web Servers">
            <ne_list ref="WebSrv"/>
            <ne_list ref="DNS (TCP)"/>
            <ne_list ref="GhostObj"/>
            <ne_list ref="WebSrv"/>
        </group>
        <group name="Letters">
            <ne_list ref="A"/><ne_list ref="B"/><ne_list ref="A"/>
            <ne_list ref="C"/><ne_list ref="B"/>
        </group>
        <group name="Only Ghosts"><ne_list ref="GhostObj"/></group>
        <group name="Nested">
            <sub><ne_list ref="A"/></sub>
        </group>
        <service_tcp name="HTTP Alt" min_dst_port="8080"/>
        <gen_service_group name="Web Services">
            <service_ref ref="HTTP Alt"/>
            <service_ref ref="HTTPS"/>
            <service_ref ref="Missing Svc"/>
        </gen_service_group>
    </generic_import_export>"#;

    fn group_fields(record: &ObjectRecord) -> (&str, Vec<&str>, Vec<&str>) {
        match record {
            ObjectRecord::AddressGroup(g) | ObjectRecord::ServiceGroup(g) => (
                g.name.as_str(),
                g.members.iter().map(String::as_str).collect(),
                g.skipped_refs.iter().map(String::as_str).collect(),
            ),
            other => panic!("not a group: {other:?}"),
        }
    }

    #[test]
    fn address_groups_resolve_dedupe_and_skip() {
        let root = parse(DOC).expect("parse");
        let scopes = build_registry(&root, false);
        let registry = scopes.get(Namespace::Address);
        let table = default_builtin_table();
        let resolver = Resolver::new(registry, Some(&table));

        let groups = extract_address_groups(&root, registry, &resolver);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            group_fields(&groups[0]),
            ("Web_Servers", vec!["WebSrv", "DNS"], vec!["GhostObj"])
        );
        assert_eq!(group_fields(&groups[1]), ("Letters", vec!["A", "B", "C"], vec![]));
    }

    #[test]
    fn builtins_disabled_leaves_predefined_refs_unresolved() {
        let root = parse(DOC).expect("parse");
        let scopes = build_registry(&root, false);
        let registry = scopes.get(Namespace::Address);
        let resolver = Resolver::local_only(registry);

        let groups = extract_address_groups(&root, registry, &resolver);
        assert_eq!(
            group_fields(&groups[0]),
            ("Web_Servers", vec!["WebSrv"], vec!["DNS (TCP)", "GhostObj"])
        );
    }

    #[test]
    fn service_groups_read_service_refs() {
        let root = parse(DOC).expect("parse");
        let scopes = build_registry(&root, false);
        let registry = scopes.get(Namespace::Service);
        let table = default_builtin_table();
        let resolver = Resolver::new(registry, Some(&table));

        let groups = extract_service_groups(&root, registry, &resolver);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            group_fields(&groups[0]),
            ("Web_Services", vec!["HTTP_Alt", "HTTPS"], vec!["Missing Svc"])
        );
    }
}

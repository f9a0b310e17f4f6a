use std::collections::HashSet;

use xml_table_core::XmlNode;

use super::canonical_name;
use crate::names::{sanitize, NameRegistry};
use crate::record::{ObjectRecord, PolicyRecord, ZoneRecord};
use crate::resolve::{dedup_stable, Resolver};

const ZONE_TAGS: &[&str] = &["zone", "interface_zone", "fw_zone"];
const ZONE_REF_HOSTS: &[&str] = &["access_rule", "fw_policy", "rule"];
const ZONE_REF_ATTRS: &[&str] = &[
    "src_zone_ref",
    "dst_zone_ref",
    "source_zone",
    "destination_zone",
    "from_zone",
    "to_zone",
];

/// Longest prefix of a rule comment used as a fallback rule name.
const COMMENT_NAME_LEN: usize = 60;

/// Declared zones first, then zones only known from rule references.
pub(super) fn extract_zones(root: &XmlNode, registry: &NameRegistry) -> Vec<ObjectRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |kind: &str, orig: &str| {
        if !orig.is_empty() && seen.insert(orig.to_string()) {
            out.push(ObjectRecord::Zone(ZoneRecord {
                name: canonical_name(registry, kind, orig),
                orig_name: orig.to_string(),
            }));
        }
    };

    for tag in ZONE_TAGS {
        for node in root.iter_tag(tag) {
            push(*tag, node.attr_trimmed("name"));
        }
    }
    for tag in ZONE_REF_HOSTS {
        for node in root.iter_tag(tag) {
            for attr in ZONE_REF_ATTRS {
                push("zone", node.attr_trimmed(attr));
            }
        }
    }
    out
}

/// One record per `rule_entry` below a `fw_policy` that carries an
/// `access_rule`. Rules are numbered across all policies. Sources and
/// destinations resolve as addresses, services as services.
pub(super) fn extract_policies(
    root: &XmlNode,
    addresses: &Resolver<'_>,
    services: &Resolver<'_>,
) -> Vec<ObjectRecord> {
    let mut out = Vec::new();
    let mut counter = 0usize;
    for policy in root.iter_tag("fw_policy") {
        for entry in policy.iter_tag("rule_entry") {
            let Some(rule) = entry.get_child("access_rule") else {
                continue;
            };
            counter += 1;
            out.push(ObjectRecord::Policy(build_policy(
                entry, rule, counter, addresses, services,
            )));
        }
    }
    out
}

fn build_policy(
    entry: &XmlNode,
    rule: &XmlNode,
    number: usize,
    addresses: &Resolver<'_>,
    services: &Resolver<'_>,
) -> PolicyRecord {
    let orig_name = rule_name(entry, number);
    let disabled = entry.attr_trimmed("is_disabled").to_ascii_lowercase();
    let action = rule
        .get_child("action")
        .map(|a| a.attr_trimmed("type"))
        .unwrap_or("");
    let log_level = rule
        .get_child("option")
        .and_then(|o| o.get_child("log_policy"))
        .map(|l| l.attr_trimmed("log_level"))
        .unwrap_or("");

    let match_part = rule.get_child("match_part");
    let mut unresolved = Vec::new();
    let mut side = |tag: &str, resolver: &Resolver<'_>| {
        let refs = match_part.map(|m| match_values(m, tag)).unwrap_or_default();
        refs.into_iter()
            .map(|value| match resolver.resolve(&value).name() {
                Some(name) => name.to_string(),
                None => {
                    unresolved.push(value.clone());
                    value
                }
            })
            .collect::<Vec<_>>()
    };
    let sources = side("match_sources", addresses);
    let destinations = side("match_destinations", addresses);
    let service_refs = side("match_services", services);

    PolicyRecord {
        name: sanitize(&orig_name),
        orig_name,
        enabled: !matches!(disabled.as_str(), "true" | "1"),
        action: action.to_string(),
        log_level: log_level.to_string(),
        sources,
        destinations,
        services: service_refs,
        unresolved_refs: dedup_stable(unresolved),
    }
}

/// `rule_entry@name`, else the start of its comment, else `Rule_<n>`.
fn rule_name(entry: &XmlNode, number: usize) -> String {
    let name = entry.attr_trimmed("name");
    if !name.is_empty() {
        return name.to_string();
    }
    let comment = entry.attr_trimmed("comment");
    if !comment.is_empty() {
        return comment.chars().take(COMMENT_NAME_LEN).collect();
    }
    format!("Rule_{number}")
}

/// De-duplicated `@value` of every child of `match_part/<tag>`.
fn match_values(match_part: &XmlNode, tag: &str) -> Vec<String> {
    let Some(list) = match_part.get_child(tag) else {
        return Vec::new();
    };
    let values = list
        .children
        .iter()
        .map(|child| child.attr_trimmed("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    dedup_stable(values)
}

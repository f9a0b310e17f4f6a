use xml_table_core::XmlNode;

use super::canonical_name;
use crate::names::NameRegistry;
use crate::record::{truncate_comment, ObjectRecord, Protocol, ServiceRecord};

/// TCP services, then UDP, then ICMP.
pub(super) fn extract_services(root: &XmlNode, registry: &NameRegistry) -> Vec<ObjectRecord> {
    let mut out = Vec::new();
    for (tag, protocol) in [("service_tcp", Protocol::Tcp), ("service_udp", Protocol::Udp)] {
        for node in root.iter_tag(tag) {
            let orig = node.attr_trimmed("name");
            if orig.is_empty() {
                continue;
            }
            let Some(port_range) = port_range(node.attr("min_dst_port"), node.attr("max_dst_port"))
            else {
                continue;
            };

            out.push(ObjectRecord::Service(ServiceRecord {
                name: canonical_name(registry, tag, orig),
                orig_name: orig.to_string(),
                protocol,
                port_range: Some(port_range),
                icmp_type: None,
                icmp_code: None,
                comment: truncate_comment(node.attr("comment").unwrap_or("")),
            }));
        }
    }

    for node in root.iter_tag("service_icmp") {
        let orig = node.attr_trimmed("name");
        if orig.is_empty() {
            continue;
        }
        out.push(ObjectRecord::Service(ServiceRecord {
            name: canonical_name(registry, "service_icmp", orig),
            orig_name: orig.to_string(),
            protocol: Protocol::Icmp,
            port_range: None,
            icmp_type: icmp_value(node, "icmp_type"),
            icmp_code: icmp_value(node, "icmp_code"),
            comment: truncate_comment(node.attr("comment").unwrap_or("")),
        }));
    }
    out
}

/// An ICMP type or code attribute. Missing or invalid values mean "any".
fn icmp_value(node: &XmlNode, attr: &str) -> Option<u8> {
    let raw = node.attr_trimmed(attr);
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                service = node.attr_trimmed("name"),
                attr,
                value = raw,
                "ignoring invalid ICMP value"
            );
            None
        }
    }
}

/// FortiOS port range from Forcepoint destination port bounds.
///
/// A missing or empty maximum, or one equal to the minimum, yields a single
/// port. Returns `None` without a minimum.
pub fn port_range(min: Option<&str>, max: Option<&str>) -> Option<String> {
    let min = min.map(str::trim).filter(|p| !p.is_empty())?;
    match max.map(str::trim) {
        Some(max) if !max.is_empty() && max != min => Some(format!("{min}-{max}")),
        _ => Some(min.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_table_core::parse;

    use super::{extract_services, port_range};
    use crate::extract::{build_registry, Namespace};
    use crate::record::{ObjectRecord, Protocol};

    #[test]
    fn port_range_forms() {
        assert_eq!(port_range(Some("80"), None), Some("80".to_string()));
        assert_eq!(port_range(Some("80"), Some("80")), Some("80".to_string()));
        assert_eq!(port_range(Some("80"), Some(" ")), Some("80".to_string()));
        assert_eq!(
            port_range(Some("8000"), Some("8090")),
            Some("8000-8090".to_string())
        );
        assert_eq!(port_range(Some(" "), Some("90")), None);
        assert_eq!(port_range(None, None), None);
    }

    #[test]
    fn tcp_then_udp_then_icmp() {
        let root = parse(
            br#"<generic_import_export>
                <service_icmp name="Echo Request" icmp_type="8" icmp_code="0"/>
                <service_udp name="Syslog UDP" min_dst_port="514" max_dst_port="514"/>
                <service_tcp name="HTTP Alt" min_dst_port="8080"/>
                <service_tcp name="Web Range" min_dst_port="8000" max_dst_port="8090" comment="dev"/>
                <service_tcp name="No Port"/>
                <service_icmp name="Any ICMP"/>
                <service_icmp name="Odd ICMP" icmp_type="300"/>
            </generic_import_export>"#,
        )
        .expect("parse");
        let scopes = build_registry(&root, false);
        let services = extract_services(&root, scopes.get(Namespace::Service));

        let summary: Vec<(String, Protocol, Option<String>, Option<u8>)> = services
            .iter()
            .map(|record| match record {
                ObjectRecord::Service(s) => {
                    (s.name.clone(), s.protocol, s.port_range.clone(), s.icmp_type)
                }
                other => panic!("not a service: {other:?}"),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("HTTP_Alt".to_string(), Protocol::Tcp, Some("8080".to_string()), None),
                ("Web_Range".to_string(), Protocol::Tcp, Some("8000-8090".to_string()), None),
                ("Syslog_UDP".to_string(), Protocol::Udp, Some("514".to_string()), None),
                ("Echo_Request".to_string(), Protocol::Icmp, None, Some(8)),
                ("Any_ICMP".to_string(), Protocol::Icmp, None, None),
                ("Odd_ICMP".to_string(), Protocol::Icmp, None, None),
            ]
        );
    }
}

use std::net::Ipv4Addr;

use xml_table_core::XmlNode;

use super::canonical_name;
use crate::names::NameRegistry;
use crate::record::{
    truncate_comment, AddressRangeRecord, HostRecord, NetworkRecord, ObjectRecord,
};

pub(super) fn extract_hosts(
    root: &XmlNode,
    registry: &NameRegistry,
    address_fallback: bool,
) -> Vec<ObjectRecord> {
    let mut out = Vec::new();
    for node in root.iter_tag("host") {
        let orig = node.attr_trimmed("name");
        if orig.is_empty() {
            continue;
        }
        let mut address = node
            .get_child("mvia_address")
            .map(|child| child.attr_trimmed("address"))
            .unwrap_or("");
        if address.is_empty() && address_fallback {
            address = node.attr_trimmed("address");
        }
        let Ok(address) = address.parse::<Ipv4Addr>() else {
            continue;
        };

        out.push(ObjectRecord::Host(HostRecord {
            name: canonical_name(registry, "host", orig),
            orig_name: orig.to_string(),
            address,
            comment: truncate_comment(node.attr("comment").unwrap_or("")),
        }));
    }
    out
}

pub(super) fn extract_networks(root: &XmlNode, registry: &NameRegistry) -> Vec<ObjectRecord> {
    let mut out = Vec::new();
    for node in root.iter_tag("network") {
        let orig = node.attr_trimmed("name");
        if orig.is_empty() {
            continue;
        }
        let Some((address, netmask)) = parse_ipv4_network(node.attr_trimmed("ipv4_network"))
        else {
            continue;
        };

        out.push(ObjectRecord::Network(NetworkRecord {
            name: canonical_name(registry, "network", orig),
            orig_name: orig.to_string(),
            address,
            netmask,
            comment: truncate_comment(node.attr("comment").unwrap_or("")),
        }));
    }
    out
}

pub(super) fn extract_address_ranges(
    root: &XmlNode,
    registry: &NameRegistry,
) -> Vec<ObjectRecord> {
    let mut out = Vec::new();
    for node in root.iter_tag("address_range") {
        let orig = node.attr_trimmed("name");
        if orig.is_empty() {
            continue;
        }
        let Some((start, end)) = node.attr_trimmed("ip_range").split_once('-') else {
            continue;
        };
        let (Ok(start_ip), Ok(end_ip)) =
            (start.trim().parse::<Ipv4Addr>(), end.trim().parse::<Ipv4Addr>())
        else {
            continue;
        };

        out.push(ObjectRecord::AddressRange(AddressRangeRecord {
            name: canonical_name(registry, "address_range", orig),
            orig_name: orig.to_string(),
            start_ip,
            end_ip,
            comment: truncate_comment(node.attr("comment").unwrap_or("")),
        }));
    }
    out
}

/// Parse `a.b.c.d/len` or `a.b.c.d/m.m.m.m` into (network address, netmask).
///
/// Host bits are cleared. Non-contiguous netmasks are rejected.
pub fn parse_ipv4_network(value: &str) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let (addr, mask) = value.trim().split_once('/')?;
    let addr: Ipv4Addr = addr.trim().parse().ok()?;
    let mask = mask.trim();

    let bits = match mask.parse::<u32>() {
        Ok(len) if len <= 32 => u32::MAX.checked_shl(32 - len).unwrap_or(0),
        Ok(_) => return None,
        Err(_) => {
            let bits = u32::from(mask.parse::<Ipv4Addr>().ok()?);
            if bits.leading_ones() + bits.trailing_zeros() != 32 {
                return None;
            }
            bits
        }
    };

    Some((
        Ipv4Addr::from(u32::from(addr) & bits),
        Ipv4Addr::from(bits),
    ))
}

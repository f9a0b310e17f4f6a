//! Normalized objects produced by extraction and consumed by the push
//! orchestrator.

use std::fmt::{self, Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{json, Value};

/// Longest comment FortiOS accepts on an object.
pub const MAX_COMMENT_LEN: usize = 255;

/// Object categories, in the order they are extracted and pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Category {
    Hosts,
    Networks,
    AddrRanges,
    NetGroups,
    Services,
    ServiceGroups,
    Zones,
    Policies,
}

/// Categories the FortiGate CMDB accepts, in dependency order: plain
/// addresses before the groups that reference them, services before
/// service groups.
pub const PUSH_ORDER: [Category; 6] = [
    Category::Hosts,
    Category::Networks,
    Category::AddrRanges,
    Category::NetGroups,
    Category::Services,
    Category::ServiceGroups,
];

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Hosts,
        Category::Networks,
        Category::AddrRanges,
        Category::NetGroups,
        Category::Services,
        Category::ServiceGroups,
        Category::Zones,
        Category::Policies,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Hosts => "hosts",
            Category::Networks => "networks",
            Category::AddrRanges => "addr_ranges",
            Category::NetGroups => "net_groups",
            Category::Services => "services",
            Category::ServiceGroups => "service_groups",
            Category::Zones => "zones",
            Category::Policies => "policies",
        }
    }

    /// CMDB path below `/api/v2/cmdb/`, or `None` for categories that are
    /// extracted for review only.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            Category::Hosts | Category::Networks | Category::AddrRanges => {
                Some("firewall/address")
            }
            Category::NetGroups => Some("firewall/addrgrp"),
            Category::Services => Some("firewall.service/custom"),
            Category::ServiceGroups => Some("firewall.service/group"),
            Category::Zones | Category::Policies => None,
        }
    }

    pub fn is_pushable(self) -> bool {
        self.endpoint().is_some()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.key() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        }
    }

    /// FortiOS payload key carrying the port range; ICMP has none.
    pub fn portrange_key(self) -> Option<&'static str> {
        match self {
            Protocol::Tcp => Some("tcp-portrange"),
            Protocol::Udp => Some("udp-portrange"),
            Protocol::Icmp => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    pub name: String,
    pub orig_name: String,
    pub address: Ipv4Addr,
    pub comment: String,
}

impl HostRecord {
    pub fn subnet(&self) -> String {
        format!("{} {}", self.address, Ipv4Addr::BROADCAST)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRecord {
    pub name: String,
    pub orig_name: String,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub comment: String,
}

impl NetworkRecord {
    pub fn subnet(&self) -> String {
        format!("{} {}", self.address, self.netmask)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRangeRecord {
    pub name: String,
    pub orig_name: String,
    pub start_ip: Ipv4Addr,
    pub end_ip: Ipv4Addr,
    pub comment: String,
}

/// Address group or service group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRecord {
    pub name: String,
    pub orig_name: String,
    pub members: Vec<String>,
    pub skipped_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    pub orig_name: String,
    pub protocol: Protocol,
    /// Destination ports for TCP and UDP services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range: Option<String>,
    /// ICMP type; `None` matches every type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icmp_code: Option<u8>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRecord {
    pub name: String,
    pub orig_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRecord {
    pub name: String,
    pub orig_name: String,
    pub enabled: bool,
    pub action: String,
    pub log_level: String,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub services: Vec<String>,
    pub unresolved_refs: Vec<String>,
}

/// One extracted object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectRecord {
    Host(HostRecord),
    Network(NetworkRecord),
    AddressRange(AddressRangeRecord),
    AddressGroup(GroupRecord),
    Service(ServiceRecord),
    ServiceGroup(GroupRecord),
    Zone(ZoneRecord),
    Policy(PolicyRecord),
}

impl ObjectRecord {
    pub fn name(&self) -> &str {
        match self {
            ObjectRecord::Host(r) => &r.name,
            ObjectRecord::Network(r) => &r.name,
            ObjectRecord::AddressRange(r) => &r.name,
            ObjectRecord::AddressGroup(r) | ObjectRecord::ServiceGroup(r) => &r.name,
            ObjectRecord::Service(r) => &r.name,
            ObjectRecord::Zone(r) => &r.name,
            ObjectRecord::Policy(r) => &r.name,
        }
    }

    pub fn orig_name(&self) -> &str {
        match self {
            ObjectRecord::Host(r) => &r.orig_name,
            ObjectRecord::Network(r) => &r.orig_name,
            ObjectRecord::AddressRange(r) => &r.orig_name,
            ObjectRecord::AddressGroup(r) | ObjectRecord::ServiceGroup(r) => &r.orig_name,
            ObjectRecord::Service(r) => &r.orig_name,
            ObjectRecord::Zone(r) => &r.orig_name,
            ObjectRecord::Policy(r) => &r.orig_name,
        }
    }

    /// References dropped from a group because they did not resolve.
    pub fn skipped_refs(&self) -> &[String] {
        match self {
            ObjectRecord::AddressGroup(r) | ObjectRecord::ServiceGroup(r) => &r.skipped_refs,
            _ => &[],
        }
    }

    /// FortiOS CMDB body for this object, or `None` for review-only records.
    pub fn payload(&self) -> Option<Value> {
        let payload = match self {
            ObjectRecord::Host(r) => json!({
                "name": r.name,
                "comment": truncate_comment(&r.comment),
                "type": "ipmask",
                "subnet": r.subnet(),
            }),
            ObjectRecord::Network(r) => json!({
                "name": r.name,
                "comment": truncate_comment(&r.comment),
                "type": "ipmask",
                "subnet": r.subnet(),
            }),
            ObjectRecord::AddressRange(r) => json!({
                "name": r.name,
                "comment": truncate_comment(&r.comment),
                "type": "iprange",
                "start-ip": r.start_ip.to_string(),
                "end-ip": r.end_ip.to_string(),
            }),
            ObjectRecord::AddressGroup(r) | ObjectRecord::ServiceGroup(r) => json!({
                "name": r.name,
                "member": r
                    .members
                    .iter()
                    .map(|m| json!({ "name": m }))
                    .collect::<Vec<_>>(),
            }),
            ObjectRecord::Service(r) => {
                let mut body = json!({
                    "name": r.name,
                    "protocol": r.protocol.as_str(),
                    "comment": truncate_comment(&r.comment),
                });
                if let (Some(key), Some(range)) = (r.protocol.portrange_key(), &r.port_range) {
                    body[key] = Value::String(range.clone());
                }
                if let Some(icmp_type) = r.icmp_type {
                    body["icmptype"] = Value::from(icmp_type);
                    if let Some(icmp_code) = r.icmp_code {
                        body["icmpcode"] = Value::from(icmp_code);
                    }
                }
                body
            }
            ObjectRecord::Zone(_) | ObjectRecord::Policy(_) => return None,
        };
        Some(payload)
    }
}

/// Cut a comment to [`MAX_COMMENT_LEN`] characters.
pub fn truncate_comment(comment: &str) -> String {
    comment.chars().take(MAX_COMMENT_LEN).collect()
}

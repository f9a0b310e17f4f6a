//! Object extraction from a parsed Forcepoint SMC export.
//!
//! Extraction reads raw element attributes, never flattened rows. It runs in
//! two passes: every object name in the document is registered first, then
//! each category is extracted in document order and references resolve
//! against the complete registry. A group may therefore name an object that
//! appears later in the file.
//!
//! FortiOS keeps addresses, services and policy objects in separate name
//! tables, so each [`Namespace`] has its own registry and references resolve
//! only within the namespace they point into.
//!
//! Elements that cannot be expressed on a FortiGate (no name, unparseable
//! address, missing port) are dropped without error.

mod addresses;
mod groups;
mod policy;
mod services;

use std::collections::BTreeMap;

use serde::Serialize;
use xml_table_core::XmlNode;

use crate::builtins::{default_builtin_table, BuiltinTable};
use crate::names::{sanitize, NameMapping, NameRegistry};
use crate::record::{Category, ObjectRecord};
use crate::resolve::Resolver;

pub use addresses::parse_ipv4_network;
pub use services::port_range;

/// Tags whose `name` attributes define address objects.
pub const ADDRESS_TAGS: &[&str] = &["host", "network", "address_range", "group"];

/// Tags whose `name` attributes define service objects.
pub const SERVICE_TAGS: &[&str] = &[
    "service_tcp",
    "service_udp",
    "service_icmp",
    "gen_service_group",
];

/// Additional tags registered when policy objects are extracted.
pub const POLICY_OBJECT_TAGS: &[&str] = &["interface", "zone", "fw_policy", "access_rule"];

/// A FortiOS name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Address,
    Service,
    Policy,
}

impl Namespace {
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Namespace::Address => ADDRESS_TAGS,
            Namespace::Service => SERVICE_TAGS,
            Namespace::Policy => POLICY_OBJECT_TAGS,
        }
    }
}

/// One [`NameRegistry`] per [`Namespace`].
#[derive(Debug, Default)]
pub struct NameScopes {
    addresses: NameRegistry,
    services: NameRegistry,
    policy: NameRegistry,
}

impl NameScopes {
    pub fn get(&self, namespace: Namespace) -> &NameRegistry {
        match namespace {
            Namespace::Address => &self.addresses,
            Namespace::Service => &self.services,
            Namespace::Policy => &self.policy,
        }
    }

    fn get_mut(&mut self, namespace: Namespace) -> &mut NameRegistry {
        match namespace {
            Namespace::Address => &mut self.addresses,
            Namespace::Service => &mut self.services,
            Namespace::Policy => &mut self.policy,
        }
    }

    /// Changed names of every namespace, addresses first.
    pub fn into_mapping(self) -> NameMapping {
        let mut mapping = self.addresses.into_mapping();
        mapping.append(self.services.into_mapping());
        mapping.append(self.policy.into_mapping());
        mapping
    }
}

/// Extraction policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Read a host's address from its own `address` attribute when it has no
    /// `mvia_address` child.
    pub host_address_fallback: bool,
    /// Resolve references to Forcepoint predefined objects through the
    /// built-in table.
    pub use_builtins: bool,
    /// Also extract zones and firewall policy rules.
    pub include_policy_objects: bool,
    /// Replacement for the embedded built-in table.
    pub builtins: Option<BuiltinTable>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            host_address_fallback: false,
            use_builtins: true,
            include_policy_objects: false,
            builtins: None,
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    #[serde(flatten)]
    pub objects: BTreeMap<Category, Vec<ObjectRecord>>,
    /// Original → canonical names that changed during sanitizing.
    pub name_map: NameMapping,
}

impl Extraction {
    /// Records of one category; empty when the category was not extracted.
    pub fn records(&self, category: Category) -> &[ObjectRecord] {
        self.objects
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, category: Category) -> usize {
        self.records(category).len()
    }

    pub fn total(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    /// Extracted categories with their record counts, in category order.
    pub fn counts(&self) -> Vec<(Category, usize)> {
        self.objects
            .iter()
            .map(|(category, records)| (*category, records.len()))
            .collect()
    }
}

/// Extract every supported object from `root`.
pub fn extract_objects(root: &XmlNode, options: &ExtractOptions) -> Extraction {
    let scopes = build_registry(root, options.include_policy_objects);
    let address_names = scopes.get(Namespace::Address);
    let service_names = scopes.get(Namespace::Service);

    let embedded;
    let builtins = if !options.use_builtins {
        None
    } else if let Some(table) = &options.builtins {
        Some(table)
    } else {
        embedded = default_builtin_table();
        Some(&embedded)
    };
    let address_resolver = Resolver::new(address_names, builtins);
    let service_resolver = Resolver::new(service_names, builtins);

    let mut objects = BTreeMap::new();
    objects.insert(
        Category::Hosts,
        addresses::extract_hosts(root, address_names, options.host_address_fallback),
    );
    objects.insert(Category::Networks, addresses::extract_networks(root, address_names));
    objects.insert(
        Category::AddrRanges,
        addresses::extract_address_ranges(root, address_names),
    );
    objects.insert(
        Category::NetGroups,
        groups::extract_address_groups(root, address_names, &address_resolver),
    );
    objects.insert(Category::Services, services::extract_services(root, service_names));
    objects.insert(
        Category::ServiceGroups,
        groups::extract_service_groups(root, service_names, &service_resolver),
    );
    if options.include_policy_objects {
        objects.insert(
            Category::Zones,
            policy::extract_zones(root, scopes.get(Namespace::Policy)),
        );
        objects.insert(
            Category::Policies,
            policy::extract_policies(root, &address_resolver, &service_resolver),
        );
    }

    for (category, records) in &objects {
        tracing::debug!(category = category.key(), count = records.len(), "extracted");
    }

    Extraction {
        objects,
        name_map: scopes.into_mapping(),
    }
}

/// Register every object name in the document, namespace by namespace and
/// tag by tag in the order of [`Namespace::tags`]. Policy objects are only
/// registered when requested.
pub fn build_registry(root: &XmlNode, include_policy_objects: bool) -> NameScopes {
    let mut scopes = NameScopes::default();
    let mut namespaces = vec![Namespace::Address, Namespace::Service];
    if include_policy_objects {
        namespaces.push(Namespace::Policy);
    }
    for namespace in namespaces {
        let registry = scopes.get_mut(namespace);
        for tag in namespace.tags() {
            for node in root.iter_tag(tag) {
                let name = node.attr_trimmed("name");
                if !name.is_empty() {
                    registry.register_kind(tag, name);
                }
            }
        }
    }
    scopes
}

/// Canonical name of an element of `kind`, falling back to the first
/// registration of `original` and then to a plain sanitize.
fn canonical_name(registry: &NameRegistry, kind: &str, original: &str) -> String {
    registry
        .canonical_for(kind, original)
        .or_else(|| registry.lookup(original))
        .map(str::to_string)
        .unwrap_or_else(|| sanitize(original))
}

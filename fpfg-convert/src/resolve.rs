//! Reference resolution against one namespace's name registry and the
//! built-in table.
//!
//! ## Decision order
//!
//! 1. The reference names an object defined in the document → its canonical
//!    name.
//! 2. The reference names a known Forcepoint predefined object → the
//!    FortiGate predefined equivalent.
//! 3. Otherwise it is unresolved. That is not an error: Forcepoint platform
//!    defaults are referenced freely but never exported, so callers record
//!    the miss and carry on.

use serde::Serialize;

use crate::builtins::BuiltinTable;
use crate::names::NameRegistry;

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Resolution {
    /// Defined in the document; holds the canonical name.
    Local(String),
    /// Mapped to a target built-in object.
    BuiltIn(String),
    /// Neither defined locally nor a known built-in.
    Unresolved,
}

impl Resolution {
    /// The target-side name, if the reference resolved.
    pub fn name(&self) -> Option<&str> {
        match self {
            Resolution::Local(name) | Resolution::BuiltIn(name) => Some(name),
            Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// Resolves references for one extraction run.
///
/// Built on a fully pre-populated registry, so forward references resolve
/// exactly like backward ones.
pub struct Resolver<'a> {
    registry: &'a NameRegistry,
    builtins: Option<&'a BuiltinTable>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a NameRegistry, builtins: Option<&'a BuiltinTable>) -> Self {
        Self { registry, builtins }
    }

    /// A resolver that treats every non-local reference as unresolved.
    pub fn local_only(registry: &'a NameRegistry) -> Self {
        Self::new(registry, None)
    }

    pub fn resolve(&self, reference: &str) -> Resolution {
        let reference = reference.trim();
        if let Some(canonical) = self.registry.lookup(reference) {
            return Resolution::Local(canonical.to_string());
        }
        if let Some(target) = self.builtins.and_then(|table| table.get(reference)) {
            return Resolution::BuiltIn(target.to_string());
        }
        Resolution::Unresolved
    }
}

/// Resolve a list of references into de-duplicated member names plus the
/// references that could not be resolved.
///
/// Members keep first-occurrence order. Empty references are ignored.
pub fn resolve_members<'r, I>(resolver: &Resolver<'_>, references: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = &'r str>,
{
    let mut members: Vec<String> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();
    for reference in references {
        let reference = reference.trim();
        if reference.is_empty() {
            continue;
        }
        match resolver.resolve(reference).name() {
            Some(name) => members.push(name.to_string()),
            None => skipped.push(reference.to_string()),
        }
    }
    (dedup_stable(members), skipped)
}

/// Drop repeated entries, keeping the first occurrence of each.
pub fn dedup_stable(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{dedup_stable, resolve_members, Resolution, Resolver};
    use crate::builtins::{default_builtin_table, BuiltinTable};
    use crate::names::NameRegistry;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let input = ["A", "B", "A", "C", "B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedup_stable(input), vec!["A", "B", "C"]);
    }

    #[test]
    fn local_names_win_over_builtins() {
        let mut registry = NameRegistry::new();
        registry.register("HTTPS");
        let table = default_builtin_table();
        let resolver = Resolver::new(&registry, Some(&table));
        assert_eq!(
            resolver.resolve("HTTPS"),
            Resolution::Local("HTTPS".to_string())
        );
    }

    #[test]
    fn resolves_local_builtin_and_unresolved() {
        let mut registry = NameRegistry::new();
        registry.register("Web Srv");
        let table = default_builtin_table();
        let resolver = Resolver::new(&registry, Some(&table));

        assert_eq!(
            resolver.resolve("Web Srv"),
            Resolution::Local("Web_Srv".to_string())
        );
        assert_eq!(
            resolver.resolve("DNS (TCP)"),
            Resolution::BuiltIn("DNS".to_string())
        );
        assert_eq!(resolver.resolve("GhostObj"), Resolution::Unresolved);
        assert_eq!(resolver.resolve("GhostObj").name(), None);
    }

    #[test]
    fn local_only_resolver_skips_builtins() {
        let registry = NameRegistry::new();
        let resolver = Resolver::local_only(&registry);
        assert_eq!(resolver.resolve("DNS (TCP)"), Resolution::Unresolved);

        let empty = BuiltinTable::empty();
        let resolver = Resolver::new(&registry, Some(&empty));
        assert!(!resolver.resolve("HTTP").is_resolved());
    }

    #[test]
    fn members_are_deduplicated_after_resolution() {
        let mut registry = NameRegistry::new();
        registry.register("WebSrv");
        let table = default_builtin_table();
        let resolver = Resolver::new(&registry, Some(&table));

        let (members, skipped) = resolve_members(
            &resolver,
            ["WebSrv", "DNS (TCP)", "GhostObj", "DNS (UDP)", " ", "WebSrv"],
        );
        assert_eq!(members, vec!["WebSrv", "DNS"]);
        assert_eq!(skipped, vec!["GhostObj"]);
    }
}

//! FortiGate-safe object naming.
//!
//! FortiOS object names are at most 79 characters drawn from
//! `[A-Za-z0-9_.-]`. Forcepoint names are free text, so every name is
//! rewritten with [`sanitize`] and the original → canonical pairs that
//! changed are kept in a [`NameRegistry`] for operator review.
//!
//! A registry covers one FortiOS name table for exactly one extraction run
//! and is owned by the caller; nothing here is global.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

/// Longest object name FortiOS accepts.
pub const MAX_NAME_LEN: usize = 79;
/// Name used when sanitizing leaves nothing behind.
pub const PLACEHOLDER_NAME: &str = "obj";

/// Rewrite `original` into the FortiGate naming grammar.
///
/// Runs of disallowed characters become one `_`, leading underscores and
/// trailing underscores/periods are dropped, and the result is cut to
/// [`MAX_NAME_LEN`]. Never returns an empty string. Idempotent.
pub fn sanitize(original: &str) -> String {
    let mut out = String::with_capacity(original.len());
    for c in original.trim().chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let mut name = trim_edges(&out).to_string();
    if name.len() > MAX_NAME_LEN {
        name.truncate(MAX_NAME_LEN);
        name = trim_edges(&name).to_string();
    }
    if name.is_empty() {
        return PLACEHOLDER_NAME.to_string();
    }
    name
}

/// True when `name` already satisfies the naming grammar.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.chars().all(is_allowed)
        && !name.starts_with('_')
        && !name.ends_with('_')
        && !name.ends_with('.')
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn trim_edges(name: &str) -> &str {
    name.trim_start_matches('_')
        .trim_end_matches(|c| c == '_' || c == '.')
}

/// Original → canonical names that had to change, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameMapping(Vec<(String, String)>);

impl NameMapping {
    pub fn get(&self, original: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(orig, _)| orig == original)
            .map(|(_, canonical)| canonical.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(o, c)| (o.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mapping as an ordered map, for JSON consumers that want object form.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0.iter().cloned().collect()
    }

    /// Append the pairs of another mapping after this one's.
    pub fn append(&mut self, other: NameMapping) {
        self.0.extend(other.0);
    }
}

/// Run-scoped registry of the object names in one FortiOS name table.
///
/// Two different originals that sanitize to the same canonical name would
/// silently overwrite each other on the firewall, so the later one gets a
/// numeric suffix (`_2`, `_3`, …). The same holds when elements of two
/// different kinds share one original name: the later kind is renamed and
/// references to the original keep resolving to the first.
#[derive(Debug, Default)]
pub struct NameRegistry {
    canonical: HashMap<String, String>,
    by_kind: HashMap<(String, String), String>,
    taken: HashSet<String>,
    mapping: NameMapping,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a (trimmed) original name and return its canonical form.
    /// Registering the same original twice returns the same canonical name.
    pub fn register(&mut self, original: &str) -> String {
        self.register_kind("", original)
    }

    /// Register an original defined by an element of `kind` (its tag).
    pub fn register_kind(&mut self, kind: &str, original: &str) -> String {
        let key = (kind.to_string(), original.to_string());
        if let Some(existing) = self.by_kind.get(&key) {
            return existing.clone();
        }

        let canonical = self.unique(sanitize(original));
        self.taken.insert(canonical.clone());
        self.by_kind.insert(key, canonical.clone());
        if self.canonical.contains_key(original) {
            tracing::warn!(
                original,
                kind,
                canonical = %canonical,
                "name already defined by another object kind"
            );
        } else {
            self.canonical
                .insert(original.to_string(), canonical.clone());
        }
        if canonical != original {
            self.mapping
                .0
                .push((original.to_string(), canonical.clone()));
        }
        canonical
    }

    /// Canonical name of the element of `kind` registered as `original`.
    pub fn canonical_for(&self, kind: &str, original: &str) -> Option<&str> {
        self.by_kind
            .get(&(kind.to_string(), original.to_string()))
            .map(String::as_str)
    }

    /// Canonical name of a registered original.
    pub fn lookup(&self, original: &str) -> Option<&str> {
        self.canonical.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.canonical.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn mapping(&self) -> &NameMapping {
        &self.mapping
    }

    pub fn into_mapping(self) -> NameMapping {
        self.mapping
    }

    fn unique(&self, base: String) -> String {
        if !self.taken.contains(&base) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let suffix = format!("_{n}");
            let keep = MAX_NAME_LEN - suffix.len();
            let stem = if base.len() > keep {
                trim_edges(&base[..keep])
            } else {
                base.as_str()
            };
            let candidate = format!("{stem}{suffix}");
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

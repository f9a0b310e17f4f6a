//! Structured results of a push run.

use std::fmt::{self, Display, Formatter};
use std::ops::AddAssign;

use clap::ValueEnum;
use serde::Serialize;

use crate::record::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Ok,
    Skip,
    Error,
}

impl OutcomeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Ok => "ok",
            OutcomeKind::Skip => "skip",
            OutcomeKind::Error => "error",
        }
    }
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one object (or one skipped reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    pub kind: OutcomeKind,
    pub name: String,
    pub orig_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PushOutcome {
    pub fn ok(name: &str, orig_name: &str, code: u16) -> Self {
        Self {
            kind: OutcomeKind::Ok,
            name: name.to_string(),
            orig_name: orig_name.to_string(),
            code: Some(code),
            message: None,
        }
    }

    pub fn skip(name: &str, orig_name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Skip,
            name: name.to_string(),
            orig_name: orig_name.to_string(),
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn error(name: &str, orig_name: &str, code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Error,
            name: name.to_string(),
            orig_name: orig_name.to_string(),
            code,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub ok: usize,
    pub skip: usize,
    pub error: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Ok => self.ok += 1,
            OutcomeKind::Skip => self.skip += 1,
            OutcomeKind::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.skip + self.error
    }
}

impl AddAssign for OutcomeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.ok += rhs.ok;
        self.skip += rhs.skip;
        self.error += rhs.error;
    }
}

/// Outcomes of one category, in the order they were produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcomes {
    pub category: Category,
    pub counts: OutcomeCounts,
    pub outcomes: Vec<PushOutcome>,
}

impl CategoryOutcomes {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            counts: OutcomeCounts::default(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: PushOutcome) {
        self.counts.record(outcome.kind);
        self.outcomes.push(outcome);
    }
}

/// Flat export row; one per outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub category: String,
    pub status: String,
    pub name: String,
    pub orig_name: String,
    pub code: String,
    pub message: String,
}

/// Everything a push run produced, grouped by category in push order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PushReport {
    pub categories: Vec<CategoryOutcomes>,
    pub totals: OutcomeCounts,
}

impl PushReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outcomes: CategoryOutcomes) {
        self.totals += outcomes.counts;
        self.categories.push(outcomes);
    }

    pub fn category(&self, category: Category) -> Option<&CategoryOutcomes> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn counts(&self, category: Category) -> OutcomeCounts {
        self.category(category)
            .map(|c| c.counts)
            .unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.totals.error > 0
    }

    /// Outcomes of one kind with their category, in report order.
    pub fn filter(&self, kind: OutcomeKind) -> Vec<(Category, &PushOutcome)> {
        self.iter().filter(|(_, o)| o.kind == kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &PushOutcome)> {
        self.categories
            .iter()
            .flat_map(|c| c.outcomes.iter().map(move |o| (c.category, o)))
    }

    /// Export rows, optionally restricted to one kind.
    pub fn rows(&self, filter: Option<OutcomeKind>) -> Vec<ReportRow> {
        self.iter()
            .filter(|(_, o)| filter.map_or(true, |kind| o.kind == kind))
            .map(|(category, o)| ReportRow {
                category: category.key().to_string(),
                status: o.kind.as_str().to_string(),
                name: o.name.clone(),
                orig_name: o.orig_name.clone(),
                code: o.code.map(|c| c.to_string()).unwrap_or_default(),
                message: o.message.clone().unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{CategoryOutcomes, OutcomeCounts, OutcomeKind, PushOutcome, PushReport};
    use crate::record::Category;

    fn sample() -> PushReport {
        let mut hosts = CategoryOutcomes::new(Category::Hosts);
        hosts.push(PushOutcome::ok("A", "A", 200));
        hosts.push(PushOutcome::error("B", "B b", Some(500), "HTTP 500: boom"));
        let mut groups = CategoryOutcomes::new(Category::NetGroups);
        groups.push(PushOutcome::skip("GhostObj", "GhostObj", "not found"));
        groups.push(PushOutcome::ok("G", "G", 201));

        let mut report = PushReport::new();
        report.add(hosts);
        report.add(groups);
        report
    }

    #[test]
    fn counts_per_category_and_total() {
        let report = sample();
        assert_eq!(
            report.counts(Category::Hosts),
            OutcomeCounts {
                ok: 1,
                skip: 0,
                error: 1
            }
        );
        assert_eq!(
            report.totals,
            OutcomeCounts {
                ok: 2,
                skip: 1,
                error: 1
            }
        );
        assert_eq!(report.totals.total(), 4);
        assert_eq!(report.counts(Category::Services), OutcomeCounts::default());
        assert!(report.has_errors());
    }

    #[test]
    fn filter_keeps_category_and_order() {
        let report = sample();
        let ok: Vec<(Category, &str)> = report
            .filter(OutcomeKind::Ok)
            .into_iter()
            .map(|(c, o)| (c, o.name.as_str()))
            .collect();
        assert_eq!(ok, vec![(Category::Hosts, "A"), (Category::NetGroups, "G")]);
    }

    #[test]
    fn rows_flatten_optional_fields() {
        let report = sample();
        let rows = report.rows(Some(OutcomeKind::Error));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "hosts");
        assert_eq!(rows[0].status, "error");
        assert_eq!(rows[0].orig_name, "B b");
        assert_eq!(rows[0].code, "500");

        let all = report.rows(None);
        assert_eq!(all.len(), 4);
        assert_eq!(all[2].code, "");
        assert_eq!(all[2].message, "not found");
    }
}

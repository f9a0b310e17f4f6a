//! Push orchestration: upsert extracted objects into a remote store.
//!
//! A [`PushSession`] owns its store and moves through
//! `Disconnected → Connected → Pushing → Idle`. Pushing is only allowed
//! from `Connected` or `Idle`, so a failed connection check blocks it.
//! Within a run, categories go in dependency order and every record yields
//! at least one outcome; no remote failure aborts the run and nothing is
//! retried.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::extract::Extraction;
use crate::push_report::{CategoryOutcomes, PushOutcome, PushReport};
use crate::record::{Category, ObjectRecord, PUSH_ORDER};
use crate::store::{ConnectionInfo, RemoteObjectStore, StoreError};

/// Longest remote message kept in an error outcome.
pub const MAX_ERROR_LEN: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Pushing,
    Idle,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Pushing => "pushing",
            SessionState::Idle => "idle",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection failed")]
    Connection(#[source] StoreError),
    #[error("cannot push while {0}; connect first")]
    NotConnected(SessionState),
}

pub struct PushSession<S> {
    store: S,
    state: SessionState,
    remote: Option<ConnectionInfo>,
}

impl<S: RemoteObjectStore> PushSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Disconnected,
            remote: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// What the last successful connection check reported.
    pub fn remote(&self) -> Option<&ConnectionInfo> {
        self.remote.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Check the remote. Returns its version string when it reports one.
    pub fn connect(&mut self) -> Result<Option<String>, PushError> {
        match self.store.test_connection() {
            Ok(info) => {
                tracing::info!(version = ?info.version, "connected");
                let version = info.version.clone();
                self.remote = Some(info);
                self.state = SessionState::Connected;
                Ok(version)
            }
            Err(err) => {
                self.remote = None;
                self.state = SessionState::Disconnected;
                Err(PushError::Connection(err))
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.remote = None;
        self.state = SessionState::Disconnected;
    }

    /// Push every pushable category.
    pub fn push(&mut self, extraction: &Extraction) -> Result<PushReport, PushError> {
        self.push_categories(extraction, &PUSH_ORDER)
    }

    /// Push the selected categories. Selection order is ignored; categories
    /// always go in [`PUSH_ORDER`].
    pub fn push_categories(
        &mut self,
        extraction: &Extraction,
        categories: &[Category],
    ) -> Result<PushReport, PushError> {
        if !matches!(self.state, SessionState::Connected | SessionState::Idle) {
            return Err(PushError::NotConnected(self.state));
        }
        self.state = SessionState::Pushing;

        let mut report = PushReport::new();
        for category in PUSH_ORDER {
            if !categories.contains(&category) {
                continue;
            }
            let outcomes = self.push_category(category, extraction.records(category));
            tracing::info!(
                category = category.key(),
                ok = outcomes.counts.ok,
                skip = outcomes.counts.skip,
                error = outcomes.counts.error,
                "category pushed"
            );
            report.add(outcomes);
        }

        tracing::info!(
            ok = report.totals.ok,
            skip = report.totals.skip,
            error = report.totals.error,
            "push finished"
        );
        self.state = SessionState::Idle;
        Ok(report)
    }

    fn push_category(&mut self, category: Category, records: &[ObjectRecord]) -> CategoryOutcomes {
        let mut outcomes = CategoryOutcomes::new(category);
        let mut existing = match self.store.list_existing(category) {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(category = category.key(), "listing existing objects failed: {err}");
                BTreeSet::new()
            }
        };

        for record in records {
            self.push_record(category, record, &mut existing, &mut outcomes);
        }
        outcomes
    }

    fn push_record(
        &mut self,
        category: Category,
        record: &ObjectRecord,
        existing: &mut BTreeSet<String>,
        outcomes: &mut CategoryOutcomes,
    ) {
        let name = record.name().trim();
        if name.is_empty() {
            outcomes.push(PushOutcome::skip("", "", "Empty name"));
            return;
        }
        let orig = match record.orig_name() {
            "" => name,
            orig => orig,
        };

        for reference in record.skipped_refs() {
            outcomes.push(PushOutcome::skip(
                reference,
                reference,
                format!("Not in document or built-in table; skipped from group {name}"),
            ));
        }

        let Some(payload) = record.payload() else {
            outcomes.push(PushOutcome::skip(name, orig, "No remote representation"));
            return;
        };

        let updating = existing.contains(name);
        tracing::debug!(category = category.key(), name, updating, "pushing object");
        let result = if updating {
            self.store.update(category, name, &payload)
        } else {
            self.store.create(category, &payload)
        };

        match result {
            Ok(response) if response.is_success() => {
                existing.insert(name.to_string());
                outcomes.push(PushOutcome::ok(name, orig, response.status));
            }
            Ok(response) => {
                tracing::warn!(category = category.key(), name, status = response.status, "object rejected");
                outcomes.push(PushOutcome::error(
                    name,
                    orig,
                    Some(response.status),
                    format!("HTTP {}: {}", response.status, truncate(&response.body)),
                ));
            }
            Err(err) => {
                tracing::warn!(category = category.key(), name, "request failed: {err}");
                outcomes.push(PushOutcome::error(name, orig, None, truncate(&err.to_string())));
            }
        }
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_LEN).collect()
}

use colored::Colorize;
use xml_table_core::{format_summary, format_text, Tabulation};

use crate::extract::Extraction;
use crate::push_report::{OutcomeKind, PushOutcome, PushReport};
use crate::store::ConnectionInfo;

/// Render the tabulation summary for terminal output.
pub fn render_tabulation(tabulation: &Tabulation) -> String {
    let mut out = vec![format_summary(tabulation).cyan().to_string()];
    for line in format_text(tabulation).lines() {
        let colored = if line.starts_with('*') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.dimmed().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }
    out.join("\n")
}

/// Render extraction counts and the rename list.
pub fn render_extraction(extraction: &Extraction) -> String {
    let mut out = Vec::new();
    let counts = extraction
        .counts()
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    out.push(format!("objects={} {counts}", extraction.total()).cyan().to_string());

    if extraction.name_map.is_empty() {
        out.push("renamed: none".to_string());
    } else {
        out.push(format!("renamed: {}", extraction.name_map.len()));
        for (original, canonical) in extraction.name_map.iter() {
            out.push(format!("  {original:?} -> {canonical}").yellow().to_string());
        }
    }
    out.join("\n")
}

/// Render a successful connection check.
pub fn render_connection(host: &str, info: &ConnectionInfo) -> String {
    let mut line = format!(
        "connected host={host} version={}",
        info.version.as_deref().unwrap_or("unknown")
    );
    if let Some(hostname) = &info.hostname {
        line.push_str(&format!(" hostname={hostname}"));
    }
    line.green().to_string()
}

/// Render the push report, optionally only outcomes of one kind. Category
/// and total counts always cover every outcome.
pub fn render_push_report(report: &PushReport, show: Option<OutcomeKind>) -> String {
    let mut out = Vec::new();
    for section in &report.categories {
        out.push(
            format!(
                "{}: ok={} skip={} error={}",
                section.category, section.counts.ok, section.counts.skip, section.counts.error
            )
            .bold()
            .to_string(),
        );
        for outcome in &section.outcomes {
            if show.map_or(true, |kind| outcome.kind == kind) {
                out.push(render_outcome(outcome));
            }
        }
    }
    out.push(
        format!(
            "total ok={} skip={} error={}",
            report.totals.ok, report.totals.skip, report.totals.error
        )
        .cyan()
        .to_string(),
    );
    out.join("\n")
}

fn render_outcome(outcome: &PushOutcome) -> String {
    let mut line = format!("  {} {}", label(outcome.kind), outcome.name);
    if outcome.orig_name != outcome.name {
        line.push_str(&format!(" ({})", outcome.orig_name));
    }
    if let Some(code) = outcome.code {
        line.push_str(&format!(" [{code}]"));
    }
    if let Some(message) = &outcome.message {
        line.push_str(&format!(" {message}"));
    }
    match outcome.kind {
        OutcomeKind::Ok => line.green().to_string(),
        OutcomeKind::Skip => line.yellow().to_string(),
        OutcomeKind::Error => line.red().to_string(),
    }
}

fn label(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::Ok => "OK  ",
        OutcomeKind::Skip => "SKIP",
        OutcomeKind::Error => "ERR ",
    }
}

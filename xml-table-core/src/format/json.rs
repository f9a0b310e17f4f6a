use crate::tabulate::Tabulation;

/// Format a tabulation as pretty-printed JSON.
pub fn format_json(tabulation: &Tabulation) -> String {
    serde_json::to_string_pretty(tabulation).unwrap_or_else(|_| "{}".to_string())
}

use crate::tabulate::Tabulation;

/// Format one line per tag: placement, instance count and column count.
pub fn format_text(tabulation: &Tabulation) -> String {
    let mut lines = Vec::with_capacity(tabulation.summary.len() + 1);
    lines.push(format!("root {}", tabulation.root.tag));
    for (key, value) in &tabulation.root.attributes {
        lines.push(format!("  {key}={value}"));
    }
    for (name, table) in &tabulation.tables {
        let Some(placement) = table.placement else {
            continue;
        };
        let tag = table.tag.as_deref().unwrap_or(name);
        let renamed = if tag == name.as_str() {
            String::new()
        } else {
            format!(" table={name}")
        };
        lines.push(format!(
            "{} {tag} count={} columns={}{renamed}",
            if placement.is_direct() { "*" } else { "-" },
            table.count,
            table.columns.len(),
        ));
    }
    lines.join("\n")
}

/// Format a one-line summary of tag and element counts.
pub fn format_summary(tabulation: &Tabulation) -> String {
    let tags = tabulation.summary.len();
    let elements: usize = tabulation.summary.iter().map(|s| s.count).sum();
    let direct = tabulation
        .summary
        .iter()
        .filter(|s| s.placement.is_direct())
        .count();
    format!(
        "root={} tags={tags} direct={direct} nested={} elements={elements}",
        tabulation.root.tag,
        tags - direct
    )
}

use crate::report::report_model::CheckReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a check report for terminal output.
///
/// Produces output like:
/// ```text
/// === Schema: article (3f2a9c1) ===
///
/// ✓ ACCEPT  good.yaml
/// ✗ REJECT  bad.yaml (validate)
///     [title] This field is required.
///     [tags] The minimum number of items is 1.
///
/// === Results: 1 accepted, 1 rejected (2 total) ===
/// ```
pub fn format_console_report(report: &CheckReport) -> String {
    let mut out = String::new();

    let short_fingerprint: String = report.schema_fingerprint.chars().take(7).collect();
    out.push_str(&format!(
        "=== Schema: {} ({}) ===\n\n",
        report.schema_name, short_fingerprint
    ));

    for result in &report.results {
        if result.accepted {
            out.push_str(&format!("\u{2713} ACCEPT  {}\n", result.name));
            continue;
        }

        match result.failed_stage {
            Some(stage) => out.push_str(&format!("\u{2717} REJECT  {} ({})\n", result.name, stage)),
            None => out.push_str(&format!("\u{2717} REJECT  {}\n", result.name)),
        }
        for err in &result.errors {
            let path = if err.path.is_empty() { "-" } else { &err.path };
            out.push_str(&format!("    [{}] {}\n", path, err.message));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} accepted, {} rejected ({} total)",
        report.accepted, report.rejected, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}

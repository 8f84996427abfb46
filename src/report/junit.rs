use crate::report::report_model::CheckReport;

// ============================================================================
// JUnit XML reporter: CI integration format
// ============================================================================

/// Generate a JUnit XML report, one test case per submission.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="article" tests="2" failures="1">
///   <testcase name="good.yaml" classname="content-blocks" />
///   <testcase name="bad.yaml" classname="content-blocks">
///     <failure message="2 error(s) at validate" type="ValidationFailure">
///       title: This field is required.
///     </failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &CheckReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        if result.accepted {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"content-blocks\" />\n",
                escape_xml(&result.name)
            ));
            continue;
        }

        let body = result
            .errors
            .iter()
            .map(|err| {
                if err.path.is_empty() {
                    err.message.clone()
                } else {
                    format!("{}: {}", err.path, err.message)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let message = match result.failed_stage {
            Some(stage) => format!("{} error(s) at {}", result.errors.len(), stage),
            None => "unreadable submission".to_string(),
        };

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"content-blocks\">\n    <failure message=\"{message}\" type=\"ValidationFailure\">{body}</failure>\n  </testcase>\n",
            name = escape_xml(&result.name),
            message = escape_xml(&message),
            body = escape_xml(&body),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.schema_name),
        tests = report.total,
        failures = report.rejected,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

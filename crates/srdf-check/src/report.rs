//! Human and machine readable load reports

use serde_json::json;
use srdf_core::LoadReport;
use std::fmt::Write;

/// Plain-text summary followed by one line per diagnostic
pub fn render_text(report: &LoadReport) -> String {
    let model = &report.model;
    let mut out = String::new();

    let _ = writeln!(out, "Robot: {}", model.name);
    let _ = writeln!(out, "  Virtual joints:      {}", model.virtual_joints.len());
    let _ = writeln!(out, "  Groups:              {}", model.groups.len());
    for group in &model.groups {
        let _ = writeln!(
            out,
            "    - {} ({} links, {} joints, {} chains, {} subgroups)",
            group.name,
            group.links.len(),
            group.joints.len(),
            group.chains.len(),
            group.subgroups.len()
        );
    }
    let _ = writeln!(out, "  Group states:        {}", model.group_states.len());
    let _ = writeln!(out, "  End effectors:       {}", model.end_effectors.len());
    let _ = writeln!(out, "  Visual sensors:      {}", model.visual_sensors.len());
    let _ = writeln!(
        out,
        "  Disabled collisions: {}",
        model.disabled_collisions.len()
    );

    if report.is_clean() {
        let _ = writeln!(out, "No problems found");
    } else {
        let _ = writeln!(
            out,
            "{} error(s), {} warning(s):",
            report.errors().count(),
            report.warnings().count()
        );
        for diagnostic in &report.diagnostics {
            let _ = writeln!(out, "  {}", diagnostic);
        }
    }
    out
}

/// JSON document with the model and diagnostics (code, severity, message)
pub fn render_json(report: &LoadReport) -> serde_json::Result<String> {
    let diagnostics: Vec<_> = report
        .diagnostics
        .iter()
        .map(|d| {
            json!({
                "severity": d.severity,
                "code": d.issue.code(),
                "message": d.issue.to_string(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "model": report.model,
        "diagnostics": diagnostics,
    }))
}

/// Exit status policy: errors always fail, warnings only when denied
pub fn failed(report: &LoadReport, deny_warnings: bool) -> bool {
    report.errors().next().is_some() || (deny_warnings && !report.is_clean())
}

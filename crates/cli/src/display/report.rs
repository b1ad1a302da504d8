use pme_core::ManipulationReport;
use std::fmt::Write as _;

/// Human readable summary of a manipulation run
pub fn format_report(report: &ManipulationReport) -> String {
    let mut out = String::new();
    if report.manipulators.is_empty() {
        out.push_str("No manipulators ran\n");
    } else {
        let _ = writeln!(out, "Manipulators: {}", report.manipulators.join(", "));
    }
    for project in &report.projects {
        let marker = if project.changed { "*" } else { " " };
        if project.original == project.result {
            let _ = writeln!(out, " {marker} {} ({})", project.result, project.pom);
        } else {
            let _ = writeln!(out, " {marker} {} -> {} ({})", project.original, project.result, project.pom);
        }
    }
    out
}

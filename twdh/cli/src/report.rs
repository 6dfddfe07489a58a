//! Console output for command results.

use owo_colors::OwoColorize;
use twdh_lib::commands::show::format_record;
use twdh_lib::commands::spatial_stats::SpatialReport;
use twdh_lib::commands::undelete::UndeleteReport;
use twdh_lib::{DatasetRecord, ExportSummary, RunSummary, pluralize};

pub fn print_records(records: &[DatasetRecord]) {
    for record in records {
        println!("{}", format_record(record));
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |p| format!("{p:.1}%"))
}

pub fn print_spatial(report: &SpatialReport) {
    for entry in &report.entries {
        let sizes = match (entry.full_bytes, entry.simp_bytes) {
            (Some(full), Some(simp)) => format!(
                "full {full} bytes, simplified {simp} bytes, reduced {}",
                percent(entry.reduction_percent())
            ),
            (Some(full), None) => format!("full {full} bytes, no simplified geometry"),
            (None, Some(simp)) => format!("no full geometry, simplified {simp} bytes"),
            (None, None) => "no geometry".dimmed().to_string(),
        };
        println!("{}: {sizes}", entry.name.bold());
    }

    println!();
    println!("{}", "Spatial statistics".bold());
    println!("  {} spatial", pluralize(report.spatial_count(), "dataset"));
    println!("  {} without geometry", pluralize(report.nonspatial_count(), "dataset"));
    println!("  full geometry total: {} bytes", report.full_total());
    println!("  simplified geometry total: {} bytes", report.simp_total());
    println!("  overall reduction: {}", percent(report.reduction_percent()).green());
}

/// Prints the counters of a bulk run, highlighting problems.
pub fn print_summary(command: &str, summary: &RunSummary) {
    println!();
    println!("{} {}", command.bold(), "summary".bold());
    for line in summary.lines() {
        if line.contains("failed") || line.contains("not found") {
            println!("  {}", line.red());
        } else if line.contains("(dry run)") {
            println!("  {}", line.yellow());
        } else {
            println!("  {line}");
        }
    }
}

/// Summary lines of an export; every count is in datasets.
fn export_lines(summary: &ExportSummary) -> Vec<String> {
    let mut lines = vec![
        format!("{} checked", pluralize(summary.datasets, "dataset")),
        format!("{} exported", pluralize(summary.exported, "dataset")),
    ];
    if summary.failed > 0 {
        lines.push(format!("{} failed", pluralize(summary.failed, "dataset")));
    }
    lines
}

pub fn print_export(command: &str, summary: &ExportSummary) {
    println!();
    println!("{} {}", command.bold(), "summary".bold());
    for line in export_lines(summary) {
        if line.ends_with("failed") {
            println!("  {}", line.red());
        } else {
            println!("  {line}");
        }
    }
    println!("  written to {}", summary.path.display().green());
}

pub fn print_undelete(report: &UndeleteReport) {
    for state in &report.states {
        let shown = state.state.as_deref().unwrap_or("unknown");
        let shown = if shown == "active" {
            shown.green().to_string()
        } else {
            shown.red().to_string()
        };
        println!("{}: {shown}", state.id.bold());
    }
    print_summary("undelete", &report.summary);
}

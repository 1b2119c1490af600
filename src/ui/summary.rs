//! Run summary
//!
//! One line per target, in the order targets first appear in the settings
//! file, followed by a count line.

use console::Style;

use crate::fleet::{FleetReport, Mode, Outcome, StepTag};

const NO_RESULT: &str = "(no result)";

fn header(mode: Mode) -> &'static str {
    match mode {
        Mode::Setup => "Setup summary:",
        Mode::Teardown => "Teardown summary:",
    }
}

fn counts(report: &FleetReport) -> String {
    format!(
        "{} target(s): {} ok, {} failed",
        report.len(),
        report.succeeded(),
        report.failed()
    )
}

fn column_width(report: &FleetReport) -> usize {
    report
        .entries()
        .map(|(address, _)| address.len())
        .max()
        .unwrap_or(0)
}

fn render(report: &FleetReport, mode: Mode, tag: impl Fn(&StepTag) -> String, missing: &str) -> Vec<String> {
    let width = column_width(report);
    let mut lines = vec![header(mode).to_string()];
    for (address, tags) in report.entries() {
        let rendered = if tags.is_empty() {
            missing.to_string()
        } else {
            tags.iter().map(&tag).collect::<Vec<_>>().join(", ")
        };
        lines.push(format!("  {address:<width$}  {rendered}"));
    }
    lines.push(counts(report));
    lines
}

/// The summary as plain text lines.
#[cfg(test)]
pub fn summary_lines(report: &FleetReport, mode: Mode) -> Vec<String> {
    render(report, mode, ToString::to_string, NO_RESULT)
}

fn styled_tag(tag: &StepTag) -> String {
    let style = match tag.outcome {
        Outcome::Succeeded => Style::new().green(),
        Outcome::Failed => Style::new().red().bold(),
        Outcome::Skipped => Style::new().dim(),
    };
    style.apply_to(tag).to_string()
}

/// Print the summary to stdout with coloured tags.
pub fn print_summary(report: &FleetReport, mode: Mode) {
    let missing = Style::new().dim().apply_to(NO_RESULT).to_string();
    let mut lines = render(report, mode, styled_tag, &missing).into_iter();

    if let Some(header) = lines.next() {
        println!("{}", Style::new().bold().apply_to(header));
    }
    let count_style = if report.failed() > 0 {
        Style::new().yellow()
    } else {
        Style::new().green()
    };
    let mut rest: Vec<String> = lines.collect();
    let count_line = rest.pop();
    for line in rest {
        println!("{line}");
    }
    if let Some(count_line) = count_line {
        println!("{}", count_style.apply_to(count_line));
    }
}

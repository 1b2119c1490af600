//! Dry-run work plan

use console::Style;

use crate::domain::WorkItem;
use crate::fleet::Mode;

/// One line per work item describing what a real run would do to it.
pub fn plan_lines(items: &[WorkItem], mode: Mode) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let package = &item.package;
            match mode {
                Mode::Setup => {
                    let deploy = if item.template.is_some() {
                        "then deploy declaration"
                    } else {
                        "no declaration"
                    };
                    format!(
                        "{}  ensure {} {} ({}), {deploy}",
                        item.target,
                        package.name,
                        package.label(),
                        package.file_name()
                    )
                }
                Mode::Teardown => format!("{}  remove {}", item.target, package.name),
            }
        })
        .collect()
}

/// Print the plan for `items` without contacting any appliance.
pub fn print_plan(items: &[WorkItem], mode: Mode, concurrency: usize) {
    println!(
        "{} {} target(s), concurrency {}",
        Style::new().bold().apply_to("Dry run:"),
        items.len(),
        concurrency
    );
    for line in plan_lines(items, mode) {
        println!("  {line}");
    }
}

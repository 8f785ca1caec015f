use crate::emit::{ApplyReport, ApplyStatus};
use crate::types::{AccessTier, ReorderPlan};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table, presets::UTF8_FULL_CONDENSED};

pub struct TableFormatter {
    no_color: bool,
}

impl TableFormatter {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    pub fn format(&self, plans: &[ReorderPlan]) -> String {
        let mut output = String::new();

        for (i, plan) in plans.iter().enumerate() {
            if i > 0 {
                output.push_str("\n\n");
            }
            output.push_str(&self.format_plan(plan));
        }

        output
    }

    fn format_plan(&self, plan: &ReorderPlan) -> String {
        let mut output = String::new();
        let (file, record) = plan.target();

        let header = format!(
            "{} {} ({} field{})",
            if plan.is_class { "class" } else { "struct" },
            record,
            plan.fields.len(),
            if plan.fields.len() == 1 { "" } else { "s" }
        );
        if self.no_color {
            output.push_str(&header);
        } else {
            output.push_str(&header.bold().to_string());
        }
        output.push('\n');
        output.push_str(&format!("  declared in {}\n\n", file.display()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["#", "Size", "Access", "Field"]);

        for (pos, field) in plan.fields.iter().enumerate() {
            let access = field.access.strip_prefix("DW_ACCESS_").unwrap_or(&field.access);
            let access_cell = match (self.no_color, field.tier) {
                (true, _) => Cell::new(access),
                (false, AccessTier::Public) => Cell::new(access).fg(Color::Green),
                (false, AccessTier::Protected) => Cell::new(access).fg(Color::Yellow),
                (false, AccessTier::Other) => Cell::new(access).fg(Color::Red),
            };
            table.add_row(vec![
                Cell::new(pos).set_alignment(CellAlignment::Right),
                Cell::new(field.size).set_alignment(CellAlignment::Right),
                access_cell,
                Cell::new(&field.name),
            ]);
        }

        output.push_str(&table.to_string());
        output.push_str(&format!("\n\nOrder: {}\n", plan.field_order()));
        output
    }

    pub fn format_report(&self, report: &ApplyReport) -> String {
        let mut output = String::new();
        let failed: Vec<_> = report.failures().collect();
        let skipped = report
            .outcomes
            .iter()
            .filter(|o| matches!(o.status, ApplyStatus::Skipped { .. }))
            .count();

        let summary = format!(
            "Reordered {} of {} type(s), {} failed, {} skipped",
            report.applied(),
            report.outcomes.len(),
            failed.len(),
            skipped
        );
        if self.no_color || (failed.is_empty() && skipped == 0) {
            output.push_str(&summary);
        } else {
            output.push_str(&summary.yellow().bold().to_string());
        }
        output.push('\n');

        for outcome in &report.outcomes {
            let line = match &outcome.status {
                ApplyStatus::Applied => continue,
                ApplyStatus::Failed { code, stderr } => format!(
                    "  ! {} ({}): exit {}: {}",
                    outcome.record,
                    outcome.file.display(),
                    code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    stderr
                ),
                ApplyStatus::Skipped { reason } => {
                    format!("  - {} ({}): {}", outcome.record, outcome.file.display(), reason)
                }
            };
            if self.no_color {
                output.push_str(&line);
            } else {
                output.push_str(&line.red().to_string());
            }
            output.push('\n');
        }

        output
    }
}

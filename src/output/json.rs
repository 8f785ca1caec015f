use crate::emit::ApplyReport;
use crate::types::ReorderPlan;
use serde::Serialize;

#[derive(Serialize)]
struct PlanOutput<'a> {
    version: &'static str,
    plans: &'a [ReorderPlan],
    summary: PlanSummary,
}

#[derive(Serialize)]
struct PlanSummary {
    total_types: usize,
    total_fields: usize,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    version: &'static str,
    #[serde(flatten)]
    report: &'a ApplyReport,
    summary: ReportSummary,
}

#[derive(Serialize)]
struct ReportSummary {
    applied: usize,
    failed: usize,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn format(&self, plans: &[ReorderPlan]) -> String {
        let output = PlanOutput {
            version: env!("CARGO_PKG_VERSION"),
            plans,
            summary: PlanSummary {
                total_types: plans.len(),
                total_fields: plans.iter().map(|p| p.fields.len()).sum(),
            },
        };
        self.render(&output)
    }

    pub fn format_report(&self, report: &ApplyReport) -> String {
        let output = ReportOutput {
            version: env!("CARGO_PKG_VERSION"),
            report,
            summary: ReportSummary { applied: report.applied(), failed: report.failures().count() },
        };
        self.render(&output)
    }

    fn render<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        } else {
            serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
        }
    }
}

use crate::tools::{ReorderTool, ToolRunner};
use crate::types::ReorderPlan;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApplyStatus {
    Applied,
    Failed { code: Option<i32>, stderr: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub record: String,
    pub file: PathBuf,
    pub fields_order: String,
    #[serde(flatten)]
    pub status: ApplyStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<ApplyOutcome>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status == ApplyStatus::Applied).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ApplyOutcome> {
        self.outcomes.iter().filter(|o| matches!(o.status, ApplyStatus::Failed { .. }))
    }
}

/// Invokes the reorder tool once per plan, in order. A failing rewrite is logged and
/// recorded; the remaining plans still run.
pub fn apply_plans(
    plans: &[ReorderPlan],
    tool: &ReorderTool,
    runner: &mut dyn ToolRunner,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for plan in plans.iter().filter(|p| !p.fields.is_empty()) {
        let (file, record) = plan.target();
        let fields_order = plan.field_order();
        let invocation = tool.invocation(record, &fields_order, &file);

        let status = match runner.run(&invocation) {
            Ok(out) if out.success => ApplyStatus::Applied,
            Ok(out) => {
                tracing::warn!(
                    record,
                    file = %file.display(),
                    code = ?out.code,
                    "reorder tool failed: {}",
                    out.stderr.trim()
                );
                ApplyStatus::Failed { code: out.code, stderr: out.stderr.trim().to_string() }
            }
            Err(e) => {
                tracing::warn!(record, file = %file.display(), "could not run reorder tool: {}", e);
                ApplyStatus::Skipped { reason: e.to_string() }
            }
        };

        report.outcomes.push(ApplyOutcome {
            record: record.to_string(),
            file,
            fields_order,
            status,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::tools::{Invocation, ToolOutput};
    use crate::types::{ACCESS_PUBLIC, PlannedField};

    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<Invocation>,
        fail_on: Option<&'static str>,
    }

    impl ToolRunner for RecordingRunner {
        fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput> {
            self.calls.push(invocation.clone());
            let fail = self.fail_on.is_some_and(|r| invocation.args[0].ends_with(r));
            Ok(ToolOutput {
                code: Some(i32::from(fail)),
                success: !fail,
                stdout: String::new(),
                stderr: if fail { "error: no such record\n".to_string() } else { String::new() },
            })
        }
    }

    fn plan(qualified: &str, fields: &[&str]) -> ReorderPlan {
        let mut p = ReorderPlan::new(qualified.to_string(), false);
        p.fields = fields
            .iter()
            .map(|f| PlannedField::new(f.to_string(), 1, ACCESS_PUBLIC.to_string()))
            .collect();
        p
    }

    #[test]
    fn one_call_per_plan_with_members() {
        let plans = [plan("/p/a.h@N::C", &["y", "z", "x"]), plan("/p/b.h@Empty", &[])];
        let tool = ReorderTool::new("clang-reorder-fields", vec![]);
        let mut runner = RecordingRunner::default();

        let report = apply_plans(&plans, &tool, &mut runner);

        assert_eq!(runner.calls.len(), 1);
        assert_eq!(
            runner.calls[0].args,
            ["--record-name=N::C", "--fields-order=y,z,x", "-i", "/p/a.h"]
        );
        assert_eq!(report.applied(), 1);
        assert_eq!(report.outcomes[0].file, PathBuf::from("/p/a.h"));
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let plans = [plan("/p/a.h@Bad", &["a"]), plan("/p/a.h@Good", &["b"])];
        let tool = ReorderTool::new("clang-reorder-fields", vec![]);
        let mut runner = RecordingRunner { fail_on: Some("Bad"), ..Default::default() };

        let report = apply_plans(&plans, &tool, &mut runner);

        assert_eq!(runner.calls.len(), 2);
        assert_eq!(report.applied(), 1);
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].record, "Bad");
        assert_eq!(
            failed[0].status,
            ApplyStatus::Failed { code: Some(1), stderr: "error: no such record".to_string() }
        );
    }

    #[test]
    fn spawn_errors_are_recorded_as_skipped() {
        struct Unavailable;
        impl ToolRunner for Unavailable {
            fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput> {
                Err(Error::ToolSpawn {
                    program: invocation.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            }
        }

        let plans = [plan("/p/a.h@S", &["a"])];
        let tool = ReorderTool::new("clang-reorder-fields", vec![]);
        let report = apply_plans(&plans, &tool, &mut Unavailable);
        assert!(matches!(report.outcomes[0].status, ApplyStatus::Skipped { .. }));
        assert_eq!(report.applied(), 0);
    }
}

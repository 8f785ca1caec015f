pub mod analysis;
pub mod cli;
pub mod config;
pub mod dump;
pub mod emit;
pub mod error;
pub mod logging;
pub mod output;
pub mod tools;
pub mod types;

pub use analysis::{PlanOptions, TypeResolver, order_fields, plan_layouts, qualify_types};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use dump::{DebugModel, DumpParser, ParserOptions, normalize_line};
pub use emit::{ApplyOutcome, ApplyReport, ApplyStatus, apply_plans};
pub use error::{Error, Result};
pub use output::{JsonFormatter, TableFormatter};
pub use tools::{DumpTool, Invocation, ProcessRunner, ReorderTool, ToolOutput, ToolRunner};
pub use types::{
    AccessTier, Address, CompositeType, Member, Namespace, PlannedField, ReorderPlan,
    TypeAliasEntry,
};

//! `.layout-align.yaml` settings.

use crate::analysis::PlanOptions;
use crate::dump::ParserOptions;
use crate::error::{Error, Result};
use crate::tools::{DumpTool, ReorderTool};
use globset::{GlobBuilder, GlobSetBuilder};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".layout-align.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dump_tool: String,
    pub reorder_tool: String,
    /// Each entry is passed as `--extra-arg=<entry>`.
    pub extra_args: Vec<String>,
    /// Glob patterns matched against qualified record names (`ns::Type`).
    pub exclude: Vec<String>,
    pub flush_at_eof: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump_tool: "llvm-dwarfdump".to_string(),
            reorder_tool: "clang-reorder-fields".to_string(),
            extra_args: vec!["-std=c++23".to_string()],
            exclude: Vec::new(),
            flush_at_eof: true,
        }
    }
}

impl Config {
    /// Loads `path`. A missing file yields defaults only when `required` is false.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(Error::Config(format!("config file not found: {}", path.display())));
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit; treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.dump_tool.trim().is_empty() {
            return Err(Error::Config("dump_tool must not be empty".to_string()));
        }
        if self.reorder_tool.trim().is_empty() {
            return Err(Error::Config("reorder_tool must not be empty".to_string()));
        }
        if self.exclude.iter().any(|p| p.is_empty()) {
            return Err(Error::Config("empty exclude pattern is not allowed".to_string()));
        }
        Ok(())
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions { flush_at_eof: self.flush_at_eof }
    }

    pub fn plan_options(&self) -> Result<PlanOptions> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(false) // * matches ::
                .build()
                .map_err(|e| Error::Config(format!("invalid exclude pattern '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|e| Error::Config(e.to_string()))?;
        Ok(PlanOptions { exclude })
    }

    pub fn dump_tool(&self) -> DumpTool {
        DumpTool::new(&self.dump_tool)
    }

    pub fn reorder_tool(&self) -> ReorderTool {
        ReorderTool::new(&self.reorder_tool, self.extra_args.clone())
    }
}

use anyhow::{Context, Result, bail};
use clap::Parser;
use layout_align::cli::InputArgs;
use layout_align::config::DEFAULT_CONFIG_FILE;
use layout_align::{
    Cli, Commands, Config, DumpParser, JsonFormatter, OutputFormat, ProcessRunner, ReorderPlan,
    TableFormatter, apply_plans, logging, plan_layouts,
};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

fn run_cli(cli: Cli) -> Result<()> {
    logging::init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan { input, output, pretty, no_color } => {
            run_plan(&input, output, pretty, no_color)?;
        }
        Commands::Apply { input, keep_dump, output, pretty, no_color } => {
            run_apply(&input, keep_dump.as_deref(), output, pretty, no_color)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    // Only an explicitly chosen config file has to exist.
    let (path, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    Config::load(path, required)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Makes the root absolute and resolves `.` and `..` lexically. Symlinks are kept as
/// given so the root still prefixes the paths recorded by the compiler.
fn resolve_root(root: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(root)
        .with_context(|| format!("Invalid project root: {}", root.display()))?;

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    if !resolved.is_dir() {
        bail!("Project root is not a directory: {}", root.display());
    }
    Ok(resolved)
}

/// Runs dump generation (unless a dump is given), parsing and planning.
fn build_plans(
    input: &InputArgs,
    config: &Config,
    keep_dump: Option<&Path>,
) -> Result<Vec<ReorderPlan>> {
    let root = resolve_root(&input.root)?;

    // Holds the generated dump until parsing is done.
    let mut scratch: Option<NamedTempFile> = None;

    let dump_path: PathBuf = match (&input.dump, &input.binary) {
        (Some(dump), _) => dump.clone(),
        (None, Some(binary)) => {
            let path = match keep_dump {
                Some(p) => p.to_path_buf(),
                None => {
                    let file = tempfile::Builder::new()
                        .prefix("layout-align-")
                        .suffix(".dump")
                        .tempfile()
                        .context("Failed to create temporary dump file")?;
                    let path = file.path().to_path_buf();
                    scratch = Some(file);
                    path
                }
            };
            config
                .dump_tool()
                .generate(&mut ProcessRunner, binary, &path)
                .with_context(|| format!("Failed to dump debug info of {}", binary.display()))?;
            path
        }
        (None, None) => bail!("Either BINARY or --dump must be given"),
    };

    let model = DumpParser::new(root, config.parser_options())
        .parse_file(&dump_path)
        .with_context(|| format!("Failed to parse dump: {}", dump_path.display()))?;
    drop(scratch);

    let options = config.plan_options().context("Invalid exclude patterns")?;
    let plans = plan_layouts(model, &options).context("Failed to plan field orders")?;
    Ok(plans)
}

fn run_plan(input: &InputArgs, output: OutputFormat, pretty: bool, no_color: bool) -> Result<()> {
    let config = load_config(input.config.as_deref())?;
    let plans = build_plans(input, &config, None)?;

    if plans.is_empty() {
        eprintln!("No types found under {}", input.root.display());
        return Ok(());
    }

    let output_str = match output {
        OutputFormat::Table => TableFormatter::new(no_color).format(&plans),
        OutputFormat::Json => JsonFormatter::new(pretty).format(&plans),
    };
    println!("{}", output_str);

    Ok(())
}

fn run_apply(
    input: &InputArgs,
    keep_dump: Option<&Path>,
    output: OutputFormat,
    pretty: bool,
    no_color: bool,
) -> Result<()> {
    let config = load_config(input.config.as_deref())?;
    let plans = build_plans(input, &config, keep_dump)?;

    if plans.is_empty() {
        eprintln!("No types found under {}", input.root.display());
        return Ok(());
    }

    let report = apply_plans(&plans, &config.reorder_tool(), &mut ProcessRunner);

    let output_str = match output {
        OutputFormat::Table => TableFormatter::new(no_color).format_report(&report),
        OutputFormat::Json => JsonFormatter::new(pretty).format_report(&report),
    };
    println!("{}", output_str);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"
0x00000010:   DW_TAG_structure_type
                DW_AT_name	("Pair")
                DW_AT_byte_size	(0x10)
                DW_AT_decl_file	("{root}/pair.h")
                DW_AT_sibling	(0x00000040)

0x00000020:     DW_TAG_member
                  DW_AT_name	("wide")
                  DW_AT_type	(0x00000040 "long")
                  DW_AT_decl_file	("{root}/pair.h")

0x00000030:     DW_TAG_member
                  DW_AT_name	("flag")
                  DW_AT_type	(0x00000048 "char")
                  DW_AT_decl_file	("{root}/pair.h")

0x00000040:   DW_TAG_base_type
                DW_AT_name	("long")
                DW_AT_byte_size	(0x08)

0x00000048:   DW_TAG_base_type
                DW_AT_name	("char")
                DW_AT_byte_size	(0x01)
"#;

    fn input_for(dir: &Path) -> InputArgs {
        let dump = dir.join("app.dump");
        std::fs::write(&dump, DUMP.replace("{root}", &dir.display().to_string()))
            .expect("write dump");
        InputArgs {
            root: dir.to_path_buf(),
            binary: None,
            dump: Some(dump),
            config: None,
        }
    }

    #[test]
    fn build_plans_from_existing_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_for(dir.path());

        let plans = build_plans(&input, &Config::default(), None).expect("plans");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].record_name(), "Pair");
        assert_eq!(plans[0].field_order(), "flag,wide");
    }

    #[test]
    fn run_plan_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_for(dir.path());

        run_plan(&input, OutputFormat::Table, false, true).expect("plan table");
        run_plan(&input, OutputFormat::Json, true, true).expect("plan json");
    }

    #[test]
    fn other_root_yields_no_plans() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let input = InputArgs { root: other.path().to_path_buf(), ..input_for(dir.path()) };

        let plans = build_plans(&input, &Config::default(), None).expect("plans");
        assert!(plans.is_empty());
        run_plan(&input, OutputFormat::Table, false, true).expect("empty plan");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input =
            InputArgs { config: Some(dir.path().join("missing.yaml")), ..input_for(dir.path()) };
        assert!(run_plan(&input, OutputFormat::Table, false, true).is_err());
    }

    #[test]
    fn explicit_default_config_name_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert!(load_config(None).is_ok());
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn parent_components_in_root_are_resolved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let root = dir.path().join("sub").join("..").join(".");
        let input = InputArgs { root, ..input_for(dir.path()) };

        assert_eq!(resolve_root(&input.root).unwrap(), std::path::absolute(dir.path()).unwrap());
        let plans = build_plans(&input, &Config::default(), None).expect("plans");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].field_order(), "flag,wide");
    }

    #[test]
    fn missing_root_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let input = InputArgs { root: dir.path().join("absent"), ..input_for(dir.path()) };

        let err = build_plans(&input, &Config::default(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("Project root is not a directory"));
    }

    #[test]
    fn failing_dump_tool_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let input = InputArgs {
            root: dir.path().to_path_buf(),
            binary: Some(dir.path().join("app")),
            dump: None,
            config: None,
        };
        let config =
            Config { dump_tool: "layout-align-missing-dumper".to_string(), ..Config::default() };

        let err = build_plans(&input, &config, None).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to dump debug info"));
    }

    #[test]
    fn apply_reports_tool_failures_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_for(dir.path());
        let config = Config {
            reorder_tool: "layout-align-missing-reorderer".to_string(),
            ..Config::default()
        };
        let plans = build_plans(&input, &config, None).expect("plans");
        let report = apply_plans(&plans, &config.reorder_tool(), &mut ProcessRunner);
        assert_eq!(report.applied(), 0);
        assert_eq!(report.outcomes.len(), 1);
    }
}

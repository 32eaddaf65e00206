//! flowsmith: 从子任务列表批量生成工作流蓝图的命令行工具
//!
//! Usage:
//!   flowsmith generate <subtasks.json> [--variations N] [--fallback-only] [--config <file>]
//!   flowsmith categories                       List fallback template categories

use anyhow::{bail, Context};
use flowsmith::{BatchExecutor, BatchOptions, GeneratorConfig, Subtask, TemplateCatalog, WorkflowGenerator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowsmith=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]).await,
        "categories" => cmd_categories(),
        "version" | "--version" | "-V" => {
            println!("flowsmith {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"flowsmith: 工作流蓝图生成工具

USAGE:
    flowsmith <COMMAND> [OPTIONS]

COMMANDS:
    generate <subtasks.json>    Generate workflows for a JSON array of subtasks
        --variations <N>        Variations per subtask (default 1)
        --fallback-only         Never call the remote service
        --config <file>         YAML configuration file
    categories                  List fallback template categories
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    FLOWSMITH_API_KEY           Remote service credential
    FLOWSMITH_BASE_URL          Remote service base URL
    FLOWSMITH_TIMEOUT_MS        Per-call deadline in milliseconds
    FLOWSMITH_BATCH_SIZE        Subtasks per concurrent chunk
    RUST_LOG                    Log filter (default flowsmith=info)"#
    );
}

struct GenerateArgs {
    input: PathBuf,
    variations: u32,
    fallback_only: bool,
    config: Option<PathBuf>,
}

fn parse_generate_args(args: &[String]) -> anyhow::Result<GenerateArgs> {
    let mut input = None;
    let mut variations = 1u32;
    let mut fallback_only = false;
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--variations" => {
                let value = iter.next().context("--variations needs a value")?;
                variations = value
                    .parse()
                    .with_context(|| format!("invalid --variations value: {value}"))?;
            }
            "--fallback-only" => fallback_only = true,
            "--config" => {
                config = Some(PathBuf::from(iter.next().context("--config needs a path")?));
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    bail!("only one input file may be given");
                }
            }
        }
    }

    Ok(GenerateArgs {
        input: input.context("missing <subtasks.json>")?,
        variations: variations.max(1),
        fallback_only,
        config,
    })
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let args = parse_generate_args(args)?;

    let config = match args.config {
        Some(ref path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .with_env_overrides(),
        None => GeneratorConfig::from_env(),
    };

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let subtasks: Vec<Subtask> =
        serde_json::from_str(&content).context("input must be a JSON array of subtasks")?;

    let options = BatchOptions::from_config(&config).with_variations(args.variations);
    let generator = WorkflowGenerator::builder()
        .config(config)
        .fallback_only(args.fallback_only)
        .build()?;

    let result = BatchExecutor::with_options(options)
        .execute(&generator, &subtasks)
        .await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.errors.is_empty() {
        eprintln!(
            "{} of {} item(s) failed",
            result.metadata.error_count,
            result.metadata.error_count + result.metadata.success_count
        );
    }
    Ok(())
}

fn cmd_categories() -> anyhow::Result<()> {
    let catalog = TemplateCatalog::builtin()?;
    for category in catalog.categories() {
        println!(
            "{:<20} {} template(s)  [{}]",
            category.name,
            category.templates.len(),
            category.integrations.join(", ")
        );
    }
    Ok(())
}

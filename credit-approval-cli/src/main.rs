use clap::Parser;
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{stdout, Write};
use std::path::PathBuf;
use tracing::info;

use credit_approval::datasets::make_credit_applications;
use credit_approval::{run, run_file, PipelineConfig, Report};

/// Predict credit-card approvals: clean, encode, scale, fit and tune a logistic regression.
#[derive(Parser, Debug)]
#[command(name = "credit-approval", version, about)]
struct Cli {
    /// Headerless data file (16 columns, `?` for missing values)
    #[arg(default_value = "credit-approval.csv")]
    data: PathBuf,

    /// JSON file overriding the default pipeline settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore DATA and generate this many synthetic applications instead
    #[arg(long, value_name = "ROWS")]
    synthetic: Option<usize>,
}

fn print_report(report: &Report) -> anyhow::Result<()> {
    let mut out = stdout();
    for section in report.sections() {
        execute!(
            out,
            SetForegroundColor(Color::Cyan),
            SetAttribute(Attribute::Bold),
            Print(format!("== {} ==\n", section.title)),
            SetAttribute(Attribute::Reset),
            ResetColor,
            Print(format!("{}\n", section.body)),
        )?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_approval=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            PipelineConfig::load(path)?
        }
        None => PipelineConfig::default(),
    };

    let report = match cli.synthetic {
        Some(rows) => {
            info!(rows, seed = config.seed, "generating synthetic applications");
            let raw = make_credit_applications(rows, Some(config.seed))?;
            run(&config, &raw)?
        }
        None => run_file(&config, &cli.data)?,
    };

    print_report(&report)
}

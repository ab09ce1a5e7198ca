// crates/liftcli/src/main.rs

use anyhow::Result;
use clap::Parser;
use liftconvert::{Converter, ConverterOptions, MapperRegistry};
use std::path::PathBuf;

/// Convert workflow definitions into Airflow DAG programs.
#[derive(Parser)]
#[command(name = "airlift")]
#[command(about = "Convert Oozie workflow XML to Airflow DAGs", long_about = None)]
struct Cli {
    /// Path to the input workflow directory (contains workflow.xml)
    #[arg(short, long)]
    input_directory_path: PathBuf,

    /// Desired output directory
    #[arg(short, long)]
    output_directory_path: PathBuf,

    /// Desired DAG name [defaults to the input directory name]
    #[arg(short, long)]
    dag_name: Option<String>,

    /// Value used in place of all ${user.name} references
    /// [defaults to the user running the conversion]
    #[arg(short, long)]
    user: Option<String>,

    /// Desired DAG start as number of days ago
    #[arg(short, long, default_value_t = 0)]
    start_days_ago: u32,

    /// Desired DAG schedule interval as number of days
    #[arg(short = 'v', long, default_value_t = 0)]
    schedule_interval: u32,

    /// Show verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let mut registry = MapperRegistry::new();
    liftnodes::register_all(&mut registry);

    let converter = Converter::new(ConverterOptions {
        dag_name: cli.dag_name,
        input_directory: cli.input_directory_path.clone(),
        output_directory: cli.output_directory_path,
        user: cli.user,
        start_days_ago: cli.start_days_ago,
        schedule_interval: cli.schedule_interval,
    })?;

    println!("🚀 Converting workflow: {}", cli.input_directory_path.display());
    let output_path = converter.convert(&registry)?;
    println!("✨ Saved generated DAG: {}", output_path.display());

    Ok(())
}

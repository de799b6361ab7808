use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use archeval_core::measures::{
    calculate_component_measures, calculate_request_trace_measures, calculate_system_measures,
};
use archeval_core::QualityModel;

mod config;
mod model;
mod report;

use config::Config;

#[derive(Parser)]
#[command(name = "archeval")]
#[command(about = "Evaluate the quality of cloud-native architecture models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate all measures and evaluate the quality factor graph
    Evaluate {
        /// Path to the model file (JSON)
        model: PathBuf,
        /// Output format: text or json (overrides the config file)
        #[arg(long)]
        format: Option<String>,
    },
    /// Print calculated measures for one scope
    Measures {
        /// Path to the model file (JSON)
        model: PathBuf,
        /// Scope: system, components, or request-traces
        #[arg(long, default_value = "system")]
        scope: String,
    },
    /// Export the model as a TOSCA-style service template (JSON)
    Export {
        /// Path to the model file (JSON)
        model: PathBuf,
        /// Template version stamp (overrides the config file)
        #[arg(long)]
        version: Option<String>,
    },
    /// Create a default .archeval.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate { model, format } => cmd_evaluate(&model, format.as_deref()),
        Commands::Measures { model, scope } => cmd_measures(&model, &scope),
        Commands::Export { model, version } => cmd_export(&model, version.as_deref()),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn config_for(model_path: &Path) -> Config {
    let dir = model_path.parent().unwrap_or_else(|| Path::new("."));
    Config::load_or_default(dir)
}

fn cmd_evaluate(model_path: &Path, format: Option<&str>) -> Result<()> {
    let config = config_for(model_path);
    let format = format.unwrap_or(&config.output.format);

    let system = model::load_model(model_path)?;
    let quality_model = QualityModel::default_model();
    quality_model
        .validate()
        .context("built-in quality model failed validation")?;
    let report = report::build_report(&system, &quality_model);

    match format {
        "text" => print!("{}", report::format_text(&report)),
        "json" => {
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize report")?;
            println!("{json}");
        }
        other => anyhow::bail!("unknown output format '{other}' (expected text or json)"),
    }
    Ok(())
}

fn cmd_measures(model_path: &Path, scope: &str) -> Result<()> {
    let system = model::load_model(model_path)?;

    let output = match scope {
        "system" => {
            let mut sections = BTreeMap::new();
            sections.insert(system.name().to_string(), calculate_system_measures(&system));
            report::format_measures("System measures", &sections)
        }
        "components" => {
            let sections = system
                .components()
                .iter()
                .map(|component| {
                    (
                        component.id.to_string(),
                        calculate_component_measures(component, &system),
                    )
                })
                .collect();
            report::format_measures("Component measures", &sections)
        }
        "request-traces" => {
            let sections = system
                .request_traces()
                .iter()
                .map(|trace| {
                    (
                        trace.id.to_string(),
                        calculate_request_trace_measures(trace, &system),
                    )
                })
                .collect();
            report::format_measures("Request trace measures", &sections)
        }
        other => anyhow::bail!(
            "unknown scope '{other}' (expected system, components, or request-traces)"
        ),
    };
    print!("{output}");
    Ok(())
}

fn cmd_export(model_path: &Path, version: Option<&str>) -> Result<()> {
    let config = config_for(model_path);
    let version = version.unwrap_or(&config.export.template_version);

    let system = model::load_model(model_path)?;
    let conversion = archeval_tosca::system_to_template(&system, version);
    let json = serde_json::to_string_pretty(&conversion.template)
        .context("failed to serialize service template")?;
    println!("{json}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(config::CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!(".archeval.toml already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())?;
    println!("Created .archeval.toml with default configuration.");
    Ok(())
}

//! Command-line parsing for the food price predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! catalog/encoding code. Dispatch lives in `crate::app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FeatureSchema, Field, FilterOrder};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fprice", version, about = "Sri Lanka food price predictor (2026)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui(TuiArgs),
    /// Answer one numbered prompt per field, then predict.
    Ask(AskArgs),
    /// Predict a single combination (scriptable).
    Predict(PredictArgs),
    /// Print the valid choices for one field given upstream choices.
    Options(OptionsArgs),
    /// Summarize the loaded dataset catalog, encoders and model.
    Catalog(CatalogArgs),
}

/// Where the startup assets live and which model variant is served.
///
/// Unset flags fall back to the environment, then the config file, then defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct AssetArgs {
    /// TOML config file (default: `fprice.toml` if present).
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Historical price dataset CSV.
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Model artifact JSON.
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Label encoder artifact JSON.
    #[arg(long, value_name = "JSON")]
    pub encoders: Option<PathBuf>,

    /// Directory holding precomputed diagnostic images.
    #[arg(long, value_name = "DIR")]
    pub outputs: Option<PathBuf>,

    /// Feature layout the model was trained on.
    #[arg(long, value_enum)]
    pub schema: Option<FeatureSchema>,

    /// How category/commodity choices are narrowed.
    #[arg(long, value_enum)]
    pub filter_order: Option<FilterOrder>,

    /// Send predictions to this HTTP endpoint instead of the local model.
    #[arg(long, value_name = "URL")]
    pub predict_url: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TuiArgs {
    #[command(flatten)]
    pub assets: AssetArgs,

    /// Log file for the interactive session (stderr would corrupt the screen).
    #[arg(long, default_value = "fprice.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct AskArgs {
    #[command(flatten)]
    pub assets: AssetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub assets: AssetArgs,

    /// Province (admin1).
    #[arg(long)]
    pub province: String,

    #[arg(long)]
    pub market: String,

    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub commodity: String,

    /// Unit (default: the commodity's most frequent unit).
    #[arg(long)]
    pub unit: Option<String>,

    /// Month of 2026 (1-12).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub assets: AssetArgs,

    /// Which field to list choices for.
    #[arg(value_enum)]
    pub field: Field,

    #[arg(long)]
    pub province: Option<String>,

    #[arg(long)]
    pub market: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub commodity: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub assets: AssetArgs,
}

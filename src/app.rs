//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - resolves configuration and loads the startup assets (fatal on failure)
//! - dispatches to the interactive form, the prompt mode or a scripted command

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{AskArgs, AssetArgs, CatalogArgs, Command, OptionsArgs, PredictArgs, TuiArgs};
use crate::config::AppConfig;
use crate::domain::{Field, MONTHS, Selection};
use crate::error::{AppError, EXIT_FAILURE};
use crate::report::{PredictionView, format_prediction, month_name};

pub mod pipeline;

use pipeline::Assets;

/// Entry point for the `fprice` binary.
pub fn run() -> Result<(), AppError> {
    // `fprice` and `fprice --data x.csv` behave like `fprice tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Ask(args) => handle_ask(args),
        Command::Predict(args) => handle_predict(args),
        Command::Options(args) => handle_options(args),
        Command::Catalog(args) => handle_catalog(args),
    }
}

fn load_assets(args: &AssetArgs) -> Result<Assets, AppError> {
    let config = AppConfig::load(args)?;
    tracing::debug!(?config, "configuration resolved");
    Assets::load(config).inspect_err(|err| tracing::error!(%err, "startup failed"))
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    init_logging(Some(&args.log_file));
    let assets = load_assets(&args.assets)?;
    crate::tui::run(&assets)
}

fn handle_ask(args: AskArgs) -> Result<(), AppError> {
    init_logging(None);
    let assets = load_assets(&args.assets)?;
    let resolver = assets.resolver();
    let variant = assets.variant();

    let mut form = resolver.resolve(&Selection::default(), variant);
    for field in Field::ALL {
        let choice = crate::cli::picker::prompt_choice(
            field.display_name(),
            form.options(field),
            form.selection.label(field),
        )?;
        form = resolver.select(&form.selection, field, &choice, variant);
    }

    let months: Vec<String> = MONTHS.filter_map(month_name).collect();
    let current = month_name(form.selection.month).unwrap_or_default();
    let month = crate::cli::picker::prompt_choice("Month (2026)", &months, &current)?;
    form.selection.month = months
        .iter()
        .position(|m| *m == month)
        .map(|idx| idx as u32 + 1)
        .unwrap_or(form.selection.month);

    println!();
    match assets.predict(&form.selection) {
        Ok(prediction) => print!("{}", format_prediction(&PredictionView::new(&prediction))),
        // Recoverable: report inline, same as the form does.
        Err(err) => println!("{err}"),
    }
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    init_logging(None);
    let assets = load_assets(&args.assets)?;
    write_prediction(&assets, &args, &mut io::stdout().lock())
}

/// One scripted prediction. A `PredictError` becomes exit code 4.
fn write_prediction<W: Write>(assets: &Assets, args: &PredictArgs, out: &mut W) -> Result<(), AppError> {
    let unit = match &args.unit {
        Some(unit) => unit.clone(),
        None => assets.resolver().default_unit_for(&args.commodity).to_string(),
    };
    let selection = Selection {
        province: args.province.clone(),
        market: args.market.clone(),
        category: args.category.clone(),
        commodity: args.commodity.clone(),
        unit,
        month: args.month,
    };

    let prediction = assets.predict(&selection)?;
    let view = PredictionView::new(&prediction);
    if args.json {
        let json = serde_json::to_string_pretty(&view)
            .map_err(|e| AppError::new(EXIT_FAILURE, format!("Failed to serialize prediction: {e}")))?;
        writeln!(out, "{json}").map_err(write_err)
    } else {
        write!(out, "{}", format_prediction(&view)).map_err(write_err)
    }
}

fn handle_options(args: OptionsArgs) -> Result<(), AppError> {
    init_logging(None);
    let assets = load_assets(&args.assets)?;
    write_options(&assets, &args, &mut io::stdout().lock())
}

/// Print the resolved choices for one field, one per line.
fn write_options<W: Write>(assets: &Assets, args: &OptionsArgs, out: &mut W) -> Result<(), AppError> {
    let resolver = assets.resolver();
    let order = assets.variant().filter_order;

    let province = args.province.as_deref().unwrap_or_default();
    let market = args.market.as_deref().unwrap_or_default();
    let category = args.category.as_deref().unwrap_or_default();

    let options: &[String] = match args.field {
        Field::Admin1 => resolver.provinces(),
        Field::Market => resolver.markets_for(province),
        Field::Category => resolver.categories(order, market),
        Field::Commodity => resolver.commodities(order, market, category),
        Field::Unit => {
            let default_unit = args
                .commodity
                .as_deref()
                .map(|c| resolver.default_unit_for(c));
            for unit in resolver.units() {
                if Some(unit.as_str()) == default_unit {
                    writeln!(out, "{unit}\t(default)").map_err(write_err)?;
                } else {
                    writeln!(out, "{unit}").map_err(write_err)?;
                }
            }
            return Ok(());
        }
    };

    for opt in options {
        writeln!(out, "{opt}").map_err(write_err)?;
    }
    Ok(())
}

fn write_err(e: io::Error) -> AppError {
    AppError::new(EXIT_FAILURE, format!("Failed to write output: {e}"))
}

fn handle_catalog(args: CatalogArgs) -> Result<(), AppError> {
    init_logging(None);
    let assets = load_assets(&args.assets)?;
    print!("{}", format_catalog_summary(&assets));
    Ok(())
}

fn format_catalog_summary(assets: &Assets) -> String {
    let catalog = &assets.catalog;
    let variant = assets.variant();
    let mut out = String::new();

    out.push_str("=== fprice - catalog ===\n");
    out.push_str(&format!("Dataset: {}\n", assets.config.data_path.display()));
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        assets.rows_read,
        catalog.records_used(),
        assets.rows_dropped
    ));
    out.push_str(&format!(
        "Catalog: provinces={} markets={} (located={}) categories={} commodities={}\n",
        catalog.province_count(),
        catalog.market_count(),
        catalog.located_market_count(),
        catalog.category_count(),
        catalog.commodity_count(),
    ));

    out.push_str("Encoders:\n");
    for field in Field::ALL {
        out.push_str(&format!(
            "- {:<10} {} labels\n",
            field.column(),
            assets.encoders.get(field).len()
        ));
    }

    out.push_str(&format!("Model: {}\n", assets.predictor.describe()));
    out.push_str(&format!(
        "Features ({:?}): {}\n",
        variant.schema,
        variant.schema.feature_names().join(", ")
    ));
    out.push_str(&format!("Filter order: {:?}\n", variant.filter_order));
    out
}

/// Install the global tracing subscriber (`RUST_LOG`, default `warn`).
///
/// With a log file, output goes there instead of stderr.
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let file = log_file.and_then(|path| match File::create(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Failed to open log file '{}': {e}", path.display());
            None
        }
    });

    // A second init (tests) is harmless; ignore it.
    let _ = match file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
        None => builder.with_writer(io::stderr).try_init(),
    };
}

/// Rewrite argv so `fprice` defaults to `fprice tui`.
///
/// Rules:
/// - `fprice`                      -> `fprice tui`
/// - `fprice --data x.csv ...`     -> `fprice tui --data x.csv ...`
/// - `fprice --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "ask" | "predict" | "options" | "catalog");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_form() {
        assert_eq!(rewrite_args(argv(&["fprice"])), argv(&["fprice", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["fprice", "--data", "x.csv"])),
            argv(&["fprice", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["fprice", "--help"])), argv(&["fprice", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["fprice", "catalog"])),
            argv(&["fprice", "catalog"])
        );
    }

    #[test]
    fn catalog_summary_lists_counts_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(pipeline::fixtures::write_assets(dir.path())).unwrap();
        let summary = format_catalog_summary(&assets);
        assert!(summary.contains("provinces=2 markets=3 (located=3)"));
        assert!(summary.contains("- market     4 labels"));
        assert!(summary.contains("tree ensemble (1 trees)"));
        assert!(summary.contains("year, month, latitude, longitude"));
    }

    fn predict_args(market: &str, unit: Option<&str>, json: bool) -> PredictArgs {
        PredictArgs {
            assets: AssetArgs::default(),
            province: "Western".to_string(),
            market: market.to_string(),
            category: "cereals and tubers".to_string(),
            commodity: "Rice (red)".to_string(),
            unit: unit.map(str::to_string),
            month: 3,
            json,
        }
    }

    fn options_args(field: Field) -> OptionsArgs {
        OptionsArgs {
            assets: AssetArgs::default(),
            field,
            province: Some("Western".to_string()),
            market: Some("Colombo".to_string()),
            category: None,
            commodity: Some("Coconut oil".to_string()),
        }
    }

    #[test]
    fn predict_defaults_unit_to_most_frequent() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(pipeline::fixtures::write_assets(dir.path())).unwrap();
        let mut out = Vec::new();
        write_prediction(&assets, &predict_args("Colombo", None, false), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Estimated price for March 2026"));
        assert!(text.contains("₨ 1,000"));
        assert!(text.contains("≈ LKR 100.00 per 100g"));
        assert!(text.contains("Rice (red) (KG)"));
    }

    #[test]
    fn predict_json_has_view_fields() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(pipeline::fixtures::write_assets(dir.path())).unwrap();
        let mut out = Vec::new();
        write_prediction(&assets, &predict_args("Colombo", Some("L"), true), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["period"], "March 2026");
        assert_eq!(json["price"], 1000.0);
        assert_eq!(json["price_text"], "₨ 1,000");
        assert_eq!(json["secondary"]["kind"], "per_hundred_millilitres");
        assert_eq!(json["confidence"], "Medium");
        assert_eq!(json["selection"]["unit"], "L");
        assert_eq!(json["selection"]["market"], "Colombo");
    }

    #[test]
    fn predict_unknown_label_exits_with_predict_code() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(pipeline::fixtures::write_assets(dir.path())).unwrap();
        let mut out = Vec::new();
        let err = write_prediction(&assets, &predict_args("Nonexistent Market", None, false), &mut out).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PREDICT);
        assert_eq!(err.to_string(), "Market 'Nonexistent Market' not found in training data.");
        assert!(out.is_empty());
    }

    #[test]
    fn options_follow_upstream_choices() {
        let dir = tempfile::tempdir().unwrap();
        let assets = Assets::load(pipeline::fixtures::write_assets(dir.path())).unwrap();

        let mut out = Vec::new();
        write_options(&assets, &options_args(Field::Market), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Colombo\nGampaha\n");

        let mut out = Vec::new();
        write_options(&assets, &options_args(Field::Category), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "cereals and tubers\noil and fats\n");

        let mut out = Vec::new();
        write_options(&assets, &options_args(Field::Unit), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "KG\nL\t(default)\nUnit\n");
    }
}

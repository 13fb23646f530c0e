#![deny(warnings)]

//! Headless CLI: load a partner model, project every scenario and render it.

use anyhow::{bail, Result};
use proj_core::{lint_model, load_model, Model};
use proj_econ::{
    bulk_margin, bulk_margin_pct, retail_margin, retail_margin_pct, tier_economics_all,
};
use proj_runtime::{pivot_chart_rows, project_model, summarize, ScenarioProjection};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
    Chart,
}

#[derive(Debug)]
struct Args {
    config: Option<String>,
    format: Format,
    scenario: Option<String>,
    tiers: bool,
    version: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Result<Args> {
    let mut args = Args {
        config: None,
        format: Format::Table,
        scenario: None,
        tiers: false,
        version: false,
    };
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => match it.next() {
                Some(path) => args.config = Some(path),
                None => bail!("--config requires a path"),
            },
            "--scenario" => match it.next() {
                Some(name) => args.scenario = Some(name),
                None => bail!("--scenario requires a name"),
            },
            "--format" => {
                args.format = match it.next().as_deref() {
                    Some("table") => Format::Table,
                    Some("json") => Format::Json,
                    Some("chart") => Format::Chart,
                    other => bail!("unknown format {other:?}, expected table|json|chart"),
                }
            }
            "--tiers" => args.tiers = true,
            "--version" => args.version = true,
            _ => warn!(%arg, "ignoring unknown argument"),
        }
    }
    Ok(args)
}

/// Render a currency or count with `dp` decimals, dropping float noise.
fn num(v: f64, dp: u32) -> String {
    Decimal::from_f64_retain(v)
        .map(|d| d.round_dp(dp).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn pct(frac: f64) -> String {
    num(frac * 100.0, 1)
}

fn print_catalog(model: &Model) {
    println!(
        "{:<26} {:>10} {:>10} {:>10} {:>8}",
        "Product", "Wholesale", "COGS", "Margin", "Margin%"
    );
    for p in &model.bulk_products {
        println!(
            "{:<26} {:>10} {:>10} {:>10} {:>8}",
            p.name,
            num(p.wholesale_price, 2),
            num(p.cogs, 2),
            num(bulk_margin(p), 2),
            pct(bulk_margin_pct(p))
        );
    }
    for p in &model.retail_products {
        println!(
            "{:<26} {:>10} {:>10} {:>10} {:>8}",
            p.name,
            num(p.wholesale_price, 2),
            num(p.cogs, 2),
            num(retail_margin(p), 2),
            pct(retail_margin_pct(p))
        );
    }
    println!();
}

fn print_tiers(model: &Model) {
    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Tier", "Servings", "Bulk rev", "Bulk prof", "Retail rev", "Total rev", "Total prof"
    );
    for e in tier_economics_all(model) {
        println!(
            "{:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            e.label,
            num(e.servings_per_month, 0),
            num(e.bulk_rev, 2),
            num(e.bulk_profit, 2),
            num(e.retail_rev, 2),
            num(e.total_rev, 2),
            num(e.total_profit, 2)
        );
        for line in &e.bulk_lines {
            println!(
                "  {:<24} {:>8} units {:>10}",
                line.name,
                num(line.units, 2),
                num(line.revenue, 2)
            );
        }
    }
    println!();
}

fn print_projection(p: &ScenarioProjection) {
    println!("== {} ==", p.name);
    println!(
        "{:<9} {:>9} {:>11} {:>11} {:>8} {:>12}",
        "Month", "Partners", "Revenue", "Profit", "Margin%", "Cum revenue"
    );
    for m in &p.months {
        println!(
            "{:<9} {:>9} {:>11} {:>11} {:>8} {:>12}",
            m.label,
            num(m.total_partners, 2),
            num(m.total_revenue, 0),
            num(m.total_profit, 0),
            num(m.margin_pct, 1),
            num(m.cumulative_revenue, 0)
        );
    }
    let s = summarize(p);
    let first_profitable = s
        .first_profitable_month
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());
    println!(
        "KPI | partners: {} | 12m revenue: ${} | 12m profit: ${} | margin: {}% | first profit: {}",
        num(s.ending_partners, 2),
        num(s.cumulative_revenue, 0),
        num(s.cumulative_profit, 0),
        num(s.final_margin_pct, 1),
        first_profitable
    );
    println!();
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "proj {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(config = ?args.config, format = ?args.format, "starting CLI");

    let model = match &args.config {
        Some(path) => load_model(path)?,
        None => Model::default(),
    };
    for lint in lint_model(&model) {
        warn!("{lint}");
    }

    let mut projections = project_model(&model);
    if let Some(name) = &args.scenario {
        projections.retain(|p| &p.name == name);
        if projections.is_empty() {
            bail!("no scenario named '{name}'");
        }
    }

    match args.format {
        Format::Table => {
            if args.tiers {
                print_catalog(&model);
                print_tiers(&model);
            }
            for p in &projections {
                print_projection(p);
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&projections)?),
        Format::Chart => {
            println!("{}", serde_json::to_string_pretty(&pivot_chart_rows(&projections))?)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_all_flags() {
        let args = parse_args(argv(&[
            "--config",
            "model.yaml",
            "--format",
            "chart",
            "--scenario",
            "Base Case",
            "--tiers",
        ]))
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("model.yaml"));
        assert_eq!(args.format, Format::Chart);
        assert_eq!(args.scenario.as_deref(), Some("Base Case"));
        assert!(args.tiers);
        assert!(!args.version);
    }

    #[test]
    fn defaults_without_flags() {
        let args = parse_args(argv(&[])).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.format, Format::Table);
    }

    #[test]
    fn trailing_flag_without_value_is_an_error() {
        let err = parse_args(argv(&["--config"])).unwrap_err();
        assert_eq!(err.to_string(), "--config requires a path");
        let err = parse_args(argv(&["--format", "json", "--scenario"])).unwrap_err();
        assert_eq!(err.to_string(), "--scenario requires a name");
        assert!(parse_args(argv(&["--format"])).is_err());
    }
}

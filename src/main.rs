use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};

// Use library instead of local modules
use unit_taxonomy::{load_prefixes, load_quantity_kinds, load_units, HierarchyOverrides, ReconciliationEngine};

const USAGE: &str = "Usage: unit-taxonomy <prefixes.json> <quantitykinds.json> <units.json> [overrides.json]";

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the taxonomy JSON
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("unit_taxonomy=info".parse()?),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    run(&args[1], &args[2], &args[3], args.get(4).map(String::as_str))
}

fn run(prefixes_path: &str, quantity_kinds_path: &str, units_path: &str, overrides_path: Option<&str>) -> Result<()> {
    let prefixes = load_prefixes(prefixes_path)?;
    let quantity_kinds = load_quantity_kinds(quantity_kinds_path)?;
    let units = load_units(units_path)?;

    let engine = match overrides_path {
        Some(path) => ReconciliationEngine::with_overrides(HierarchyOverrides::from_file(path)?),
        None => ReconciliationEngine::new(),
    };

    let reconciliation = engine
        .reconcile(prefixes, &quantity_kinds, &units)
        .context("Reconciliation pass failed")?;

    tracing::info!(fingerprint = %reconciliation.report.fingerprint, "Taxonomy ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &reconciliation.taxonomy).context("Failed to write taxonomy JSON")?;
    writeln!(out)?;

    Ok(())
}

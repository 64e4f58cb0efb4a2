use anyhow::{bail, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

use medallion_warehouse::db::setup_database;
use medallion_warehouse::gold::create_views;
use medallion_warehouse::normalize::NormalizerMaps;
use medallion_warehouse::pipeline;
use medallion_warehouse::quality::QualityEngine;

const DEFAULT_DB_PATH: &str = "warehouse.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("ingest") => run_ingest(&data_dir_arg(&args)?, &db_path(&args, 3)),
        Some("transform") => run_transform(&db_path(&args, 2)),
        Some("views") => run_views(&db_path(&args, 2)),
        Some("check") => run_check(&args[2..]),
        Some("run") => run_all(&data_dir_arg(&args)?, &db_path(&args, 3)),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("medallion-warehouse - bronze/silver/gold batch warehouse pipeline");
    println!();
    println!("Usage:");
    println!("  medallion-warehouse ingest <data_dir> [db_path]   stage source CSVs into bronze");
    println!("  medallion-warehouse transform [db_path]           run the silver transforms");
    println!("  medallion-warehouse views [db_path]               (re)create the gold views");
    println!("  medallion-warehouse check [--json] [db_path]      run the quality contract");
    println!("  medallion-warehouse run <data_dir> [db_path]      ingest + transform + views + check");
    println!();
    println!("Default db_path: {}", DEFAULT_DB_PATH);
}

fn data_dir_arg(args: &[String]) -> Result<PathBuf> {
    match args.get(2) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => bail!("Missing <data_dir> argument"),
    }
}

fn db_path(args: &[String], index: usize) -> PathBuf {
    args.get(index)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

fn open_store(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_ingest(data_dir: &Path, db_path: &Path) -> Result<()> {
    println!("Staging source CSVs from {}", data_dir.display());

    let mut conn = open_store(db_path)?;
    let summary = pipeline::ingest(&mut conn, data_dir)?;

    for entity in &summary.entities {
        println!("✓ {}: {} rows staged", entity.entity, entity.raw_rows);
    }
    println!("✓ Bronze layer replaced ({} rows total)", summary.total_conformed());

    Ok(())
}

fn run_transform(db_path: &Path) -> Result<()> {
    println!("Running silver transforms...");

    let mut conn = open_store(db_path)?;
    let maps = NormalizerMaps::new();
    let summary = pipeline::transform(&mut conn, &maps)?;

    for entity in &summary.entities {
        println!(
            "✓ {}: {} raw rows → {} conformed rows",
            entity.entity, entity.raw_rows, entity.conformed_rows
        );
    }
    println!("✓ Silver layer replaced ({} rows total)", summary.total_conformed());

    Ok(())
}

fn run_views(db_path: &Path) -> Result<()> {
    let conn = open_store(db_path)?;
    create_views(&conn)?;

    println!("✓ Gold views created: gold_dim_customers, gold_dim_products, gold_fact_sales");
    Ok(())
}

fn run_check(rest: &[String]) -> Result<()> {
    let as_json = rest.iter().any(|a| a == "--json");
    let db = rest
        .iter()
        .find(|a| *a != "--json")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    let conn = open_store(&db)?;
    // The contract reads the gold views; make sure they exist
    create_views(&conn)?;

    let report = QualityEngine::new().run(&conn)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &report.checks {
            if check.passed {
                println!("✓ {}", check.name);
            } else {
                println!("✗ {}: {} violations", check.name, check.violation_count);
                for sample in &check.samples {
                    println!("    {}", sample);
                }
            }
        }
        println!("{}", report.summary());
    }

    if !report.passed {
        std::process::exit(1);
    }
    Ok(())
}

fn run_all(data_dir: &Path, db_path: &Path) -> Result<()> {
    run_ingest(data_dir, db_path)?;
    run_transform(db_path)?;
    run_views(db_path)?;
    run_check(&[db_path.display().to_string()])?;

    println!("✓ Pipeline run complete");
    Ok(())
}

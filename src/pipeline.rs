// Pipeline Orchestration - Sequential, fail-fast batch run
//
// Entities are independent: each one reads its full bronze snapshot,
// transforms it, and full-replaces its silver target inside one transaction.
// The first failure aborts the remaining entities; the failing entity's
// transaction has already rolled back, entities not yet attempted keep their
// last-good snapshot.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::db;
use crate::normalize::NormalizerMaps;
use crate::records::{
    RawCustomer, RawErpCategory, RawErpCustomer, RawErpLocation, RawProduct, RawSale,
};
use crate::silver;

/// Source CSV file names expected under the data directory.
pub const SOURCE_FILES: [&str; 6] = [
    "crm_customers.csv",
    "crm_products.csv",
    "crm_sales.csv",
    "erp_customers.csv",
    "erp_locations.csv",
    "erp_categories.csv",
];

/// Row counts for one entity's load.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub raw_rows: usize,
    pub conformed_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub entities: Vec<EntitySummary>,
}

impl RunSummary {
    pub fn total_conformed(&self) -> usize {
        self.entities.iter().map(|e| e.conformed_rows).sum()
    }
}

// ============================================================================
// BRONZE INGESTION
// ============================================================================

/// Stage the six source CSVs into the bronze tables, each as a full replace.
pub fn ingest(conn: &mut Connection, data_dir: &Path) -> Result<RunSummary> {
    let mut entities = Vec::new();

    let customers: Vec<RawCustomer> = db::load_csv(&data_dir.join("crm_customers.csv"))?;
    let count = db::replace_bronze_customers(conn, &customers)
        .context("Failed to stage CRM customers")?;
    entities.push(staged("crm_customers", count));

    let products: Vec<RawProduct> = db::load_csv(&data_dir.join("crm_products.csv"))?;
    let count =
        db::replace_bronze_products(conn, &products).context("Failed to stage CRM products")?;
    entities.push(staged("crm_products", count));

    let sales: Vec<RawSale> = db::load_csv(&data_dir.join("crm_sales.csv"))?;
    let count = db::replace_bronze_sales(conn, &sales).context("Failed to stage CRM sales")?;
    entities.push(staged("crm_sales", count));

    let erp_customers: Vec<RawErpCustomer> = db::load_csv(&data_dir.join("erp_customers.csv"))?;
    let count = db::replace_bronze_erp_customers(conn, &erp_customers)
        .context("Failed to stage ERP customers")?;
    entities.push(staged("erp_customers", count));

    let erp_locations: Vec<RawErpLocation> = db::load_csv(&data_dir.join("erp_locations.csv"))?;
    let count = db::replace_bronze_erp_locations(conn, &erp_locations)
        .context("Failed to stage ERP locations")?;
    entities.push(staged("erp_locations", count));

    let erp_categories: Vec<RawErpCategory> = db::load_csv(&data_dir.join("erp_categories.csv"))?;
    let count = db::replace_bronze_erp_categories(conn, &erp_categories)
        .context("Failed to stage ERP categories")?;
    entities.push(staged("erp_categories", count));

    Ok(RunSummary { entities })
}

fn staged(entity: &str, rows: usize) -> EntitySummary {
    EntitySummary {
        entity: entity.to_string(),
        raw_rows: rows,
        conformed_rows: rows,
    }
}

// ============================================================================
// SILVER TRANSFORMATION
// ============================================================================

/// Run the six silver transforms with today's date as the processing date.
pub fn transform(conn: &mut Connection, maps: &NormalizerMaps) -> Result<RunSummary> {
    transform_as_of(conn, maps, Utc::now().date_naive())
}

/// Run the six silver transforms against a fixed processing date.
/// Entities are processed sequentially; the first error aborts the rest.
pub fn transform_as_of(
    conn: &mut Connection,
    maps: &NormalizerMaps,
    today: NaiveDate,
) -> Result<RunSummary> {
    let mut entities = Vec::new();

    let raw = db::get_bronze_customers(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_customers(raw, maps);
    db::replace_silver_customers(conn, &conformed).context("Failed to load silver customers")?;
    entities.push(EntitySummary {
        entity: "crm_customers".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    let raw = db::get_bronze_products(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_products(raw, maps);
    db::replace_silver_products(conn, &conformed).context("Failed to load silver products")?;
    entities.push(EntitySummary {
        entity: "crm_products".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    let raw = db::get_bronze_sales(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_sales(raw);
    db::replace_silver_sales(conn, &conformed).context("Failed to load silver sales")?;
    entities.push(EntitySummary {
        entity: "crm_sales".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    let raw = db::get_bronze_erp_customers(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_erp_customers(raw, maps, today);
    db::replace_silver_erp_customers(conn, &conformed)
        .context("Failed to load silver ERP customers")?;
    entities.push(EntitySummary {
        entity: "erp_customers".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    let raw = db::get_bronze_erp_locations(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_erp_locations(raw, maps);
    db::replace_silver_erp_locations(conn, &conformed)
        .context("Failed to load silver ERP locations")?;
    entities.push(EntitySummary {
        entity: "erp_locations".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    let raw = db::get_bronze_erp_categories(conn)?;
    let raw_rows = raw.len();
    let conformed = silver::transform_erp_categories(raw);
    db::replace_silver_erp_categories(conn, &conformed)
        .context("Failed to load silver ERP categories")?;
    entities.push(EntitySummary {
        entity: "erp_categories".to_string(),
        raw_rows,
        conformed_rows: conformed.len(),
    });

    Ok(RunSummary { entities })
}

// ============================================================================
// TESTS
// ============================================================================

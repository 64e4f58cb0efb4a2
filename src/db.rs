// Warehouse Store - SQLite schema, CSV staging, atomic full-replace writers
//
// Bronze tables hold rows exactly as landed (everything nullable); silver
// tables hold the conformed snapshots. Every load is a whole-snapshot
// replacement: DELETE + bulk INSERT inside one transaction per entity, so a
// failed load rolls back and readers never see a partial snapshot.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::records::{
    Customer, ErpCategory, ErpCustomer, ErpLocation, Product, RawCustomer, RawErpCategory,
    RawErpCustomer, RawErpLocation, RawProduct, RawSale, SalesLine,
};

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ------------------------------------------------------------------
    // Bronze: as-landed, loosely typed
    // ------------------------------------------------------------------
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_customers (
            customer_id INTEGER,
            customer_key TEXT,
            first_name TEXT,
            last_name TEXT,
            marital_status TEXT,
            gender TEXT,
            create_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_products (
            product_id INTEGER,
            product_key TEXT,
            product_name TEXT,
            cost REAL,
            product_line TEXT,
            start_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_sales (
            order_number TEXT,
            product_key TEXT,
            customer_id INTEGER,
            order_date INTEGER,
            ship_date INTEGER,
            due_date INTEGER,
            sales_amount INTEGER,
            quantity INTEGER,
            price INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_customers (
            customer_id TEXT,
            birthdate TEXT,
            gender TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_locations (
            customer_id TEXT,
            country TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_categories (
            category_id TEXT,
            category TEXT,
            subcategory TEXT,
            maintenance TEXT
        )",
        [],
    )?;

    // ------------------------------------------------------------------
    // Silver: conformed snapshots; loaded_at is informational only
    // ------------------------------------------------------------------
    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_customers (
            customer_id INTEGER NOT NULL,
            customer_key TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            marital_status TEXT NOT NULL,
            gender TEXT NOT NULL,
            create_date TEXT,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_products (
            product_id INTEGER,
            category_id TEXT NOT NULL,
            product_key TEXT NOT NULL,
            product_name TEXT NOT NULL,
            cost REAL NOT NULL,
            product_line TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_sales (
            order_number TEXT NOT NULL,
            product_key TEXT NOT NULL,
            customer_id INTEGER,
            order_date TEXT,
            ship_date TEXT,
            due_date TEXT,
            sales_amount INTEGER,
            quantity INTEGER,
            price INTEGER,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_customers (
            customer_id TEXT NOT NULL,
            birthdate TEXT,
            gender TEXT NOT NULL,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_locations (
            customer_id TEXT NOT NULL,
            country TEXT NOT NULL,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_categories (
            category_id TEXT NOT NULL,
            category TEXT,
            subcategory TEXT,
            maintenance TEXT,
            loaded_at TEXT NOT NULL
        )",
        [],
    )?;

    // ------------------------------------------------------------------
    // Indexes for the gold joins
    // ------------------------------------------------------------------
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_silver_customers_id
         ON silver_crm_customers(customer_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_silver_products_key
         ON silver_crm_products(product_key)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_silver_sales_keys
         ON silver_crm_sales(product_key, customer_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// CSV STAGING
// ============================================================================

/// Load one source CSV into typed raw rows.
pub fn load_csv<T: DeserializeOwned>(csv_path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result
            .with_context(|| format!("Failed to deserialize row in {}", csv_path.display()))?;
        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// DATE MAPPING HELPERS
// ============================================================================

fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn date_from_sql(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

// ============================================================================
// BRONZE WRITERS / READERS
// ============================================================================

pub fn replace_bronze_customers(conn: &mut Connection, rows: &[RawCustomer]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_crm_customers", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_customers (
                customer_id, customer_key, first_name, last_name,
                marital_status, gender, create_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.customer_id,
                r.customer_key,
                r.first_name,
                r.last_name,
                r.marital_status,
                r.gender,
                r.create_date,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_customers(conn: &Connection) -> Result<Vec<RawCustomer>> {
    let mut stmt = conn.prepare(
        "SELECT customer_id, customer_key, first_name, last_name,
                marital_status, gender, create_date
         FROM bronze_crm_customers",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawCustomer {
                customer_id: row.get(0)?,
                customer_key: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                marital_status: row.get(4)?,
                gender: row.get(5)?,
                create_date: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_bronze_products(conn: &mut Connection, rows: &[RawProduct]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_crm_products", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_products (
                product_id, product_key, product_name, cost, product_line, start_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.product_id,
                r.product_key,
                r.product_name,
                r.cost,
                r.product_line,
                r.start_date,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_products(conn: &Connection) -> Result<Vec<RawProduct>> {
    let mut stmt = conn.prepare(
        "SELECT product_id, product_key, product_name, cost, product_line, start_date
         FROM bronze_crm_products",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawProduct {
                product_id: row.get(0)?,
                product_key: row.get(1)?,
                product_name: row.get(2)?,
                cost: row.get(3)?,
                product_line: row.get(4)?,
                start_date: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_bronze_sales(conn: &mut Connection, rows: &[RawSale]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_crm_sales", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_sales (
                order_number, product_key, customer_id, order_date, ship_date,
                due_date, sales_amount, quantity, price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.order_number,
                r.product_key,
                r.customer_id,
                r.order_date,
                r.ship_date,
                r.due_date,
                r.sales_amount,
                r.quantity,
                r.price,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_sales(conn: &Connection) -> Result<Vec<RawSale>> {
    let mut stmt = conn.prepare(
        "SELECT order_number, product_key, customer_id, order_date, ship_date,
                due_date, sales_amount, quantity, price
         FROM bronze_crm_sales",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawSale {
                order_number: row.get(0)?,
                product_key: row.get(1)?,
                customer_id: row.get(2)?,
                order_date: row.get(3)?,
                ship_date: row.get(4)?,
                due_date: row.get(5)?,
                sales_amount: row.get(6)?,
                quantity: row.get(7)?,
                price: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_bronze_erp_customers(
    conn: &mut Connection,
    rows: &[RawErpCustomer],
) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_erp_customers", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_erp_customers (customer_id, birthdate, gender)
             VALUES (?1, ?2, ?3)",
        )?;
        for r in rows {
            stmt.execute(params![r.customer_id, r.birthdate, r.gender])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_erp_customers(conn: &Connection) -> Result<Vec<RawErpCustomer>> {
    let mut stmt =
        conn.prepare("SELECT customer_id, birthdate, gender FROM bronze_erp_customers")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawErpCustomer {
                customer_id: row.get(0)?,
                birthdate: row.get(1)?,
                gender: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_bronze_erp_locations(
    conn: &mut Connection,
    rows: &[RawErpLocation],
) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_erp_locations", [])?;
    {
        let mut stmt = tx
            .prepare("INSERT INTO bronze_erp_locations (customer_id, country) VALUES (?1, ?2)")?;
        for r in rows {
            stmt.execute(params![r.customer_id, r.country])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_erp_locations(conn: &Connection) -> Result<Vec<RawErpLocation>> {
    let mut stmt = conn.prepare("SELECT customer_id, country FROM bronze_erp_locations")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawErpLocation {
                customer_id: row.get(0)?,
                country: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_bronze_erp_categories(
    conn: &mut Connection,
    rows: &[RawErpCategory],
) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM bronze_erp_categories", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_erp_categories (category_id, category, subcategory, maintenance)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for r in rows {
            stmt.execute(params![r.category_id, r.category, r.subcategory, r.maintenance])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_bronze_erp_categories(conn: &Connection) -> Result<Vec<RawErpCategory>> {
    let mut stmt = conn.prepare(
        "SELECT category_id, category, subcategory, maintenance FROM bronze_erp_categories",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawErpCategory {
                category_id: row.get(0)?,
                category: row.get(1)?,
                subcategory: row.get(2)?,
                maintenance: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

// ============================================================================
// SILVER WRITERS / READERS
// ============================================================================

pub fn replace_silver_customers(conn: &mut Connection, rows: &[Customer]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_crm_customers", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_customers (
                customer_id, customer_key, first_name, last_name,
                marital_status, gender, create_date, loaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.customer_id,
                r.customer_key,
                r.first_name,
                r.last_name,
                r.marital_status,
                r.gender,
                date_to_sql(r.create_date),
                loaded_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_customers(conn: &Connection) -> Result<Vec<Customer>> {
    let mut stmt = conn.prepare(
        "SELECT customer_id, customer_key, first_name, last_name,
                marital_status, gender, create_date
         FROM silver_crm_customers
         ORDER BY customer_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Customer {
                customer_id: row.get(0)?,
                customer_key: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                marital_status: row.get(4)?,
                gender: row.get(5)?,
                create_date: date_from_sql(row.get(6)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_silver_products(conn: &mut Connection, rows: &[Product]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_crm_products", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_products (
                product_id, category_id, product_key, product_name,
                cost, product_line, start_date, end_date, loaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.product_id,
                r.category_id,
                r.product_key,
                r.product_name,
                r.cost,
                r.product_line,
                date_to_sql(r.start_date),
                date_to_sql(r.end_date),
                loaded_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_products(conn: &Connection) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT product_id, category_id, product_key, product_name,
                cost, product_line, start_date, end_date
         FROM silver_crm_products
         ORDER BY product_key, start_date",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Product {
                product_id: row.get(0)?,
                category_id: row.get(1)?,
                product_key: row.get(2)?,
                product_name: row.get(3)?,
                cost: row.get(4)?,
                product_line: row.get(5)?,
                start_date: date_from_sql(row.get(6)?),
                end_date: date_from_sql(row.get(7)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_silver_sales(conn: &mut Connection, rows: &[SalesLine]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_crm_sales", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_sales (
                order_number, product_key, customer_id, order_date, ship_date,
                due_date, sales_amount, quantity, price, loaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.order_number,
                r.product_key,
                r.customer_id,
                date_to_sql(r.order_date),
                date_to_sql(r.ship_date),
                date_to_sql(r.due_date),
                r.sales_amount,
                r.quantity,
                r.price,
                loaded_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_sales(conn: &Connection) -> Result<Vec<SalesLine>> {
    let mut stmt = conn.prepare(
        "SELECT order_number, product_key, customer_id, order_date, ship_date,
                due_date, sales_amount, quantity, price
         FROM silver_crm_sales",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(SalesLine {
                order_number: row.get(0)?,
                product_key: row.get(1)?,
                customer_id: row.get(2)?,
                order_date: date_from_sql(row.get(3)?),
                ship_date: date_from_sql(row.get(4)?),
                due_date: date_from_sql(row.get(5)?),
                sales_amount: row.get(6)?,
                quantity: row.get(7)?,
                price: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_silver_erp_customers(conn: &mut Connection, rows: &[ErpCustomer]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_erp_customers", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_erp_customers (customer_id, birthdate, gender, loaded_at)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.customer_id,
                date_to_sql(r.birthdate),
                r.gender,
                loaded_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_erp_customers(conn: &Connection) -> Result<Vec<ErpCustomer>> {
    let mut stmt = conn.prepare(
        "SELECT customer_id, birthdate, gender
         FROM silver_erp_customers
         ORDER BY customer_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ErpCustomer {
                customer_id: row.get(0)?,
                birthdate: date_from_sql(row.get(1)?),
                gender: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_silver_erp_locations(conn: &mut Connection, rows: &[ErpLocation]) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_erp_locations", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_erp_locations (customer_id, country, loaded_at)
             VALUES (?1, ?2, ?3)",
        )?;
        for r in rows {
            stmt.execute(params![r.customer_id, r.country, loaded_at])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_erp_locations(conn: &Connection) -> Result<Vec<ErpLocation>> {
    let mut stmt = conn.prepare(
        "SELECT customer_id, country
         FROM silver_erp_locations
         ORDER BY customer_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ErpLocation {
                customer_id: row.get(0)?,
                country: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn replace_silver_erp_categories(
    conn: &mut Connection,
    rows: &[ErpCategory],
) -> Result<usize> {
    let loaded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM silver_erp_categories", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_erp_categories (
                category_id, category, subcategory, maintenance, loaded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for r in rows {
            stmt.execute(params![
                r.category_id,
                r.category,
                r.subcategory,
                r.maintenance,
                loaded_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn get_silver_erp_categories(conn: &Connection) -> Result<Vec<ErpCategory>> {
    let mut stmt = conn.prepare(
        "SELECT category_id, category, subcategory, maintenance
         FROM silver_erp_categories
         ORDER BY category_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ErpCategory {
                category_id: row.get(0)?,
                category: row.get(1)?,
                subcategory: row.get(2)?,
                maintenance: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

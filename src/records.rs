// Record Types - Raw (bronze) and conformed (silver) row shapes
//
// Raw rows are loosely typed, exactly as landed: every field is optional and
// text fields keep their original whitespace. Conformed rows are the output
// of the silver transforms. The load timestamp lives in the store, not here;
// it is set by the writer and never read by a transform.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW (BRONZE) ROWS
// ============================================================================

/// CRM customer master row, as landed from `crm_customers.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCustomer {
    #[serde(rename = "customer_id")]
    pub customer_id: Option<i64>,

    #[serde(rename = "customer_key")]
    pub customer_key: Option<String>,

    #[serde(rename = "first_name")]
    pub first_name: Option<String>,

    #[serde(rename = "last_name")]
    pub last_name: Option<String>,

    #[serde(rename = "marital_status")]
    pub marital_status: Option<String>,

    #[serde(rename = "gender")]
    pub gender: Option<String>,

    /// ISO date text (`YYYY-MM-DD`); parsed leniently by the transform
    #[serde(rename = "create_date")]
    pub create_date: Option<String>,
}

/// CRM product master row, as landed from `crm_products.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(rename = "product_id")]
    pub product_id: Option<i64>,

    /// Composite key: category prefix + clean product key, `-` separated
    #[serde(rename = "product_key")]
    pub product_key: Option<String>,

    #[serde(rename = "product_name")]
    pub product_name: Option<String>,

    #[serde(rename = "cost")]
    pub cost: Option<f64>,

    #[serde(rename = "product_line")]
    pub product_line: Option<String>,

    #[serde(rename = "start_date")]
    pub start_date: Option<String>,
}

/// CRM sales detail row, as landed from `crm_sales.csv`.
/// Dates are packed 8-digit integers (YYYYMMDD); measures are raw integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSale {
    #[serde(rename = "order_number")]
    pub order_number: Option<String>,

    #[serde(rename = "product_key")]
    pub product_key: Option<String>,

    #[serde(rename = "customer_id")]
    pub customer_id: Option<i64>,

    #[serde(rename = "order_date")]
    pub order_date: Option<i64>,

    #[serde(rename = "ship_date")]
    pub ship_date: Option<i64>,

    #[serde(rename = "due_date")]
    pub due_date: Option<i64>,

    #[serde(rename = "sales_amount")]
    pub sales_amount: Option<i64>,

    #[serde(rename = "quantity")]
    pub quantity: Option<i64>,

    #[serde(rename = "price")]
    pub price: Option<i64>,
}

/// ERP customer demographics row, as landed from `erp_customers.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawErpCustomer {
    /// May carry a literal "NAS" prefix ahead of the shared customer key
    #[serde(rename = "customer_id")]
    pub customer_id: Option<String>,

    #[serde(rename = "birthdate")]
    pub birthdate: Option<String>,

    #[serde(rename = "gender")]
    pub gender: Option<String>,
}

/// ERP customer location row, as landed from `erp_locations.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawErpLocation {
    /// May carry `-` separators that the CRM key does not
    #[serde(rename = "customer_id")]
    pub customer_id: Option<String>,

    #[serde(rename = "country")]
    pub country: Option<String>,
}

/// ERP product category map row, as landed from `erp_categories.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawErpCategory {
    #[serde(rename = "category_id")]
    pub category_id: Option<String>,

    #[serde(rename = "category")]
    pub category: Option<String>,

    #[serde(rename = "subcategory")]
    pub subcategory: Option<String>,

    #[serde(rename = "maintenance")]
    pub maintenance: Option<String>,
}

// ============================================================================
// CONFORMED (SILVER) ROWS
// ============================================================================

/// Conformed CRM customer: exactly one row per customer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub customer_key: String,
    pub first_name: String,
    pub last_name: String,
    pub marital_status: String,
    pub gender: String,
    pub create_date: Option<NaiveDate>,
}

/// Conformed CRM product: one row per (clean key, start date).
/// `end_date` is derived from the next row of the same key; the currently
/// active row keeps it null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Option<i64>,
    pub category_id: String,
    pub product_key: String,
    pub product_name: String,
    pub cost: f64,
    pub product_line: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Conformed CRM sales line. The composite (order, product, customer) key is
/// not unique; rows pass through one-for-one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesLine {
    pub order_number: String,
    pub product_key: String,
    pub customer_id: Option<i64>,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub sales_amount: Option<i64>,
    pub quantity: Option<i64>,
    pub price: Option<i64>,
}

/// Conformed ERP customer demographics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpCustomer {
    pub customer_id: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: String,
}

/// Conformed ERP customer location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpLocation {
    pub customer_id: String,
    pub country: String,
}

/// Conformed ERP category map (passthrough).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpCategory {
    pub category_id: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub maintenance: Option<String>,
}

// Quality-Check Contract - Empty-result predicates over silver and gold
//
// Each check is a query whose rows describe violations; the run passes iff
// every check comes back empty. The engine only reports; repairs happen in
// the silver transforms, never here.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub violation_count: usize,
    /// First few violation descriptions, for diagnostics
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub checks: Vec<CheckResult>,
    pub passed: bool,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        let failed: Vec<&str> = self
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.as_str())
            .collect();

        if failed.is_empty() {
            format!("{} checks, all passed", self.checks.len())
        } else {
            format!(
                "{} checks, {} failed: {}",
                self.checks.len(),
                failed.len(),
                failed.join(", ")
            )
        }
    }
}

// ============================================================================
// QUALITY ENGINE
// ============================================================================

pub struct QualityEngine {
    /// How many violation descriptions to keep per check
    sample_limit: usize,
}

impl QualityEngine {
    pub fn new() -> Self {
        QualityEngine { sample_limit: 5 }
    }

    /// Run the full contract. Requires the gold views to exist.
    pub fn run(&self, conn: &Connection) -> Result<QualityReport> {
        let checks = vec![
            self.check(
                conn,
                "customer_id_unique",
                "SELECT 'customer_id ' || customer_id || ' appears ' || COUNT(*) || ' times'
                 FROM silver_crm_customers
                 GROUP BY customer_id
                 HAVING COUNT(*) > 1",
            )?,
            self.check(
                conn,
                "no_untrimmed_text",
                "SELECT 'customer ' || customer_id || ' has untrimmed name'
                 FROM silver_crm_customers
                 WHERE first_name != TRIM(first_name) OR last_name != TRIM(last_name)
                 UNION ALL
                 SELECT 'location ' || customer_id || ' has untrimmed country'
                 FROM silver_erp_locations
                 WHERE country != TRIM(country)",
            )?,
            self.check(
                conn,
                "labels_in_domain",
                "SELECT 'customer ' || customer_id || ' marital_status=' || marital_status
                 FROM silver_crm_customers
                 WHERE marital_status NOT IN ('Married', 'Single', 'n/a')
                 UNION ALL
                 SELECT 'customer ' || customer_id || ' gender=' || gender
                 FROM silver_crm_customers
                 WHERE gender NOT IN ('Female', 'Male', 'n/a')
                 UNION ALL
                 SELECT 'erp customer ' || customer_id || ' gender=' || gender
                 FROM silver_erp_customers
                 WHERE gender NOT IN ('Female', 'Male', 'n/a')
                 UNION ALL
                 SELECT 'product ' || product_key || ' line=' || product_line
                 FROM silver_crm_products
                 WHERE product_line NOT IN ('Mountain', 'Road', 'other Sales', 'Touring', 'n/a')",
            )?,
            self.check(
                conn,
                "country_never_empty",
                "SELECT 'location ' || customer_id || ' has empty country'
                 FROM silver_erp_locations
                 WHERE country IS NULL OR country = ''",
            )?,
            self.check(
                conn,
                "no_negative_cost",
                "SELECT 'product ' || product_key || ' cost=' || cost
                 FROM silver_crm_products
                 WHERE cost < 0",
            )?,
            self.check(
                conn,
                "sales_equals_quantity_times_price",
                "SELECT 'order ' || order_number || ': ' || sales_amount
                        || ' != ' || quantity || ' * ' || price
                 FROM silver_crm_sales
                 WHERE sales_amount IS NOT NULL
                   AND quantity IS NOT NULL
                   AND price IS NOT NULL
                   AND sales_amount != quantity * price",
            )?,
            self.check(
                conn,
                "measures_positive_or_null",
                "SELECT 'order ' || order_number || ' has non-positive measure'
                 FROM silver_crm_sales
                 WHERE (sales_amount IS NOT NULL AND sales_amount <= 0)
                    OR (quantity IS NOT NULL AND quantity <= 0)
                    OR (price IS NOT NULL AND price <= 0)",
            )?,
            self.check(
                conn,
                "product_ranges_do_not_overlap",
                "SELECT 'product ' || p.product_key || ' range starting '
                        || COALESCE(p.start_date, 'null') || ' overlaps a successor'
                 FROM silver_crm_products p
                 WHERE p.end_date IS NOT NULL
                   AND EXISTS (
                       SELECT 1 FROM silver_crm_products n
                       WHERE n.product_key = p.product_key
                         AND n.start_date > p.start_date
                         AND n.start_date <= p.end_date
                   )",
            )?,
            self.check(
                conn,
                "one_open_range_per_product",
                "SELECT 'product ' || product_key || ' has '
                        || SUM(CASE WHEN end_date IS NULL THEN 1 ELSE 0 END)
                        || ' open-ended rows'
                 FROM silver_crm_products
                 GROUP BY product_key
                 HAVING SUM(CASE WHEN end_date IS NULL THEN 1 ELSE 0 END) != 1",
            )?,
            self.check(
                conn,
                "no_inverted_sales_dates",
                "SELECT 'order ' || order_number || ' ships or falls due before order date'
                 FROM silver_crm_sales
                 WHERE (ship_date IS NOT NULL AND order_date IS NOT NULL
                        AND ship_date < order_date)
                    OR (due_date IS NOT NULL AND order_date IS NOT NULL
                        AND due_date < order_date)",
            )?,
            self.check(
                conn,
                "no_orphaned_fact_rows",
                "SELECT 'order ' || order_number || ' has no matching dimension row'
                 FROM gold_fact_sales
                 WHERE product_sk IS NULL OR customer_sk IS NULL",
            )?,
            self.check(
                conn,
                "surrogate_keys_unique",
                "SELECT 'customer_sk ' || customer_sk || ' duplicated'
                 FROM gold_dim_customers
                 GROUP BY customer_sk HAVING COUNT(*) > 1
                 UNION ALL
                 SELECT 'product_sk ' || product_sk || ' duplicated'
                 FROM gold_dim_products
                 GROUP BY product_sk HAVING COUNT(*) > 1",
            )?,
        ];

        let passed = checks.iter().all(|c| c.passed);
        Ok(QualityReport { checks, passed })
    }

    /// Run one predicate; each returned row is one violation description.
    fn check(&self, conn: &Connection, name: &str, sql: &str) -> Result<CheckResult> {
        let mut stmt = conn
            .prepare(sql)
            .with_context(|| format!("Failed to prepare quality check '{}'", name))?;

        let violations = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Quality check '{}' failed to execute", name))?;

        let samples = violations.iter().take(self.sample_limit).cloned().collect();

        Ok(CheckResult {
            name: name.to_string(),
            passed: violations.is_empty(),
            violation_count: violations.len(),
            samples,
        })
    }
}

impl Default for QualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

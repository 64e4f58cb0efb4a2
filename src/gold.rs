// Gold Layer - Star-schema views over the conformed snapshots
//
// Pure joins and projections, recreated on demand. Surrogate keys are
// assigned by stable ordering (customers by natural id, products by start
// date then key). Fact assembly left-joins by natural key; unmatched joins
// yield null surrogate keys, which the offline quality contract flags.

use anyhow::Result;
use rusqlite::Connection;

pub fn create_views(conn: &Connection) -> Result<()> {
    conn.execute("DROP VIEW IF EXISTS gold_fact_sales", [])?;
    conn.execute("DROP VIEW IF EXISTS gold_dim_customers", [])?;
    conn.execute("DROP VIEW IF EXISTS gold_dim_products", [])?;

    conn.execute(
        "CREATE VIEW gold_dim_customers AS
         SELECT
             ROW_NUMBER() OVER (ORDER BY c.customer_id) AS customer_sk,
             c.customer_id,
             c.customer_key,
             c.first_name,
             c.last_name,
             COALESCE(l.country, 'n/a') AS country,
             c.marital_status,
             CASE
                 WHEN c.gender != 'n/a' THEN c.gender
                 ELSE COALESCE(e.gender, 'n/a')
             END AS gender,
             e.birthdate,
             c.create_date
         FROM silver_crm_customers c
         LEFT JOIN silver_erp_customers e ON c.customer_key = e.customer_id
         LEFT JOIN silver_erp_locations l ON c.customer_key = l.customer_id",
        [],
    )?;

    // Current rows only: historical versions carry a derived end date
    conn.execute(
        "CREATE VIEW gold_dim_products AS
         SELECT
             ROW_NUMBER() OVER (ORDER BY p.start_date, p.product_key) AS product_sk,
             p.product_id,
             p.product_key,
             p.product_name,
             p.category_id,
             c.category,
             c.subcategory,
             c.maintenance,
             p.cost,
             p.product_line,
             p.start_date
         FROM silver_crm_products p
         LEFT JOIN silver_erp_categories c ON p.category_id = c.category_id
         WHERE p.end_date IS NULL",
        [],
    )?;

    conn.execute(
        "CREATE VIEW gold_fact_sales AS
         SELECT
             s.order_number,
             pr.product_sk,
             cu.customer_sk,
             s.order_date,
             s.ship_date,
             s.due_date,
             s.sales_amount,
             s.quantity,
             s.price
         FROM silver_crm_sales s
         LEFT JOIN gold_dim_products pr ON s.product_key = pr.product_key
         LEFT JOIN gold_dim_customers cu ON s.customer_id = cu.customer_id",
        [],
    )?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        replace_silver_customers, replace_silver_erp_customers, replace_silver_erp_locations,
        replace_silver_products, replace_silver_sales, setup_database,
    };
    use crate::records::{Customer, ErpCustomer, ErpLocation, Product, SalesLine};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn seeded_connection() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let customers = vec![
            Customer {
                customer_id: 11000,
                customer_key: "AW00011000".to_string(),
                first_name: "Jon".to_string(),
                last_name: "Yang".to_string(),
                marital_status: "Married".to_string(),
                gender: "n/a".to_string(),
                create_date: date(2025, 10, 6),
            },
            Customer {
                customer_id: 11001,
                customer_key: "AW00011001".to_string(),
                first_name: "Eugene".to_string(),
                last_name: "Huang".to_string(),
                marital_status: "Single".to_string(),
                gender: "Male".to_string(),
                create_date: date(2025, 10, 6),
            },
        ];
        replace_silver_customers(&mut conn, &customers).unwrap();

        let erp_customers = vec![ErpCustomer {
            customer_id: "AW00011000".to_string(),
            birthdate: date(1971, 10, 6),
            gender: "Male".to_string(),
        }];
        replace_silver_erp_customers(&mut conn, &erp_customers).unwrap();

        let locations = vec![ErpLocation {
            customer_id: "AW00011000".to_string(),
            country: "Australia".to_string(),
        }];
        replace_silver_erp_locations(&mut conn, &locations).unwrap();

        let products = vec![
            Product {
                product_id: Some(210),
                category_id: "BK_R93R".to_string(),
                product_key: "62".to_string(),
                product_name: "Road-950 Red, 62".to_string(),
                cost: 1059.31,
                product_line: "Road".to_string(),
                start_date: date(2023, 1, 1),
                end_date: date(2023, 5, 31),
            },
            Product {
                product_id: Some(211),
                category_id: "BK_R93R".to_string(),
                product_key: "62".to_string(),
                product_name: "Road-950 Red, 62".to_string(),
                cost: 1088.00,
                product_line: "Road".to_string(),
                start_date: date(2023, 6, 1),
                end_date: None,
            },
        ];
        replace_silver_products(&mut conn, &products).unwrap();

        let sales = vec![
            SalesLine {
                order_number: "SO100".to_string(),
                product_key: "62".to_string(),
                customer_id: Some(11000),
                order_date: date(2024, 1, 15),
                ship_date: date(2024, 1, 22),
                due_date: date(2024, 1, 27),
                sales_amount: Some(2176),
                quantity: Some(2),
                price: Some(1088),
            },
            // References nothing; surrogate keys must come back null
            SalesLine {
                order_number: "SO999".to_string(),
                product_key: "missing".to_string(),
                customer_id: Some(99999),
                order_date: date(2024, 2, 1),
                ship_date: None,
                due_date: None,
                sales_amount: Some(10),
                quantity: Some(1),
                price: Some(10),
            },
        ];
        replace_silver_sales(&mut conn, &sales).unwrap();

        create_views(&conn).unwrap();
        conn
    }

    #[test]
    fn test_dimension_surrogate_keys_follow_natural_order() {
        let conn = seeded_connection();

        let keys: Vec<(i64, i64)> = conn
            .prepare("SELECT customer_sk, customer_id FROM gold_dim_customers ORDER BY customer_sk")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(keys, vec![(1, 11000), (2, 11001)]);
    }

    #[test]
    fn test_dim_products_keeps_only_current_rows() {
        let conn = seeded_connection();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM gold_dim_products", [], |row| row.get(0))
            .unwrap();

        assert_eq!(count, 1, "historical product versions are excluded");
    }

    #[test]
    fn test_erp_gender_fills_in_when_crm_is_missing() {
        let conn = seeded_connection();

        let gender: String = conn
            .query_row(
                "SELECT gender FROM gold_dim_customers WHERE customer_id = 11000",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(gender, "Male");
    }

    #[test]
    fn test_fact_join_resolves_surrogates_and_permits_nulls() {
        let conn = seeded_connection();

        let (product_sk, customer_sk): (Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT product_sk, customer_sk FROM gold_fact_sales WHERE order_number = 'SO100'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(product_sk.is_some());
        assert_eq!(customer_sk, Some(1));

        let (product_sk, customer_sk): (Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT product_sk, customer_sk FROM gold_fact_sales WHERE order_number = 'SO999'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(product_sk, None, "unmatched joins are permitted nulls");
        assert_eq!(customer_sk, None);
    }

    #[test]
    fn test_views_can_be_recreated() {
        let conn = seeded_connection();
        create_views(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM gold_fact_sales", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}

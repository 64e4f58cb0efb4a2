// Silver Transformation Engine - Six per-entity cleansing routines
//
// Each routine is a pure function from one raw snapshot to one conformed
// snapshot. Entities have no cross-dependency here; joins happen only in the
// gold views. Output ordering is deterministic so repeated runs over the
// same raw snapshot produce byte-identical conformed rows.

use chrono::NaiveDate;

use crate::dedup::latest_per_key;
use crate::keys::{split_product_key, strip_known_prefix, strip_separators};
use crate::normalize::{clean_text, non_empty, NormalizerMaps};
use crate::records::{
    Customer, ErpCategory, ErpCustomer, ErpLocation, Product, RawCustomer, RawErpCategory,
    RawErpCustomer, RawErpLocation, RawProduct, RawSale, SalesLine,
};
use crate::reconcile::{reconcile, SalesMeasures};
use crate::temporal::{close_date_ranges, null_if_future, parse_iso_date, parse_packed_date};

/// ERP demographics ids carry this literal prefix ahead of the shared key.
const ERP_CUSTOMER_PREFIX: &str = "NAS";

// ============================================================================
// CRM CUSTOMER
// ============================================================================

/// Deduplicate to one row per customer id (latest create date wins, later
/// raw row breaks ties), trim names, map status and gender codes.
/// Rows with a null id are discarded entirely.
pub fn transform_customers(rows: Vec<RawCustomer>, maps: &NormalizerMaps) -> Vec<Customer> {
    latest_per_key(
        rows,
        |r| r.customer_id,
        |r| parse_iso_date(r.create_date.as_deref()),
    )
    .into_iter()
    .map(|(customer_id, r)| Customer {
        customer_id,
        customer_key: clean_text(r.customer_key.as_deref()),
        first_name: clean_text(r.first_name.as_deref()),
        last_name: clean_text(r.last_name.as_deref()),
        marital_status: maps.marital_status.resolve(r.marital_status.as_deref()),
        gender: maps.gender.resolve(r.gender.as_deref()),
        create_date: parse_iso_date(r.create_date.as_deref()),
    })
    .collect()
}

// ============================================================================
// CRM PRODUCT
// ============================================================================

/// Decompose the composite key, default missing cost to zero, map line
/// codes, and derive validity end dates per clean key.
pub fn transform_products(rows: Vec<RawProduct>, maps: &NormalizerMaps) -> Vec<Product> {
    let mut products: Vec<Product> = rows
        .into_iter()
        .filter_map(|r| {
            let composite = non_empty(r.product_key.as_deref())?;
            let parts = split_product_key(&composite);

            Some(Product {
                product_id: r.product_id,
                category_id: parts.category_id,
                product_key: parts.product_key,
                product_name: clean_text(r.product_name.as_deref()),
                cost: r.cost.unwrap_or(0.0),
                product_line: maps.product_line.resolve(r.product_line.as_deref()),
                start_date: parse_iso_date(r.start_date.as_deref()),
                end_date: None,
            })
        })
        .collect();

    // Partition by clean key, order by start date ascending (nulls first;
    // the stable sort keeps raw order on ties), then close each run
    products.sort_by(|a, b| {
        a.product_key
            .cmp(&b.product_key)
            .then(a.start_date.cmp(&b.start_date))
    });

    let mut run_start = 0;
    while run_start < products.len() {
        let mut run_end = run_start + 1;
        while run_end < products.len()
            && products[run_end].product_key == products[run_start].product_key
        {
            run_end += 1;
        }

        let starts: Vec<Option<NaiveDate>> = products[run_start..run_end]
            .iter()
            .map(|p| p.start_date)
            .collect();

        for (offset, end_date) in close_date_ranges(&starts).into_iter().enumerate() {
            products[run_start + offset].end_date = end_date;
        }

        run_start = run_end;
    }

    products
}

// ============================================================================
// CRM SALES LINE
// ============================================================================

/// Repair packed dates and reconcile the three measures. Rows pass through
/// one-for-one; the composite key is not unique and is not deduplicated.
pub fn transform_sales(rows: Vec<RawSale>) -> Vec<SalesLine> {
    rows.into_iter()
        .map(|r| {
            let measures = reconcile(SalesMeasures {
                sales_amount: r.sales_amount,
                quantity: r.quantity,
                price: r.price,
            });

            SalesLine {
                order_number: clean_text(r.order_number.as_deref()),
                product_key: clean_text(r.product_key.as_deref()),
                customer_id: r.customer_id,
                order_date: parse_packed_date(r.order_date),
                ship_date: parse_packed_date(r.ship_date),
                due_date: parse_packed_date(r.due_date),
                sales_amount: measures.sales_amount,
                quantity: measures.quantity,
                price: measures.price,
            }
        })
        .collect()
}

// ============================================================================
// ERP CUSTOMER DEMOGRAPHICS
// ============================================================================

/// Strip the "NAS" prefix, null out future birthdates, map gender tokens.
/// Rows without an id are dropped (nothing to key the row on).
pub fn transform_erp_customers(
    rows: Vec<RawErpCustomer>,
    maps: &NormalizerMaps,
    today: NaiveDate,
) -> Vec<ErpCustomer> {
    rows.into_iter()
        .filter_map(|r| {
            let raw_id = non_empty(r.customer_id.as_deref())?;

            Some(ErpCustomer {
                customer_id: strip_known_prefix(&raw_id, ERP_CUSTOMER_PREFIX).to_string(),
                birthdate: null_if_future(parse_iso_date(r.birthdate.as_deref()), today),
                gender: maps.erp_gender.resolve(r.gender.as_deref()),
            })
        })
        .collect()
}

// ============================================================================
// ERP CUSTOMER LOCATION
// ============================================================================

/// Remove every separator from the id and normalize country labels.
pub fn transform_erp_locations(
    rows: Vec<RawErpLocation>,
    maps: &NormalizerMaps,
) -> Vec<ErpLocation> {
    rows.into_iter()
        .filter_map(|r| {
            let raw_id = non_empty(r.customer_id.as_deref())?;

            Some(ErpLocation {
                customer_id: strip_separators(&raw_id),
                country: maps.country.resolve(r.country.as_deref()),
            })
        })
        .collect()
}

// ============================================================================
// ERP CATEGORY MAP
// ============================================================================

/// Passthrough copy. Participates in the same full-replace pipeline and
/// quality contract but applies no field-level transformation.
pub fn transform_erp_categories(rows: Vec<RawErpCategory>) -> Vec<ErpCategory> {
    rows.into_iter()
        .filter_map(|r| {
            let category_id = non_empty(r.category_id.as_deref())?;

            Some(ErpCategory {
                category_id,
                category: r.category,
                subcategory: r.subcategory,
                maintenance: r.maintenance,
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> NormalizerMaps {
        NormalizerMaps::new()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn raw_customer(
        id: Option<i64>,
        first: &str,
        status: &str,
        gender: &str,
        created: &str,
    ) -> RawCustomer {
        RawCustomer {
            customer_id: id,
            customer_key: Some("AW00011000".to_string()),
            first_name: Some(first.to_string()),
            last_name: Some("  Doe ".to_string()),
            marital_status: Some(status.to_string()),
            gender: Some(gender.to_string()),
            create_date: Some(created.to_string()),
        }
    }

    fn raw_product(id: i64, key: &str, line: &str, cost: Option<f64>, start: &str) -> RawProduct {
        RawProduct {
            product_id: Some(id),
            product_key: Some(key.to_string()),
            product_name: Some("HL Road Frame".to_string()),
            cost,
            product_line: Some(line.to_string()),
            start_date: Some(start.to_string()),
        }
    }

    fn raw_sale(
        order: &str,
        dates: (i64, i64, i64),
        sales: Option<i64>,
        quantity: Option<i64>,
        price: Option<i64>,
    ) -> RawSale {
        RawSale {
            order_number: Some(order.to_string()),
            product_key: Some("FR-R92B-58".to_string()),
            customer_id: Some(11000),
            order_date: Some(dates.0),
            ship_date: Some(dates.1),
            due_date: Some(dates.2),
            sales_amount: sales,
            quantity,
            price,
        }
    }

    #[test]
    fn test_customers_dedup_keeps_latest_create_date() {
        let rows = vec![
            raw_customer(Some(1), " Jon ", "m", "F", "2025-01-01"),
            raw_customer(Some(1), "Jonathan", "M", "f", "2025-06-01"),
            raw_customer(None, "Ghost", "S", "M", "2025-12-01"),
            raw_customer(Some(2), "Mary", "S", "F", "2025-03-01"),
        ];

        let customers = transform_customers(rows, &maps());

        assert_eq!(customers.len(), 2, "null id dropped, id 1 deduplicated");
        assert_eq!(customers[0].customer_id, 1);
        assert_eq!(customers[0].first_name, "Jonathan");
        assert_eq!(customers[0].create_date, Some(date(2025, 6, 1)));
        assert_eq!(customers[0].marital_status, "Married");
        assert_eq!(customers[0].gender, "Female");
        assert_eq!(customers[0].last_name, "Doe", "names are trimmed");
        assert_eq!(customers[1].customer_id, 2);
    }

    #[test]
    fn test_customers_unmapped_codes_become_sentinel() {
        let rows = vec![raw_customer(Some(5), "Ann", "divorced", "", "2025-01-01")];

        let customers = transform_customers(rows, &maps());

        assert_eq!(customers[0].marital_status, "n/a");
        assert_eq!(customers[0].gender, "n/a");
    }

    #[test]
    fn test_products_key_split_and_end_dates() {
        let rows = vec![
            raw_product(210, "BK-R93R-62", "R", Some(1059.31), "2023-01-01"),
            raw_product(211, "BK-R93R-62", "R", Some(1059.31), "2023-06-01"),
        ];

        let products = transform_products(rows, &maps());

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category_id, "BK_R93R");
        assert_eq!(products[0].product_key, "62");
        assert_eq!(products[0].start_date, Some(date(2023, 1, 1)));
        assert_eq!(products[0].end_date, Some(date(2023, 5, 31)));
        assert_eq!(products[1].end_date, None, "most recent row stays active");
        assert_eq!(products[0].product_line, "Road");
    }

    #[test]
    fn test_products_null_cost_defaults_to_zero() {
        let rows = vec![raw_product(7, "CO-RF-FR-R92B-58", "x", None, "2023-01-01")];

        let products = transform_products(rows, &maps());

        assert_eq!(products[0].cost, 0.0);
        assert_eq!(products[0].product_line, "n/a");
        assert_eq!(products[0].category_id, "CO_RF");
        assert_eq!(products[0].product_key, "FR-R92B-58");
    }

    #[test]
    fn test_products_end_dates_independent_per_key() {
        let rows = vec![
            raw_product(1, "AC-HE-HL-U509", "S", Some(12.0), "2023-01-01"),
            raw_product(2, "BK-M82S-38", "M", Some(1898.09), "2023-01-01"),
            raw_product(3, "AC-HE-HL-U509", "S", Some(13.0), "2024-01-01"),
        ];

        let products = transform_products(rows, &maps());

        // Sorted by clean key: "38" (BK_M82S) before "HL-U509" (AC_HE)
        assert_eq!(products[0].product_key, "38");
        assert_eq!(products[0].end_date, None);
        assert_eq!(products[1].product_key, "HL-U509");
        assert_eq!(products[1].end_date, Some(date(2023, 12, 31)));
        assert_eq!(products[2].end_date, None);
    }

    #[test]
    fn test_sales_dates_and_measures() {
        let rows = vec![
            // valid dates, sales stored as zero
            raw_sale("SO100", (20240115, 20240122, 20240127), Some(0), Some(2), Some(10)),
            // zero and wrong-length dates, null price
            raw_sale("SO101", (0, 2024012, 20231332), Some(100), Some(5), None),
        ];

        let sales = transform_sales(rows);

        assert_eq!(sales[0].order_date, Some(date(2024, 1, 15)));
        assert_eq!(sales[0].sales_amount, Some(20));
        assert_eq!(sales[0].price, Some(10));

        assert_eq!(sales[1].order_date, None);
        assert_eq!(sales[1].ship_date, None);
        assert_eq!(sales[1].due_date, None, "calendar-invalid nulls out");
        assert_eq!(sales[1].sales_amount, Some(100));
        assert_eq!(sales[1].price, Some(20));
    }

    #[test]
    fn test_sales_identity_holds_post_transform() {
        let rows = vec![
            raw_sale("SO1", (20240101, 20240108, 20240113), Some(0), Some(2), Some(10)),
            raw_sale("SO2", (20240101, 20240108, 20240113), Some(90), Some(3), Some(10)),
            raw_sale("SO3", (20240101, 20240108, 20240113), None, Some(1), Some(-5)),
        ];

        for line in transform_sales(rows) {
            if let (Some(s), Some(q), Some(p)) = (line.sales_amount, line.quantity, line.price) {
                assert_eq!(s, q * p, "sales = quantity × price for {}", line.order_number);
            }
        }
    }

    #[test]
    fn test_erp_customers_prefix_birthdate_gender() {
        let today = date(2026, 8, 23);
        let rows = vec![
            RawErpCustomer {
                customer_id: Some("NAS11000".to_string()),
                birthdate: Some("1985-04-12".to_string()),
                gender: Some("female".to_string()),
            },
            RawErpCustomer {
                customer_id: Some("11001".to_string()),
                birthdate: Some("2030-01-01".to_string()),
                gender: Some("x".to_string()),
            },
            RawErpCustomer {
                customer_id: None,
                birthdate: None,
                gender: None,
            },
        ];

        let customers = transform_erp_customers(rows, &maps(), today);

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].customer_id, "11000");
        assert_eq!(customers[0].birthdate, Some(date(1985, 4, 12)));
        assert_eq!(customers[0].gender, "Female");
        assert_eq!(customers[1].customer_id, "11001");
        assert_eq!(customers[1].birthdate, None, "future birthdate nulled");
        assert_eq!(customers[1].gender, "n/a");
    }

    #[test]
    fn test_erp_locations_separator_and_country() {
        let rows = vec![
            RawErpLocation {
                customer_id: Some("AW-00011000".to_string()),
                country: Some("usa ".to_string()),
            },
            RawErpLocation {
                customer_id: Some("AW-00011001".to_string()),
                country: Some("".to_string()),
            },
            RawErpLocation {
                customer_id: Some("AW-00011002".to_string()),
                country: Some(" Australia".to_string()),
            },
        ];

        let locations = transform_erp_locations(rows, &maps());

        assert_eq!(locations[0].customer_id, "AW00011000");
        assert_eq!(locations[0].country, "United States");
        assert_eq!(locations[1].country, "n/a");
        assert_eq!(locations[2].country, "Australia");
    }

    #[test]
    fn test_erp_categories_passthrough() {
        let rows = vec![
            RawErpCategory {
                category_id: Some("AC_HE".to_string()),
                category: Some("Accessories".to_string()),
                subcategory: Some("Helmets".to_string()),
                maintenance: Some("No".to_string()),
            },
            RawErpCategory {
                category_id: None,
                category: Some("orphan".to_string()),
                subcategory: None,
                maintenance: None,
            },
        ];

        let categories = transform_erp_categories(rows);

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category_id, "AC_HE");
        assert_eq!(categories[0].category.as_deref(), Some("Accessories"));
    }

    #[test]
    fn test_transforms_are_idempotent_on_same_snapshot() {
        let build = || {
            vec![
                raw_customer(Some(1), "Jon", "M", "F", "2025-01-01"),
                raw_customer(Some(1), "Jon", "M", "F", "2025-01-01"),
                raw_customer(Some(3), "Ann", "S", "F", "2025-02-01"),
            ]
        };

        let first = transform_customers(build(), &maps());
        let second = transform_customers(build(), &maps());

        assert_eq!(first, second, "same raw snapshot, identical conformed rows");
    }
}

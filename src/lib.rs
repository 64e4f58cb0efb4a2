// Medallion Warehouse - Core Library
// Exposes all modules for use in the CLI and tests

pub mod db;
pub mod records;
pub mod normalize;   // Field normalizers: code maps, trim helpers
pub mod dedup;       // Latest-wins deduplication per natural key
pub mod keys;        // Composite key decomposition, id cleanup
pub mod temporal;    // Packed dates, validity-range derivation
pub mod reconcile;   // Sales measure reconciliation
pub mod silver;      // The six per-entity transform routines
pub mod gold;        // Star-schema views
pub mod quality;     // Quality-check contract
pub mod pipeline;    // Sequential fail-fast orchestration

// Re-export commonly used types
pub use records::{
    Customer, ErpCategory, ErpCustomer, ErpLocation, Product, RawCustomer, RawErpCategory,
    RawErpCustomer, RawErpLocation, RawProduct, RawSale, SalesLine,
};
pub use normalize::{CodeMap, Fallback, NormalizerMaps, NOT_AVAILABLE};
pub use dedup::latest_per_key;
pub use keys::{split_product_key, strip_known_prefix, strip_separators, ProductKeyParts};
pub use temporal::{close_date_ranges, null_if_future, parse_iso_date, parse_packed_date};
pub use reconcile::{reconcile, SalesMeasures};
pub use quality::{CheckResult, QualityEngine, QualityReport};
pub use pipeline::{EntitySummary, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Reconciliation Engine - Sales measure repair
//
// Recomputes derived measures when stored values are absent, non-positive,
// or internally inconsistent. Both rules read the same input snapshot: the
// sales rule sees the original stored price, the price rule sees the
// original stored sales amount. Neither sees the other's output.

use serde::{Deserialize, Serialize};

/// The three numeric measures of a sales line, as landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesMeasures {
    pub sales_amount: Option<i64>,
    pub quantity: Option<i64>,
    pub price: Option<i64>,
}

/// Reconcile one row's measures.
///
/// - sales_amount: kept when positive and not provably different from
///   quantity × |price|; otherwise recomputed as quantity × |price| (null
///   when either factor is null).
/// - price: kept when positive; otherwise recomputed as sales ÷ quantity
///   from the original stored values, null when quantity is zero or either
///   operand is null.
/// - quantity: passthrough, unvalidated.
pub fn reconcile(input: SalesMeasures) -> SalesMeasures {
    let derived = input
        .quantity
        .zip(input.price)
        .map(|(quantity, price)| quantity * price.abs());

    let sales_amount = match input.sales_amount {
        // A null factor makes the inequality unprovable; the stored value
        // stands as long as it is positive
        Some(stored) if stored > 0 && derived.map_or(true, |d| d == stored) => Some(stored),
        _ => derived,
    };

    let price = match input.price {
        Some(stored) if stored > 0 => Some(stored),
        _ => match (input.sales_amount, input.quantity) {
            // quantity = 0 leaves the division undefined, i.e. null
            (Some(sales), Some(quantity)) if quantity != 0 => Some(sales / quantity),
            _ => None,
        },
    };

    SalesMeasures {
        sales_amount,
        quantity: input.quantity,
        price,
    }
}

// ============================================================================
// TESTS
// ============================================================================

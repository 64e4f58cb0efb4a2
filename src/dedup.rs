// Deduplication Engine - Latest-wins row selection per natural key
//
// When a natural key repeats in the raw snapshot, exactly one row survives:
// the one with the maximal ordering value. Ties break toward the highest raw
// row position, so reruns over the same snapshot are reproducible.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Select one row per key. Rows whose key resolves to `None` are discarded
/// entirely and never propagate downstream.
///
/// Returns `(key, row)` pairs sorted ascending by key, which keeps the
/// conformed snapshot byte-identical across runs.
pub fn latest_per_key<T, K, O>(
    rows: Vec<T>,
    key_of: impl Fn(&T) -> Option<K>,
    order_of: impl Fn(&T) -> O,
) -> Vec<(K, T)>
where
    K: Ord,
    O: Ord,
{
    let mut best: BTreeMap<K, (O, usize, T)> = BTreeMap::new();

    for (position, row) in rows.into_iter().enumerate() {
        let key = match key_of(&row) {
            Some(k) => k,
            None => continue,
        };
        let order = order_of(&row);

        match best.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert((order, position, row));
            }
            Entry::Occupied(mut slot) => {
                // position is strictly increasing, so >= means a later row
                // with an equal ordering value replaces the earlier one
                if order >= slot.get().0 {
                    slot.insert((order, position, row));
                }
            }
        }
    }

    best.into_iter()
        .map(|(key, (_, _, row))| (key, row))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

//! SKU normalization.
//!
//! Every path that uses a SKU as a storage key goes through [`normalize`]
//! first; raw operator input (typed or scanned) is never used directly.

/// Canonical key form for a SKU: trimmed and uppercased. Idempotent.
pub fn normalize(sku: &str) -> String {
    sku.trim().to_uppercase()
}

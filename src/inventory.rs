//! Stock decrement over a product's color/size variant list. Runs inside the
//! checkout transaction; the caller persists the mutated list and turns
//! misses into order warnings.

use crate::models::ColorVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjust {
    /// Stock was decremented (clamped at zero); carries the remaining stock.
    Applied { remaining: i32 },
    /// No color variant with that name on the product.
    ColorMissing,
    /// The color exists but has no such size label.
    SizeMissing,
}

/// Decrement the stock of `color`/`size` by `quantity`, never below zero.
pub fn decrement(
    colors: &mut [ColorVariant],
    color: &str,
    size: &str,
    quantity: i32,
) -> StockAdjust {
    let Some(variant) = colors.iter_mut().find(|c| c.name == color) else {
        return StockAdjust::ColorMissing;
    };
    let Some(entry) = variant.sizes.iter_mut().find(|s| s.size == size) else {
        return StockAdjust::SizeMissing;
    };
    entry.stock = (entry.stock - quantity).max(0);
    StockAdjust::Applied {
        remaining: entry.stock,
    }
}

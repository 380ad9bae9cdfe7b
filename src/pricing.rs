//! Sale-price resolution. A product's own sale wins over its collection's,
//! which wins over its category's; the first percentage above zero applies.
//! Resolved fresh on every read, nothing is cached.

/// Pick the percentage that applies for a product given its own sale and the
/// sales of the tags it references.
pub fn sale_percentage(
    product_pct: i32,
    collection_pct: Option<i32>,
    category_pct: Option<i32>,
) -> i32 {
    if product_pct > 0 {
        return product_pct;
    }
    if let Some(pct) = collection_pct {
        if pct > 0 {
            return pct;
        }
    }
    if let Some(pct) = category_pct {
        if pct > 0 {
            return pct;
        }
    }
    0
}

/// `round(price * (1 - pct/100))`, with the percentage capped at 100.
pub fn effective_price(price: i64, pct: i32) -> i64 {
    if pct <= 0 {
        return price;
    }
    let pct = pct.min(100);
    ((price as f64) * (1.0 - (pct as f64) / 100.0)).round() as i64
}

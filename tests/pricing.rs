use yaqeen_api::pricing::{effective_price, sale_percentage};

#[test]
fn product_sale_wins_over_tags() {
    assert_eq!(sale_percentage(30, Some(20), Some(10)), 30);
}

#[test]
fn collection_sale_applies_when_product_has_none() {
    assert_eq!(sale_percentage(0, Some(20), Some(10)), 20);
}

#[test]
fn category_sale_is_the_last_resort() {
    assert_eq!(sale_percentage(0, Some(0), Some(10)), 10);
    assert_eq!(sale_percentage(0, None, Some(10)), 10);
}

#[test]
fn no_sale_when_all_percentages_are_zero() {
    assert_eq!(sale_percentage(0, Some(0), Some(0)), 0);
    assert_eq!(sale_percentage(0, None, None), 0);
}

#[test]
fn effective_price_rounds() {
    // 1000 * (1 - 15/100) = 850
    assert_eq!(effective_price(1000, 15), 850);
    // 999 * 0.67 = 669.33 -> 669
    assert_eq!(effective_price(999, 33), 669);
    // 150 * 0.95 = 142.5 -> rounds half up to 143
    assert_eq!(effective_price(150, 5), 143);
}

#[test]
fn effective_price_at_boundaries() {
    assert_eq!(effective_price(1000, 0), 1000);
    assert_eq!(effective_price(1000, 100), 0);
    // Percentages above 100 are capped, never negative prices.
    assert_eq!(effective_price(1000, 250), 0);
}

#[test]
fn full_price_when_nothing_applies() {
    let pct = sale_percentage(0, None, None);
    assert_eq!(effective_price(4500, pct), 4500);
}

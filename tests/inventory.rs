use yaqeen_api::inventory::{StockAdjust, decrement};
use yaqeen_api::models::{ColorVariant, SizeStock};

fn catalog_colors() -> Vec<ColorVariant> {
    vec![
        ColorVariant {
            name: "Black".into(),
            hex: Some("#000000".into()),
            image: None,
            sizes: vec![
                SizeStock {
                    size: "S".into(),
                    stock: 3,
                },
                SizeStock {
                    size: "M".into(),
                    stock: 5,
                },
            ],
        },
        ColorVariant {
            name: "White".into(),
            hex: None,
            image: None,
            sizes: vec![SizeStock {
                size: "M".into(),
                stock: 2,
            }],
        },
    ]
}

#[test]
fn ordering_two_of_five_leaves_three() {
    let mut colors = catalog_colors();
    let result = decrement(&mut colors, "Black", "M", 2);
    assert_eq!(result, StockAdjust::Applied { remaining: 3 });
    assert_eq!(colors[0].sizes[1].stock, 3);
}

#[test]
fn ordering_more_than_stock_floors_at_zero() {
    let mut colors = catalog_colors();
    let result = decrement(&mut colors, "Black", "M", 6);
    assert_eq!(result, StockAdjust::Applied { remaining: 0 });
    assert_eq!(colors[0].sizes[1].stock, 0);
}

#[test]
fn unknown_color_leaves_stock_unchanged() {
    let mut colors = catalog_colors();
    let result = decrement(&mut colors, "Crimson", "M", 1);
    assert_eq!(result, StockAdjust::ColorMissing);
    assert_eq!(colors, catalog_colors());
}

#[test]
fn unknown_size_leaves_stock_unchanged() {
    let mut colors = catalog_colors();
    let result = decrement(&mut colors, "White", "XL", 1);
    assert_eq!(result, StockAdjust::SizeMissing);
    assert_eq!(colors, catalog_colors());
}

#[test]
fn only_the_matching_size_is_touched() {
    let mut colors = catalog_colors();
    decrement(&mut colors, "Black", "S", 1);
    assert_eq!(colors[0].sizes[0].stock, 2);
    assert_eq!(colors[0].sizes[1].stock, 5);
    assert_eq!(colors[1].sizes[0].stock, 2);
}

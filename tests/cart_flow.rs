use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

use yaqeen_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    dto::products::CreateProductRequest,
    email::Mailer,
    entity::users,
    error::AppError,
    middleware::auth::AuthUser,
    models::{ColorVariant, Role, SizeStock},
    routes::params::Pagination,
    services::{cart_service, product_service},
    state::AppState,
};

// Cart lines are keyed by (product, color, size): adding the same variant
// twice merges quantities, a different size opens a new line.
#[tokio::test]
async fn cart_merge_by_variant_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let user = AuthUser {
        id: create_user(&state, "cart@example.com").await?,
        role: Role::User,
    };
    let staff = AuthUser {
        id: Uuid::new_v4(),
        role: Role::Admin,
    };

    // Sale percentages outside 0-100 never reach the catalog.
    let err = product_service::create_product(
        &state,
        &staff,
        product_request("Broken Sale Tee", Some(150)),
    )
    .await
    .expect_err("sale above 100 must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let product = product_service::create_product(&state, &staff, product_request("Cart Tee", Some(20)))
        .await?
        .data
        .expect("created product");
    assert_eq!(product.effective_price, 800);

    // First add opens a line, second add of the same variant merges into it.
    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            color: "Black".into(),
            size: "M".into(),
            quantity: 2,
        },
    )
    .await?;
    let merged = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            color: "Black".into(),
            size: "M".into(),
            quantity: 3,
        },
    )
    .await?
    .data
    .expect("cart line");
    assert_eq!(merged.quantity, 5);

    // A different size is its own line.
    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            color: "Black".into(),
            size: "L".into(),
            quantity: 1,
        },
    )
    .await?;

    let cart = cart_service::list_cart(&state, &user, pagination())
        .await?
        .data
        .expect("cart list");
    assert_eq!(cart.items.len(), 2);

    // Unknown variants never enter the cart.
    let err = cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            color: "Crimson".into(),
            size: "M".into(),
            quantity: 1,
        },
    )
    .await
    .expect_err("unknown color must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Quantity can be set directly, and lines can be removed.
    let updated = cart_service::update_cart_item(
        &state,
        &user,
        merged.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await?
    .data
    .expect("updated line");
    assert_eq!(updated.quantity, 1);

    cart_service::remove_from_cart(&state, &user, merged.id).await?;
    let err = cart_service::remove_from_cart(&state, &user, merged.id)
        .await
        .expect_err("removing twice must 404");
    assert!(matches!(err, AppError::NotFound));

    let cart = cart_service::list_cart(&state, &user, pagination())
        .await?
        .data
        .expect("cart list");
    assert_eq!(cart.items.len(), 1);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, messages, audit_logs, products, tags, \
         users, admins, order_counters RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        mailer: Mailer::disabled(),
    })
}

async fn create_user(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Cart Customer".into()),
        email: Set(email.to_string()),
        phone: Set("+200000001".into()),
        password_hash: Set("dummy".into()),
        address: Set(None),
        reset_otp: Set(None),
        reset_otp_expires: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

fn product_request(name: &str, sale_percentage: Option<i32>) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        description: Some("Cart flow product".into()),
        price: 1000,
        sale_percentage,
        images: vec![],
        colors: vec![ColorVariant {
            name: "Black".into(),
            hex: Some("#000000".into()),
            image: None,
            sizes: vec![
                SizeStock {
                    size: "M".into(),
                    stock: 10,
                },
                SizeStock {
                    size: "L".into(),
                    stock: 4,
                },
            ],
        }],
        category: None,
        collection: None,
    }
}

fn pagination() -> Pagination {
    Pagination {
        page: Some(1),
        per_page: Some(20),
    }
}

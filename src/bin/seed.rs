use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use sqlx::types::Json;
use uuid::Uuid;

use yaqeen_api::{
    config::AppConfig,
    db::create_pool,
    models::{ColorVariant, SizeStock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let superadmin_id = ensure_admin(&pool, "owner@yaqeen.example", "owner123", "superadmin").await?;
    let admin_id = ensure_admin(&pool, "admin@yaqeen.example", "admin123", "admin").await?;

    let summer = ensure_tag(&pool, "Summer", "collection", 0).await?;
    let winter = ensure_tag(&pool, "Winter", "collection", 0).await?;
    let tshirts = ensure_tag(&pool, "T-Shirts", "category", 0).await?;
    let hoodies = ensure_tag(&pool, "Hoodies", "category", 10).await?;

    seed_products(&pool, &[(tshirts, summer), (hoodies, winter)]).await?;

    println!("Seed completed. Superadmin ID: {superadmin_id}, Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO admins (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.split('@').next().unwrap_or("staff"))
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let admin_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured admin {email} (role={role})");
    Ok(admin_id)
}

async fn ensure_tag(
    pool: &sqlx::PgPool,
    name: &str,
    kind: &str,
    sale_percentage: i32,
) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO tags (id, name, kind, sale_percentage)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE SET kind = EXCLUDED.kind
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(kind)
    .bind(sale_percentage)
    .fetch_one(pool)
    .await?;

    println!("Ensured tag {name} ({kind})");
    Ok(row.0)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    tag_pairs: &[(Uuid, Uuid)],
) -> anyhow::Result<()> {
    let (tshirts, summer) = tag_pairs[0];
    let (hoodies, winter) = tag_pairs[1];

    let products: Vec<(&str, &str, i64, i32, Uuid, Uuid, Vec<ColorVariant>)> = vec![
        (
            "Classic Tee",
            "Everyday cotton t-shirt",
            45000,
            0,
            tshirts,
            summer,
            vec![
                variant("Black", "#000000", &[("S", 20), ("M", 30), ("L", 25)]),
                variant("White", "#ffffff", &[("S", 15), ("M", 25), ("L", 20)]),
            ],
        ),
        (
            "Oversized Hoodie",
            "Heavyweight fleece hoodie",
            120000,
            15,
            hoodies,
            winter,
            vec![
                variant("Olive", "#556b2f", &[("M", 10), ("L", 12), ("XL", 8)]),
                variant("Sand", "#d2b48c", &[("M", 9), ("L", 7)]),
            ],
        ),
    ];

    for (name, desc, price, sale, category_id, collection_id, colors) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, sale_percentage, colors, category_id, collection_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(sale)
        .bind(Json(colors))
        .bind(category_id)
        .bind(collection_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

fn variant(name: &str, hex: &str, sizes: &[(&str, i32)]) -> ColorVariant {
    ColorVariant {
        name: name.to_string(),
        hex: Some(hex.to_string()),
        image: None,
        sizes: sizes
            .iter()
            .map(|(size, stock)| SizeStock {
                size: (*size).to_string(),
                stock: *stock,
            })
            .collect(),
    }
}

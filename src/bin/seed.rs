use gadget_storefront::{
    config::AppConfig, db::create_pool, product_kind::ProductKind,
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(&pool, "admin@example.com", "admin12345", "admin").await?;
    let user_id = ensure_user_with_role(&pool, "user@example.com", "user12345", "user").await?;
    seed_categories(&pool).await?;
    seed_notebooks(&pool).await?;
    seed_smartphones(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO customers (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_categories(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for descriptor in ProductKind::registry() {
        sqlx::query("INSERT INTO categories (name, slug) VALUES ($1, $2) ON CONFLICT (slug) DO NOTHING")
            .bind(descriptor.display_name)
            .bind(descriptor.category_slug)
            .execute(pool)
            .await?;
    }
    println!("Seeded categories");
    Ok(())
}

async fn category_id(pool: &sqlx::PgPool, kind: ProductKind) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(kind.descriptor().category_slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Register the slug; returns false when it already belongs to a product.
async fn claim_slug(
    tx: &mut sqlx::PgConnection,
    kind: ProductKind,
    slug: &str,
    object_id: Uuid,
) -> anyhow::Result<bool> {
    let claimed = sqlx::query(
        "INSERT INTO product_slugs (slug, content_type, object_id) VALUES ($1, $2, $3) \
         ON CONFLICT (slug) DO NOTHING",
    )
    .bind(slug)
    .bind(kind.as_str())
    .bind(object_id)
    .execute(tx)
    .await?;
    Ok(claimed.rows_affected() > 0)
}

async fn seed_notebooks(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let category = category_id(pool, ProductKind::Notebook).await?;
    let notebooks = [
        ("ThinkPad X1 Carbon", "thinkpad-x1-carbon", Decimal::new(149_999, 2), "14", "IPS", "3.4 GHz", "16 GB", "Intel Iris Xe", "12 h"),
        ("MacBook Air 13", "macbook-air-13", Decimal::new(109_900, 2), "13.6", "Liquid Retina", "3.5 GHz", "8 GB", "Apple 8-core GPU", "18 h"),
        ("ASUS Zenbook 14", "asus-zenbook-14", Decimal::new(89_950, 2), "14", "OLED", "4.8 GHz", "16 GB", "Intel Arc", "10 h"),
    ];

    for (title, slug, price, diagonal, display, freq, ram, video, battery) in notebooks {
        let id = Uuid::new_v4();
        let mut tx = pool.begin().await?;
        if !claim_slug(&mut tx, ProductKind::Notebook, slug, id).await? {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO notebooks (id, category_id, title, description, slug, price,
                diagonal, display_type, processor_freq, ram, video, time_without_charge)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id)
        .bind(category)
        .bind(title)
        .bind(format!("{title} notebook"))
        .bind(slug)
        .bind(price)
        .bind(diagonal)
        .bind(display)
        .bind(freq)
        .bind(ram)
        .bind(video)
        .bind(battery)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
    }

    println!("Seeded notebooks");
    Ok(())
}

async fn seed_smartphones(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let category = category_id(pool, ProductKind::Smartphone).await?;
    let smartphones = [
        ("Pixel 8", "pixel-8", Decimal::new(69_900, 2), "6.2", "OLED", "2400x1080", "4575 mAh", "8 GB", false, None, "50 MP", "10.5 MP"),
        ("Galaxy A55", "galaxy-a55", Decimal::new(44_999, 2), "6.6", "Super AMOLED", "2340x1080", "5000 mAh", "8 GB", true, Some("1 TB"), "50 MP", "32 MP"),
    ];

    for (title, slug, price, diagonal, display, resolution, accum, ram, sd, sd_max, main_cam, front_cam) in
        smartphones
    {
        let id = Uuid::new_v4();
        let mut tx = pool.begin().await?;
        if !claim_slug(&mut tx, ProductKind::Smartphone, slug, id).await? {
            continue;
        }
        sqlx::query(
            r#"
            INSERT INTO smartphones (id, category_id, title, description, slug, price,
                diagonal, display_type, resolution, accum_volume, ram, sd, sd_volume_max,
                main_cam_mp, frontal_cam_mp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(id)
        .bind(category)
        .bind(title)
        .bind(format!("{title} smartphone"))
        .bind(slug)
        .bind(price)
        .bind(diagonal)
        .bind(display)
        .bind(resolution)
        .bind(accum)
        .bind(ram)
        .bind(sd)
        .bind(sd_max)
        .bind(main_cam)
        .bind(front_cam)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
    }

    println!("Seeded smartphones");
    Ok(())
}

#![allow(dead_code)]

use gadget_storefront::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::products::{CreateNotebookRequest, CreateSmartphoneRequest, ProductFields},
    entity::users::ActiveModel as UserActive,
    middleware::auth::{AuthUser, Identity},
    services::product_service,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// State backed by the test database, or `None` when none is configured.
pub async fn test_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run database tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 10).await?;
    // Tests in one binary run concurrently; concurrent DDL on Postgres can collide.
    MIGRATED
        .get_or_try_init(|| async { run_migrations(&orm_from_pool(&pool)).await })
        .await?;
    Ok(Some(AppState::new(pool, AppConfig::for_tests(database_url))))
}

/// Tests share one database, so every fixture gets a unique name.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn create_user(state: &AppState, role: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.com", unique(role))),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: role.into(),
    })
}

pub fn signed_in(user: &AuthUser) -> Identity {
    Identity::Authenticated(user.clone())
}

pub fn anonymous(token: Uuid) -> Identity {
    Identity::Anonymous {
        cart_token: Some(token),
    }
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<String> {
    let slug = unique(name);
    sqlx::query("INSERT INTO categories (name, slug) VALUES ($1, $2)")
        .bind(name)
        .bind(&slug)
        .execute(&state.pool)
        .await?;
    Ok(slug)
}

fn fields(slug: &str, price: Decimal, category_slug: &str) -> ProductFields {
    ProductFields {
        title: format!("Test {slug}"),
        description: "Fixture product".into(),
        slug: slug.to_string(),
        price,
        category_slug: Some(category_slug.to_string()),
        is_published: None,
        image: None,
    }
}

pub async fn create_notebook(
    state: &AppState,
    admin: &AuthUser,
    category_slug: &str,
    price: Decimal,
) -> anyhow::Result<String> {
    let slug = unique("nb");
    product_service::create_notebook(
        state,
        admin,
        CreateNotebookRequest {
            product: fields(&slug, price, category_slug),
            diagonal: "14".into(),
            display_type: "IPS".into(),
            processor_freq: "3.2 GHz".into(),
            ram: "16 GB".into(),
            video: "Integrated".into(),
            time_without_charge: "10 h".into(),
        },
    )
    .await?;
    Ok(slug)
}

pub async fn create_smartphone(
    state: &AppState,
    admin: &AuthUser,
    category_slug: &str,
    price: Decimal,
) -> anyhow::Result<String> {
    let slug = unique("sp");
    product_service::create_smartphone(
        state,
        admin,
        smartphone_request(&slug, price, category_slug),
    )
    .await?;
    Ok(slug)
}

pub fn smartphone_request(slug: &str, price: Decimal, category_slug: &str) -> CreateSmartphoneRequest {
    CreateSmartphoneRequest {
        product: fields(slug, price, category_slug),
        diagonal: "6.1".into(),
        display_type: "OLED".into(),
        resolution: "2400x1080".into(),
        accum_volume: "4000 mAh".into(),
        ram: "8 GB".into(),
        sd: None,
        sd_volume_max: None,
        main_cam_mp: "50 MP".into(),
        frontal_cam_mp: "12 MP".into(),
    }
}

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

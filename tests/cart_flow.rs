mod common;

use common::{
    anonymous, create_category, create_notebook, create_smartphone, create_user, money, signed_in,
    test_state,
};
use gadget_storefront::{
    dto::products::UpdateProductRequest,
    error::AppError,
    product_kind::ProductKind,
    services::{cart_service, product_service},
};
use uuid::Uuid;

#[tokio::test]
async fn signed_in_user_keeps_one_active_cart() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, "user").await?;
    let other = create_user(&state, "user").await?;

    let first = cart_service::resolve_cart(&state, signed_in(&user)).await?;
    let second = cart_service::resolve_cart(&state, signed_in(&user)).await?;
    assert_eq!(first.cart.id, second.cart.id);
    assert_eq!(
        first.cart.owner_id,
        first.customer.as_ref().map(|c| c.id),
        "cart belongs to the user's customer"
    );
    assert!(!first.cart.for_anonymous_user);

    let theirs = cart_service::resolve_cart(&state, signed_in(&other)).await?;
    assert_ne!(theirs.cart.id, first.cart.id);
    Ok(())
}

#[tokio::test]
async fn anonymous_token_maps_to_its_own_cart() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let token = Uuid::new_v4();

    let first = cart_service::resolve_cart(&state, anonymous(token)).await?;
    assert!(first.cart.for_anonymous_user);
    assert_eq!(first.cart.anonymous_token, Some(token));
    assert!(first.customer.is_none());

    let again = cart_service::resolve_cart(&state, anonymous(token)).await?;
    assert_eq!(again.cart.id, first.cart.id);

    let other = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;
    assert_ne!(other.cart.id, first.cart.id);
    Ok(())
}

#[tokio::test]
async fn missing_token_mints_a_fresh_anonymous_cart() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let identity = gadget_storefront::middleware::auth::Identity::Anonymous { cart_token: None };
    let current = cart_service::resolve_cart(&state, identity).await?;
    let token = current.cart.anonymous_token.expect("token minted");
    assert_eq!(current.user_id(), None);

    let again = cart_service::resolve_cart(&state, anonymous(token)).await?;
    assert_eq!(again.cart.id, current.cart.id);
    Ok(())
}

#[tokio::test]
async fn concurrent_first_requests_share_one_cart() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let token = Uuid::new_v4();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        tasks.push(tokio::spawn(async move {
            cart_service::resolve_cart(&state, anonymous(token)).await
        }));
    }
    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await??.cart.id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "all requests resolved the same cart");

    let (active,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM carts WHERE anonymous_token = $1 AND in_order = FALSE",
    )
    .bind(token)
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(active, 1);
    Ok(())
}

#[tokio::test]
async fn cart_totals_follow_lines() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let notebook = create_notebook(&state, &admin, &category, money(10_000)).await?;
    let phone = create_smartphone(&state, &admin, &category, money(5_000)).await?;

    let current = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;
    let empty = cart_service::view_cart(&state, &current).await?.data.unwrap();
    assert_eq!(empty.cart.total_products, 0);
    assert_eq!(empty.cart.final_price, money(0));

    cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &notebook).await?;
    cart_service::add_to_cart(&state, &current, ProductKind::Smartphone, &phone).await?;
    let view = cart_service::change_qty(&state, &current, ProductKind::Notebook, &notebook, 2)
        .await?
        .data
        .unwrap();

    assert_eq!(view.cart.total_products, 2);
    assert_eq!(view.cart.final_price, money(25_000));
    let line = view
        .lines
        .iter()
        .find(|l| l.slug.as_deref() == Some(notebook.as_str()))
        .expect("notebook line");
    assert_eq!(line.qty, 2);
    assert_eq!(line.final_price, money(20_000));

    // Adding an existing product leaves its line alone.
    let view = cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &notebook)
        .await?
        .data
        .unwrap();
    assert_eq!(view.cart.final_price, money(25_000));

    let view = cart_service::remove_from_cart(&state, &current, ProductKind::Smartphone, &phone)
        .await?
        .data
        .unwrap();
    assert_eq!(view.cart.total_products, 1);
    assert_eq!(view.cart.final_price, money(20_000));

    let missing =
        cart_service::remove_from_cart(&state, &current, ProductKind::Smartphone, &phone).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let zero = cart_service::change_qty(&state, &current, ProductKind::Notebook, &notebook, 0).await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn concurrent_adds_of_one_product_keep_one_line() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let phone = create_smartphone(&state, &admin, &category, money(5_000)).await?;
    let current = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let state = state.clone();
        let current = current.clone();
        let phone = phone.clone();
        tasks.push(tokio::spawn(async move {
            cart_service::add_to_cart(&state, &current, ProductKind::Smartphone, &phone).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let view = cart_service::view_cart(&state, &current).await?.data.unwrap();
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].qty, 1);
    assert_eq!(view.cart.total_products, 1);
    assert_eq!(view.cart.final_price, money(5_000));
    Ok(())
}

#[tokio::test]
async fn price_change_reaches_open_carts() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let notebook = create_notebook(&state, &admin, &category, money(10_000)).await?;

    let current = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;
    cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &notebook).await?;
    cart_service::change_qty(&state, &current, ProductKind::Notebook, &notebook, 2).await?;

    product_service::update_product(
        &state,
        &admin,
        ProductKind::Notebook,
        &notebook,
        UpdateProductRequest {
            price: Some(money(12_000)),
            ..Default::default()
        },
    )
    .await?;

    // The handle resolved before the price change still reports fresh totals.
    let view = cart_service::view_cart(&state, &current).await?.data.unwrap();
    assert_eq!(view.cart.final_price, money(24_000));

    let current = cart_service::resolve_cart(&state, current.identity.clone()).await?;
    let view = cart_service::view_cart(&state, &current).await?.data.unwrap();
    assert_eq!(view.cart.final_price, money(24_000));
    assert_eq!(view.lines[0].final_price, money(24_000));
    Ok(())
}

#[tokio::test]
async fn deleting_a_product_clears_it_from_carts() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let notebook = create_notebook(&state, &admin, &category, money(10_000)).await?;
    let phone = create_smartphone(&state, &admin, &category, money(5_000)).await?;

    let current = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;
    cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &notebook).await?;
    cart_service::add_to_cart(&state, &current, ProductKind::Smartphone, &phone).await?;

    product_service::delete_product(&state, &admin, ProductKind::Notebook, &notebook).await?;

    let view = cart_service::view_cart(&state, &current).await?.data.unwrap();
    assert_eq!(view.cart.total_products, 1);
    assert_eq!(view.cart.final_price, money(5_000));

    let gone = cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &notebook).await;
    assert!(matches!(gone, Err(AppError::ProductNotFound)));
    Ok(())
}

#[tokio::test]
async fn unpublished_products_cannot_be_added() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let phone = create_smartphone(&state, &admin, &category, money(5_000)).await?;
    product_service::update_product(
        &state,
        &admin,
        ProductKind::Smartphone,
        &phone,
        UpdateProductRequest {
            is_published: Some(false),
            ..Default::default()
        },
    )
    .await?;

    let current = cart_service::resolve_cart(&state, anonymous(Uuid::new_v4())).await?;
    let result = cart_service::add_to_cart(&state, &current, ProductKind::Smartphone, &phone).await;
    assert!(matches!(result, Err(AppError::ProductNotFound)));

    // The slug exists, but under the other kind it does not.
    let result = cart_service::add_to_cart(&state, &current, ProductKind::Notebook, &phone).await;
    assert!(matches!(result, Err(AppError::ProductNotFound)));
    Ok(())
}

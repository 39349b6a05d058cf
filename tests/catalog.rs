mod common;

use common::{
    create_category, create_notebook, create_smartphone, create_user, money, smartphone_request,
    test_state, unique,
};
use gadget_storefront::{
    error::AppError,
    image_policy::{ImageError, ImageUpload},
    models::ProductSpecs,
    product_kind::ProductKind,
    routes::params::ProductQuery,
    services::{catalog_service, product_service},
};

#[tokio::test]
async fn sidebar_counts_products_of_every_kind() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let gadgets = create_category(&state, "Gadgets").await?;
    let empty = create_category(&state, "Empty").await?;
    create_notebook(&state, &admin, &gadgets, money(10_000)).await?;
    create_notebook(&state, &admin, &gadgets, money(20_000)).await?;
    create_smartphone(&state, &admin, &gadgets, money(5_000)).await?;

    let sidebar = catalog_service::sidebar(&state.orm).await?;
    let entry = sidebar.iter().find(|c| c.slug == gadgets).expect("gadgets listed");
    assert_eq!(entry.count, 3);
    assert_eq!(entry.url, format!("/api/categories/{gadgets}"));
    let entry = sidebar.iter().find(|c| c.slug == empty).expect("empty listed");
    assert_eq!(entry.count, 0);
    Ok(())
}

#[tokio::test]
async fn category_detail_lists_newest_first() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let older = create_notebook(&state, &admin, &category, money(10_000)).await?;
    let newer = create_smartphone(&state, &admin, &category, money(5_000)).await?;

    let detail = catalog_service::category_detail(&state, &category)
        .await?
        .data
        .unwrap();
    let slugs: Vec<_> = detail.products.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, [newer.as_str(), older.as_str()]);
    assert!(detail.categories.iter().any(|c| c.slug == category));

    let missing = catalog_service::category_detail(&state, &unique("nowhere")).await;
    assert!(matches!(missing, Err(AppError::UnknownCategory(_))));
    Ok(())
}

#[tokio::test]
async fn product_detail_carries_kind_specs() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let phone = create_smartphone(&state, &admin, &category, money(5_000)).await?;

    let detail = catalog_service::get_product(&state, ProductKind::Smartphone, &phone)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.product.kind, ProductKind::Smartphone);
    assert_eq!(detail.product.url, format!("/api/products/smartphone/{phone}"));
    assert_eq!(detail.category.map(|c| c.slug), Some(category));
    match detail.specs {
        ProductSpecs::Smartphone(specs) => assert!(specs.sd, "sd defaults to true"),
        other => panic!("unexpected specs {other:?}"),
    }

    let wrong_kind = catalog_service::get_product(&state, ProductKind::Notebook, &phone).await;
    assert!(matches!(wrong_kind, Err(AppError::ProductNotFound)));
    Ok(())
}

#[tokio::test]
async fn slugs_are_unique_across_kinds() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    let notebook = create_notebook(&state, &admin, &category, money(10_000)).await?;

    let clash = product_service::create_smartphone(
        &state,
        &admin,
        smartphone_request(&notebook, money(5_000), &category),
    )
    .await;
    assert!(matches!(clash, Err(AppError::SlugTaken(slug)) if slug == notebook));
    Ok(())
}

#[tokio::test]
async fn product_creation_checks_image_price_and_category() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;

    let mut request = smartphone_request(&unique("sp"), money(5_000), &category);
    request.product.image = Some(ImageUpload {
        path: "products/tiny.png".into(),
        width: 100,
        height: 100,
        size_bytes: 1_024,
    });
    let result = product_service::create_smartphone(&state, &admin, request).await;
    assert!(matches!(
        result,
        Err(AppError::Image(ImageError::ResolutionTooLow { .. }))
    ));

    let request = smartphone_request(&unique("sp"), money(-1), &category);
    let result = product_service::create_smartphone(&state, &admin, request).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let request = smartphone_request(&unique("sp"), money(5_000), &unique("nowhere"));
    let result = product_service::create_smartphone(&state, &admin, request).await;
    assert!(matches!(result, Err(AppError::UnknownCategory(_))));

    let user = create_user(&state, "user").await?;
    let request = smartphone_request(&unique("sp"), money(5_000), &category);
    let result = product_service::create_smartphone(&state, &user, request).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn kind_listing_is_paginated_and_sorted() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    create_notebook(&state, &admin, &category, money(10_000)).await?;
    create_notebook(&state, &admin, &category, money(20_000)).await?;

    let resp = catalog_service::list_products(
        &state,
        ProductKind::Notebook,
        ProductQuery {
            per_page: Some(1),
            ..Default::default()
        },
    )
    .await?;
    let meta = resp.meta.unwrap();
    assert_eq!(meta.per_page, Some(1));
    assert!(meta.total.unwrap() >= 2);
    let items = resp.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert!(items.iter().all(|p| p.kind == ProductKind::Notebook));
    Ok(())
}

#[tokio::test]
async fn latest_products_put_the_requested_kind_first() -> anyhow::Result<()> {
    let Some(state) = test_state().await? else {
        return Ok(());
    };
    let admin = create_user(&state, "admin").await?;
    let category = create_category(&state, "Gadgets").await?;
    create_notebook(&state, &admin, &category, money(10_000)).await?;
    create_smartphone(&state, &admin, &category, money(5_000)).await?;

    let items = catalog_service::latest_products(&state, Some("smartphone"))
        .await?
        .data
        .unwrap()
        .items;
    assert_eq!(items[0].kind, ProductKind::Smartphone);
    let first_notebook = items.iter().position(|p| p.kind == ProductKind::Notebook);
    let last_phone = items.iter().rposition(|p| p.kind == ProductKind::Smartphone);
    assert!(first_notebook > last_phone);

    // Unknown kinds are ignored.
    let items = catalog_service::latest_products(&state, Some("tablet"))
        .await?
        .data
        .unwrap()
        .items;
    assert!(!items.is_empty());
    Ok(())
}

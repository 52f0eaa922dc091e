use assert_matches::assert_matches;
use stockroom_api::{errors::ServiceError, services::catalog::UpdateProductRequest};

mod common;

#[tokio::test]
async fn create_normalizes_sku_and_applies_defaults() {
    let (_db, services) = common::setup().await;

    let created = services
        .catalog
        .create(common::product("  nx-1001 ", "Premium Leather Desk Mat", 142))
        .await
        .expect("create failed");

    assert_eq!(created.sku, "NX-1001");
    assert_eq!(created.low_stock_threshold, 10);
    assert!(created.last_updated.is_some());

    // Lookup goes through the same normalization.
    let found = services
        .catalog
        .get("nx-1001")
        .await
        .expect("get failed")
        .expect("product missing");
    assert_eq!(found.name, "Premium Leather Desk Mat");
    assert_eq!(found.stock, 142);
}

#[tokio::test]
async fn duplicate_sku_is_rejected() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 10))
        .await
        .expect("create failed");

    let err = services
        .catalog
        .create(common::product("nx-1001", "Other Mat", 5))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::DuplicateSku(sku) if sku == "NX-1001");
}

#[tokio::test]
async fn update_merges_fields_and_refreshes_timestamp() {
    let (_db, services) = common::setup().await;

    let created = services
        .catalog
        .create(common::product("NX-2001", "Mechanical Keyboard", 55))
        .await
        .expect("create failed");

    let updated = services
        .catalog
        .update(
            "nx-2001",
            UpdateProductRequest {
                name: Some("Mechanical Keyboard (Red Switch)".to_string()),
                low_stock_threshold: Some(20),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");

    assert_eq!(updated.name, "Mechanical Keyboard (Red Switch)");
    assert_eq!(updated.low_stock_threshold, 20);
    // Untouched fields survive the merge.
    assert_eq!(updated.stock, 55);
    assert_eq!(updated.category, created.category);
    assert!(updated.last_updated.is_some());
}

#[tokio::test]
async fn adjust_stock_is_relative_and_may_go_negative() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-3001", "USB-C Hub", 3))
        .await
        .expect("create failed");

    services
        .catalog
        .adjust_stock("NX-3001", -10)
        .await
        .expect("adjust failed");

    let product = services
        .catalog
        .get("NX-3001")
        .await
        .expect("get failed")
        .expect("product missing");
    assert_eq!(product.stock, -7);

    services
        .catalog
        .adjust_stock("NX-3001", 12)
        .await
        .expect("adjust failed");
    let product = services
        .catalog
        .get("NX-3001")
        .await
        .expect("get failed")
        .expect("product missing");
    assert_eq!(product.stock, 5);
}

#[tokio::test]
async fn adjust_stock_on_unknown_sku_is_not_found() {
    let (_db, services) = common::setup().await;

    let err = services.catalog.adjust_stock("NOPE-1", 5).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn low_stock_flag_follows_threshold() {
    let (_db, services) = common::setup().await;

    let product = services
        .catalog
        .create(common::product("NX-1002", "Aluminum Laptop Stand", 8))
        .await
        .expect("create failed");

    // Default threshold is 10, so a stock of 8 is flagged.
    assert!(product.is_low_stock());

    services
        .catalog
        .adjust_stock("NX-1002", 10)
        .await
        .expect("adjust failed");
    let product = services
        .catalog
        .get("NX-1002")
        .await
        .expect("get failed")
        .expect("product missing");
    assert!(!product.is_low_stock());
}

#[tokio::test]
async fn delete_removes_one_product() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 1))
        .await
        .expect("create failed");

    services.catalog.delete("nx-1001").await.expect("delete failed");
    assert!(services
        .catalog
        .get("NX-1001")
        .await
        .expect("get failed")
        .is_none());

    let err = services.catalog.delete("NX-1001").await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

// The batch delete runs in one transaction: every matching row is removed
// in a single commit (all-or-nothing at the batch level). Keys that match
// nothing simply do not contribute to the count.
#[tokio::test]
async fn delete_many_commits_the_whole_batch() {
    let (_db, services) = common::setup().await;

    for sku in ["NX-1001", "NX-1002", "NX-2001"] {
        services
            .catalog
            .create(common::product(sku, "Product", 1))
            .await
            .expect("create failed");
    }

    let deleted = services
        .catalog
        .delete_many(&[
            "nx-1001".to_string(),
            "NX-1002".to_string(),
            "MISSING-1".to_string(),
        ])
        .await
        .expect("batch delete failed");

    assert_eq!(deleted, 2);

    let remaining = services.catalog.list().await.expect("list failed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].sku, "NX-2001");
}

#[tokio::test]
async fn list_returns_catalog_in_sku_order() {
    let (_db, services) = common::setup().await;

    for sku in ["NX-3002", "NX-1001", "NX-2001"] {
        services
            .catalog
            .create(common::product(sku, "Product", 1))
            .await
            .expect("create failed");
    }

    let products = services.catalog.list().await.expect("list failed");
    let skus: Vec<_> = products.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["NX-1001", "NX-2001", "NX-3002"]);
}

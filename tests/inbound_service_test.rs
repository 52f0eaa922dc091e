use assert_matches::assert_matches;
use stockroom_api::{entities::transaction_log, errors::ServiceError};

mod common;

#[tokio::test]
async fn lookup_stays_quiet_below_four_characters() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 10))
        .await
        .expect("create failed");

    // Three characters would already prefix-match, but the lookup must not
    // fire yet.
    let found = services.inbound.lookup("NX-").await.expect("lookup failed");
    assert!(found.is_none());

    let found = services.inbound.lookup("nx-1").await.expect("lookup failed");
    assert_eq!(found.expect("product missing").sku, "NX-1001");
}

#[tokio::test]
async fn lookup_prefix_matches_in_sku_order() {
    let (_db, services) = common::setup().await;

    for sku in ["NX-1002", "NX-1001"] {
        services
            .catalog
            .create(common::product(sku, "Product", 1))
            .await
            .expect("create failed");
    }

    let found = services
        .inbound
        .lookup(" nx-10 ")
        .await
        .expect("lookup failed")
        .expect("product missing");
    assert_eq!(found.sku, "NX-1001");
}

#[tokio::test]
async fn register_increments_stock_and_appends_one_log() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Premium Leather Desk Mat", 142))
        .await
        .expect("create failed");

    let receipt = services
        .inbound
        .register("nx-1001", 5, "Staff A")
        .await
        .expect("register failed");

    assert_eq!(receipt.sku, "NX-1001");
    assert_eq!(receipt.quantity, 5);
    assert_eq!(receipt.new_stock, 147);
    assert_eq!(receipt.product_name, "Premium Leather Desk Mat");

    let product = services
        .catalog
        .get("NX-1001")
        .await
        .expect("get failed")
        .expect("product missing");
    assert_eq!(product.stock, 147);

    let history = services.inbound.history().await.expect("history failed");
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.entry_type, transaction_log::INBOUND);
    assert_eq!(entry.sku.as_deref(), Some("NX-1001"));
    assert_eq!(entry.quantity, Some(5));
    assert_eq!(entry.operator, "Staff A");
    assert!(entry.items.0.is_empty());
}

#[tokio::test]
async fn register_rejects_nonpositive_quantity() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 10))
        .await
        .expect("create failed");

    for quantity in [0, -3] {
        let err = services
            .inbound
            .register("NX-1001", quantity, "Staff A")
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    // Nothing was written.
    let history = services.inbound.history().await.expect("history failed");
    assert!(history.is_empty());
    let product = services
        .catalog
        .get("NX-1001")
        .await
        .expect("get failed")
        .expect("product missing");
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn register_requires_a_resolved_product() {
    let (_db, services) = common::setup().await;

    let err = services
        .inbound
        .register("GHOST-1", 5, "Staff A")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let history = services.inbound.history().await.expect("history failed");
    assert!(history.is_empty());
}

#[tokio::test]
async fn history_is_newest_first() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 0))
        .await
        .expect("create failed");

    for quantity in [1, 2, 3] {
        services
            .inbound
            .register("NX-1001", quantity, "Staff A")
            .await
            .expect("register failed");
    }

    let history = services.inbound.history().await.expect("history failed");
    let quantities: Vec<_> = history.iter().filter_map(|e| e.quantity).collect();
    assert_eq!(quantities, vec![3, 2, 1]);
}

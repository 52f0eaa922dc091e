use std::collections::HashSet;

use stockroom_api::{
    entities::order::DeliveryType,
    entities::transaction_log::LogItem,
    services::logs::{self, LogCursor, OutboundRecord, SearchFacet},
};

mod common;

fn record(
    delivery: DeliveryType,
    order_number: &str,
    tracking: &str,
    customer: &str,
    items: Vec<(&str, &str, i32)>,
) -> OutboundRecord {
    OutboundRecord {
        delivery_type: delivery,
        order_number: order_number.to_string(),
        tracking_number: tracking.to_string(),
        customer_name: customer.to_string(),
        operator: "Admin".to_string(),
        items: items
            .into_iter()
            .map(|(sku, name, quantity)| LogItem {
                sku: sku.to_string(),
                name: name.to_string(),
                quantity,
                link: None,
            })
            .collect(),
    }
}

#[tokio::test]
async fn sku_facet_matches_whole_normalized_tokens_only() {
    let (_db, services) = common::setup().await;

    services
        .logs
        .append_outbound(record(
            DeliveryType::Post,
            "ORD-1",
            "TRK1",
            "Alice Kim",
            vec![
                ("NX-1001", "Premium Leather Desk Mat", 1),
                ("NX-2002", "Wireless Ergonomic Mouse", 2),
            ],
        ))
        .await
        .expect("append failed");

    services
        .logs
        .append_outbound(record(
            DeliveryType::Post,
            "ORD-2",
            "TRK2",
            "Bob Lee",
            vec![("NX-3001", "USB-C Hub 7-in-1", 1)],
        ))
        .await
        .expect("append failed");

    // Term is normalized before matching.
    let page = services
        .logs
        .search(SearchFacet::Sku, " nx-1001 ", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].order_number.as_deref(), Some("ORD-1"));

    // A fragment that is not a whole SKU matches nothing.
    let page = services
        .logs
        .search(SearchFacet::Sku, "NX-100", 50, None)
        .await
        .expect("search failed");
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn product_token_facet_requires_a_whole_token() {
    let (_db, services) = common::setup().await;

    services
        .logs
        .append_outbound(record(
            DeliveryType::Valex,
            "ORD-1",
            "TRK1",
            "Alice Kim",
            vec![("NX-1001", "Premium Leather Desk Mat", 1)],
        ))
        .await
        .expect("append failed");

    let page = services
        .logs
        .search(SearchFacet::ProductNameToken, "Leather", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);

    // Substrings of a token do not match; neither do multi-word fragments.
    for term in ["leath", "Leather Desk"] {
        let page = services
            .logs
            .search(SearchFacet::ProductNameToken, term, 50, None)
            .await
            .expect("search failed");
        assert!(page.entries.is_empty(), "term {:?} must not match", term);
    }
}

#[tokio::test]
async fn customer_facet_is_exact_lowercased_match() {
    let (_db, services) = common::setup().await;

    services
        .logs
        .append_outbound(record(
            DeliveryType::Post,
            "ORD-1",
            "TRK1",
            "Alice Kim",
            vec![("NX-1001", "Desk Mat", 1)],
        ))
        .await
        .expect("append failed");

    let page = services
        .logs
        .search(SearchFacet::CustomerName, "ALICE KIM", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);

    // Partial names do not match: the facet is equality, not containment.
    let page = services
        .logs
        .search(SearchFacet::CustomerName, "Alice", 50, None)
        .await
        .expect("search failed");
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn order_and_tracking_facets_are_exact() {
    let (_db, services) = common::setup().await;

    services
        .logs
        .append_outbound(record(
            DeliveryType::Pickup,
            "ORD-2023-8821",
            "TRK998877",
            "Alice Kim",
            vec![("NX-1001", "Desk Mat", 1)],
        ))
        .await
        .expect("append failed");

    let page = services
        .logs
        .search(SearchFacet::OrderId, "ORD-2023-8821", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);

    let page = services
        .logs
        .search(SearchFacet::TrackingNumber, " TRK998877 ", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);

    let page = services
        .logs
        .search(SearchFacet::OrderId, "ORD-2023", 50, None)
        .await
        .expect("search failed");
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn inbound_entries_never_surface_in_the_outbound_views() {
    let (_db, services) = common::setup().await;

    services
        .catalog
        .create(common::product("NX-1001", "Desk Mat", 0))
        .await
        .expect("create failed");
    services
        .inbound
        .register("NX-1001", 5, "Staff A")
        .await
        .expect("register failed");

    services
        .logs
        .append_outbound(record(
            DeliveryType::Post,
            "ORD-1",
            "TRK1",
            "Alice Kim",
            vec![("NX-1001", "Desk Mat", 1)],
        ))
        .await
        .expect("append failed");

    let page = services
        .logs
        .outbound_page(50, None)
        .await
        .expect("page failed");
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].entry_type, "POST");

    let page = services
        .logs
        .search(SearchFacet::Sku, "NX-1001", 50, None)
        .await
        .expect("search failed");
    assert_eq!(page.entries.len(), 1);
    assert_ne!(page.entries[0].entry_type, "INBOUND");
}

#[tokio::test]
async fn pages_are_disjoint_and_newest_first() {
    let (_db, services) = common::setup().await;

    for i in 0..7 {
        services
            .logs
            .append_outbound(record(
                DeliveryType::Post,
                &format!("ORD-{}", i),
                &format!("TRK{}", i),
                "Alice Kim",
                vec![("NX-1001", "Desk Mat", 1)],
            ))
            .await
            .expect("append failed");
    }

    let mut seen = HashSet::new();
    let mut cursor: Option<LogCursor> = None;
    let mut fetched = 0usize;
    let mut last_created_at = None;

    loop {
        let page = services
            .logs
            .outbound_page(3, cursor.take())
            .await
            .expect("page failed");
        if page.entries.is_empty() {
            break;
        }

        for entry in &page.entries {
            // No entry appears twice across consecutive pages.
            assert!(seen.insert(entry.id), "duplicate entry across pages");
            if let Some(previous) = last_created_at {
                assert!(entry.created_at <= previous, "pages must stay descending");
            }
            last_created_at = Some(entry.created_at);
        }
        fetched += page.entries.len();

        cursor = page
            .next_cursor
            .as_deref()
            .map(LogCursor::decode)
            .transpose()
            .expect("cursor decode failed");
        if cursor.is_none() {
            break;
        }
    }

    assert_eq!(fetched, 7);
}

#[tokio::test]
async fn delivery_filter_trims_the_fetched_page_client_side() {
    let (_db, services) = common::setup().await;

    for (delivery, order_number) in [
        (DeliveryType::Post, "ORD-1"),
        (DeliveryType::Valex, "ORD-2"),
        (DeliveryType::Pickup, "ORD-3"),
    ] {
        services
            .logs
            .append_outbound(record(
                delivery,
                order_number,
                "TRK1",
                "Alice Kim",
                vec![("NX-1001", "Desk Mat", 1)],
            ))
            .await
            .expect("append failed");
    }

    let page = services
        .logs
        .outbound_page(50, None)
        .await
        .expect("page failed");
    assert_eq!(page.entries.len(), 3);

    let filtered = logs::filter_by_delivery(&page.entries, Some(DeliveryType::Valex));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].order_number.as_deref(), Some("ORD-2"));

    let unfiltered = logs::filter_by_delivery(&page.entries, None);
    assert_eq!(unfiltered.len(), 3);
}

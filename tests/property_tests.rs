use proptest::prelude::*;
use uuid::Uuid;

use stockroom_api::{
    entities::order::DeliveryType,
    services::fulfillment::{page_window, PageMark, PickSession, WorkingItem},
    sku,
};

fn session_of(required: Vec<i32>) -> PickSession {
    PickSession {
        order_id: Uuid::nil(),
        order_number: "ORD-P".to_string(),
        tracking: "TRK-P".to_string(),
        delivery_type: DeliveryType::Post,
        customer_name: "Prop Tester".to_string(),
        items: required
            .into_iter()
            .enumerate()
            .map(|(i, qty)| WorkingItem {
                sku: format!("SKU-{}", i),
                name: format!("Item {}", i),
                required_qty: qty,
                scanned_qty: 0,
            })
            .collect(),
    }
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in ".{0,64}") {
        let once = sku::normalize(&raw);
        prop_assert_eq!(sku::normalize(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn normalization_uppercases_ascii(raw in "[a-z0-9 -]{1,32}") {
        let normalized = sku::normalize(&raw);
        prop_assert!(!normalized.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn scanned_quantity_never_goes_below_zero(
        required in prop::collection::vec(0..10i32, 1..5),
        ops in prop::collection::vec((0usize..5, -100..100i32), 0..40),
    ) {
        let mut session = session_of(required);
        for (slot, delta) in ops {
            let target = format!("SKU-{}", slot);
            if delta % 2 == 0 {
                session.adjust_quantity(&target, delta);
            } else {
                session.set_quantity(&target, delta);
            }
            prop_assert!(session.items.iter().all(|i| i.scanned_qty >= 0));
        }
    }

    #[test]
    fn completion_means_exact_match_everywhere(
        required in prop::collection::vec(1..5i32, 1..4),
    ) {
        let mut session = session_of(required.clone());
        // Scanning exactly the required quantities completes the order.
        for (i, qty) in required.iter().enumerate() {
            let target = format!("SKU-{}", i);
            for _ in 0..*qty {
                session.record_scan(&target).unwrap();
            }
        }
        prop_assert!(session.is_complete());

        // One extra scan anywhere breaks it again.
        session.record_scan("SKU-0").unwrap();
        prop_assert!(!session.is_complete());
    }

    #[test]
    fn page_window_always_contains_the_current_page(
        current in 1usize..500,
        total in 1usize..500,
        window in 1usize..12,
    ) {
        let marks = page_window(current, total, window);
        let clamped = current.min(total);
        prop_assert!(marks.contains(&PageMark::Page(clamped)));

        let pages: Vec<usize> = marks.iter().filter_map(|m| match m {
            PageMark::Page(p) => Some(*p),
            PageMark::Gap => None,
        }).collect();

        // The run is contiguous and within bounds.
        prop_assert!(pages.windows(2).all(|w| w[1] == w[0] + 1));
        prop_assert!(pages.iter().all(|p| (1..=total).contains(p)));

        // Ellipses appear exactly on the sides the run does not touch.
        let first = *pages.first().unwrap();
        let last = *pages.last().unwrap();
        prop_assert_eq!(marks.first() == Some(&PageMark::Gap), first > 1);
        prop_assert_eq!(marks.last() == Some(&PageMark::Gap), last < total);
    }
}

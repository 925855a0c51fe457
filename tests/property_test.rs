use {
    proptest::prelude::*,
    rust_decimal::Decimal,
    tixpay::{
        domain::{
            nvp::NvpPayload,
            order::{LineItem, Order},
            status::CanonicalStatus,
        },
        services::payload::{fill_payload_with_order, format_amount},
    },
};

const KNOWN_STATUSES: [&str; 7] = [
    "Completed",
    "Pending",
    "Cancelled",
    "Failed",
    "Denied",
    "Refunded",
    "Reversed",
];

fn arb_item() -> impl Strategy<Value = LineItem> {
    (
        "[a-z0-9-]{1,12}",
        ".{0,200}",
        ".{0,200}",
        0i64..100_000,
        1u32..5,
    )
        .prop_map(|(id, name, desc, cents, qty)| {
            LineItem::new(id, name, desc, Decimal::new(cents, 2), qty)
        })
}

fn arb_order() -> impl Strategy<Value = Order> {
    prop::collection::vec(arb_item(), 1..6).prop_map(|items| {
        let total: Decimal = items.iter().map(LineItem::subtotal).sum();
        Order::new("order-p", items, total, "USD")
    })
}

proptest! {
    /// The mapper is total: every string maps, and everything outside the
    /// fixed table maps to the conservative Pending default.
    #[test]
    fn unknown_statuses_map_to_pending(s in ".*") {
        prop_assume!(!KNOWN_STATUSES.contains(&s.as_str()));
        prop_assert_eq!(CanonicalStatus::from_provider(&s), CanonicalStatus::Pending);
    }

    /// A consistent order always builds, and the aggregate fields agree
    /// with the order total.
    #[test]
    fn payload_totals_agree_with_the_order(order in arb_order()) {
        let mut payload = NvpPayload::new();
        fill_payload_with_order(&mut payload, &order, "Conf 2026").unwrap();

        let total = format_amount(order.total());
        prop_assert_eq!(payload.get("PAYMENTREQUEST_0_ITEMAMT"), Some(total.as_str()));
        prop_assert_eq!(payload.get("PAYMENTREQUEST_0_AMT"), Some(total.as_str()));
    }

    /// Name and description fields never exceed the remote field limit.
    #[test]
    fn payload_fields_respect_the_length_limit(order in arb_order()) {
        let mut payload = NvpPayload::new();
        fill_payload_with_order(&mut payload, &order, "Conf 2026").unwrap();

        for i in 0..order.items().len() {
            let name = payload.get(&format!("L_PAYMENTREQUEST_0_NAME{i}")).unwrap();
            let desc = payload.get(&format!("L_PAYMENTREQUEST_0_DESC{i}")).unwrap();
            prop_assert!(name.chars().count() <= 127);
            prop_assert!(desc.chars().count() <= 127);
        }
    }

    /// Building twice from the same order is byte-identical — the charge
    /// confirmation must reproduce exactly what initiation sent.
    #[test]
    fn payload_builder_is_deterministic(order in arb_order()) {
        let mut a = NvpPayload::new();
        let mut b = NvpPayload::new();
        fill_payload_with_order(&mut a, &order, "Conf 2026").unwrap();
        fill_payload_with_order(&mut b, &order, "Conf 2026").unwrap();
        prop_assert_eq!(a.encode(), b.encode());
    }

    /// A declared total that disagrees with the line items is always
    /// rejected before anything is sent.
    #[test]
    fn skewed_totals_are_rejected(order in arb_order(), skew in 1i64..10_000) {
        let skewed = Order::new(
            "order-p",
            order.items().to_vec(),
            order.total() + Decimal::new(skew, 2),
            "USD",
        );
        let mut payload = NvpPayload::new();
        prop_assert!(fill_payload_with_order(&mut payload, &skewed, "Conf 2026").is_err());
    }
}

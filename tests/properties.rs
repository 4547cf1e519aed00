use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use pharma_report::aggregate::top_products;
use pharma_report::data::Cell;
use pharma_report::dataset::{SaleRecord, normalize_table};
use pharma_report::filter::{FilterCriteria, Selection};
use pharma_report::ingest::RawTable;

fn record_strategy() -> impl Strategy<Value = SaleRecord> {
    (
        proptest::option::of(prop_oneof![
            Just("ASPIRINE"),
            Just("DOLIPRANE"),
            Just("SPASFON")
        ]),
        0i64..1000,
        proptest::option::of(prop_oneof![Just("ALICE"), Just("BOB"), Just("CHLOE")]),
        proptest::option::of(0i64..60),
    )
        .prop_map(|(product, amount, operator, day_offset)| SaleRecord {
            product: product.map(str::to_string),
            unit_price: None,
            amount: Decimal::from(amount),
            quantity: Decimal::ONE,
            client: None,
            operator: operator.map(str::to_string),
            code: None,
            date: day_offset.map(|offset| {
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
            }),
            source_file: "ventes.xlsx".to_string(),
        })
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Empty),
        (0.0..1000.0f64).prop_map(Cell::Number),
        "[A-Z]{1,8}".prop_map(Cell::Text),
        Just(Cell::Text("2025-01-05".to_string())),
    ]
}

fn table_strategy() -> impl Strategy<Value = RawTable> {
    proptest::sample::subsequence(
        vec![
            "Nom Produit",
            "Qté",
            "Montant TTC",
            "Prix TTC",
            "Opérateur",
            "Date",
            "TVA",
        ],
        0..=7,
    )
    .prop_flat_map(|headers| {
        let width = headers.len();
        (
            Just(headers),
            proptest::collection::vec(proptest::collection::vec(cell_strategy(), width), 0..20),
        )
    })
    .prop_map(|(headers, rows)| RawTable {
        source: "ventes.xlsx".to_string(),
        headers: headers.into_iter().map(String::from).collect(),
        rows,
    })
}

proptest! {
    // Predicates form a commutative conjunction: sequential application
    // in either order matches joint application.
    #[test]
    fn filter_application_order_is_irrelevant(
        records in proptest::collection::vec(record_strategy(), 0..40),
        selected_op in prop_oneof![Just("ALICE"), Just("BOB")],
        needle in prop_oneof![Just("asp"), Just("DOLI"), Just("zzz")],
    ) {
        let by_operator = FilterCriteria {
            operators: Selection::only([selected_op.to_string()]),
            ..FilterCriteria::default()
        };
        let by_product = FilterCriteria {
            product_contains: Some(needle.to_string()),
            ..FilterCriteria::default()
        };
        let joint = FilterCriteria {
            operators: Selection::only([selected_op.to_string()]),
            product_contains: Some(needle.to_string()),
            ..FilterCriteria::default()
        };

        let op_then_product: Vec<&SaleRecord> = records
            .iter()
            .filter(|r| by_operator.matches(r))
            .filter(|r| by_product.matches(r))
            .collect();
        let product_then_op: Vec<&SaleRecord> = records
            .iter()
            .filter(|r| by_product.matches(r))
            .filter(|r| by_operator.matches(r))
            .collect();
        let jointly: Vec<&SaleRecord> = records.iter().filter(|r| joint.matches(r)).collect();

        prop_assert_eq!(&op_then_product, &product_then_op);
        prop_assert_eq!(&op_then_product, &jointly);
    }

    #[test]
    fn top_products_is_bounded_and_sorted_descending(
        records in proptest::collection::vec(record_strategy(), 0..40),
        n in 0usize..20,
    ) {
        let refs: Vec<&SaleRecord> = records.iter().collect();
        let top = top_products(&refs, n);
        prop_assert!(top.len() <= n);
        for pair in top.windows(2) {
            prop_assert!(pair[0].total_amount >= pair[1].total_amount);
        }
    }

    #[test]
    fn normalization_is_idempotent_and_row_preserving(table in table_strategy()) {
        let first = normalize_table(&table);
        let second = normalize_table(&table);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), table.rows.len());
    }
}

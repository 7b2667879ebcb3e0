//! End-to-end tests for well addressing.
//!
//! Name ↔ (row, col) ↔ linear index, for both plate sizes and both fill orders.

use assembly_rs::model::{index_to_rowcol, parse_well, rowcol_to_index, well_name};
use assembly_rs::{Error, FillOrder, Shape};
use proptest::prelude::*;

fn shapes() -> impl Strategy<Value = Shape> {
    prop_oneof![Just(Shape::PLATE_96), Just(Shape::PLATE_384)]
}

fn orders() -> impl Strategy<Value = FillOrder> {
    prop_oneof![Just(FillOrder::DownColumns), Just(FillOrder::AcrossRows)]
}

proptest! {
    #[test]
    fn prop_name_round_trip(shape in shapes(), row in 0..16usize, col in 0..24usize) {
        prop_assume!(shape.contains(row, col));
        prop_assert_eq!(parse_well(&well_name(row, col), shape).unwrap(), (row, col));
    }

    #[test]
    fn prop_index_round_trip(shape in shapes(), order in orders(), idx in 0..384usize) {
        prop_assume!(idx < shape.capacity());
        let (row, col) = index_to_rowcol(idx, shape, order);
        prop_assert!(shape.contains(row, col));
        prop_assert_eq!(rowcol_to_index(row, col, shape, order), idx);
    }

    #[test]
    fn prop_out_of_range_rejected(row in 8..26usize, col in 0..12usize) {
        let name = well_name(row, col);
        let rejected = matches!(parse_well(&name, Shape::PLATE_96), Err(Error::InvalidAddress { .. }));
        prop_assert!(rejected);
    }
}

// ============================================================================
// Fixed points
// ============================================================================

#[test]
fn down_columns_walks_a1_b1() {
    let names: Vec<String> = (0..10)
        .map(|i| {
            let (r, c) = index_to_rowcol(i, Shape::PLATE_96, FillOrder::DownColumns);
            well_name(r, c)
        })
        .collect();
    assert_eq!(names, ["A1", "B1", "C1", "D1", "E1", "F1", "G1", "H1", "A2", "B2"]);
}

#[test]
fn across_rows_walks_a1_a2() {
    let (r, c) = index_to_rowcol(12, Shape::PLATE_96, FillOrder::AcrossRows);
    assert_eq!(well_name(r, c), "B1");
    let (r, c) = index_to_rowcol(11, Shape::PLATE_96, FillOrder::AcrossRows);
    assert_eq!(well_name(r, c), "A12");
}

#[test]
fn last_wells() {
    assert_eq!(parse_well("H12", Shape::PLATE_96).unwrap(), (7, 11));
    assert_eq!(parse_well("P24", Shape::PLATE_384).unwrap(), (15, 23));
    assert_eq!(rowcol_to_index(7, 11, Shape::PLATE_96, FillOrder::DownColumns), 95);
    assert_eq!(rowcol_to_index(15, 23, Shape::PLATE_384, FillOrder::AcrossRows), 383);
}

#[test]
fn malformed_names() {
    for bad in ["", "1A", "A", "A0", "A13", "I1", "A+1", "AA1"] {
        assert!(
            matches!(parse_well(bad, Shape::PLATE_96), Err(Error::InvalidAddress { .. })),
            "{bad} should be rejected"
        );
    }
}

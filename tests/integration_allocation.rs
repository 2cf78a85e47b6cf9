//! Integration tests for allocation invariants across many inputs.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voltshare::billing::engine::{allocate, calculate_bill, calculate_bill_with};
use voltshare::billing::types::{AllocationInput, BillingPeriod, RoomReading};

use common::approx_eq;

/// Random non-negative inputs: (main meter, rate, room readings).
fn random_cases(seed: u64, n: usize) -> Vec<(f64, f64, Vec<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let room_count = rng.random_range(0..12);
            let kwh: Vec<f64> = (0..room_count)
                .map(|_| {
                    if rng.random_bool(0.1) {
                        0.0
                    } else {
                        rng.random_range(0.0..800.0)
                    }
                })
                .collect();
            let main = rng.random_range(0.0..5000.0);
            let rate = rng.random_range(0.0..40.0);
            (main, rate, kwh)
        })
        .collect()
}

#[test]
fn shares_sum_to_one_or_zero() {
    for (main, rate, kwh) in random_cases(7, 500) {
        let a = allocate(&common::input(main, rate, &kwh));
        let share_sum: f64 = a.rooms.iter().map(|r| r.share).sum();
        if a.total_submeter_kwh > 0.0 {
            assert!(
                (share_sum - 1.0).abs() < common::TOLERANCE,
                "shares sum to {share_sum} for {kwh:?}"
            );
        } else {
            assert_eq!(share_sum, 0.0);
        }
        for r in &a.rooms {
            assert!((0.0..=1.0).contains(&r.share), "share {} out of range", r.share);
        }
    }
}

#[test]
fn missing_is_floored_gap() {
    for (main, rate, kwh) in random_cases(11, 500) {
        let a = allocate(&common::input(main, rate, &kwh));
        let expected = (main - a.total_submeter_kwh).max(0.0);
        assert_eq!(a.missing_kwh, expected);
        assert!(a.missing_kwh >= 0.0);
    }
}

#[test]
fn every_missing_unit_is_billed() {
    for (main, rate, kwh) in random_cases(23, 500) {
        let bill = calculate_bill(main, rate, common::rooms(&kwh), "January", 2024);
        if bill.total_submeter_kwh <= 0.0 {
            continue;
        }
        let expected = (bill.total_submeter_kwh + bill.missing_kwh) * rate;
        assert!(
            approx_eq(bill.total_amount(), expected),
            "billed {} vs expected {expected}",
            bill.total_amount()
        );
        assert!(approx_eq(
            bill.billed_kwh(),
            bill.total_submeter_kwh + bill.missing_kwh
        ));
    }
}

#[test]
fn submeters_above_main_bill_only_metered_use() {
    let bill = calculate_bill(150.0, 10.0, common::rooms(&[90.0, 100.0]), "January", 2024);
    assert_eq!(bill.missing_kwh, 0.0);
    assert_eq!(bill.submeter_excess(), 40.0);
    assert!(approx_eq(bill.total_amount(), 1900.0));
}

#[test]
fn empty_room_list() {
    let bill = calculate_bill(120.0, 12.0, Vec::new(), "January", 2024);
    assert_eq!(bill.total_submeter_kwh, 0.0);
    assert_eq!(bill.missing_kwh, 120.0);
    assert!(bill.rooms.is_empty());
    assert_eq!(bill.total_amount(), 0.0);
}

#[test]
fn concrete_two_room_scenario() {
    let bill = calculate_bill(200.0, 12.0, common::rooms(&[90.0, 100.0]), "January", 2024);
    assert_eq!(bill.total_submeter_kwh, 190.0);
    assert_eq!(bill.missing_kwh, 10.0);

    let (r1, r2) = (&bill.rooms[0], &bill.rooms[1]);
    assert_eq!(format!("{:.4}", r1.share), "0.4737");
    assert_eq!(format!("{:.3}", r1.compensation_kwh), "4.737");
    assert_eq!(format!("{:.3}", r1.final_kwh), "94.737");
    assert_eq!(format!("{:.2}", r1.bill_amount), "1136.84");
    assert_eq!(format!("{:.4}", r2.share), "0.5263");
    assert_eq!(format!("{:.3}", r2.final_kwh), "105.263");
    assert_eq!(format!("{:.2}", r2.bill_amount), "1263.16");
    assert_eq!(format!("{:.2}", bill.total_amount()), "2400.00");
}

#[test]
fn malformed_text_behaves_like_zero() {
    let messy = calculate_bill(
        "abc",
        "12",
        vec![RoomReading::new("1", "R1", "xyz")],
        "January",
        2024,
    );
    let clean = calculate_bill(0.0, 12.0, vec![RoomReading::new("1", "R1", 0.0)], "January", 2024);
    assert_eq!(messy.rooms, clean.rooms);
    assert_eq!(messy.main_meter_kwh, clean.main_meter_kwh);
    assert_eq!(messy.rate_per_kwh, clean.rate_per_kwh);
    assert_eq!(messy.total_submeter_kwh, clean.total_submeter_kwh);
    assert_eq!(messy.missing_kwh, clean.missing_kwh);
}

#[test]
fn text_and_number_inputs_agree() {
    let as_text = AllocationInput {
        main_meter_kwh: "200".into(),
        rate_per_kwh: " 12.0 ".into(),
        rooms: vec![
            RoomReading::new("1", "Room 1", "90"),
            RoomReading::new("2", "Room 2", "100 kWh"),
        ],
        period: BillingPeriod::new("January", 2024),
    };
    assert_eq!(
        allocate(&as_text),
        allocate(&common::input(200.0, 12.0, &[90.0, 100.0]))
    );
}

#[test]
fn output_order_matches_input_order() {
    for (main, rate, kwh) in random_cases(31, 50) {
        let input = common::input(main, rate, &kwh);
        let a = allocate(&input);
        let in_ids: Vec<&str> = input.rooms.iter().map(|r| r.id.as_str()).collect();
        let out_ids: Vec<&str> = a.rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(in_ids, out_ids);
    }
}

#[test]
fn repeated_calls_give_identical_rooms() {
    let stamper = common::fixed_stamper();
    for (main, rate, kwh) in random_cases(47, 50) {
        let input = common::input(main, rate, &kwh);
        let first = calculate_bill_with(&input, &stamper);
        let second = calculate_bill_with(&input, &stamper);
        assert_eq!(first, second);

        let fresh_a = calculate_bill(main, rate, common::rooms(&kwh), "January", 2024);
        let fresh_b = calculate_bill(main, rate, common::rooms(&kwh), "January", 2024);
        assert_eq!(fresh_a.rooms, fresh_b.rooms);
    }
}

#[test]
fn concurrent_callers_share_nothing() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let bill = calculate_bill(
                    200.0 + f64::from(i),
                    12.0,
                    common::rooms(&[90.0, 100.0]),
                    "January",
                    2024,
                );
                (i, bill.missing_kwh)
            })
        })
        .collect();
    for h in handles {
        let (i, missing) = h.join().expect("thread should not panic");
        assert_eq!(missing, 10.0 + f64::from(i));
    }
}

use super::*;

fn room(tour_id: Uuid, quantity: i32) -> Room {
    Room {
        id: Uuid::new_v4(),
        tour_id,
        name: "Double room".to_string(),
        quantity,
    }
}

fn reserved(room_id: Uuid, quantity: i32, booking_status: BookingStatus) -> ReservedLine {
    ReservedLine { room_id, quantity, booking_status }
}

#[test]
fn test_window_for_three_day_tour() {
    let target = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    let (start, end) = occupancy_window(target, 3);

    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
    assert_eq!(end, target);
}

#[test]
fn test_window_for_one_day_tour_is_single_day() {
    let target = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    assert_eq!(occupancy_window(target, 1), (target, target));
}

#[test]
fn test_window_crosses_month_boundary() {
    let target = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let (start, _) = occupancy_window(target, 5);

    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 26).unwrap());
}

#[test]
fn test_booked_rooms_reduce_remaining() {
    // Tour duration 3, one room type with capacity 5, an existing booking of
    // 2 rooms departing the day before the target date: 3 remain.
    let tour_id = Uuid::new_v4();
    let rooms = vec![room(tour_id, 5)];

    let reserved_lines = vec![reserved(rooms[0].id, 2, BookingStatus::Active)];
    let remaining = compute_remaining(&rooms, &reserved_lines);

    assert_eq!(remaining[&rooms[0].id], 3);
}

#[test]
fn test_cancelled_bookings_do_not_reserve() {
    let tour_id = Uuid::new_v4();
    let rooms = vec![room(tour_id, 5)];

    let reserved_lines = vec![
        reserved(rooms[0].id, 2, BookingStatus::Active),
        reserved(rooms[0].id, 4, BookingStatus::Cancelled),
    ];
    let remaining = compute_remaining(&rooms, &reserved_lines);

    assert_eq!(remaining[&rooms[0].id], 3);
}

#[test]
fn test_line_for_unconfigured_room_is_ignored() {
    let tour_id = Uuid::new_v4();
    let rooms = vec![room(tour_id, 5)];

    let reserved_lines = vec![reserved(Uuid::new_v4(), 3, BookingStatus::Active)];
    let remaining = compute_remaining(&rooms, &reserved_lines);

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[&rooms[0].id], 5);
}

#[test]
fn test_remaining_reports_oversell_as_negative() {
    let tour_id = Uuid::new_v4();
    let rooms = vec![room(tour_id, 2)];

    let reserved_lines = vec![
        reserved(rooms[0].id, 2, BookingStatus::Active),
        reserved(rooms[0].id, 1, BookingStatus::Active),
    ];
    let remaining = compute_remaining(&rooms, &reserved_lines);

    assert_eq!(remaining[&rooms[0].id], -1);
}

#[test]
fn test_clamp_never_negative_never_above_capacity() {
    let tour_id = Uuid::new_v4();
    let rooms = vec![room(tour_id, 4), room(tour_id, 2)];

    let reserved_lines = vec![
        reserved(rooms[0].id, 1, BookingStatus::Active),
        reserved(rooms[1].id, 5, BookingStatus::Active),
    ];
    let clamped = clamp_non_negative(compute_remaining(&rooms, &reserved_lines));

    for r in &rooms {
        let n = clamped[&r.id];
        assert!(n >= 0);
        assert!(n <= r.quantity);
    }
    assert_eq!(clamped[&rooms[0].id], 3);
    assert_eq!(clamped[&rooms[1].id], 0);
}

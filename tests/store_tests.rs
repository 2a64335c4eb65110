use hotelbook::core::availability::AvailabilityEngine;
use hotelbook::core::ledger::Ledger;
use hotelbook::errors::{AppError, BookingStep, ErrorKind};
use hotelbook::models::{Reservation, RoomRestriction, User};
use hotelbook::store::memory::{FAIL_QUERY_DATE, FAIL_RESTRICTION_ROOM};
use hotelbook::models::RestrictionKind;
use hotelbook::store::{
    AvailabilityStore, MemoryStore, ReservationStore, RoomStore, SqliteStore, UserStore,
};

use std::sync::Arc;

mod common;
use common::date;

fn sqlite_with_rooms() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("in-memory db");
    store.migrate().expect("migrations");
    store.insert_room("General's Quarters").expect("room 1");
    store.insert_room("Major's Suite").expect("room 2");
    store
}

fn guest(room_id: i64, start: &str, end: &str) -> Reservation {
    let mut r = Reservation::draft(date(start), date(end));
    r.room_id = room_id;
    r.first_name = "Yusuf".into();
    r.last_name = "Grenada".into();
    r.email = "yg@yg.com".into();
    r.phone = "222-122-0122".into();
    r
}

/// Inclusive overlap rules, checked the same way against both stores.
fn check_overlap_rules<S: RoomStore + AvailabilityStore>(store: &S) {
    assert!(
        store
            .search_availability_by_room(1, date("2050-01-01"), date("2050-01-03"))
            .unwrap()
    );

    store
        .insert_restriction(&RoomRestriction::block(1, date("2050-01-02")))
        .unwrap();

    let busy = |s, e| {
        !store
            .search_availability_by_room(1, date(s), date(e))
            .unwrap()
    };

    // touching either end counts
    assert!(busy("2050-01-02", "2050-01-02"));
    assert!(busy("2049-12-30", "2050-01-02"));
    assert!(busy("2050-01-02", "2050-01-05"));
    assert!(!busy("2050-01-03", "2050-01-05"));
    assert!(!busy("2049-12-30", "2050-01-01"));

    // room 2 is untouched
    assert!(
        store
            .search_availability_by_room(2, date("2050-01-02"), date("2050-01-02"))
            .unwrap()
    );

    let free = store
        .search_availability_for_all_rooms(date("2050-01-01"), date("2050-01-03"))
        .unwrap();
    assert_eq!(free.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

    let free = store
        .search_availability_for_all_rooms(date("2050-01-04"), date("2050-01-05"))
        .unwrap();
    assert_eq!(free.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_overlap_rules_memory() {
    check_overlap_rules(&MemoryStore::with_default_rooms());
}

#[test]
fn test_overlap_rules_sqlite() {
    check_overlap_rules(&sqlite_with_rooms());
}

fn check_ledger_insert_restriction<S>(store: Arc<S>)
where
    S: ReservationStore + AvailabilityStore + 'static,
{
    let ledger = Ledger::new(store.clone());
    let engine = AvailabilityEngine::new(store.clone());

    let (res_id, first) = store
        .insert_reservation_with_restriction(&guest(1, "2050-03-01", "2050-03-02"))
        .unwrap();

    // a second row for the same reservation, stretching the stay
    let extra = RoomRestriction::for_reservation(res_id, 1, date("2050-03-03"), date("2050-03-05"));
    let id = ledger.insert_restriction(&extra).unwrap();
    assert!(id > first);

    let rows = ledger
        .restrictions_for_room(1, date("2050-03-04"), date("2050-03-04"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].reservation_id, Some(res_id));
    assert_eq!(rows[0].kind, RestrictionKind::Reservation);

    assert!(!engine.is_room_available(1, date("2050-03-05"), date("2050-03-07")).unwrap());
    assert!(engine.is_room_available(1, date("2050-03-06"), date("2050-03-07")).unwrap());
    assert_eq!(
        engine
            .available_rooms(date("2050-03-04"), date("2050-03-04"))
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect::<Vec<_>>(),
        vec![2]
    );
}

#[test]
fn test_ledger_insert_restriction_memory() {
    let store = Arc::new(MemoryStore::with_default_rooms());
    check_ledger_insert_restriction(store.clone());

    // store failures come back unchanged
    let ledger = Ledger::new(store);
    let err = ledger
        .insert_restriction(&RoomRestriction::block(FAIL_RESTRICTION_ROOM, date("2050-03-01")))
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn test_ledger_insert_restriction_sqlite() {
    check_ledger_insert_restriction(Arc::new(sqlite_with_rooms()));
}

#[test]
fn test_rooms_in_id_order() {
    let store = sqlite_with_rooms();
    let rooms = store.all_rooms().unwrap();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].id, 1);
    assert_eq!(rooms[0].room_name, "General's Quarters");
    assert_eq!(rooms[1].room_name, "Major's Suite");

    assert!(matches!(store.room_by_id(3), Err(AppError::NotFound(_))));
}

#[test]
fn test_booking_pair_is_written_together() {
    let store = sqlite_with_rooms();

    let (res_id, rr_id) = store
        .insert_reservation_with_restriction(&guest(1, "2050-01-01", "2050-01-03"))
        .unwrap();
    assert!(res_id > 0 && rr_id > 0);

    let rows = store
        .restrictions_for_room(1, date("2050-01-01"), date("2050-01-31"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].reservation_id, Some(res_id));
    assert_eq!(rows[0].start_date, date("2050-01-01"));
    assert_eq!(rows[0].end_date, date("2050-01-03"));
    assert!(!rows[0].is_block());

    let stored = store.reservation_by_id(res_id).unwrap();
    assert_eq!(stored.room_name, "General's Quarters");
    assert!(!stored.processed);
}

#[test]
fn test_booking_for_missing_room_leaves_nothing_behind() {
    let store = sqlite_with_rooms();

    let err = store
        .insert_reservation_with_restriction(&guest(99, "2050-01-01", "2050-01-03"))
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Booking {
            step: BookingStep::Reservation,
            ..
        }
    ));
    assert!(store.all_reservations().unwrap().is_empty());
}

#[test]
fn test_memory_restriction_failure_rolls_back_reservation() {
    let store = MemoryStore::with_default_rooms();

    let err = store
        .insert_reservation_with_restriction(&guest(
            FAIL_RESTRICTION_ROOM,
            "2050-01-01",
            "2050-01-03",
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Booking {
            step: BookingStep::Restriction,
            ..
        }
    ));
    assert!(store.all_reservations().unwrap().is_empty());
}

#[test]
fn test_memory_query_failure_date() {
    let store = MemoryStore::with_default_rooms();
    let day = date(FAIL_QUERY_DATE);

    assert!(store.search_availability_by_room(1, day, day).is_err());
    assert!(store.search_availability_for_all_rooms(day, day).is_err());
    assert!(
        store
            .search_availability_by_room(1, date("2060-01-02"), date("2060-01-02"))
            .is_ok()
    );
}

#[test]
fn test_listings_edit_process_delete() {
    let store = sqlite_with_rooms();

    let (late, _) = store
        .insert_reservation_with_restriction(&guest(2, "2050-03-01", "2050-03-02"))
        .unwrap();
    let (early, _) = store
        .insert_reservation_with_restriction(&guest(1, "2050-01-01", "2050-01-03"))
        .unwrap();

    let all = store.all_reservations().unwrap();
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![early, late]);
    assert_eq!(all[1].room_name, "Major's Suite");

    store.update_processed(early, true).unwrap();
    let fresh = store.new_reservations().unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].id, late);

    let mut edited = store.reservation_by_id(late).unwrap();
    edited.first_name = "Jane".into();
    edited.email = "jane@example.com".into();
    store.update_reservation(&edited).unwrap();
    let reloaded = store.reservation_by_id(late).unwrap();
    assert_eq!(reloaded.first_name, "Jane");
    assert_eq!(reloaded.email, "jane@example.com");
    assert_eq!(reloaded.start_date, date("2050-03-01"));

    store.delete_reservation(late).unwrap();
    assert!(matches!(
        store.reservation_by_id(late),
        Err(AppError::NotFound(_))
    ));
    assert!(
        store
            .search_availability_by_room(2, date("2050-03-01"), date("2050-03-02"))
            .unwrap()
    );
    assert!(matches!(
        store.delete_reservation(late),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_blocks_add_and_remove() {
    let stores: Vec<Box<dyn AvailabilityStore>> = vec![
        Box::new(sqlite_with_rooms()),
        Box::new(MemoryStore::with_default_rooms()),
    ];
    for store in stores {
        let id = store.insert_block(1, date("2050-05-05")).unwrap();
        let rows = store
            .restrictions_for_room(1, date("2050-05-01"), date("2050-05-31"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_block());
        assert_eq!(rows[0].start_date, rows[0].end_date);

        store.delete_block(id).unwrap();
        assert!(
            store
                .restrictions_for_room(1, date("2050-05-01"), date("2050-05-31"))
                .unwrap()
                .is_empty()
        );
        assert!(matches!(store.delete_block(id), Err(AppError::NotFound(_))));
    }
}

#[test]
fn test_users_by_email() {
    let now = chrono::Local::now().to_rfc3339();
    let user = User {
        id: 0,
        first_name: "Ada".into(),
        last_name: "Admin".into(),
        email: "admin@hotelbook.local".into(),
        password: "not-a-real-hash".into(),
        access_level: 3,
        created_at: now.clone(),
        updated_at: now,
    };

    let sqlite = sqlite_with_rooms();
    let memory = MemoryStore::new();
    for store in [&sqlite as &dyn UserStore, &memory as &dyn UserStore] {
        let id = store.insert_user(&user).unwrap();
        let found = store.user_by_email("admin@hotelbook.local").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(store.user_by_id(id).unwrap().email, user.email);
        assert!(store.user_by_email("nobody@hotelbook.local").unwrap().is_none());
        // email is unique
        assert!(store.insert_user(&user).is_err());
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let store = SqliteStore::in_memory().unwrap();
    let first = store.migrate().unwrap();
    assert!(!first.is_empty());
    assert!(store.migrate().unwrap().is_empty());
}

//! Integration tests for allocation writes and roll call.
//!
//! Covers the schedule conflict rule end to end:
//! - Overlapping blocking allocations are rejected
//! - Absent and excused allocations free the slot
//! - Touching windows are allowed
//! - Bulk allocation reports partial failures and skips ineligible students
//! - Concurrent writes for one student serialize on the student lock
//! - Moving an event re-checks its allocations

mod common;

use assert_matches::assert_matches;
use common::{
    active_class, deactivate, event, event_with, new_event, semester, student, window, workshop,
};
use rollcall_core::attendance::AttendanceStatus;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::error::RepoError;
use rollcall_db::models::allocation::{Allocation, ConflictCheck, CreateAllocation};
use rollcall_db::models::event::UpdateEvent;
use rollcall_db::repositories::{AllocationRepo, EventRepo, WorkshopRepo};
use sqlx::PgPool;

async fn allocate(pool: &PgPool, event_id: DbId, student_id: DbId) -> Allocation {
    AllocationRepo::create(
        pool,
        event_id,
        &CreateAllocation {
            student_id,
            status_id: None,
        },
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Conflict checks on create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_new_allocation_defaults_to_planned(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let e = event(&pool, "Choir", window(4, 9, 10)).await;

    let a = allocate(&pool, e.id, s.id).await;
    assert_eq!(a.status_id, AttendanceStatus::Planned.id());
    assert_eq!(a.event_id, e.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_overlapping_allocation_rejected(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let choir = event(&pool, "Choir", window(4, 9, 11)).await;
    let chess = event(&pool, "Chess", window(4, 10, 12)).await;
    allocate(&pool, choir.id, s.id).await;

    let err = AllocationRepo::create(
        &pool,
        chess.id,
        &CreateAllocation {
            student_id: s.id,
            status_id: None,
        },
    )
    .await
    .unwrap_err();

    match err {
        RepoError::Core(CoreError::ScheduleConflict(conflict)) => {
            assert_eq!(conflict.total, 1);
            assert!(conflict.events[0].starts_with("Choir"));
        }
        other => panic!("expected schedule conflict, got {other:?}"),
    }
    assert_eq!(AllocationRepo::list_for_event(&pool, chess.id).await.unwrap().len(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_touching_windows_do_not_conflict(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let first = event(&pool, "First", window(4, 8, 10)).await;
    let second = event(&pool, "Second", window(4, 10, 12)).await;

    allocate(&pool, first.id, s.id).await;
    allocate(&pool, second.id, s.id).await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_absent_allocation_frees_slot(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let choir = event(&pool, "Choir", window(4, 9, 11)).await;
    let chess = event(&pool, "Chess", window(4, 9, 11)).await;

    let a = allocate(&pool, choir.id, s.id).await;
    AllocationRepo::update_status(&pool, a.id, AttendanceStatus::Absent, ConflictCheck::Enforce)
        .await
        .unwrap()
        .unwrap();

    let b = allocate(&pool, chess.id, s.id).await;

    // Flipping the first back to Present now clashes with the second.
    let result =
        AllocationRepo::update_status(&pool, a.id, AttendanceStatus::Present, ConflictCheck::Enforce)
            .await;
    assert_matches!(result, Err(RepoError::Core(CoreError::ScheduleConflict(_))));

    // Excusing the second makes room again.
    AllocationRepo::update_status(&pool, b.id, AttendanceStatus::Excused, ConflictCheck::Enforce)
        .await
        .unwrap();
    let a = AllocationRepo::update_status(&pool, a.id, AttendanceStatus::Present, ConflictCheck::Enforce)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a.status_id, AttendanceStatus::Present.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_blocking_allocation_skips_check(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let choir = event(&pool, "Choir", window(4, 9, 11)).await;
    let chess = event(&pool, "Chess", window(4, 9, 11)).await;
    allocate(&pool, choir.id, s.id).await;

    let excused = AllocationRepo::create(
        &pool,
        chess.id,
        &CreateAllocation {
            student_id: s.id,
            status_id: Some(AttendanceStatus::Excused.id()),
        },
    )
    .await
    .unwrap();
    assert_eq!(excused.status_id, 4);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_allocation_to_missing_entities(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let e = event(&pool, "Choir", window(4, 9, 10)).await;

    let missing_event = AllocationRepo::create(
        &pool,
        999_999,
        &CreateAllocation {
            student_id: s.id,
            status_id: None,
        },
    )
    .await;
    assert_matches!(
        missing_event,
        Err(RepoError::Core(CoreError::NotFound { entity: "Event", .. }))
    );

    let missing_student = AllocationRepo::create(
        &pool,
        e.id,
        &CreateAllocation {
            student_id: 999_999,
            status_id: None,
        },
    )
    .await;
    assert_matches!(
        missing_student,
        Err(RepoError::Core(CoreError::NotFound { entity: "Student", .. }))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_missing_allocation_returns_none(pool: PgPool) {
    let result =
        AllocationRepo::update_status(&pool, 999_999, AttendanceStatus::Present, ConflictCheck::Enforce)
            .await
            .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Bulk allocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_allocate_reports_partial_failures(pool: PgPool) {
    let c = active_class(&pool).await;
    let ana = student(&pool, c.id, "Ana").await;
    let bruno = student(&pool, c.id, "Bruno").await;
    let carla = student(&pool, c.id, "Carla").await;
    let choir = event(&pool, "Choir", window(4, 9, 11)).await;
    let chess = event(&pool, "Chess", window(4, 10, 12)).await;

    allocate(&pool, choir.id, bruno.id).await;
    allocate(&pool, chess.id, carla.id).await;

    let result = AllocationRepo::bulk_allocate(
        &pool,
        chess.id,
        &[ana.id, bruno.id, carla.id, ana.id, 999_999],
    )
    .await
    .unwrap();

    assert_eq!(result.created.len(), 1);
    assert_eq!(result.created[0].student_id, ana.id);

    let failed: Vec<DbId> = result.failed.iter().map(|f| f.student_id).collect();
    assert_eq!(failed, vec![bruno.id, carla.id, 999_999]);
    assert!(result.failed[0].error.starts_with("Schedule conflict with: Choir"));
    assert!(result.failed[1].error.ends_with("already allocated to this event"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_allocate_unknown_event(pool: PgPool) {
    let result = AllocationRepo::bulk_allocate(&pool, 999_999, &[1]).await;
    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::NotFound { entity: "Event", .. }))
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_allocate_skips_ineligible_students(pool: PgPool) {
    let c = active_class(&pool).await;
    let member = student(&pool, c.id, "Ana").await;
    let outsider = student(&pool, c.id, "Bruno").await;

    let old = semester(&pool, "2023.2", true).await;
    let old_class = common::class(&pool, old.id, "6A").await;
    let veteran = student(&pool, old_class.id, "Carla").await;

    let robotics = workshop(&pool, "Robotics", "Lab 1").await;
    WorkshopRepo::set_students(&pool, robotics.id, &[member.id, veteran.id])
        .await
        .unwrap();
    deactivate(&pool, old.id).await;

    let e = event_with(
        &pool,
        new_event("Robotics club", None, Some(vec![robotics.id])),
        window(4, 9, 10),
    )
    .await;

    let result =
        AllocationRepo::bulk_allocate(&pool, e.id, &[member.id, outsider.id, veteran.id])
            .await
            .unwrap();

    assert_eq!(result.created.len(), 1);
    assert_eq!(result.created[0].student_id, member.id);

    let failed: Vec<DbId> = result.failed.iter().map(|f| f.student_id).collect();
    assert_eq!(failed, vec![outsider.id, veteran.id]);
    assert!(result.failed[0].error.contains("workshops"));
    assert!(result.failed[1].error.contains("active semester"));

    let allocated = AllocationRepo::list_for_event(&pool, e.id).await.unwrap();
    assert_eq!(allocated.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_overlapping_creates_commit_once(pool: PgPool) {
    let c = active_class(&pool).await;
    let student_id = student(&pool, c.id, "Ana").await.id;

    for day in 11..=16 {
        let choir = event(&pool, "Choir", window(day, 9, 11)).await;
        let chess = event(&pool, "Chess", window(day, 10, 12)).await;

        let spawn_create = |event_id: DbId| {
            let pool = pool.clone();
            tokio::spawn(async move {
                AllocationRepo::create(
                    &pool,
                    event_id,
                    &CreateAllocation {
                        student_id,
                        status_id: None,
                    },
                )
                .await
            })
        };
        let first = spawn_create(choir.id);
        let second = spawn_create(chess.id);
        let results = [first.await.unwrap(), second.await.unwrap()];

        let committed = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(committed, 1, "exactly one allocation on day {day}");
        let rejected = results.into_iter().find_map(Result::err).unwrap();
        assert_matches!(rejected, RepoError::Core(CoreError::ScheduleConflict(_)));
    }
}

// ---------------------------------------------------------------------------
// Roll call
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_roll_call_marks_present_and_absent(pool: PgPool) {
    let c = active_class(&pool).await;
    let ana = student(&pool, c.id, "Ana").await;
    let bruno = student(&pool, c.id, "Bruno").await;
    let carla = student(&pool, c.id, "Carla").await;
    let e = event(&pool, "Choir", window(4, 9, 10)).await;

    allocate(&pool, e.id, ana.id).await;
    allocate(&pool, e.id, bruno.id).await;
    let excused = allocate(&pool, e.id, carla.id).await;
    AllocationRepo::update_status(&pool, excused.id, AttendanceStatus::Excused, ConflictCheck::Enforce)
        .await
        .unwrap();

    let result = AllocationRepo::roll_call(&pool, e.id, &[ana.id]).await.unwrap();
    assert_eq!(result.present, 1);
    assert_eq!(result.absent, 1);

    let rows = AllocationRepo::list_for_event(&pool, e.id).await.unwrap();
    let statuses: Vec<(&str, i16)> = rows
        .iter()
        .map(|r| (r.student_name.as_str(), r.status_id))
        .collect();
    assert_eq!(statuses, vec![("Ana", 2), ("Bruno", 3), ("Carla", 4)]);

    let attendees = AllocationRepo::list_attendees(&pool, e.id).await.unwrap();
    assert_eq!(attendees.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roll_call_rejects_students_not_on_roll(pool: PgPool) {
    let c = active_class(&pool).await;
    let ana = student(&pool, c.id, "Ana").await;
    let outsider = student(&pool, c.id, "Outsider").await;
    let e = event(&pool, "Choir", window(4, 9, 10)).await;
    let a = allocate(&pool, e.id, ana.id).await;

    let result = AllocationRepo::roll_call(&pool, e.id, &[ana.id, outsider.id]).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));

    // Nothing was written.
    let a = AllocationRepo::find_by_id(&pool, a.id).await.unwrap().unwrap();
    assert_eq!(a.status_id, AttendanceStatus::Planned.id());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_roll_call_on_cancelled_event_rejected(pool: PgPool) {
    let e = event(&pool, "Choir", window(4, 9, 10)).await;
    EventRepo::toggle_cancelled(&pool, e.id).await.unwrap();

    let result = AllocationRepo::roll_call(&pool, e.id, &[]).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Event edits
// ---------------------------------------------------------------------------

fn move_to(starts_at: chrono::DateTime<chrono::Utc>, ends_at: chrono::DateTime<chrono::Utc>) -> UpdateEvent {
    UpdateEvent {
        title: None,
        kind_id: None,
        starts_at: Some(starts_at),
        ends_at: Some(ends_at),
        location: None,
        weight: None,
        workshop_ids: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_moving_event_onto_booked_slot_rejected(pool: PgPool) {
    let c = active_class(&pool).await;
    let s = student(&pool, c.id, "Ana").await;
    let choir = event(&pool, "Choir", window(4, 9, 10)).await;
    let chess = event(&pool, "Chess", window(4, 14, 15)).await;
    allocate(&pool, choir.id, s.id).await;
    allocate(&pool, chess.id, s.id).await;

    let w = window(4, 9, 11);
    let result = EventRepo::update(&pool, chess.id, &move_to(w.starts_at, w.ends_at)).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::ScheduleConflict(_))));

    let unchanged = EventRepo::find_by_id(&pool, chess.id).await.unwrap().unwrap();
    assert_eq!(unchanged.starts_at, window(4, 14, 15).starts_at);

    // A free slot is fine.
    let w = window(5, 9, 11);
    let moved = EventRepo::update(&pool, chess.id, &move_to(w.starts_at, w.ends_at))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.starts_at, w.starts_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_inverted_event_window_rejected(pool: PgPool) {
    let e = event(&pool, "Choir", window(4, 9, 10)).await;
    let w = window(4, 9, 10);
    let result = EventRepo::update(&pool, e.id, &move_to(w.ends_at, w.starts_at)).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
}

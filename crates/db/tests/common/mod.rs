//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use rollcall_core::conflict::TimeWindow;
use rollcall_core::types::{DbId, Timestamp};
use rollcall_db::models::class::{Class, CreateClass};
use rollcall_db::models::event::{CreateEvent, Event};
use rollcall_db::models::semester::{CreateSemester, Semester, UpdateSemester};
use rollcall_db::models::student::{CreateStudent, Student};
use rollcall_db::models::workshop::{CreateWorkshop, Workshop};
use rollcall_db::repositories::{ClassRepo, EventRepo, SemesterRepo, StudentRepo, WorkshopRepo};
use sqlx::PgPool;

pub fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

pub fn window(day: u32, start_hour: u32, end_hour: u32) -> TimeWindow {
    TimeWindow::new(at(day, start_hour), at(day, end_hour)).unwrap()
}

pub async fn semester(pool: &PgPool, name: &str, is_active: bool) -> Semester {
    SemesterRepo::create(
        pool,
        &CreateSemester {
            name: name.to_string(),
            is_active: Some(is_active),
        },
    )
    .await
    .unwrap()
}

/// Mark a semester inactive after its classes and students were created.
pub async fn deactivate(pool: &PgPool, semester_id: DbId) {
    SemesterRepo::update(
        pool,
        semester_id,
        &UpdateSemester {
            name: None,
            is_active: Some(false),
        },
    )
    .await
    .unwrap()
    .unwrap();
}

pub async fn class(pool: &PgPool, semester_id: DbId, name: &str) -> Class {
    ClassRepo::create(
        pool,
        &CreateClass {
            semester_id,
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn student(pool: &PgPool, class_id: DbId, name: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            class_id,
            name: name.to_string(),
            workshop_ids: None,
        },
    )
    .await
    .unwrap()
}

pub async fn workshop(pool: &PgPool, name: &str, location: &str) -> Workshop {
    WorkshopRepo::create(
        pool,
        &CreateWorkshop {
            name: name.to_string(),
            default_location: location.to_string(),
            student_ids: None,
        },
    )
    .await
    .unwrap()
}

pub fn new_event(title: &str, weight: Option<i32>, workshop_ids: Option<Vec<DbId>>) -> CreateEvent {
    CreateEvent {
        title: title.to_string(),
        kind_id: 2,
        date: at(4, 0).date_naive(),
        start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        cadence: None,
        interval_days: None,
        recurrence_end: None,
        location: None,
        weight,
        workshop_ids,
    }
}

/// Create a single event occupying `w`.
pub async fn event(pool: &PgPool, title: &str, w: TimeWindow) -> Event {
    event_with(pool, new_event(title, None, None), w).await
}

pub async fn event_with(pool: &PgPool, input: CreateEvent, w: TimeWindow) -> Event {
    EventRepo::create_series(pool, &input, &[w])
        .await
        .unwrap()
        .remove(0)
}

/// An active semester with one class, ready for students.
pub async fn active_class(pool: &PgPool) -> Class {
    let s = semester(pool, "2024.1", true).await;
    class(pool, s.id, "7A").await
}

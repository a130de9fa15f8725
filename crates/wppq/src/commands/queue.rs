//! Queue commands
//!
//! Listing, pushing callers, reordering and attending entries.

use chrono::Utc;
use serde::Serialize;
use wppq_core::{
    metrics::{self, AttendanceMetrics},
    queue::sort_active,
    store,
    Direction, EntryId, Error, MetricsStore, Outcome, Phone, PhoneId, PhoneStore, QueueEntry,
    Result,
};

use super::{truncate, App};

/// A waiting entry with the phone it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueRow {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub phone_name: String,
    pub display_number: String,
    pub wait_minutes: f64,
}

impl QueueRow {
    fn new(entry: QueueEntry, phone: &Phone, now: chrono::DateTime<Utc>) -> Self {
        Self {
            wait_minutes: entry.wait_minutes(now),
            phone_name: phone.name.clone(),
            display_number: phone.display_number(),
            entry,
        }
    }
}

/// An attended entry and the phone's updated counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attendance {
    pub entry: QueueEntry,
    pub wait_minutes: f64,
    pub metrics: AttendanceMetrics,
}

/// Waiting entries of one phone, or of every online phone of the account
pub async fn list<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: Option<&PhoneId>,
) -> Result<Vec<QueueRow>> {
    let now = Utc::now();

    if let Some(phone_id) = phone_id {
        let entries = app.engine().list(phone_id, app.account()).await?;
        let phone = app
            .store()
            .get_phone(phone_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Phone {phone_id} not found")))?;
        return Ok(entries
            .into_iter()
            .map(|entry| QueueRow::new(entry, &phone, now))
            .collect());
    }

    let mut rows = Vec::new();
    for phone in app.registry().list(app.account()).await? {
        if !phone.online {
            continue;
        }
        let entries = app.store().find_active_entries(&phone.id).await?;
        rows.extend(
            sort_active(&entries)
                .into_iter()
                .map(|entry| QueueRow::new(entry, &phone, now)),
        );
    }
    rows.sort_by(|a, b| {
        (a.entry.position, a.entry.created_at, &a.entry.id).cmp(&(
            b.entry.position,
            b.entry.created_at,
            &b.entry.id,
        ))
    });
    Ok(rows)
}

pub async fn push<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
) -> Result<QueueEntry> {
    app.engine().push(phone_id, app.account()).await
}

/// Move an entry; `direction` is one of `top`, `up`, `down`, `bottom`
pub async fn move_entry<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
    entry_id: &EntryId,
    direction: &str,
) -> Result<Outcome<Vec<QueueEntry>>> {
    let direction: Direction = direction
        .parse()
        .map_err(|_| Error::validation(format!("Unknown direction '{direction}'")))?;
    app.engine()
        .reorder(entry_id, phone_id, direction, app.account())
        .await
}

/// Attend an entry and record its wait in the phone's metrics
pub async fn attend<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
    entry_id: &EntryId,
) -> Result<Attendance> {
    let entry = app.engine().attend(entry_id, phone_id, app.account()).await?;
    let now = store::now();
    let wait_minutes = entry.wait_minutes(now);
    let metrics = metrics::record_attendance(app.store(), phone_id, wait_minutes, now).await?;
    Ok(Attendance {
        entry,
        wait_minutes,
        metrics,
    })
}

pub async fn repair<S: PhoneStore + MetricsStore + ?Sized>(
    app: &App<S>,
    phone_id: &PhoneId,
) -> Result<Outcome<Vec<QueueEntry>>> {
    app.engine().repair(phone_id, app.account()).await
}

pub fn render_rows(rows: &[QueueRow]) -> String {
    if rows.is_empty() {
        return "Queue is empty".to_string();
    }

    let mut out = format!(
        "{:>4}  {:<8} {:<18} {:<20} {:>9}\n",
        "POS", "ENTRY", "PHONE", "NAME", "WAIT(min)"
    );
    for row in rows {
        out.push_str(&format!(
            "{:>4}  {:<8} {:<18} {:<20} {:>9.1}\n",
            row.entry.position,
            truncate(row.entry.id.as_str(), 8),
            truncate(&row.display_number, 18),
            truncate(&row.phone_name, 20),
            row.wait_minutes,
        ));
    }
    out.trim_end().to_string()
}

pub fn render_entry(entry: &QueueEntry) -> String {
    format!(
        "Entry {} queued on phone {} at position {}",
        entry.id, entry.phone_id, entry.position
    )
}

pub fn render_outcome(outcome: &Outcome<Vec<QueueEntry>>) -> String {
    match outcome {
        Outcome::NoOp => "Nothing to do".to_string(),
        Outcome::Applied(entries) => entries
            .iter()
            .map(|e| format!("{:>4}  {}", e.position, e.id))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_attendance(attendance: &Attendance) -> String {
    format!(
        "Attended entry {} after {:.1} min (today: {}, total: {}, average wait: {:.1} min)",
        attendance.entry.id,
        attendance.wait_minutes,
        attendance.metrics.today_attendances,
        attendance.metrics.total_attendances,
        attendance.metrics.average_wait_minutes,
    )
}

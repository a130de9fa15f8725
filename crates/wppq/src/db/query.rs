//! Row parsing and column conversions shared by the store operations

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use wppq_core::{
    AccountId, AttendanceMetrics, EntryId, Error, Phone, PhoneId, QueueEntry, Result,
};

pub(crate) const PHONE_COLUMNS: &str = "id, account_id, number, name, online, created_at, \
     last_online_change, last_online, last_offline, deleted";

pub(crate) const ENTRY_COLUMNS: &str = "id, phone_id, account_id, position, active, created_at";

pub(crate) const ATTENDANCE_COLUMNS: &str = "phone_id, today_attendances, total_attendances, \
     average_wait_minutes, last_attendance, updated_at";

/// Wrap a driver error with what we were doing
pub(crate) fn db_error(action: &str, e: &sqlx::Error) -> Error {
    Error::collaborator(format!("Failed to {action}: {e}"))
}

/// Row id behind a string identifier
///
/// Identifiers that are not integers can never match a row.
pub(crate) fn row_id(id: &str) -> Option<i64> {
    id.parse().ok()
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::collaborator(format!("Invalid timestamp in {column}: {millis}")))
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| Error::collaborator(format!("Failed to read {column}: {e}")))
}

fn get_time(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    from_millis(column, get(row, column)?)
}

fn get_optional_time(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>> {
    get::<Option<i64>>(row, column)?
        .map(|millis| from_millis(column, millis))
        .transpose()
}

fn get_u32(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: i64 = get(row, column)?;
    u32::try_from(value)
        .map_err(|_| Error::collaborator(format!("Value out of range in {column}: {value}")))
}

/// Parse a `phones` row
pub(crate) fn parse_phone_row(row: &SqliteRow) -> Result<Phone> {
    Ok(Phone {
        id: PhoneId::new(get::<i64>(row, "id")?.to_string()),
        account_id: AccountId::new(get::<String>(row, "account_id")?),
        number: get(row, "number")?,
        name: get(row, "name")?,
        online: get(row, "online")?,
        created_at: get_time(row, "created_at")?,
        last_online_change: get_optional_time(row, "last_online_change")?,
        last_online: get_optional_time(row, "last_online")?,
        last_offline: get_optional_time(row, "last_offline")?,
        deleted: get(row, "deleted")?,
    })
}

/// Parse a `queue_entries` row
pub(crate) fn parse_entry_row(row: &SqliteRow) -> Result<QueueEntry> {
    Ok(QueueEntry {
        id: EntryId::new(get::<i64>(row, "id")?.to_string()),
        phone_id: PhoneId::new(get::<i64>(row, "phone_id")?.to_string()),
        account_id: AccountId::new(get::<String>(row, "account_id")?),
        position: get_u32(row, "position")?,
        active: get(row, "active")?,
        created_at: get_time(row, "created_at")?,
    })
}

/// Parse an `attendance_metrics` row
pub(crate) fn parse_attendance_row(row: &SqliteRow) -> Result<AttendanceMetrics> {
    Ok(AttendanceMetrics {
        phone_id: PhoneId::new(get::<i64>(row, "phone_id")?.to_string()),
        today_attendances: get_u32(row, "today_attendances")?,
        total_attendances: get_u32(row, "total_attendances")?,
        average_wait_minutes: get(row, "average_wait_minutes")?,
        last_attendance: get_optional_time(row, "last_attendance")?,
        updated_at: get_time(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_rejects_foreign_ids() {
        assert_eq!(row_id("42"), Some(42));
        assert_eq!(row_id("p-1"), None);
        assert_eq!(row_id(""), None);
    }

    #[test]
    fn test_millis_round_trip_keeps_precision() -> Result<()> {
        let now = Utc::now();
        let back = from_millis("created_at", to_millis(now))?;
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
        Ok(())
    }
}

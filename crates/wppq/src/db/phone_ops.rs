//! Phone registry and attendance metrics operations

use wppq_core::{
    store, AccountId, AttendanceMetrics, Error, MetricsStore, NewPhone, Phone, PhoneId, PhoneStore,
    Result,
};

use super::{
    query::{
        db_error, parse_attendance_row, parse_phone_row, row_id, to_millis, ATTENDANCE_COLUMNS,
        PHONE_COLUMNS,
    },
    SqliteStore,
};

#[async_trait::async_trait]
impl PhoneStore for SqliteStore {
    async fn create_phone(&self, phone: NewPhone) -> Result<Phone> {
        let now = store::now();
        let id = sqlx::query(
            "INSERT INTO phones (account_id, number, name, online, created_at, deleted)
             VALUES (?, ?, ?, 0, ?, 0)",
        )
        .bind(phone.account_id.as_str())
        .bind(&phone.number)
        .bind(&phone.name)
        .bind(to_millis(now))
        .execute(&self.pool)
        .await
        .map(|result| result.last_insert_rowid())
        .map_err(|e| db_error("create phone", &e))?;

        Ok(Phone {
            id: PhoneId::new(id.to_string()),
            account_id: phone.account_id,
            number: phone.number,
            name: phone.name,
            online: false,
            created_at: now,
            last_online_change: None,
            last_online: None,
            last_offline: None,
            deleted: false,
        })
    }

    async fn find_phone_by_number(&self, number: &str) -> Result<Option<Phone>> {
        sqlx::query(&format!(
            "SELECT {PHONE_COLUMNS} FROM phones WHERE number = ? AND deleted = 0 LIMIT 1"
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query phone by number", &e))
        .and_then(|row| row.as_ref().map(parse_phone_row).transpose())
    }

    async fn list_phones(&self, account: &AccountId) -> Result<Vec<Phone>> {
        sqlx::query(&format!(
            "SELECT {PHONE_COLUMNS} FROM phones
             WHERE account_id = ? AND deleted = 0 ORDER BY created_at, id"
        ))
        .bind(account.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list phones", &e))?
        .iter()
        .map(parse_phone_row)
        .collect()
    }

    async fn update_phone(&self, phone: &Phone) -> Result<()> {
        let id = row_id(phone.id.as_str())
            .ok_or_else(|| Error::not_found(format!("Phone {} not found", phone.id)))?;

        let affected = sqlx::query(
            "UPDATE phones SET number = ?, name = ?, online = ?, last_online_change = ?,
                 last_online = ?, last_offline = ?, deleted = ?
             WHERE id = ?",
        )
        .bind(&phone.number)
        .bind(&phone.name)
        .bind(phone.online)
        .bind(phone.last_online_change.map(to_millis))
        .bind(phone.last_online.map(to_millis))
        .bind(phone.last_offline.map(to_millis))
        .bind(phone.deleted)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update phone", &e))?
        .rows_affected();

        if affected == 0 {
            return Err(Error::not_found(format!("Phone {} not found", phone.id)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MetricsStore for SqliteStore {
    async fn get_attendance(&self, phone_id: &PhoneId) -> Result<Option<AttendanceMetrics>> {
        let Some(id) = row_id(phone_id.as_str()) else {
            return Ok(None);
        };
        sqlx::query(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_metrics WHERE phone_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("query attendance metrics", &e))
        .and_then(|row| row.as_ref().map(parse_attendance_row).transpose())
    }

    async fn put_attendance(&self, metrics: &AttendanceMetrics) -> Result<()> {
        let id = row_id(metrics.phone_id.as_str())
            .ok_or_else(|| Error::not_found(format!("Phone {} not found", metrics.phone_id)))?;

        sqlx::query(
            "INSERT INTO attendance_metrics
                 (phone_id, today_attendances, total_attendances, average_wait_minutes,
                  last_attendance, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(phone_id) DO UPDATE SET
                 today_attendances = excluded.today_attendances,
                 total_attendances = excluded.total_attendances,
                 average_wait_minutes = excluded.average_wait_minutes,
                 last_attendance = excluded.last_attendance,
                 updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(i64::from(metrics.today_attendances))
        .bind(i64::from(metrics.total_attendances))
        .bind(metrics.average_wait_minutes)
        .bind(metrics.last_attendance.map(to_millis))
        .bind(to_millis(metrics.updated_at))
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| db_error("save attendance metrics", &e))
    }
}

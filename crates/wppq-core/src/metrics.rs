//! Attendance and dashboard metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    identity::AccountId,
    phone::PhoneId,
    queue::QueueEntry,
    store::{MetricsStore, PhoneStore},
    Result,
};

/// Running attendance counters for one phone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceMetrics {
    pub phone_id: PhoneId,
    /// Attendances since the start of the UTC day of `last_attendance`
    pub today_attendances: u32,
    pub total_attendances: u32,
    /// Running mean, in minutes
    pub average_wait_minutes: f64,
    pub last_attendance: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceMetrics {
    /// Counters after the first attendance of a phone
    #[must_use]
    pub fn first(phone_id: PhoneId, wait_minutes: f64, now: DateTime<Utc>) -> Self {
        Self {
            phone_id,
            today_attendances: 1,
            total_attendances: 1,
            average_wait_minutes: wait_minutes,
            last_attendance: Some(now),
            updated_at: now,
        }
    }

    /// Fold one more attendance into the counters
    #[must_use]
    pub fn record(self, wait_minutes: f64, now: DateTime<Utc>) -> Self {
        let today_attendances = if self
            .last_attendance
            .is_some_and(|last| last >= start_of_day(now))
        {
            self.today_attendances.saturating_add(1)
        } else {
            1
        };

        let total = f64::from(self.total_attendances);
        let total_attendances = self.total_attendances.saturating_add(1);
        let average_wait_minutes =
            self.average_wait_minutes.mul_add(total, wait_minutes) / f64::from(total_attendances);

        Self {
            today_attendances,
            total_attendances,
            average_wait_minutes,
            last_attendance: Some(now),
            updated_at: now,
            ..self
        }
    }

    /// Attendances today as seen from `now`
    #[must_use]
    pub fn today_as_of(&self, now: DateTime<Utc>) -> u32 {
        if self
            .last_attendance
            .is_some_and(|last| last >= start_of_day(now))
        {
            self.today_attendances
        } else {
            0
        }
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}

/// Account-wide dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_phones: usize,
    pub online_phones: usize,
    /// Active entries on online phones
    pub waiting: usize,
    /// Mean current wait of `waiting` entries, 0 when none
    pub average_wait_minutes: f64,
    pub today_attendances: u32,
    /// Most recent online/offline transition
    pub last_connection: Option<DateTime<Utc>>,
}

/// Record one attendance for a phone
///
/// # Errors
///
/// Returns an error if the store fails
pub async fn record_attendance<S: MetricsStore + ?Sized>(
    store: &S,
    phone_id: &PhoneId,
    wait_minutes: f64,
    now: DateTime<Utc>,
) -> Result<AttendanceMetrics> {
    let metrics = match store.get_attendance(phone_id).await? {
        Some(current) => current.record(wait_minutes, now),
        None => AttendanceMetrics::first(phone_id.clone(), wait_minutes, now),
    };
    store.put_attendance(&metrics).await?;
    debug!(phone = %phone_id, total = metrics.total_attendances, "Recorded attendance");
    Ok(metrics)
}

/// Compute the dashboard for an account
///
/// # Errors
///
/// Returns an error if the store fails
#[allow(clippy::cast_precision_loss)]
pub async fn dashboard<S: PhoneStore + MetricsStore + ?Sized>(
    store: &S,
    account: &AccountId,
    now: DateTime<Utc>,
) -> Result<DashboardMetrics> {
    let phones = store.list_phones(account).await?;

    let mut waiting: Vec<QueueEntry> = Vec::new();
    let mut today_attendances = 0u32;
    for phone in &phones {
        if phone.online {
            waiting.extend(store.find_active_entries(&phone.id).await?);
        }
        if let Some(metrics) = store.get_attendance(&phone.id).await? {
            today_attendances = today_attendances.saturating_add(metrics.today_as_of(now));
        }
    }

    let average_wait_minutes = if waiting.is_empty() {
        0.0
    } else {
        waiting.iter().map(|e| e.wait_minutes(now)).sum::<f64>() / waiting.len() as f64
    };

    Ok(DashboardMetrics {
        total_phones: phones.len(),
        online_phones: phones.iter().filter(|p| p.online).count(),
        waiting: waiting.len(),
        average_wait_minutes,
        today_attendances,
        last_connection: phones.iter().filter_map(|p| p.last_online_change).max(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, hour, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    #[test]
    fn test_running_average() {
        let metrics = AttendanceMetrics::first(PhoneId::new("p"), 4.0, at(9));
        let metrics = metrics.record(8.0, at(10));
        assert_eq!(metrics.total_attendances, 2);
        assert!((metrics.average_wait_minutes - 6.0).abs() < f64::EPSILON);

        let metrics = metrics.record(0.0, at(11));
        assert!((metrics.average_wait_minutes - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_today_counter_resets_on_new_day() {
        let metrics = AttendanceMetrics::first(PhoneId::new("p"), 1.0, at(9));
        let metrics = metrics.record(1.0, at(10));
        assert_eq!(metrics.today_attendances, 2);

        let tomorrow = at(9) + Duration::days(1);
        assert_eq!(metrics.today_as_of(tomorrow), 0);

        let metrics = metrics.record(1.0, tomorrow);
        assert_eq!(metrics.today_attendances, 1);
        assert_eq!(metrics.total_attendances, 3);
    }
}

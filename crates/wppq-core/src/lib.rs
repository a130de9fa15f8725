//! wppq-core - Queue ordering for WhatsApp phone lines
//!
//! This crate provides:
//! - Phone line and queue entry types
//! - The pure reordering planner
//! - The queue ordering engine and phone registry
//! - Attendance and dashboard metrics
//! - Storage traits and an in-memory store

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod identity;
pub mod memory;
pub mod metrics;
pub mod phone;
pub mod queue;
pub mod registry;
pub mod store;

pub use engine::{EngineOptions, Outcome, QueueEngine};
pub use error::{Error, Result};
pub use identity::{AccountId, IdentityProvider, StaticIdentity};
pub use memory::MemoryStore;
pub use metrics::{AttendanceMetrics, DashboardMetrics};
pub use phone::{format_number, NewPhone, Phone, PhoneId};
pub use queue::{Direction, EntryId, NewEntry, PositionChange, QueueEntry};
pub use registry::{OnlineChange, PhoneRegistry};
pub use store::{MetricsStore, PhoneStore, QueueStore};

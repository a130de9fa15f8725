//! wppq - Waiting queues for WhatsApp phone lines
//!
//! Register phone lines, bring them online, and keep each line's queue of
//! waiting callers in order. Backed by a local `SQLite` database.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod identity;
pub mod logging;

//! # taskdesk
//!
//! Assign tasks to employees, track their status and time, and score
//! employees on how they handle high-priority work.
//!
//! All state lives in three JSON collections (`users.json`,
//! `employees.json`, `tasks.json`) that are loaded and rewritten whole on
//! every change. The [`storage::Storage`] trait hides where they live, so
//! tests can run against [`storage::MemoryStorage`].
//!
//! ## Layers
//!
//! *   [`storage`]: whole-collection load and save.
//! *   [`tasks`]: assignment, status, time and reason updates.
//! *   [`auth`]: login lookup and salted password hashes.
//! *   [`performance`]: per-employee counters, scores and leaderboard.
//! *   [`commands`]: the CLI views built on the layers above.
//!
//! ## Scoring
//!
//! Every employee starts at 100. Each high-priority task that is not done
//! costs 10 points, and so does each done high-priority task whose
//! deadline has passed.

pub mod auth;
pub mod commands;
pub mod error;
pub mod models;
pub mod performance;
pub mod storage;
pub mod tasks;

pub use error::{Error, Result};

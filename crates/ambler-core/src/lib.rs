//! ambler-core
//!
//! Core building blocks for the Ambler backfill runtime.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task_type, envelope, outcome, attempt）
//! - **queue**: Queue port + InMemoryQueue（delayed scheduling, at-most-once,
//!   bounded retention）
//! - **typed**: 型付き Task API（Task trait, Handler trait, TypedRegistry,
//!   payload codec）
//! - **runtime**: envelope を handler にディスパッチ
//! - **worker**: lease → execute → ack/fail ループ（watch による shutdown）
//! - **backfill**: the walker itself - feed port, BackfillTask, Submitter
//! - **observability**: status views

pub mod backfill;
pub mod domain;
pub mod error;
pub mod observability;
pub mod queue;
pub mod runtime;
pub mod typed;
pub mod worker;

pub use error::AmblerError;

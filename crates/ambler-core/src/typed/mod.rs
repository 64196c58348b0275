//! Typed Task API (Task trait, Handler trait, TypedRegistry, payload codec).

pub mod codec;
pub mod handler;
pub mod registry;
pub mod task;

pub use handler::{DynHandler, Handler, TaskContext, TypedHandler};
pub use registry::TypedRegistry;
pub use task::Task;

//! Process plumbing: HTTP surface, cycle schedule and runtime wiring

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::{create_router, start_server, AppState, HealthStatus};
pub use runtime::{HydraRuntime, RuntimeError};
pub use scheduler::CycleSchedule;

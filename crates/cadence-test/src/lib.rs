//! Cadence recurrence engine - integration test support.
//!
//! Re-exports the workspace crates under a single `component` path so the
//! integration tests read like downstream code.

pub mod component {
    pub use cadence_core::{config, model, recurrence, window};
    pub use cadence_service::{event, exception, projection, schedule, store};

    pub mod error {
        pub use cadence_core::error::{CoreError, CoreResult};
        pub use cadence_service::error::{ServiceError, ServiceResult};
    }

    pub mod db {
        pub use cadence_db::db::*;
        pub use cadence_db::error::{DbError, DbResult};
    }
}

//! Gatehouse workforce client - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `gatehouse_test::` paths.

pub mod component {
    pub use gatehouse_auth::*;
    pub use gatehouse_client::*;
    pub use gatehouse_core::*;

    pub mod auth {
        pub use gatehouse_auth::{catalog, guard, permission, scope};
    }

    pub mod client {
        pub use gatehouse_client::{gateway, http, poll, session, store, wire};
    }
}

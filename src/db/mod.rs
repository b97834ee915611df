//! Embedded store: bootstrap and record access.
//!
//! `bootstrap` produces the single process-wide connection pool;
//! `repo` exposes the typed operations over it.

pub mod bootstrap;
pub mod repo;

pub use bootstrap::{open_store, BootstrapError};
pub use repo::{RepoError, Repository};

//! git-groom - interactive repository maintenance
//!
//! Two flows share one phase-controller primitive:
//! - **prune**: reconcile local branches against the remote and delete the
//!   orphaned ones the operator selects
//! - **deps**: walk dependency-update PRs into a staging branch one merge at a
//!   time, pausing on conflicts until the operator resolves them
//!
//! All git and `gh` invocations go through an injectable
//! [`gateway::CommandGateway`].

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod platform;
pub mod prune;
pub mod reconcile;
pub mod repo;
pub mod staging;
pub mod types;
pub mod workflow;

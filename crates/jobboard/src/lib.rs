//! Job-board backend library.
//!
//! The centerpiece is the staged query filter builder in [`query`], which
//! turns untrusted request parameters into a composable retrieval
//! specification. [`store`] materializes those specifications against a
//! document store; [`jobs`] and [`users`] layer the domain services and
//! HTTP routers on top.

pub mod config;
pub mod error;
pub mod jobs;
pub mod query;
pub mod store;
pub mod telemetry;
pub mod users;

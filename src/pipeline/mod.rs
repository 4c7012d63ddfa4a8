//! Research pipeline
//!
//! A deep-research run is a linear pipeline of four dependent stages: plan
//! the searches, fan them out concurrently, synthesize a report from
//! whatever search results succeeded, and deliver it. Each stage module is
//! independently testable; [`manager::ResearchManager`] composes them and
//! pushes progress events to the caller.

pub mod config;
pub mod constants;
pub mod events;
pub mod manager;
pub mod notify;
pub mod planner;
pub mod search;
pub mod types;
pub mod writer;

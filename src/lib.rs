//! Guarded shell execution and sandboxed line editing for agents, one skill
//! call per process.

pub mod config;
pub mod dispatch;
pub mod enforcement;
pub mod error;
pub mod tools;

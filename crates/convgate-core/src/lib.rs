//! # convgate-core
//!
//! Core crate for the conversion gateway. Contains the configuration
//! schemas loaded at startup and the unified error system shared by every
//! other crate in the workspace.
//!
//! This crate has **no** internal dependencies on other convgate crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;

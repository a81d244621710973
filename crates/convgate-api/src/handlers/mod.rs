//! Route handlers organized by domain.

pub mod convert;
pub mod download;
pub mod health;
pub mod viewer;

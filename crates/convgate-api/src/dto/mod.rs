//! Data transfer objects for JSON requests and responses.

pub mod request;
pub mod response;

//! # convgate-storage
//!
//! Local filesystem storage for the conversion gateway: request-scoped
//! upload spools and the converted files served back for download.

pub mod local;
pub mod naming;
pub mod spool;

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

pub use local::{LocalStore, StoredFile, StoredFileMeta};
pub use spool::SpooledUpload;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

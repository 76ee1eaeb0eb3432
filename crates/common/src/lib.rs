//! Shared building blocks for the EduPlatform mail and datastore glue:
//! configuration, the datastore connection resolver, the common error type,
//! and the email wire types exchanged between the notifier and the relay.

pub mod config;
pub mod db;
pub mod error;
pub mod types;

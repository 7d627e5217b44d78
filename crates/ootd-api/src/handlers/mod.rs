//! HTTP handler modules for ootd-api.

pub mod messages;
pub mod ootd;
pub mod upload;

//! Promote app releases through a publishing service's edit/track/commit model.
//!
//! A flow opens an edit on an application, reads the releases staged on a
//! track, picks a candidate by version code, transitions its status, and
//! commits the edit. See [`workflow`] for the three flows.

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod promotion;
pub mod publisher;
pub mod selector;
pub mod session;
pub mod track;
pub mod workflow;

pub use error::{Error, Result};

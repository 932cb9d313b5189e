//! Domain models for the publishing service's edit/track model.
//!
//! # Core Concepts
//!
//! - [`AppEdit`]: A change transaction against one application. Track changes
//!   staged in an edit are invisible until the edit is committed.
//! - [`Track`]: A named distribution channel carrying an ordered list of releases.
//! - [`Release`]: A distributable unit identified by version codes, with a
//!   [`ReleaseStatus`].
//! - [`BundleRef`]: An artifact uploaded within an edit.

mod bundle;
mod edit;
mod release;
mod track;

pub use bundle::*;
pub use edit::*;
pub use release::*;
pub use track::*;

//! Decision engine for the warden path-access filter.
//!
//! Pure types and logic: the pattern catalog with its specificity lattice,
//! the resolver, and the decision surface. Filesystem access (path
//! canonicalization, the permission probe) lives in `warden_fs`; the two
//! are glued together by the `warden_app` facade.

mod decision;
mod error;
mod level;
mod operation;
mod pattern;
mod resolver;

pub use decision::*;
pub use error::*;
pub use level::*;
pub use operation::*;
pub use pattern::*;
pub use resolver::*;

//! Facade for the warden path-access filter.
//!
//! `SecurityFilter` glues the canonicalizer, the permission probe and the
//! resolver into the one call sites use, and owns the fail-closed policy:
//! every internal error becomes a deny decision.

mod filter;

pub use filter::SecurityFilter;

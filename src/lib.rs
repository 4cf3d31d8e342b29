//! `tgr-rs` is a toolkit for reading and writing TGR sprite containers,
//! the IFF-based 2D asset format used for buildings, units and UI
//! portraits in late-90s real-time strategy games.
//!
//! The format library lives in [`tgr_types`]; this crate re-exports it and
//! hosts the command-line drivers (see the `tgr_utils` example).

pub use tgr_types;

#[doc(inline)]
pub use tgr_types::prelude;

//! ALMA Core - Calendar Types
//!
//! Entity types, enums and errors for the calendar subsystem, plus the pure
//! pieces of scheduling logic: time rendering, recurrence planning, bulk
//! scopes and the rich read model. No I/O happens in this crate.

mod bulk;
mod entities;
mod enums;
mod error;
mod filter;
mod identity;
mod read_model;
mod recurrence;
mod time_fmt;

pub use bulk::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use filter::*;
pub use identity::*;
pub use read_model::*;
pub use recurrence::*;
pub use time_fmt::*;

//! Capability algebra used to decide whether a test case may run on an environment.
//!
//! Requirements are expressed as predicates (`IntRange`, `SetSpace`, node and
//! environment spaces); candidates are the concrete capabilities an environment
//! offers. Every check returns a `ResultReason` so callers can explain a mismatch
//! instead of only rejecting it.

mod environment;
mod os;
mod reason;
mod space;

pub use environment::{
    EnvironmentCapability, EnvironmentSpace, EnvironmentStatus, EnvironmentStatusParseError,
    NodeCapability, NodeSpace,
};
pub use os::{OsType, OsTypeParseError};
pub use reason::ResultReason;
pub use space::{create_set_space, IntRange, SetMatch, SetSpace, SpaceError};

//! Distributed building blocks: message passing, wire records, and the
//! locality and membership discovery run once per iolet at construction.

pub mod communicator;
pub mod locality;
pub mod membership;
pub mod wire;

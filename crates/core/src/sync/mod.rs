//! Background sync job plumbing.

pub mod ports;

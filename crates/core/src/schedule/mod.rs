//! Local time blocks, the schedule entries reconciled with Google Calendar.

pub mod ports;
mod service;

pub use service::TimeBlockService;

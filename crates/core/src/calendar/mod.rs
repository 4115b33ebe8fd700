//! Google Calendar integration: OAuth connection, sync executor, webhooks.

pub mod channels;
pub mod connection;
pub mod ports;
pub mod settings;
pub mod state;
pub mod sync_service;
pub mod tokens;
pub mod webhook;

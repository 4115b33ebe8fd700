//! Domain data types

pub mod calendar;
pub mod identity;
pub mod settings;
pub mod sync;
pub mod time_block;

pub use calendar::*;
pub use identity::*;
pub use settings::*;
pub use sync::*;
pub use time_block::*;

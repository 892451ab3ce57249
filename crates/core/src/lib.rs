#![forbid(unsafe_code)]

pub mod model;
pub mod session;
pub mod shuffle;
pub mod time;

pub use time::Clock;

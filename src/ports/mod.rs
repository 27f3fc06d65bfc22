//! Port traits between the domain and the outside world.

pub mod candle_source;
pub mod config_port;
pub mod report_port;

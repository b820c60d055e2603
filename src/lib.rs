pub mod client;
pub mod command;
pub mod config;
mod non_zero_duration;
pub mod normalize;
pub mod render;
pub mod report;
pub mod resolver;
pub mod service;
pub mod source;
#[cfg(test)]
mod test_server;

pub use non_zero_duration::NonZeroDuration;

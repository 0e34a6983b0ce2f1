mod client;
pub mod expiry;
pub mod review;
mod service;

pub use review::Identity;
pub use service::{Service, rate_limiter};

//! Security module for relayd.
//!
//! - **Password**: Argon2 hashing for operator credentials, bcrypt verification for
//!   hashes imported from older deployments
//! - **Rate Limiting**: Governor-based flood protection for inbound lines

pub mod password;
pub mod rate_limit;

pub use rate_limit::RateLimitManager;

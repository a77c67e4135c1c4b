//! Rate limiting logic and state management.

mod key;
mod limiter;

pub use key::CounterKey;
pub use limiter::RateLimit;

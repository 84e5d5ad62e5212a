//! Application-level orchestration built on the domain services.

pub mod poller;

pub use poller::FollowUpPoller;

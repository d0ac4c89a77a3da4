//! Feed errors.
//!
//! The simulated feed never fails. Real transports report their failures
//! through [`FeedError`] so the connection controller can move to the
//! error state and schedule a reconnect.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The underlying transport failed (socket closed, bad frame, ...).
    #[error("feed transport error: {0}")]
    Transport(String),

    /// The feed stopped producing data.
    #[error("feed closed")]
    Closed,
}

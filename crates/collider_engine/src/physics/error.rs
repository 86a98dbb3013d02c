//! Collision error types

use thiserror::Error;

/// Errors raised by pairwise collision tests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// No pairwise algorithm exists for this combination of shapes
    ///
    /// Only happens when a custom shape takes part in a pairwise test. This is
    /// a missing implementation, not a "no collision" result.
    #[error("collisions between {this} and {other} colliders are not implemented")]
    UnsupportedShape {
        /// Kind of the collider the test was called on
        this: &'static str,
        /// Kind of the collider it was tested against
        other: &'static str,
    },
}

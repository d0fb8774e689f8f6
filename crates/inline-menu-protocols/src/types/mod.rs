//! Common types used across the inline menu coordinator.

mod auth;
mod credential;
mod geometry;
mod ids;

pub use auth::*;
pub use credential::*;
pub use geometry::*;
pub use ids::*;

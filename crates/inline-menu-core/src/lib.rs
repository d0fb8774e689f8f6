//! # Inline Menu Core
//!
//! The background coordinator of the autofill inline menu.
//!
//! ```text
//! page frames ──► CommandRouter ──► Coordinator
//!                                     │  FocusState (single focused field, visibility)
//!                                     │  EventPipeline (debounce / throttle timers)
//!                                     │  GeometryCache (sub-frame offsets)
//!                                     │  CredentialProjection
//!                                     ▼
//! surfaces ◄──── PortRegistry ◄── position / visibility commands
//! ```
//!
//! Collaborators (credentials, auth status, settings, filling, popouts and the
//! frame transport) are injected through the traits in `inline_menu_protocols`.

pub mod coordinator;
mod coordinator_frames;
mod coordinator_lifecycle;
mod coordinator_position;
mod coordinator_surfaces;
pub mod debounce;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod page_details;
pub mod ports;
pub mod position;
pub mod projection;
pub mod router;

pub use coordinator::{Collaborators, Coordinator, CoordinatorSettings, PendingAction};
pub use debounce::{Debouncer, EventPipeline, PipelineHandler, Throttle};
pub use error::CoordinatorError;
pub use focus::{CloseEffect, CloseRequest, FocusState, FocusedField, MenuPhase};
pub use geometry::{GeometryCache, OffsetEntry};
pub use page_details::PageDetailsStore;
pub use ports::{PortPair, PortRegistry, Registration, Released};
pub use position::{button_position, list_position};
pub use projection::CredentialProjection;
pub use router::CommandRouter;

//! # Inline Menu Protocols
//!
//! Protocol definitions shared by the inline menu coordinator and its hosts.
//! Contains only types and interface definitions - no implementations.
//!
//! ## Contents
//!
//! - [`types`] - Typed identifiers, field geometry and credential views
//! - [`frame`] - Messages exchanged with page frames
//! - [`surface`] - Messages exchanged with the button and list surfaces
//! - [`collaborator`] - Traits for the external collaborators the coordinator consumes
//!
//! ## Execution contexts
//!
//! ```text
//! ┌──────────────┐  request/response   ┌──────────────────┐   ports    ┌───────────────┐
//! │ page frames  │ ◄─────────────────► │   coordinator    │ ◄────────► │ button / list │
//! │ (N per tab)  │    FrameMessage     │  (background)    │  signed    │   surfaces    │
//! └──────────────┘    FrameRequest     └──────────────────┘            └───────────────┘
//! ```

pub mod collaborator;
pub mod error;
pub mod frame;
pub mod surface;
pub mod types;

pub use collaborator::{
    AuthStatusProvider, AutofillService, CredentialProvider, FillRequest, FrameMessenger,
    SettingsProvider, SurfacePort, VaultPopouts,
};
pub use error::{FrameError, ProtocolError, ProviderError};
pub use frame::{
    FocusDirection, FrameDetails, FrameMessage, FrameRequest, MessageSender, PageDetails,
    SubFrameRef, TabContext,
};
pub use surface::{
    split_signing_key, ButtonPortMessage, InitSurface, ListPortMessage, SurfaceCommand,
    SurfaceKind, VisibilityStyles,
};
pub use types::*;

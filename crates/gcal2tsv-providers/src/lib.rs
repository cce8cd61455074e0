//! Calendar event sources.
//!
//! This crate fetches events for the export pipeline:
//!
//! - [`EventSource`] - The seam the pipeline fetches events through
//! - [`google`] - OAuth authorization, token caching and the Calendar API client
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Google API     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌──────────────────────┐    ┌──────────────┐
//! │ GoogleCalendarClient │    │ StaticSource │
//! └────────┬─────────────┘    └──────┬───────┘
//!          │                         │
//!          │       EventSource       │
//!          └───────────┬─────────────┘
//!                      │
//!                      ▼
//!              ┌───────────────┐
//!              │ CalendarEvent │
//!              └───────────────┘
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod provider;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{BoxFuture, ErrorSource, EventSource, StaticSource};

//! Event system for session transitions.
//!
//! Events are fired from the async session operations (login, logout,
//! proactive expiry, authorization loss). If no listeners are
//! registered they are silently ignored (zero overhead). The
//! synchronous `restore` path logs instead of dispatching.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vestibule::register_event_listeners;
//! use vestibule::events::listeners::LoggingListener;
//!
//! fn main() {
//!     // register listeners at startup
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//!
//!     // session transitions will now be logged
//! }
//! ```
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to react to transitions, for
//! example to route back to the login view after a logout:
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use vestibule::events::{Listener, SessionEvent};
//!
//! struct NavigateOnLogout;
//!
//! #[async_trait]
//! impl Listener for NavigateOnLogout {
//!     async fn handle(&self, event: &SessionEvent) {
//!         if let SessionEvent::LoggedOut { .. } = event {
//!             // send the router to the login view
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners};

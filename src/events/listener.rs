use async_trait::async_trait;

use super::SessionEvent;

/// Trait for handling session events asynchronously.
///
/// Implement this trait to react to session transitions: navigation,
/// toasts, metrics. Listeners may perform any async operation.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use vestibule::events::{Listener, SessionEvent};
///
/// struct FailedLoginCounter;
///
/// #[async_trait]
/// impl Listener for FailedLoginCounter {
///     async fn handle(&self, event: &SessionEvent) {
///         if let SessionEvent::LoginFailed { .. } = event {
///             // increment a counter
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle a session event.
    ///
    /// Called for every event dispatched. Filter by matching on the
    /// event variant to handle specific transitions.
    async fn handle(&self, event: &SessionEvent);
}

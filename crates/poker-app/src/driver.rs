//! Driver trait for abstracting presentation.
//!
//! The [`Driver`] trait decouples the runtime from how a view is shown. The
//! CLI prints to a terminal; tests record what was rendered.

use crate::App;

/// Presents the application state.
pub trait Driver: Send {
    /// Frontend-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Render the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend can no longer present output.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;
}

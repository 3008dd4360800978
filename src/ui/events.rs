//! Application event handling.
//!
//! Applies background task results to the application state.

use crate::app::{App, AppEvent};

use super::helpers::hand_off;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ListingLoaded {
            generation,
            outcome,
        } => {
            app.apply_load(generation, outcome);
        }
        AppEvent::MediaResolved { generation, result } => {
            if let Some(url) = app.apply_resolved(generation, result) {
                hand_off(app, &url);
            }
        }
        AppEvent::TaskPanicked {
            task,
            generation,
            error,
        } => {
            tracing::error!(task, generation, error = %error, "Background task panicked");
            if app.apply_listing_panic(generation) {
                app.set_status(format!("Internal error in {} task", task));
            }
        }
    }
}

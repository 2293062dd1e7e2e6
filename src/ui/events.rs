//! Background task event processing.

use crate::app::{App, AppEvent};
use crate::notifications::NotificationKind;

use super::helpers::open_url;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ShowWelcome => {
            tracing::debug!("Showing first-visit welcome");
            app.toast(NotificationKind::Success, "Welcome to FoxWeb!");
        }
        AppEvent::OpenIssue { url } => {
            tracing::info!(url = %url, "Opening suggestion issue form");
            open_url(app, &url);
        }
        AppEvent::Connectivity { online } => {
            app.set_connectivity(online);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.toast(
                NotificationKind::Error,
                format!("Internal error in {} task", task),
            );
        }
    }
}

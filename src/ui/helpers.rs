//! Helper functions for UI operations.
//!
//! Spawning of listing and resolution tasks, panic capture, and the player
//! handoff.

use crate::app::{App, AppEvent, Effect, LoadRequest, ResolveRequest};
use crate::media::ResolveError;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of the task silently disappearing, the panic message comes back
/// as `Err(String)` so the caller can report it over the event channel.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Start whatever background work `effect` asks for.
pub(super) fn run_effect(app: &mut App, effect: Effect, event_tx: &mpsc::Sender<AppEvent>) {
    match effect {
        Effect::Load(request) => spawn_load(app, request, event_tx),
        Effect::Resolve(request) => spawn_resolve(app, request, event_tx),
    }
}

/// Spawn the listing fetch for a freshly rendered screen.
///
/// `render_screen` already aborted the previous listing task; the handle is
/// kept so the next render can abort this one.
pub(super) fn spawn_load(app: &mut App, request: LoadRequest, event_tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    let tx = event_tx.clone();
    let LoadRequest { generation, target } = request;

    tracing::debug!(generation, target = ?target, "Spawning listing task");

    app.load_handle = Some(tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(target.execute(&client)).await {
            Ok(outcome) => {
                if let Err(e) = tx.send(AppEvent::ListingLoaded { generation, outcome }).await {
                    tracing::warn!(error = %e, event = "ListingLoaded", "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "listing", error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "listing",
                        generation,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    }));
}

/// Spawn a media resolution.
///
/// Exactly one `MediaResolved` is sent per request, a panic included, so the
/// resolving overlay always comes down.
pub(super) fn spawn_resolve(
    app: &mut App,
    request: ResolveRequest,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let resolver = app.resolver.clone();
    let tx = event_tx.clone();
    let ResolveRequest { generation, url } = request;

    app.resolve_handle = Some(tokio::spawn(async move {
        let result = match catch_task_panic(resolver.resolve(&url)).await {
            Ok(result) => result,
            Err(panic_msg) => {
                tracing::error!(task = "resolve", error = %panic_msg, "Background task panicked");
                Err(ResolveError::Task(panic_msg))
            }
        };
        if let Err(e) = tx.send(AppEvent::MediaResolved { generation, result }).await {
            tracing::warn!(error = %e, event = "MediaResolved", "Channel send failed (receiver dropped)");
        }
    }));
}

/// Give a player URL to the user: print it, or open it in the browser.
pub(super) fn hand_off(app: &mut App, url: &str) {
    if app.print_player_url {
        app.set_status(format!("Player: {}", url));
        return;
    }

    if let Err(e) = validate_url_for_open(url) {
        tracing::warn!(error = %e, "Refusing to open player URL");
        app.alert = Some("Failed to load video.".to_string());
        return;
    }

    match open::that_detached(url) {
        Ok(()) => app.set_status("Opened in browser"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to launch browser");
            app.set_status(format!("Failed to open browser: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        let result = catch_task_panic(async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_catch_task_panic_formatted_message() {
        let n = 3;
        let result: Result<(), String> =
            catch_task_panic(async move { panic!("bad index {}", n) }).await;
        assert_eq!(result, Err("bad index 3".to_string()));
    }
}

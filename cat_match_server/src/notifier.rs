//! Notification publisher
//!
//! Announces new match requests (and approvals) to the outside world. Delivery is best effort: every failure is
//! logged and then forgotten. Nothing here can affect the outcome of the request that triggered the event.
use std::time::Duration;

use cat_match_engine::events::{EventHooks, MatchApprovedEvent, MatchRequestedEvent};
use log::*;
use reqwest::Client;

const NOTIFY_TARGET: &str = "cms::notifications";
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the event hooks for the server. When `webhook_url` is given, each new match request is POSTed to it as
/// JSON.
pub fn notification_hooks(webhook_url: Option<String>) -> EventHooks {
    let mut hooks = EventHooks::default();
    let webhook = webhook_url.and_then(|url| match Client::builder().timeout(WEBHOOK_TIMEOUT).build() {
        Ok(client) => Some((client, url)),
        Err(e) => {
            error!("📬️ Could not build the webhook client. Match requests will only be logged. {e}");
            None
        },
    });
    hooks.on_match_requested(move |ev: MatchRequestedEvent| {
        let webhook = webhook.clone();
        Box::pin(async move {
            let r = &ev.request;
            info!(target: NOTIFY_TARGET, "📬️ New match request {}: {} -> {}", r.id, r.issuer_cat_id, r.match_cat_id);
            if let Some((client, url)) = webhook {
                post_event(&client, &url, &ev).await;
            }
        })
    });
    hooks.on_match_approved(|ev: MatchApprovedEvent| {
        Box::pin(async move {
            info!(
                target: NOTIFY_TARGET,
                "📬️ Match request {} approved. {} competing requests were withdrawn",
                ev.request.id,
                ev.invalidated.len()
            );
        })
    });
    hooks
}

async fn post_event(client: &Client, url: &str, event: &MatchRequestedEvent) {
    match client.post(url).json(event).send().await {
        Ok(res) if res.status().is_success() => {
            debug!(target: NOTIFY_TARGET, "📬️ Webhook accepted match request {}", event.request.id);
        },
        Ok(res) => {
            warn!(
                target: NOTIFY_TARGET,
                "📬️ Webhook rejected match request {} with status {}",
                event.request.id,
                res.status()
            );
        },
        Err(e) => {
            warn!(target: NOTIFY_TARGET, "📬️ Could not deliver match request {} to the webhook. {e}", event.request.id);
        },
    }
}

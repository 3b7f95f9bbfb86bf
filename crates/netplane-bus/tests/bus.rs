// crates/netplane-bus/tests/bus.rs
// ============================================================================
// Module: Dispatch Bus Tests
// Description: Tests for request/reply resolution and topic fan-out.
// ============================================================================
//! ## Overview
//! Validates that every request resolves exactly once and that publications
//! reach subscribers.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use netplane_bus::Bus;
use netplane_bus::Request;
use netplane_bus::Response;
use serde_json::json;

// ============================================================================
// SECTION: Request/Reply Tests
// ============================================================================

/// Tests a request to an unregistered address resolves with an error.
#[tokio::test]
async fn request_to_unknown_address_resolves_with_error() {
    let bus = Bus::new();
    let response = bus.request("netplane.nowhere", Request::bare("get_service_info")).await;
    assert_eq!(response.error.as_deref(), Some("unknown service address"));
    assert_eq!(response.action, "get_service_info");
}

/// Tests a served request resolves with the service's reply.
#[tokio::test]
async fn served_request_resolves_with_service_reply() {
    let bus = Bus::new();
    let mut mailbox = bus.serve("netplane.echo");
    tokio::spawn(async move {
        while let Some(queued) = mailbox.recv().await {
            let reply = Response::content(
                "netplane.echo",
                queued.request.action.clone(),
                queued.request.params,
            );
            let _ = queued.reply.send(reply);
        }
    });

    let response = bus.request("netplane.echo", Request::new("echo", json!({"k": 1}))).await;
    assert_eq!(response.content, Some(json!({"k": 1})));
    assert!(!response.is_error());
}

/// Tests a dropped reply channel resolves with an error, not a hang.
#[tokio::test]
async fn dropped_reply_resolves_with_error() {
    let bus = Bus::new();
    let mut mailbox = bus.serve("netplane.mute");
    tokio::spawn(async move {
        while let Some(queued) = mailbox.recv().await {
            drop(queued.reply);
        }
    });

    let response = bus.request("netplane.mute", Request::bare("anything")).await;
    assert_eq!(response.error.as_deref(), Some("service dropped the request"));
}

/// Tests a dropped mailbox resolves requests with a service-unavailable error.
#[tokio::test]
async fn dropped_mailbox_resolves_with_unavailable() {
    let bus = Bus::new();
    let mailbox = bus.serve("netplane.gone");
    drop(mailbox);

    let response = bus.request("netplane.gone", Request::bare("anything")).await;
    assert_eq!(response.error.as_deref(), Some("service unavailable"));
}

// ============================================================================
// SECTION: Publish/Subscribe Tests
// ============================================================================

/// Tests publications reach subscribers registered before the publish.
#[tokio::test]
async fn publication_reaches_existing_subscriber() {
    let bus = Bus::new();
    let mut updates = bus.subscribe("topology-updated");

    bus.publish("topology-updated", "netplane.topology", json!({"nodes": [], "links": []}));

    let publication = updates.recv().await.expect("publication");
    assert_eq!(publication.service, "netplane.topology");
    assert_eq!(publication.content, json!({"nodes": [], "links": []}));
}

/// Tests publishing without subscribers is not an error.
#[tokio::test]
async fn publication_without_subscribers_is_discarded() {
    let bus = Bus::new();
    bus.publish("routing-routes-updated", "netplane.routing", json!([]));
    // No panic and no hang is the assertion.
}

/// Tests independent topics do not cross-deliver.
#[tokio::test]
async fn topics_do_not_cross_deliver() {
    let bus = Bus::new();
    let mut routes = bus.subscribe("routing-routes-updated");

    bus.publish("routing-prefixes-updated", "netplane.routing", json!([]));
    bus.publish("routing-routes-updated", "netplane.routing", json!([1]));

    let publication = routes.recv().await.expect("publication");
    assert_eq!(publication.content, json!([1]));
}

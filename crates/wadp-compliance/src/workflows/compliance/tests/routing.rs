use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::compliance::repository::PortalDocument;
use crate::workflows::compliance::router::{sweep_router, SweepRequest};
use crate::workflows::compliance::service::ComplianceSweepService;

fn due_soon_portal() -> (Arc<MemoryStore>, Arc<MemoryChannel>) {
    let fields = OrgFixture::user_group("Puzzle Makers")
        .due("2026-09-01")
        .contacts("Alice", "Boramey")
        .fields();
    (MemoryStore::seeded(vec![fields]), Arc::new(MemoryChannel::default()))
}

fn arc_service(
    store: Arc<MemoryStore>,
    channel: Arc<MemoryChannel>,
) -> Arc<ComplianceSweepService<MemoryStore, MemoryChannel>> {
    Arc::new(build_service(store, channel))
}

#[tokio::test]
async fn sweep_handler_runs_a_dry_run() {
    let (store, channel) = due_soon_portal();
    let service = arc_service(store.clone(), channel.clone());

    let request = SweepRequest {
        dry_run: true,
        as_of: Some("2026-08-15".to_string()),
    };
    let response = crate::workflows::compliance::router::sweep_handler::<MemoryStore, MemoryChannel>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["dry_run"], json!(true));
    assert_eq!(payload["transitions"][0]["group_name"], json!("Puzzle Makers"));
    assert_eq!(payload["transitions"][0]["to_level"], json!(1));

    // Dry runs leave the portal untouched.
    assert_eq!(
        store.document(PortalDocument::Organizations)[0].get("out_of_compliance_level"),
        Some(&"0".to_string())
    );
    assert!(channel.talk_posts().is_empty());
}

#[tokio::test]
async fn sweep_handler_rejects_unparseable_dates() {
    let (store, channel) = due_soon_portal();
    let service = arc_service(store, channel.clone());

    let request = SweepRequest {
        dry_run: false,
        as_of: Some("soon".to_string()),
    };
    let response = crate::workflows::compliance::router::sweep_handler::<MemoryStore, MemoryChannel>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("unparseable as_of date 'soon'"));
    assert!(channel.talk_posts().is_empty());
}

#[tokio::test]
async fn sweep_handler_reports_store_failures() {
    let service = arc_service(
        Arc::new(MemoryStore::default()),
        Arc::new(MemoryChannel::default()),
    );

    let request = SweepRequest {
        dry_run: false,
        as_of: Some("2026-08-15".to_string()),
    };
    let response = crate::workflows::compliance::router::sweep_handler::<MemoryStore, MemoryChannel>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error string")
        .contains("not found"));
}

#[tokio::test]
async fn sweep_route_accepts_payloads() {
    let (store, channel) = due_soon_portal();
    let router = sweep_router(arc_service(store, channel.clone()));

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/compliance/sweeps")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({"as_of": "2026-08-15"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["dry_run"], json!(false));
    assert_eq!(payload["notices_delivered"], json!(1));
    assert_eq!(payload["emails_sent"], json!(2));
    assert_eq!(channel.talk_posts().len(), 1);
}

#[tokio::test]
async fn organizations_route_lists_affiliates() {
    let (store, channel) = due_soon_portal();
    let router = sweep_router(arc_service(store, channel));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/compliance/organizations")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["group_name"], json!("Puzzle Makers"));
    assert_eq!(payload[0]["org_type"], json!("User Group"));
    assert_eq!(payload[0]["out_of_compliance_level"], json!(0));
}

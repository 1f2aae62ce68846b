mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{id_of, TestApp};
use spacer_server::models::Role;

#[tokio::test]
async fn test_confirm_then_cancel_drives_space_status() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;

    let space = app.create_space(&owner, 35, 250).await;
    let space_id = id_of(&space);
    assert_eq!(space["status"], "available");

    let reply = app
        .book(&client, &space_id, "2030-05-01T10:00:00Z", "2030-05-01T12:00:00Z")
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    assert_eq!(reply.data()["status"], "pending");
    assert_eq!(reply.data()["total_amount"].as_f64(), Some(70.0));
    let booking_id = id_of(reply.data());

    // Creating a booking leaves the space alone.
    let reply = app.get(&format!("/spaces/{space_id}"), None).await;
    assert_eq!(reply.data()["status"], "available");

    let reply = app
        .put(&format!("/admin/bookings/{booking_id}"), Some(&admin.token), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.data()["booking"]["status"], "confirmed");
    assert_eq!(reply.data()["space_status"], "booked");
    let reply = app.get(&format!("/spaces/{space_id}"), None).await;
    assert_eq!(reply.data()["status"], "booked");

    let reply = app
        .put(&format!("/admin/bookings/{booking_id}"), Some(&admin.token), json!({ "status": "cancelled" }))
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.data()["booking"]["status"], "cancelled");
    let reply = app.get(&format!("/spaces/{space_id}"), None).await;
    assert_eq!(reply.data()["status"], "available");
}

#[tokio::test]
async fn test_hourly_and_daily_pricing() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let space_id = id_of(&app.create_space(&owner, 45, 250).await);

    let four_hours = app
        .book(&client, &space_id, "2030-05-01T08:00:00Z", "2030-05-01T12:00:00Z")
        .await;
    assert_eq!(four_hours.data()["total_amount"].as_f64(), Some(180.0));

    let two_days = app
        .book(&client, &space_id, "2030-06-01T08:00:00Z", "2030-06-03T08:00:00Z")
        .await;
    assert_eq!(two_days.data()["total_amount"].as_f64(), Some(500.0));
}

#[tokio::test]
async fn test_time_range_must_be_positive() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let space_id = id_of(&app.create_space(&owner, 45, 250).await);

    for (start, end) in [
        ("2030-05-01T12:00:00Z", "2030-05-01T10:00:00Z"),
        ("2030-05-01T12:00:00Z", "2030-05-01T12:00:00Z"),
    ] {
        let reply = app.book(&client, &space_id, start, end).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.error_code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_illegal_transitions_are_conflicts() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);
    let booking_id = id_of(
        app.book(&client, &space_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z")
            .await
            .data(),
    );
    let status_uri = format!("/bookings/{booking_id}/status");

    let reply = app.put(&status_uri, Some(&admin.token), json!({ "status": "confirmed" })).await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

    let reply = app.put(&status_uri, Some(&admin.token), json!({ "status": "pending" })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "CONFLICT");

    let reply = app
        .post(&format!("/bookings/{booking_id}/cancel"), Some(&client.token), json!({ "reason": "Plans changed" }))
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.data()["booking"]["cancellation_reason"], "Plans changed");
    assert_eq!(reply.data()["space_status"], "available");

    let reply = app.put(&status_uri, Some(&admin.token), json!({ "status": "confirmed" })).await;
    assert_eq!(reply.error_code(), "CONFLICT");

    let reply = app
        .post(&format!("/bookings/{booking_id}/cancel"), Some(&client.token), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_space_owner_cannot_move_bookings() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);
    let booking_id = id_of(
        app.book(&client, &space_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z")
            .await
            .data(),
    );

    for status in ["confirmed", "cancelled", "completed"] {
        let reply = app
            .put(&format!("/bookings/{booking_id}/status"), Some(&owner.token), json!({ "status": status }))
            .await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{status}");
    }
    let reply = app
        .post(&format!("/bookings/{booking_id}/cancel"), Some(&owner.token), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app.get(&format!("/bookings/{booking_id}"), Some(&owner.token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["status"], "pending");
    let reply = app.get(&format!("/spaces/{space_id}"), None).await;
    assert_eq!(reply.data()["status"], "available");
}

#[tokio::test]
async fn test_clients_may_only_cancel() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let stranger = app.actor("stranger@example.com", Role::Client).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);
    let booking_id = id_of(
        app.book(&client, &space_id, "2030-05-01T10:00:00Z", "2030-05-01T11:00:00Z")
            .await
            .data(),
    );

    let reply = app
        .put(&format!("/bookings/{booking_id}/status"), Some(&client.token), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app.get(&format!("/bookings/{booking_id}"), Some(&stranger.token)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app
        .post(&format!("/bookings/{booking_id}/cancel"), Some(&stranger.token), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app.get(&format!("/bookings/{booking_id}"), Some(&owner.token)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.data()["status"], "pending");
}

#[tokio::test]
async fn test_overlapping_confirmations_are_refused() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let alice = app.actor("alice@example.com", Role::Client).await;
    let bob = app.actor("bob@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);

    let first = id_of(app.book(&alice, &space_id, "2030-05-01T10:00:00Z", "2030-05-01T13:00:00Z").await.data());
    let second = id_of(app.book(&bob, &space_id, "2030-05-01T12:00:00Z", "2030-05-01T14:00:00Z").await.data());

    let reply = app
        .put(&format!("/bookings/{first}/status"), Some(&admin.token), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = app
        .put(&format!("/bookings/{second}/status"), Some(&admin.token), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "CONFLICT");
    let reply = app.get(&format!("/bookings/{second}"), Some(&bob.token)).await;
    assert_eq!(reply.data()["status"], "pending");

    // New requests against a confirmed slot are refused up front.
    let reply = app.book(&bob, &space_id, "2030-05-01T11:00:00Z", "2030-05-01T12:00:00Z").await;
    assert_eq!(reply.error_code(), "CONFLICT");

    // Touching intervals do not overlap.
    let reply = app.book(&bob, &space_id, "2030-05-01T13:00:00Z", "2030-05-01T14:00:00Z").await;
    assert_eq!(reply.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_space_stays_booked_until_last_confirmation_ends() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);

    let morning = id_of(app.book(&client, &space_id, "2030-05-01T08:00:00Z", "2030-05-01T10:00:00Z").await.data());
    let evening = id_of(app.book(&client, &space_id, "2030-05-01T18:00:00Z", "2030-05-01T20:00:00Z").await.data());
    for id in [&morning, &evening] {
        let reply = app
            .put(&format!("/bookings/{id}/status"), Some(&admin.token), json!({ "status": "confirmed" }))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    let reply = app
        .put(&format!("/bookings/{morning}/status"), Some(&admin.token), json!({ "status": "completed" }))
        .await;
    assert_eq!(reply.data()["space_status"], "booked");

    let reply = app.get(&format!("/spaces/{space_id}/availability"), None).await;
    let intervals = reply.data().as_array().unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0]["start"], "2030-05-01T18:00:00Z");

    let reply = app.post(&format!("/bookings/{evening}/cancel"), Some(&client.token), json!({})).await;
    assert_eq!(reply.data()["space_status"], "available");
}

#[tokio::test]
async fn test_client_lists_own_bookings_only() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let alice = app.actor("alice@example.com", Role::Client).await;
    let bob = app.actor("bob@example.com", Role::Client).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);

    app.book(&alice, &space_id, "2030-05-01T08:00:00Z", "2030-05-01T09:00:00Z").await;
    app.book(&alice, &space_id, "2030-05-02T08:00:00Z", "2030-05-02T09:00:00Z").await;
    app.book(&bob, &space_id, "2030-05-03T08:00:00Z", "2030-05-03T09:00:00Z").await;

    let reply = app.get("/bookings?per_page=1", Some(&alice.token)).await;
    assert_eq!(reply.data()["total"], 2);
    assert_eq!(reply.data()["pages"], 2);
    assert_eq!(reply.data()["items"].as_array().unwrap().len(), 1);

    let reply = app.get(&format!("/spaces/{space_id}/bookings"), Some(&owner.token)).await;
    assert_eq!(reply.data()["total"], 3);
    let reply = app.get(&format!("/spaces/{space_id}/bookings"), Some(&bob.token)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_for_someone_else_requires_admin() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let alice = app.actor("alice@example.com", Role::Client).await;
    let bob = app.actor("bob@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);

    let body = json!({
        "space_id": space_id,
        "client_id": bob.user.id,
        "start_time": "2030-05-01T08:00:00Z",
        "end_time": "2030-05-01T09:00:00Z"
    });
    let reply = app.post("/bookings", Some(&alice.token), body.clone()).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app.post("/bookings", Some(&admin.token), body).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.data()["client_id"], bob.user.id.to_string());
}

#[tokio::test]
async fn test_missing_space_and_deleted_space() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;

    let reply = app
        .book(&client, "6f1c1a52-4a4b-4f43-9d7a-6a3ad1b0a001", "2030-05-01T08:00:00Z", "2030-05-01T09:00:00Z")
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let space_id = id_of(&app.create_space(&owner, 20, 150).await);
    app.delete(&format!("/spaces/{space_id}"), Some(&owner.token)).await;
    let reply = app.book(&client, &space_id, "2030-05-01T08:00:00Z", "2030-05-01T09:00:00Z").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_pending_booking_on_deleted_space_cannot_be_confirmed() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let admin = app.actor("admin@example.com", Role::Admin).await;
    let space_id = id_of(&app.create_space(&owner, 20, 150).await);
    let booking_id = id_of(
        app.book(&client, &space_id, "2030-05-01T08:00:00Z", "2030-05-01T09:00:00Z")
            .await
            .data(),
    );
    app.delete(&format!("/spaces/{space_id}"), Some(&owner.token)).await;

    let reply = app
        .put(&format!("/admin/bookings/{booking_id}"), Some(&admin.token), json!({ "status": "confirmed" }))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "VALIDATION_ERROR");
    let reply = app.get(&format!("/spaces/{space_id}"), None).await;
    assert_eq!(reply.data()["status"], "available");

    // Winding the booking down is still allowed.
    let reply = app
        .post(&format!("/bookings/{booking_id}/cancel"), Some(&client.token), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_prices_are_rejected() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let mut payload = common::space_payload("Nairobi", 20, 150);
    payload["price_per_day"] = json!(5e28);
    let reply = app.post("/spaces", Some(&owner.token), payload).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "VALIDATION_ERROR");

    let mut payload = common::space_payload("Nairobi", 20, 150);
    payload["price_per_hour"] = json!(10.125);
    let reply = app.post("/spaces", Some(&owner.token), payload).await;
    assert_eq!(reply.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_booking_total_beyond_amount_range_is_rejected() {
    let app = TestApp::new();
    let owner = app.actor("owner@example.com", Role::SpaceOwner).await;
    let client = app.actor("client@example.com", Role::Client).await;
    let mut payload = common::space_payload("Nairobi", 20, 150);
    payload["price_per_day"] = json!(9_000_000_000i64);
    let reply = app.post("/spaces", Some(&owner.token), payload).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    let space_id = id_of(reply.data());

    let reply = app.book(&client, &space_id, "2030-05-01T08:00:00Z", "2030-05-03T08:00:00Z").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error_code(), "VALIDATION_ERROR");
}

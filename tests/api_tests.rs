
use actix_web::{
    http::{header, StatusCode},
    test::{self, TestRequest},
};
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn public_pages_need_no_token() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    for uri in ["/", "/health"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
    }
}

#[actix_rt::test]
async fn unknown_portfolio_is_pending() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = TestRequest::get().uri("/portfolio/nobody").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "status": "pending" }));
}

#[actix_rt::test]
async fn api_routes_reject_missing_or_bad_tokens() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = TestRequest::get().uri("/api/v1/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/v1/projects")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn saving_a_profile_reports_dropped_entries() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    let auth = ctx.bearer("user-1");

    let req = TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({
            "bio": "Writes Rust",
            "education": [
                { "school": "MIT", "degree": "BSc", "start_year": "2015", "end_year": "2019" },
                { "school": "", "degree": "MSc" }
            ]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["dropped_entries"], 1);
    assert!(body["notice"].is_string());
    assert_eq!(body["profile"]["education"].as_array().map(Vec::len), Some(1));

    let req = TestRequest::get()
        .uri("/api/v1/profile")
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["bio"], "Writes Rust");
}

#[actix_rt::test]
async fn malformed_profile_json_is_a_bad_request() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header((header::AUTHORIZATION, ctx.bearer("user-1")))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn project_lifecycle_through_the_api() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    let auth = ctx.bearer("user-1");

    let (content_type, payload) = multipart_body(vec![
        Part::Json(
            "metadata",
            json!({
                "title": "Weather App",
                "description": "Forecasts",
                "technologies": "Rust, actix, Rust",
                "project_url": "https://weather.example.com"
            }),
        ),
        Part::File("thumbnail", "cover.png", png_bytes(64, 48)),
        Part::File("screenshots", "one.png", png_bytes(32, 32)),
    ]);

    let req = TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;

    assert_eq!(created["technologies"], json!(["Rust", "actix"]));
    assert_eq!(created["screenshots"].as_array().map(Vec::len), Some(1));
    let id = created["id"].as_str().expect("id").to_string();
    let thumbnail = created["thumbnail"].as_str().expect("thumbnail").to_string();

    // listed for the owner
    let req = TestRequest::get()
        .uri("/api/v1/projects")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    // served publicly as JPEG
    let media_path = thumbnail.strip_prefix("http://localhost").expect("local media URL");
    let resp = test::call_service(&app, TestRequest::get().uri(media_path).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );

    // a profile makes the portfolio ready
    let req = TestRequest::put()
        .uri("/api/v1/profile")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_json(json!({ "display_name": "Ada" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = TestRequest::get().uri("/portfolio/user-1").to_request();
    let portfolio: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(portfolio["status"], "ready");
    assert_eq!(portfolio["profile"]["display_name"], "Ada");
    assert_eq!(portfolio["projects"][0]["title"], "Weather App");

    // deletion is guarded by confirm
    let req = TestRequest::delete()
        .uri(&format!("/api/v1/projects/{id}"))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/projects/{id}?confirm=true"))
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["document_deleted"], true);
    assert_eq!(report["blobs_deleted"], 2);

    assert!(ctx.projects.is_empty());
    assert!(ctx.blobs.is_empty());
}

#[actix_rt::test]
async fn editing_another_users_project_is_forbidden() {
    let ctx = TestContext::new();
    let id = ctx.insert_project("owner", "Theirs", Vec::new()).await;
    let app = init_app!(ctx.state);

    let (content_type, payload) = multipart_body(vec![Part::Json(
        "metadata",
        json!({
            "title": "Mine now",
            "description": "Taken",
            "project_url": "https://example.com"
        }),
    )]);
    let req = TestRequest::put()
        .uri(&format!("/api/v1/projects/{id}"))
        .insert_header((header::AUTHORIZATION, ctx.bearer("intruder")))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn invalid_project_id_is_a_bad_request() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = TestRequest::get()
        .uri("/api/v1/projects/not-a-uuid")
        .insert_header((header::AUTHORIZATION, ctx.bearer("user-1")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn media_outside_the_store_is_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = TestRequest::get().uri("/media/projects/user-1/site/thumbnail").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn account_deletion_requires_confirmation() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    let auth = ctx.bearer("user-1");

    let req = TestRequest::delete()
        .uri("/api/v1/profile")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::delete()
        .uri("/api/v1/profile?confirm=true")
        .insert_header((header::AUTHORIZATION, auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["profile_deleted"], false);
    assert_eq!(body["projects_deleted"], 0);
}

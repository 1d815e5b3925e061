use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use erp_dashboard::{api::create_router, app_state::AppState, config::Config};

fn app() -> Router {
    create_router(AppState::new(Config::default()).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router, role: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({"username": "flyweis", "password": "1234", "role": role}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    assert_eq!(body["redirect"], "/dashboard");
    (body["token"].as_str().unwrap().to_string(), cookie)
}

#[tokio::test]
async fn test_protected_routes_redirect_without_session() {
    let app = app();

    for uri in ["/dashboard", "/api/pages/ledger", "/api/pages/ledger/export", "/no/such/page"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_unlocks_protected_routes() {
    let app = app();
    let (token, cookie) = login(&app, "Manager").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], "Manager");
    assert_eq!(body["pages"].as_array().unwrap().len(), 33);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pages/leads?stage=Qualified")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["shown"], 1);
    assert_eq!(body["total"], 3);
    assert_eq!(body["summary"]["average_score"], 75.0);
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json("/login", json!({"username": "flyweis", "password": "wrong"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = body_json(response).await;
    assert!(body.to_string().contains("Invalid credentials"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = app();
    let (token, _) = login(&app, "Admin").await;
    let bearer = format!("Bearer {}", token);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "flyweis");
    assert_eq!(body["role"], "Admin");
    assert!(body.get("authenticated").is_none());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_record_crud_over_http() {
    let app = app();
    let (token, _) = login(&app, "Admin").await;
    let bearer = format!("Bearer {}", token);

    let response = app
        .clone()
        .oneshot({
            let mut request = post_json("/api/pages/taxes/records", json!({"name": "Cess", "value": "250"}));
            request
                .headers_mut()
                .insert(header::AUTHORIZATION, bearer.parse().unwrap());
            request
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["value"], 250);

    let response = app
        .clone()
        .oneshot({
            let mut request = post_json("/api/pages/taxes/records", json!({"name": "Bad", "value": "-5"}));
            request
                .headers_mut()
                .insert(header::AUTHORIZATION, bearer.parse().unwrap());
            request
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/pages/taxes/export")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let csv = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&csv).ends_with("Cess,250"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/pages/taxes/records/1")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_pos_checkout_over_http() {
    let app = app();
    let (token, _) = login(&app, "Admin").await;
    let bearer = format!("Bearer {}", token);
    let authed = |mut request: Request<Body>| {
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, bearer.parse().unwrap());
        request
    };

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/pos/cart", json!({"product_id": 3}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["name"], "Jacket");

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/pos/cart", json!({"product_id": 42}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/pos/checkout", json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], 70.0);

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/pos/checkout", json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

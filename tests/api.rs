use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use pos_server::{config::AppConfig, routes::create_router, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> anyhow::Result<Router> {
    let state = AppState::bootstrap(AppConfig::for_tests(), None).await?;
    Ok(create_router(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, axum::http::HeaderMap, Vec<u8>)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await?.to_bytes().to_vec();
    Ok((status, headers, bytes))
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let (status, _, bytes) = send(app, method, uri, token, body).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn login(app: &Router, username: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    Ok(body["data"]["token"]
        .as_str()
        .expect("token in response")
        .to_string())
}

fn location(headers: &axum::http::HeaderMap) -> &str {
    headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_and_unknown_routes() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, body) = send_json(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send_json(&app, "GET", "/api/nope", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["error"], "Not Found");
    assert!(body["meta"].is_object());
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> anyhow::Result<()> {
    let app = app().await?;
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password");
    Ok(())
}

#[tokio::test]
async fn product_endpoints_search_and_admin_gating() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, body) = send_json(&app, "GET", "/api/products?q=fruit", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["meta"]["total"], 2);

    let new_product = json!({ "name": "Bread", "category": "Bakery", "price": "800", "stock": 12 });
    let (status, _) =
        send_json(&app, "POST", "/api/products", None, Some(new_product.clone())).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = login(&app, "admin", "admin").await?;
    let (status, body) =
        send_json(&app, "POST", "/api/products", Some(&admin), Some(new_product)).await?;
    assert_eq!(status, StatusCode::CREATED);
    let bread_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/products/{bread_id}/stock"),
        Some(&admin),
        Some(json!({ "stock": 3 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stock"], 3);

    let (status, body) = send_json(
        &app,
        "PATCH",
        &format!("/api/products/{bread_id}"),
        Some(&admin),
        Some(json!({ "category": "Bread & Cakes" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Bread");
    assert_eq!(body["data"]["category"], "Bread & Cakes");

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/products/{}/stock", uuid::Uuid::new_v4()),
        Some(&admin),
        Some(json!({ "stock": 3 })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(json!({ "name": " ", "category": "Bakery", "price": "1", "stock": 1 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn shopkeeper_session_checkout_and_role_gates() -> anyhow::Result<()> {
    let app = app().await?;
    let admin = login(&app, "admin", "admin").await?;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/admin/users",
        Some(&admin),
        Some(json!({ "username": "till", "password": "pass", "role": "shopkeeper" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let till = login(&app, "till", "pass").await?;

    // role-gated pages
    let (status, headers, _) = send(&app, "GET", "/admin", Some(&till), None).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location(&headers), "/");

    let (status, headers, _) = send(&app, "GET", "/cart", None, None).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location(&headers), "/login");

    let (status, body) = send_json(&app, "GET", "/admin", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], "admin");

    let (status, _) = send_json(&app, "GET", "/api/admin/users", Some(&till), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // fill the cart and check out
    let (_, body) = send_json(&app, "GET", "/api/products?q=apple", None, None).await?;
    let apple_id = body["data"][0]["id"].as_str().unwrap().to_string();

    for expected in ["added", "incremented"] {
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/cart",
            Some(&till),
            Some(json!({ "product_id": apple_id })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], expected);
    }

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/checkout",
        Some(&till),
        Some(json!({ "payment_method": "" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/checkout",
        Some(&till),
        Some(json!({ "payment_method": "cash" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sale"]["total"], "2000");
    let receipt_url = body["data"]["receipt_url"].as_str().unwrap().to_string();

    let (status, headers, bytes) = send(&app, "GET", &receipt_url, Some(&till), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert!(bytes.starts_with(b"%PDF-1.4"));

    let (_, body) =
        send_json(&app, "GET", &format!("/api/products/{apple_id}"), None, None).await?;
    assert_eq!(body["data"]["stock"], 98);

    let (status, body) = send_json(&app, "GET", "/api/cart", Some(&till), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item_count"], 0);

    // logging out ends the session behind the token
    let (status, _) = send_json(&app, "POST", "/api/auth/logout", Some(&till), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some(&till), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_reports_and_sales_search() -> anyhow::Result<()> {
    let app = app().await?;
    let admin = login(&app, "admin", "admin").await?;

    let (_, body) = send_json(&app, "GET", "/api/products?q=banana", None, None).await?;
    let banana_id = body["data"][0]["id"].as_str().unwrap().to_string();
    send_json(
        &app,
        "POST",
        "/api/cart",
        Some(&admin),
        Some(json!({ "product_id": banana_id })),
    )
    .await?;
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/checkout",
        Some(&admin),
        Some(json!({ "payment_method": "mobile" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send_json(&app, "GET", "/api/admin/sales?q=banana", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);

    let today = chrono::Utc::now().date_naive();
    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/admin/reports?type=monthly&start={today}"),
        Some(&admin),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_revenue"], "500");
    assert_eq!(body["data"]["frequency"][0]["product_name"], "Banana");

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/api/admin/reports?type=custom&start={today}"),
        Some(&admin),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, headers, bytes) = send(
        &app,
        "GET",
        &format!("/api/admin/reports/document?type=custom&start={today}&end={today}"),
        Some(&admin),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str()?;
    assert!(disposition.starts_with("attachment; filename=\"custom-sales-report-from-"));
    assert!(bytes.starts_with(b"%PDF-1.4"));

    let (status, body) = send_json(
        &app,
        "GET",
        "/api/admin/inventory/low-stock?threshold=60",
        Some(&admin),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Milk");
    Ok(())
}

#[tokio::test]
async fn expired_sessions_do_not_count_as_active() -> anyhow::Result<()> {
    let config = AppConfig {
        session_ttl_hours: -1,
        ..AppConfig::for_tests()
    };
    let app = create_router(AppState::bootstrap(config, None).await?);

    let mut tokens = Vec::new();
    for _ in 0..5 {
        tokens.push(login(&app, "admin", "admin").await?);
    }

    let (status, body) = send_json(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["active_sessions"], 0);

    let (status, _) = send_json(&app, "GET", "/api/auth/me", Some(&tokens[4]), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn product_writes_outside_column_bounds_are_rejected() -> anyhow::Result<()> {
    let app = app().await?;
    let token = login(&app, "admin", "admin").await?;

    for price in ["0.001", "10000000000", "50000000000000000000000000000"] {
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/products",
            Some(&token),
            Some(json!({ "name": "Gold", "category": "Bulk", "price": price, "stock": 1 })),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}: {body}");
    }

    let (_, products) = send_json(&app, "GET", "/api/products", None, None).await?;
    let id = products["data"][0]["id"].as_str().expect("product id").to_string();
    let stock_before = products["data"][0]["stock"].clone();

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/products/{id}/stock"),
        Some(&token),
        Some(json!({ "stock": 3_000_000_000u64 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, product) = send_json(&app, "GET", &format!("/api/products/{id}"), None, None).await?;
    assert_eq!(product["data"]["stock"], stock_before);
    assert_eq!(products["meta"]["total"], 3);
    Ok(())
}

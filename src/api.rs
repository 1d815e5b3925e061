// Dashboard HTTP surface - login, page collections and module operations

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    framework::{
        chart::ChartPoint,
        export::CsvExport,
        filter::FilterSpec,
        page::{PageDefinition, PageSchema},
        record::{display_value, Draft, RecordId},
    },
    infrastructure::{
        middleware::{
            auth_gate, clear_session_cookie_header, session_cookie_header, CurrentSession,
            LANDING_ROUTE, LOGIN_ROUTE,
        },
        session::{Credentials, Role},
    },
    schemas::{
        inventory::{self, InventorySchema, EXPIRY_WARNING_DAYS},
        manufacturing::{self, BomSchema},
        administration::{self, RolesSchema},
        ecommerce::{self, PosCartSchema, PosProductsSchema},
        project::{self, MessagesSchema, TasksSchema},
        security::{self, IpAllowlistSchema, IpRequestsSchema},
    },
};

/// Search term parameter; every other recognised parameter is a facet.
pub const SEARCH_PARAM: &str = "search";

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Authentication
        .route(LOGIN_ROUTE, get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/session", get(current_session))
        // Landing
        .route("/", get(|| async { Redirect::to(LANDING_ROUTE) }))
        .route(LANDING_ROUTE, get(dashboard))
        // Generic page collections
        .route("/api/pages", get(list_pages))
        .route("/api/pages/{slug}", get(page_view))
        .route("/api/pages/{slug}/records", post(create_record))
        .route(
            "/api/pages/{slug}/records/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/api/pages/{slug}/export", get(export_page))
        .route("/api/pages/{slug}/chart", get(page_chart))
        .route("/api/pages/{slug}/reset", post(reset_page))
        // Module operations
        .route("/api/inventory/expiring", get(expiring_items))
        .route("/api/inventory/{id}/adjust", post(adjust_stock))
        .route("/api/security/requests/{id}/approve", post(approve_request))
        .route("/api/security/requests/{id}/reject", post(reject_request))
        .route("/api/bom/{id}/components", post(add_component))
        .route("/api/bom/{id}/components/{component_id}", delete(remove_component))
        .route("/api/roles/{id}/permissions", post(toggle_permission))
        .route("/api/tasks/{id}/comments", post(add_comment))
        .route("/api/messages", post(post_message))
        .route("/api/pos/cart", post(add_to_cart))
        .route("/api/pos/cart/{id}", delete(remove_from_cart))
        .route("/api/pos/checkout", post(checkout))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate::<AppState>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Authentication handlers

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

async fn login_form() -> Json<Value> {
    Json(json!({
        "roles": Role::ALL,
        "default_role": Role::default(),
    }))
}

async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> AppResult<Response> {
    let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => role.parse::<Role>()?,
        None => Role::default(),
    };
    let credentials = Credentials {
        username: request.username,
        password: request.password,
    };

    let session = state.sessions.login(&credentials, role).await?;
    let cookie = session_cookie_header(&state.config.auth.session_cookie, &session.token);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "token": session.token,
            "username": session.username,
            "role": session.role,
            "redirect": LANDING_ROUTE,
        })),
    )
        .into_response())
}

async fn logout(State(state): State<AppState>, session: CurrentSession) -> Response {
    state.sessions.logout(&session.token).await;
    let cookie = clear_session_cookie_header(&state.config.auth.session_cookie);

    ([(header::SET_COOKIE, cookie)], Json(json!({ "redirect": LOGIN_ROUTE }))).into_response()
}

async fn current_session(session: CurrentSession) -> Json<Value> {
    Json(json!({
        "username": session.username,
        "role": session.current_role(),
        "authenticated_at": session.authenticated_at,
    }))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

// Dashboard and page handlers

async fn dashboard(State(state): State<AppState>, session: CurrentSession) -> AppResult<Json<Value>> {
    let spec = FilterSpec::new();
    let mut pages = Vec::with_capacity(state.workspace.pages().len());

    for page in state.workspace.pages() {
        let list = state.workspace.list(page.slug)?.read().await;
        pages.push(json!({
            "slug": page.slug,
            "title": page.title,
            "section": page.section,
            "records": list.len(),
            "summary": list.filter(&spec).aggregate(&page.metrics),
        }));
    }

    Ok(Json(json!({
        "username": session.username,
        "role": session.current_role(),
        "pages": pages,
    })))
}

async fn list_pages(State(state): State<AppState>) -> Json<Vec<PageDefinition>> {
    Json(state.workspace.pages().iter().map(|p| p.as_ref().clone()).collect())
}

/// Filter from query parameters; only declared facets are honoured.
fn filter_spec(page: &PageDefinition, params: &HashMap<String, String>) -> FilterSpec {
    let mut spec = FilterSpec::new();
    if let Some(term) = params.get(SEARCH_PARAM) {
        spec = spec.search(term);
    }
    for facet in &page.facets {
        if let Some(value) = params.get(facet) {
            spec = spec.facet(facet, value);
        }
    }
    spec
}

async fn page_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Value>> {
    let page = state.workspace.page(&slug)?;
    let list = state.workspace.list(&slug)?.read().await;
    let spec = filter_spec(&page, &params);
    let view = list.filter(&spec);

    debug!("{}: {} of {} records match {:?}", slug, view.len(), list.len(), spec);

    Ok(Json(json!({
        "page": page.as_ref(),
        "records": view.to_vec(),
        "shown": view.len(),
        "total": list.len(),
        "summary": view.aggregate(&page.metrics),
        "facets": page.facet_options(&list),
        "chart": page.chart.as_ref().map(|chart| view.chart(chart)),
    })))
}

async fn get_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, RecordId)>,
) -> AppResult<Json<Value>> {
    let list = state.workspace.list(&slug)?.read().await;
    let record = list
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", list.schema().entity, id)))?;

    Ok(Json(json!({
        "record": record,
        "draft": Draft::from_record(record),
    })))
}

async fn create_record(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let draft = Draft::from_value(body)?;
    let record = state.workspace.list(&slug)?.write().await.add(draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, RecordId)>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let draft = Draft::from_value(body)?;
    let record = state.workspace.list(&slug)?.write().await.update(id, draft)?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, RecordId)>,
) -> AppResult<StatusCode> {
    let mut list = state.workspace.list(&slug)?.write().await;
    if list.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("{} {} not found", list.schema().entity, id)))
    }
}

async fn export_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<CsvExport> {
    let page = state.workspace.page(&slug)?;
    let list = state.workspace.list(&slug)?.read().await;
    let spec = filter_spec(&page, &params);

    let content = list.filter(&spec).export_csv(&page.columns);
    Ok(CsvExport::new(page.export_filename, content))
}

async fn page_chart(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Vec<ChartPoint>>> {
    let page = state.workspace.page(&slug)?;
    let chart = page
        .chart
        .as_ref()
        .ok_or_else(|| AppError::NotFound(format!("Page '{}' has no chart", slug)))?;

    let list = state.workspace.list(&slug)?.read().await;
    let spec = filter_spec(&page, &params);
    Ok(Json(list.filter(&spec).chart(chart)))
}

async fn reset_page(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Json<Value>> {
    state.workspace.reset(&slug).await?;
    let records = state.workspace.list(&slug)?.read().await.len();
    Ok(Json(json!({ "slug": slug, "records": records })))
}

// Module operation handlers

#[derive(Debug, Deserialize)]
pub struct StockAdjustmentRequest {
    pub change: Value,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub module: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub product_id: RecordId,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(request): Json<StockAdjustmentRequest>,
) -> AppResult<impl IntoResponse> {
    let mut list = state.workspace.list(InventorySchema::slug())?.write().await;
    let today = Utc::now().date_naive();
    let record = inventory::adjust_stock(&mut list, id, &display_value(&request.change), &request.reason, today)?;
    Ok(Json(record))
}

async fn expiring_items(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Value>> {
    let days = query.days.unwrap_or(EXPIRY_WARNING_DAYS);
    let list = state.workspace.list(InventorySchema::slug())?.read().await;
    let count = inventory::expiring_within(list.records(), days, Utc::now().date_naive());
    Ok(Json(json!({ "days": days, "expiring": count })))
}

async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    // Requests before allow-list, always in this order.
    let mut requests = state.workspace.list(IpRequestsSchema::slug())?.write().await;
    let mut allowlist = state.workspace.list(IpAllowlistSchema::slug())?.write().await;
    let entry = security::approve_request(&mut requests, &mut allowlist, id)?;
    Ok(Json(entry))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<StatusCode> {
    let mut requests = state.workspace.list(IpRequestsSchema::slug())?.write().await;
    security::reject_request(&mut requests, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_component(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
    let draft = Draft::from_value(body)?;
    let mut list = state.workspace.list(BomSchema::slug())?.write().await;
    let record = manufacturing::add_component(&mut list, id, draft)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn remove_component(
    State(state): State<AppState>,
    Path((id, component_id)): Path<(RecordId, RecordId)>,
) -> AppResult<StatusCode> {
    let mut list = state.workspace.list(BomSchema::slug())?.write().await;
    if manufacturing::remove_component(&mut list, id, component_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Component {} not found on product {}",
            component_id, id
        )))
    }
}

async fn toggle_permission(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(request): Json<PermissionRequest>,
) -> AppResult<impl IntoResponse> {
    let mut list = state.workspace.list(RolesSchema::slug())?.write().await;
    let record = administration::toggle_permission(&mut list, id, &request.module)?;
    Ok(Json(record))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(request): Json<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    let mut list = state.workspace.list(TasksSchema::slug())?.write().await;
    let record = project::add_comment(&mut list, id, &request.text)?;
    Ok(Json(record))
}

async fn post_message(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<MessageRequest>,
) -> AppResult<impl IntoResponse> {
    let user = request
        .user
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| session.username.clone());

    let mut list = state.workspace.list(MessagesSchema::slug())?.write().await;
    let record = project::post_message(&mut list, &user, &request.text, Utc::now().naive_utc())?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn add_to_cart(
    State(state): State<AppState>,
    Json(request): Json<CartRequest>,
) -> AppResult<impl IntoResponse> {
    // Products before cart, always in this order.
    let mut products = state.workspace.list(PosProductsSchema::slug())?.write().await;
    let mut cart = state.workspace.list(PosCartSchema::slug())?.write().await;
    let line = ecommerce::add_to_cart(&mut products, &mut cart, request.product_id)?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn remove_from_cart(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> AppResult<StatusCode> {
    let mut products = state.workspace.list(PosProductsSchema::slug())?.write().await;
    let mut cart = state.workspace.list(PosCartSchema::slug())?.write().await;
    ecommerce::remove_from_cart(&mut products, &mut cart, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn checkout(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let mut cart = state.workspace.list(PosCartSchema::slug())?.write().await;
    let total = ecommerce::checkout(&mut cart)?;
    Ok(Json(json!({ "message": "Payment Successful!", "total": total })))
}

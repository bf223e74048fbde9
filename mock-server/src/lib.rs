use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A stored item: the JSON object the client posted plus a server-side id.
#[derive(Clone, Debug, Serialize)]
pub struct Item {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// What `/upload` saw in one multipart section.
#[derive(Clone, Debug, Serialize)]
pub struct UploadedPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub length: usize,
    pub text: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", get(echo).post(echo_body).delete(echo))
        .route("/upload", post(upload))
        .route("/items", post(create_item))
        .route("/items/{id}", get(get_item).delete(delete_item))
        .route("/empty", get(empty))
        .route("/array", get(array))
        .route("/text", get(text))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_object(headers: &HeaderMap) -> Map<String, Value> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect()
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "headers": header_object(&headers),
        "query": query,
    }))
}

async fn echo_body(method: Method, headers: HeaderMap, body: axum::body::Bytes) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({
        "method": method.as_str(),
        "content_type": content_type,
        "length": body.len(),
        "body": std::str::from_utf8(&body).ok(),
        "headers": header_object(&headers),
    }))
}

async fn upload(mut multipart: Multipart) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut parts = Vec::new();
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.body_text() }))))?;
        let Some(field) = field else { break };
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.body_text() }))))?;
        parts.push(UploadedPart {
            name,
            file_name,
            content_type,
            length: data.len(),
            text: String::from_utf8(data.to_vec()).ok(),
        });
    }
    Ok(Json(json!({ "parts": parts })))
}

async fn create_item(
    State(db): State<Db>,
    Json(fields): Json<Map<String, Value>>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        fields,
    };
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, (StatusCode, Json<Value>)> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut items = db.write().await;
    items
        .remove(&id)
        .map(|item| Json(json!({ "deleted": item.id })))
        .ok_or_else(not_found)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn array() -> Json<Value> {
    Json(json!([1, 2, 3]))
}

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "not json")
}

//! In-process mock of the MiniApp service for integration tests.
//!
//! Speaks the real envelope format, keeps albums and blueprints in memory,
//! and accepts presigned PUTs on `/storage/{name}`.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::Json;
use serde_json::{Map, Value, json};

pub const API_KEY: &str = "ma_test";
pub const CHARACTER_ID: &str = "char-1";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    base_url: String,
    requests: Vec<Recorded>,
    blueprint: Map<String, Value>,
    media: BTreeMap<String, Value>,
    /// (character id, media id, album id, created at) in insertion order.
    album: Vec<(String, String, String, i64)>,
    storage: BTreeMap<String, StoredObject>,
    next_id: u64,
}

type Shared = Arc<Mutex<Inner>>;

#[derive(Clone)]
pub struct MockService {
    pub base_url: String,
    inner: Shared,
}

impl MockService {
    /// Bind to an ephemeral port and serve on the current runtime.
    pub async fn start() -> Self {
        init_tracing();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let inner = Arc::new(Mutex::new(Inner {
            base_url: base_url.clone(),
            ..Inner::default()
        }));
        let app = router(Arc::clone(&inner));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, inner }
    }

    /// Serve from a dedicated runtime thread, for blocking-client tests.
    pub fn start_on_thread() -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                tx.send(Self::start().await).unwrap();
                std::future::pending::<()>().await;
            });
        });
        rx.recv().unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// `METHOD path` for every request, in arrival order.
    pub fn labels(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn stored(&self) -> BTreeMap<String, StoredObject> {
        self.inner.lock().unwrap().storage.clone()
    }

    /// Pre-populate the album with `count` image media, oldest first.
    pub fn seed_album(&self, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        for i in 0..count {
            let media_id = format!("seed-{i}");
            let url = format!("https://cdn.example/{media_id}.png");
            inner.media.insert(media_id.clone(), media_json(&media_id, "image", &url));
            let created_at = 1_700_000_000_000 + i64::try_from(i).unwrap();
            inner
                .album
                .push((CHARACTER_ID.to_owned(), media_id, format!("alb-seed-{i}"), created_at));
        }
    }
}

/// Route client logs to the test harness; `RUST_LOG=miniapp_client=debug`
/// shows every request.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/miniapp/character/blueprint", post(get_blueprint))
        .route("/miniapp/character/blueprint/state", post(upsert_state))
        .route("/miniapp/media/create", post(create_media))
        .route("/miniapp/media/album/add", post(album_add))
        .route("/miniapp/media/album/list", post(album_list))
        .route("/miniapp/assets/list", post(assets_list))
        .route("/miniapp/assets/types", get(assets_types))
        .route("/miniapp/files/presign/upload", post(presign))
        .route("/storage/{name}", put(store_object))
        .with_state(state)
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

fn fail(code: &str, message: &str) -> Json<Value> {
    Json(json!({"success": false, "error": {"code": code, "message": message}}))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Record the request and check the API key.
fn admit(
    inner: &mut Inner,
    method: &'static str,
    path: &str,
    headers: &HeaderMap,
    body: &Value,
) -> Result<(), Json<Value>> {
    let authorization = header_value(headers, header::AUTHORIZATION);
    inner.requests.push(Recorded {
        method,
        path: path.to_owned(),
        authorization: authorization.clone(),
        content_type: header_value(headers, header::CONTENT_TYPE),
        body: body.clone(),
        len: 0,
    });
    if authorization.as_deref() == Some(format!("ApiKey {API_KEY}").as_str()) {
        Ok(())
    } else {
        Err(fail("A000401", "Invalid API key"))
    }
}

fn media_json(media_id: &str, kind: &str, url: &str) -> Value {
    let payload = match kind {
        "video" => json!({"videoUrl": url}),
        "audio" => json!({"audioUrl": url}),
        _ => json!({"imageUrl": url}),
    };
    json!({"mediaId": media_id, "kind": kind, "payload": payload, "createdAt": 1_700_000_000_000_i64})
}

fn character_json(blueprint: &Map<String, Value>) -> Value {
    json!({
        "character": {
            "id": CHARACTER_ID,
            "profile": {
                "id": CHARACTER_ID,
                "userId": "user-1",
                "profileName": "Nova",
                "username": "nova",
                "avatar": "https://cdn.example/nova.png",
                "identityCard": {"occupation": "cartographer"},
                "followersCount": 12
            },
            "blueprint": blueprint
        }
    })
}

async fn get_blueprint(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/character/blueprint", &headers, &body) {
        return e;
    }
    if body["characterId"] != CHARACTER_ID {
        return fail("A000404", "Character not found");
    }
    ok(character_json(&inner.blueprint))
}

async fn upsert_state(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/character/blueprint/state", &headers, &body) {
        return e;
    }
    if body["characterId"] != CHARACTER_ID {
        return fail("A000404", "Character not found");
    }
    let Value::Object(fields) = body else {
        return fail("A000422", "Body must be an object");
    };
    for (key, value) in fields {
        if key == "characterId" {
            continue;
        }
        if value.is_null() {
            inner.blueprint.remove(&key);
        } else {
            inner.blueprint.insert(key, value);
        }
    }
    ok(character_json(&inner.blueprint))
}

async fn create_media(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/media/create", &headers, &body) {
        return e;
    }
    let Some(url) = body["url"].as_str() else {
        return fail("A000422", "url is required");
    };
    let kind = body["kind"].as_str().unwrap_or("image");
    inner.next_id += 1;
    let media_id = format!("m-{}", inner.next_id);
    let media = media_json(&media_id, kind, url);
    inner.media.insert(media_id, media.clone());
    ok(json!({"media": media}))
}

async fn album_add(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/media/album/add", &headers, &body) {
        return e;
    }
    let character_id = body["characterId"].as_str().unwrap_or_default().to_owned();
    let media_id = body["mediaId"].as_str().unwrap_or_default().to_owned();
    if !inner.media.contains_key(&media_id) {
        return fail("A000404", "Media not found");
    }
    if let Some((owner, _, album_id, _)) = inner.album.iter().find(|(_, m, _, _)| *m == media_id) {
        return if *owner == character_id {
            ok(json!({"albumId": album_id}))
        } else {
            fail("A000409", "Media already belongs to another album")
        };
    }
    inner.next_id += 1;
    let album_id = format!("alb-{}", inner.next_id);
    let created_at = 1_800_000_000_000 + i64::try_from(inner.next_id).unwrap();
    inner
        .album
        .push((character_id, media_id, album_id.clone(), created_at));
    ok(json!({"albumId": album_id}))
}

/// Newest-first slice of `items` starting at the offset encoded in `cursor`.
fn paginate(items: Vec<Value>, seek: &Value) -> (Vec<Value>, Value) {
    let limit = usize::try_from(seek["limit"].as_u64().unwrap_or(20)).unwrap();
    let start: usize = seek["cursor"]
        .as_str()
        .and_then(|c| c.strip_prefix("off-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let end = (start + limit).min(items.len());
    let page = items.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();
    let next = if end < items.len() {
        json!({"cursor": format!("off-{end}"), "hasMore": true})
    } else {
        Value::Null
    };
    (page, next)
}

async fn album_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/media/album/list", &headers, &body) {
        return e;
    }
    let character_id = body["characterId"].as_str().unwrap_or_default();
    let items: Vec<Value> = inner
        .album
        .iter()
        .rev()
        .filter(|(owner, _, _, _)| owner == character_id)
        .map(|(_, media_id, _, created_at)| {
            json!({"media": inner.media.get(media_id), "createdAt": created_at})
        })
        .collect();
    let (items, next) = paginate(items, &body["seek"]);
    ok(json!({"items": items, "next": next}))
}

fn asset_json(i: usize, kind: &str) -> Value {
    json!({
        "id": format!("asset-{i}"),
        "media": media_json(&format!("am-{i}"), "image", &format!("https://cdn.example/asset-{i}.png")),
        "objectName": format!("assets/{i}.png"),
        "name": format!("Asset {i}"),
        "type": kind,
        "username": "nova"
    })
}

async fn assets_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/assets/list", &headers, &body) {
        return e;
    }
    let filter = body["type"].as_str();
    let all: Vec<Value> = (0..5)
        .map(|i| asset_json(i, if i % 2 == 0 { "Outfit" } else { "Item" }))
        .filter(|a| filter.is_none_or(|t| a["type"] == t))
        .collect();
    let (items, next) = paginate(all, &body);
    let total = items.len();
    ok(json!({"items": items, "next": next, "total": total}))
}

async fn assets_types(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "GET", "/miniapp/assets/types", &headers, &Value::Null) {
        return e;
    }
    ok(json!({"types": ["Outfit", "Item"]}))
}

async fn presign(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    if let Err(e) = admit(&mut inner, "POST", "/miniapp/files/presign/upload", &headers, &body) {
        return e;
    }
    let Some(filename) = body["filename"].as_str() else {
        return fail("A000422", "filename is required");
    };
    let base = inner.base_url.clone();
    ok(json!({
        "presignedUrl": format!("{base}/storage/{filename}?sig=abc"),
        "fileUrl": format!("https://cdn.example/{filename}")
    }))
}

/// Presigned PUT target. Names containing `reject` simulate an expired URL.
async fn store_object(
    State(state): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let mut inner = state.lock().unwrap();
    let content_type = header_value(&headers, header::CONTENT_TYPE);
    inner.requests.push(Recorded {
        method: "PUT",
        path: format!("/storage/{name}"),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: content_type.clone(),
        body: Value::Null,
        len: body.len(),
    });
    if name.contains("reject") {
        return StatusCode::FORBIDDEN;
    }
    inner.storage.insert(
        name,
        StoredObject {
            content_type,
            bytes: body.to_vec(),
        },
    );
    StatusCode::OK
}

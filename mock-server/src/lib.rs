use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
}

struct Account {
    id: Uuid,
    password: String,
}

/// Accounts, issued tokens and each user's notes.
#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    notes: HashMap<String, HashMap<Uuid, Note>>,
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, detail: &str) -> Rejection {
    (status, Json(json!({ "detail": detail })))
}

/// Router with the single demo account.
pub fn app() -> Router {
    app_with_users(&[(DEMO_EMAIL, DEMO_PASSWORD)])
}

pub fn app_with_users(users: &[(&str, &str)]) -> Router {
    let mut store = Store::default();
    for (email, password) in users {
        store.accounts.insert(
            email.to_string(),
            Account {
                id: Uuid::new_v4(),
                password: password.to_string(),
            },
        );
    }
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the bearer token to the account email.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    store
        .tokens
        .get(token)
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

fn require_title(input: &NoteInput) -> Result<String, Rejection> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Title must not be empty"));
    }
    Ok(title.to_string())
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Rejection> {
    let mut store = db.write().await;
    let valid = store
        .accounts
        .get(&input.email)
        .is_some_and(|account| account.password == input.password);
    if !valid {
        warn!(email = %input.email, "rejected login");
        return Err(reject(StatusCode::UNAUTHORIZED, "Incorrect email or password"));
    }
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), input.email.clone());
    info!(email = %input.email, "issued token");
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Profile>, Rejection> {
    let store = db.read().await;
    let email = authenticate(&store, &headers)?;
    let account = store
        .accounts
        .get(&email)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    Ok(Json(Profile {
        id: account.id,
        email,
    }))
}

async fn list_notes(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Note>>, Rejection> {
    let store = db.read().await;
    let email = authenticate(&store, &headers)?;
    let notes = store
        .notes
        .get(&email)
        .map(|notes| notes.values().cloned().collect())
        .unwrap_or_default();
    Ok(Json(notes))
}

async fn create_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NoteInput>,
) -> Result<(StatusCode, Json<Note>), Rejection> {
    let mut store = db.write().await;
    let email = authenticate(&store, &headers)?;
    let title = require_title(&input)?;
    let now = Utc::now();
    let note = Note {
        id: Uuid::new_v4(),
        title,
        content: input.content.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    store
        .notes
        .entry(email)
        .or_default()
        .insert(note.id, note.clone());
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<NoteInput>,
) -> Result<Json<Note>, Rejection> {
    let mut store = db.write().await;
    let email = authenticate(&store, &headers)?;
    let title = require_title(&input)?;
    let note = store
        .notes
        .get_mut(&email)
        .and_then(|notes| notes.get_mut(&id))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Note not found"))?;
    note.title = title;
    note.content = input.content.unwrap_or_default();
    note.updated_at = Utc::now();
    Ok(Json(note.clone()))
}

async fn delete_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let email = authenticate(&store, &headers)?;
    store
        .notes
        .get_mut(&email)
        .and_then(|notes| notes.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Note not found"))
}

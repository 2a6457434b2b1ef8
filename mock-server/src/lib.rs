use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MailingList {
    pub id: u64,
    pub name: String,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub reply_to: Option<String>,
}

#[derive(Deserialize)]
pub struct NewList {
    pub name: String,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub reply_to: Option<String>,
}

#[derive(Deserialize)]
pub struct ListUpdate {
    pub name: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub reply_to: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Subscribed,
    Unsubscribed,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Subscriber {
    pub list_id: u64,
    pub email: String,
    pub name: Option<String>,
    pub status: SubscriberStatus,
}

#[derive(Deserialize)]
pub struct SubscriberData {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct Subscribe {
    pub subscriber_data: SubscriberData,
}

#[derive(Deserialize)]
pub struct Unsubscribe {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: u64,
    pub title: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct NewCampaign {
    pub title: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    pub id: u64,
    pub domain: String,
}

#[derive(Deserialize)]
pub struct NewDomain {
    pub domain: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    lists: BTreeMap<u64, MailingList>,
    subscribers: BTreeMap<(u64, String), Subscriber>,
    campaigns: BTreeMap<u64, Campaign>,
    domains: BTreeMap<u64, Domain>,
}

impl Store {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Behaviour knobs for the mock API.
#[derive(Clone, Debug)]
pub struct MockOptions {
    /// Value the `key` header must carry.
    pub api_key: String,
    /// Requests accepted before every further one gets 429.
    pub rate_limit: Option<u32>,
}

impl MockOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            rate_limit: None,
        }
    }

    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = Some(limit);
        self
    }
}

#[derive(Clone)]
struct AppState {
    options: Arc<MockOptions>,
    served: Arc<AtomicU32>,
    db: Db,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"})))
}

pub fn app(options: MockOptions) -> Router {
    let state = AppState {
        options: Arc::new(options),
        served: Arc::new(AtomicU32::new(0)),
        db: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/lists", get(list_lists).post(create_list))
        .route("/lists/{list_id}", get(show_list).put(update_list))
        .route("/lists/{list_id}/subscribers", get(list_subscribers))
        .route("/lists/{list_id}/subscriber/{email}", get(get_subscriber))
        .route("/lists/{list_id}/subscribe", post(subscribe))
        .route("/lists/{list_id}/unsubscribe", delete(unsubscribe))
        .route("/subscribers/{email}", get(subscriber_lists))
        .route("/subscribers/{email}/delete", delete(delete_subscriber))
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaign/{campaign_id}/send", get(send_campaign))
        .route("/domains", get(list_domains).post(create_domain))
        .route("/domains/{id}", delete(delete_domain))
        .fallback(|| async { not_found() })
        .layer(middleware::from_fn_with_state(state.clone(), guard))
        .with_state(state)
}

pub async fn run(listener: TcpListener, options: MockOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app(options)).await
}

/// Key check and rate limiting, in that order.
async fn guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    debug!(method = %request.method(), uri = %request.uri(), "mock request");

    let key = request.headers().get("key").and_then(|v| v.to_str().ok());
    if key != Some(state.options.api_key.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"}))).into_response();
    }

    let served = state.served.fetch_add(1, Ordering::SeqCst);
    if state.options.rate_limit.is_some_and(|limit| served >= limit) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"message": "Too Many Attempts."})),
        )
            .into_response();
    }

    next.run(request).await
}

// --- lists ---

async fn list_lists(State(state): State<AppState>) -> Json<Vec<MailingList>> {
    let db = state.db.read().await;
    Json(db.lists.values().cloned().collect())
}

async fn create_list(
    State(state): State<AppState>,
    Json(input): Json<NewList>,
) -> (StatusCode, Json<MailingList>) {
    let mut db = state.db.write().await;
    let list = MailingList {
        id: db.allocate_id(),
        name: input.name,
        from_name: input.from_name,
        from_email: input.from_email,
        reply_to: input.reply_to,
    };
    db.lists.insert(list.id, list.clone());
    (StatusCode::CREATED, Json(list))
}

async fn show_list(State(state): State<AppState>, Path(list_id): Path<u64>) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    let list = db.lists.get(&list_id).ok_or_else(not_found)?;
    let members = db.subscribers.values().filter(|s| s.list_id == list_id);
    let (subscribed, unsubscribed) = members.fold((0, 0), |(on, off), s| match s.status {
        SubscriberStatus::Subscribed => (on + 1, off),
        SubscriberStatus::Unsubscribed => (on, off + 1),
    });
    Ok(Json(json!({
        "list": list,
        "subscribers": {"subscribed": subscribed, "unsubscribed": unsubscribed},
    })))
}

async fn update_list(
    State(state): State<AppState>,
    Path(list_id): Path<u64>,
    Json(input): Json<ListUpdate>,
) -> ApiResult<Json<MailingList>> {
    let mut db = state.db.write().await;
    let list = db.lists.get_mut(&list_id).ok_or_else(not_found)?;
    if let Some(name) = input.name {
        list.name = name;
    }
    if input.from_name.is_some() {
        list.from_name = input.from_name;
    }
    if input.from_email.is_some() {
        list.from_email = input.from_email;
    }
    if input.reply_to.is_some() {
        list.reply_to = input.reply_to;
    }
    Ok(Json(list.clone()))
}

// --- subscribers ---

async fn list_subscribers(
    State(state): State<AppState>,
    Path(list_id): Path<u64>,
) -> ApiResult<Json<Vec<Subscriber>>> {
    let db = state.db.read().await;
    if !db.lists.contains_key(&list_id) {
        return Err(not_found());
    }
    Ok(Json(
        db.subscribers
            .values()
            .filter(|s| s.list_id == list_id)
            .cloned()
            .collect(),
    ))
}

async fn get_subscriber(
    State(state): State<AppState>,
    Path((list_id, email)): Path<(u64, String)>,
) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    let subscriber = db.subscribers.get(&(list_id, email)).ok_or_else(not_found)?;
    Ok(Json(json!({"subscriber": subscriber})))
}

async fn subscribe(
    State(state): State<AppState>,
    Path(list_id): Path<u64>,
    Json(input): Json<Subscribe>,
) -> ApiResult<Json<Subscriber>> {
    let mut db = state.db.write().await;
    if !db.lists.contains_key(&list_id) {
        return Err(not_found());
    }
    let data = input.subscriber_data;
    let subscriber = Subscriber {
        list_id,
        email: data.email.clone(),
        name: data.name,
        status: SubscriberStatus::Subscribed,
    };
    db.subscribers.insert((list_id, data.email), subscriber.clone());
    Ok(Json(subscriber))
}

async fn unsubscribe(
    State(state): State<AppState>,
    Path(list_id): Path<u64>,
    Json(input): Json<Unsubscribe>,
) -> ApiResult<Json<Subscriber>> {
    let mut db = state.db.write().await;
    let subscriber = db
        .subscribers
        .get_mut(&(list_id, input.email))
        .ok_or_else(not_found)?;
    subscriber.status = SubscriberStatus::Unsubscribed;
    Ok(Json(subscriber.clone()))
}

async fn subscriber_lists(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    let db = state.db.read().await;
    let memberships: Vec<&Subscriber> = db.subscribers.values().filter(|s| s.email == email).collect();
    if memberships.is_empty() {
        return Err(not_found());
    }
    Ok(Json(json!({"email": email, "lists": memberships})))
}

async fn delete_subscriber(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let before = db.subscribers.len();
    db.subscribers.retain(|(_, e), _| *e != email);
    let deleted = before - db.subscribers.len();
    if deleted == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({"deleted": deleted})))
}

// --- campaigns ---

async fn list_campaigns(State(state): State<AppState>) -> Json<Vec<Campaign>> {
    let db = state.db.read().await;
    Json(db.campaigns.values().cloned().collect())
}

async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<NewCampaign>,
) -> (StatusCode, Json<Campaign>) {
    let mut db = state.db.write().await;
    let campaign = Campaign {
        id: db.allocate_id(),
        title: input.title,
        status: "draft".to_string(),
    };
    db.campaigns.insert(campaign.id, campaign.clone());
    (StatusCode::CREATED, Json(campaign))
}

async fn send_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    let campaign = db.campaigns.get_mut(&campaign_id).ok_or_else(not_found)?;
    campaign.status = "queued".to_string();
    Ok(Json(json!({"status": "queued"})))
}

// --- domains ---

async fn list_domains(State(state): State<AppState>) -> Json<Vec<Domain>> {
    let db = state.db.read().await;
    Json(db.domains.values().cloned().collect())
}

async fn create_domain(
    State(state): State<AppState>,
    Json(input): Json<NewDomain>,
) -> (StatusCode, Json<Domain>) {
    let mut db = state.db.write().await;
    let domain = Domain {
        id: db.allocate_id(),
        domain: input.domain,
    };
    db.domains.insert(domain.id, domain.clone());
    (StatusCode::CREATED, Json(domain))
}

async fn delete_domain(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let mut db = state.db.write().await;
    db.domains.remove(&id).ok_or_else(not_found)?;
    Ok(Json(json!({"deleted": id})))
}

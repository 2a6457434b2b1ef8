use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Campaign, MailingList, MockOptions, Subscriber, SubscriberStatus};
use serde_json::Value;
use tower::ServiceExt;

const KEY: &str = "test-key";

fn mock() -> Router {
    app(MockOptions::new(KEY))
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("key", KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("key", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth and limits ---

#[tokio::test]
async fn missing_key_returns_401() {
    let resp = mock()
        .oneshot(Request::builder().uri("/lists").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_key_returns_401() {
    let resp = mock()
        .oneshot(
            Request::builder()
                .uri("/lists")
                .header("key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_returns_429_after_budget() {
    let app = app(MockOptions::new(KEY).with_rate_limit(1));
    let first = app.clone().oneshot(request("GET", "/lists")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.oneshot(request("GET", "/lists")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let resp = mock().oneshot(request("GET", "/nowhere")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "not found");
}

// --- lists ---

#[tokio::test]
async fn list_lists_empty() {
    let resp = mock().oneshot(request("GET", "/lists")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let lists: Vec<MailingList> = body_json(resp).await;
    assert!(lists.is_empty());
}

#[tokio::test]
async fn create_list_returns_201() {
    let resp = mock()
        .oneshot(json_request("POST", "/lists", r#"{"name":"Newsletter"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let list: MailingList = body_json(resp).await;
    assert_eq!(list.name, "Newsletter");
    assert_eq!(list.id, 1);
}

#[tokio::test]
async fn create_list_malformed_json_returns_422() {
    let resp = mock()
        .oneshot(json_request("POST", "/lists", r#"{"title":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn show_list_not_found() {
    let resp = mock().oneshot(request("GET", "/lists/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn show_list_bad_id_returns_400() {
    let resp = mock().oneshot(request("GET", "/lists/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- domains ---

#[tokio::test]
async fn delete_missing_domain_returns_404_body() {
    let resp = mock().oneshot(request("DELETE", "/domains/3")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"error":"not found"}"#);
}

// --- full lifecycle ---

#[tokio::test]
async fn subscriber_lifecycle() {
    let app = mock();

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/lists", r#"{"name":"Weekly"}"#))
        .await
        .unwrap();
    let list: MailingList = body_json(resp).await;
    let id = list.id;

    // subscribe
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/lists/{id}/subscribe"),
            r#"{"subscriber_data":{"email":"a@b.com","name":"Ann"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let subscriber: Subscriber = body_json(resp).await;
    assert_eq!(subscriber.status, SubscriberStatus::Subscribed);

    // lookup in list
    let resp = app
        .clone()
        .oneshot(request("GET", &format!("/lists/{id}/subscriber/a@b.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["subscriber"]["name"], "Ann");

    // unsubscribe carries a body on DELETE
    let resp = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/lists/{id}/unsubscribe"),
            r#"{"email":"a@b.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let subscriber: Subscriber = body_json(resp).await;
    assert_eq!(subscriber.status, SubscriberStatus::Unsubscribed);

    // list summary counts the unsubscribed member
    let resp = app.clone().oneshot(request("GET", &format!("/lists/{id}"))).await.unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["subscribers"]["subscribed"], 0);
    assert_eq!(body["subscribers"]["unsubscribed"], 1);

    // global delete
    let resp = app
        .clone()
        .oneshot(request("DELETE", "/subscribers/a@b.com/delete"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(request("GET", "/subscribers/a@b.com")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn campaign_send_is_a_get() {
    let app = mock();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/campaigns", r#"{"title":"Spring"}"#))
        .await
        .unwrap();
    let campaign: Campaign = body_json(resp).await;
    assert_eq!(campaign.status, "draft");

    let resp = app
        .clone()
        .oneshot(request("GET", &format!("/campaign/{}/send", campaign.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "queued");

    let resp = app.oneshot(request("GET", "/campaigns")).await.unwrap();
    let campaigns: Vec<Campaign> = body_json(resp).await;
    assert_eq!(campaigns[0].status, "queued");
}

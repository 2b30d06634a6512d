//! Relay endpoint tests.
//!
//! The router is driven with `oneshot`; both providers are stood in for by a
//! wiremock server.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cinemate::config::Config;
use cinemate::server::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TMDB_KEY: &str = "tmdb-test-key";
const CHAT_KEY: &str = "sk-or-test";

fn app(upstream: &str, tmdb_key: Option<&str>, chat_key: Option<&str>) -> Router {
    let mut config = Config::default();
    config.tmdb.api_key = tmdb_key.map(str::to_string);
    config.tmdb.base_url = format!("{}/3", upstream);
    config.openrouter.api_key = chat_key.map(str::to_string);
    config.openrouter.base_url = format!("{}/api/v1", upstream);
    config.upstream.timeout_secs = 5;

    let state = AppState::from_config(config, CancellationToken::new()).unwrap();
    build_router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn movie_page() -> Value {
    json!({
        "page": 1,
        "results": [
            {"id": 278, "title": "The Shawshank Redemption", "overview": "Imprisoned in the 1940s...",
             "poster_path": "/q6y0Go1tsGEsmtFryDOJo3dEmqu.jpg", "release_date": "1994-09-23",
             "vote_average": 8.7}
        ],
        "total_pages": 500,
        "total_results": 10000
    })
}

async fn assert_no_calls(server: &MockServer) {
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "unexpected upstream calls: {}", requests.len());
}

#[tokio::test]
async fn test_missing_keys_never_call_upstream() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let (status, body) = get(app(&uri, None, None), "/api/trending").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Missing TMDB API key"}));

    let (status, body) = get(app(&uri, None, None), "/api/top-rated").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Missing TMDB API key"}));

    let (status, body) = get(app(&uri, None, None), "/api/movie/550").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Missing TMDB API key"}));

    let (status, body) = post_json(
        app(&uri, None, None),
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "hi"}]}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Missing OpenRouter API key"}));

    assert_no_calls(&server).await;
}

#[tokio::test]
async fn test_trending_success_is_verbatim() {
    let server = MockServer::start().await;
    let raw = movie_page().to_string();
    Mock::given(method("GET"))
        .and(path("/3/trending/movie/week"))
        .and(query_param("api_key", TMDB_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_raw(raw.clone(), "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/trending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, raw.into_bytes());
}

#[tokio::test]
async fn test_top_rated_query_and_idempotence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .and(query_param("api_key", TMDB_KEY))
        .and(query_param("language", "en-US"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_page()))
        .expect(2)
        .mount(&server)
        .await;

    let router = app(&server.uri(), Some(TMDB_KEY), None);
    let (first_status, first) = get(router.clone(), "/api/top-rated").await;
    let (second_status, second) = get(router, "/api/top-rated").await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(json_of(&first)["results"][0]["id"], 278);
}

#[tokio::test]
async fn test_upstream_status_is_mirrored() {
    let server = MockServer::start().await;
    let rejection = json!({"success": false, "status_code": 7, "status_message": "Invalid API key"});
    Mock::given(method("GET"))
        .and(path("/3/trending/movie/week"))
        .respond_with(ResponseTemplate::new(401).set_body_json(rejection.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/movie/top_rated"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"status_code": 25})))
        .mount(&server)
        .await;

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/trending").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(&body), json!({ "error": rejection }));

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/top-rated").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_of(&body), json!({"error": {"status_code": 25}}));
}

#[tokio::test]
async fn test_transport_failures_are_500() {
    // Nothing listens on port 1.
    let dead = "http://127.0.0.1:1";

    let (status, body) = get(app(dead, Some(TMDB_KEY), None), "/api/trending").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Failed to fetch trending movies"}));

    let (status, body) = get(app(dead, Some(TMDB_KEY), None), "/api/top-rated").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Failed to fetch movies"}));

    let (status, body) = post_json(
        app(dead, None, Some(CHAT_KEY)),
        "/api/chat",
        json!({"messages": []}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_non_json_upstream_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/top-rated").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body), json!({"error": "Failed to fetch movies"}));
}

#[tokio::test]
async fn test_chat_forwards_messages_verbatim() {
    let server = MockServer::start().await;
    let messages = json!([
        {"role": "system", "content": "You are a helpful AI movie expert."},
        {"role": "user", "content": "Recommend a thriller"}
    ]);
    let completion = json!({
        "id": "gen-1",
        "choices": [{"message": {"role": "assistant", "content": "Try Se7en"}}]
    });
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(bearer_token(CHAT_KEY))
        .and(body_json(json!({
            "model": "mistralai/mistral-7b-instruct",
            "messages": messages.clone()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post_json(
        app(&server.uri(), None, Some(CHAT_KEY)),
        "/api/chat",
        json!({ "messages": messages }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, completion);
}

#[tokio::test]
async fn test_chat_upstream_rejection() {
    let server = MockServer::start().await;
    let rejection = json!({"error": {"message": "No auth credentials found", "code": 401}});
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(rejection.clone()))
        .mount(&server)
        .await;

    let (status, body) = post_json(
        app(&server.uri(), None, Some(CHAT_KEY)),
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "hi"}]}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": rejection }));
}

#[tokio::test]
async fn test_chat_body_not_json() {
    let server = MockServer::start().await;

    let (status, body) = post_json(
        app(&server.uri(), None, Some(CHAT_KEY)),
        "/api/chat",
        "not json".to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));

    assert_no_calls(&server).await;
}

#[tokio::test]
async fn test_chat_body_without_messages_is_forwarded() {
    let server = MockServer::start().await;
    let rejection = json!({"error": {"message": "messages is required", "code": 400}});
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(body_json(json!({
            "model": "mistralai/mistral-7b-instruct",
            "messages": null
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(rejection.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post_json(
        app(&server.uri(), None, Some(CHAT_KEY)),
        "/api/chat",
        json!({"prompt": "hi"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": rejection }));
}

async fn mount_movie(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/3/movie/{id}")))
        .and(query_param("api_key", TMDB_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 807, "title": "Se7en", "runtime": 127, "vote_average": 8.4,
            "overview": "Two homicide detectives...", "poster_path": "/se7en.jpg",
            "genres": [{"id": 80, "name": "Crime"}, {"id": 53, "name": "Thriller"}]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/3/movie/{id}/credits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 807,
            "cast": [{"id": 287, "name": "Brad Pitt", "character": "David Mills"}]
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/3/movie/{id}/videos")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"type": "Trailer", "site": "YouTube", "key": "znmZoVkCjpI"}]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_movie_partial_aggregate() {
    let server = MockServer::start().await;
    mount_movie(&server, "807").await;
    Mock::given(method("GET"))
        .and(path("/3/movie/807/reviews"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"status_code": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/movie/807").await;
    assert_eq!(status, StatusCode::OK);

    let body = json_of(&body);
    assert_eq!(body["id"], "807");
    assert_eq!(body["details"]["title"], "Se7en");
    assert_eq!(body["credits"]["cast"][0]["name"], "Brad Pitt");
    assert_eq!(body["videos"]["results"][0]["key"], "znmZoVkCjpI");
    assert_eq!(body["reviews"], Value::Null);
    assert_eq!(body["errors"]["reviews"]["status"], 503);
    assert!(body["errors"].get("details").is_none());
}

#[tokio::test]
async fn test_movie_unknown_id_mirrors_upstream() {
    let server = MockServer::start().await;
    let not_found = json!({"success": false, "status_code": 34,
        "status_message": "The resource you requested could not be found."});
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found.clone()))
        .expect(4)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server.uri(), Some(TMDB_KEY), None), "/api/movie/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body), json!({ "error": not_found }));
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let router = app("http://127.0.0.1:1", None, None);
    let (status, body) = get(router.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Healthy");

    let (status, _) = get(router, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

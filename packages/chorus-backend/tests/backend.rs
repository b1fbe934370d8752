use std::{
	future::IntoFuture,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use chorus_backend::{ElasticsearchClient, Error, SearchRequest};
use chorus_config::{Backend, BackendAuth};

#[derive(Clone, Default)]
struct Captured {
	bodies: Arc<Mutex<Vec<Value>>>,
	authorization: Arc<Mutex<Vec<String>>>,
}

async fn start_search_server(captured: Captured) -> (String, Sender<()>) {
	let app = Router::new()
		.route("/articles/_search", routing::post(search_handler))
		.route("/broken/_search", routing::post(broken_handler))
		.with_state(captured);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind search server.");
	let addr = listener.local_addr().expect("Failed to read search server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn search_handler(
	State(captured): State<Captured>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	if let Some(value) = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) {
		captured.authorization.lock().unwrap_or_else(|err| err.into_inner()).push(value.to_string());
	}

	captured.bodies.lock().unwrap_or_else(|err| err.into_inner()).push(payload);

	Json(serde_json::json!({
		"took": 1,
		"hits": {
			"total": { "value": 2, "relation": "eq" },
			"hits": [{ "_id": "doc1" }, { "_id": "doc2" }]
		},
		"aggregations": { "agg_terms_tag": { "buckets": [{ "key": "a", "doc_count": 2 }] } }
	}))
}

async fn broken_handler() -> impl IntoResponse {
	(StatusCode::BAD_REQUEST, "parsing_exception: unknown query [matchh]")
}

fn backend_config(url: String, auth: Option<BackendAuth>) -> Backend {
	Backend {
		url,
		index: "articles".to_string(),
		r#type: None,
		timeout_ms: 5_000,
		auth,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_api_key_auth_header() {
	let auth = BackendAuth { username: None, password: None, api_key: Some("secret".to_string()) };
	let headers =
		chorus_backend::auth_headers(Some(&auth), &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "ApiKey secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut default_headers = Map::new();

	default_headers.insert("x-retries".to_string(), Value::from(3));

	let err = chorus_backend::auth_headers(None, &default_headers)
		.expect_err("Expected invalid header config.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn posts_body_and_parses_response() {
	let captured = Captured::default();
	let (url, shutdown) = start_search_server(captured.clone()).await;
	let client = ElasticsearchClient::new(&backend_config(url, None)).expect("Client failed.");
	let body = serde_json::json!({ "query": { "match": { "title": "foo" } }, "size": 10 });
	let response = client
		.search(&SearchRequest::new("articles", None, body.clone()))
		.await
		.expect("Search failed.");

	assert_eq!(response.hits.total_value(), 2);
	assert_eq!(response.hits.hits[0]["_id"], "doc1");
	assert!(response.aggregations.is_some());
	assert_eq!(*captured.bodies.lock().expect("lock"), vec![body]);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn sends_basic_auth_when_configured() {
	let captured = Captured::default();
	let (url, shutdown) = start_search_server(captured.clone()).await;
	let auth = BackendAuth {
		username: Some("elastic".to_string()),
		password: Some("changeme".to_string()),
		api_key: None,
	};
	let client =
		ElasticsearchClient::new(&backend_config(url, Some(auth))).expect("Client failed.");

	client
		.search(&SearchRequest::new("articles", None, serde_json::json!({})))
		.await
		.expect("Search failed.");

	let authorization = captured.authorization.lock().expect("lock").clone();

	assert_eq!(authorization.len(), 1);
	assert!(authorization[0].starts_with("Basic "), "Unexpected header: {}", authorization[0]);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn non_success_status_is_an_error() {
	let (url, shutdown) = start_search_server(Captured::default()).await;
	let client = ElasticsearchClient::new(&backend_config(url, None)).expect("Client failed.");
	let err = client
		.search(&SearchRequest::new("broken", None, serde_json::json!({})))
		.await
		.expect_err("Expected status error.");

	match err {
		Error::Status { status, message } => {
			assert_eq!(status, 400);
			assert!(message.contains("parsing_exception"));
		},
		other => panic!("Unexpected error: {other:?}"),
	}

	let _ = shutdown.send(());
}

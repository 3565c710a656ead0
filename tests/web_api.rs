// JSON API tests — drive the router in-process with tower's oneshot.
#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sieve::classify::model::ClassifierModel;
use sieve::classify::pipeline::{LabelMap, SpamPipeline};
use sieve::classify::tfidf::TfidfVectorizer;
use sieve::posters::traits::{NoPosterLookup, PosterLookup};
use sieve::recommend::catalog::{Catalog, SimilarityMatrix};
use sieve::recommend::resolver::ResolverConfig;
use sieve::recommend::Recommender;
use sieve::text::normalize::Normalizer;
use sieve::web::{build_router, AppState};

fn spam_pipeline() -> SpamPipeline {
    let vocabulary: HashMap<String, usize> = [("free", 0), ("prize", 1), ("lunch", 2)]
        .into_iter()
        .map(|(t, i)| (t.to_string(), i))
        .collect();
    let vectorizer = TfidfVectorizer::new(vocabulary, vec![1.0, 1.0, 1.0]).unwrap();
    let model = ClassifierModel::Linear {
        classes: vec![0, 1],
        coef: vec![vec![2.0, 2.0, -3.0]],
        intercept: vec![-0.5],
    };
    SpamPipeline::new(
        Normalizer::default(),
        Box::new(vectorizer),
        Box::new(model),
        LabelMap::default(),
    )
    .unwrap()
}

fn recommender() -> Recommender {
    let catalog = Catalog::new(["Avatar", "Spectre", "Skyfall", "Up"]);
    let matrix = SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.1, 0.2, 0.4],
        vec![0.1, 1.0, 0.9, 0.0],
        vec![0.2, 0.9, 1.0, 0.1],
        vec![0.4, 0.0, 0.1, 1.0],
    ])
    .unwrap();
    Recommender::new(catalog, matrix, ResolverConfig::default()).unwrap()
}

/// Posters for titles starting with "S"; nothing for the rest.
struct FakePosters;

#[async_trait]
impl PosterLookup for FakePosters {
    async fn poster_url(&self, title: &str) -> Option<String> {
        title
            .starts_with('S')
            .then(|| format!("https://posters.test/{title}.jpg"))
    }
}

fn full_state() -> AppState {
    AppState {
        spam: Some(Arc::new(spam_pipeline())),
        recommender: Some(Arc::new(recommender())),
        posters: Arc::new(FakePosters),
    }
}

fn empty_state() -> AppState {
    AppState {
        spam: None,
        recommender: None,
        posters: Arc::new(NoPosterLookup),
    }
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok_without_artifacts() {
    let (status, body) = send(empty_state(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn predict_returns_label_and_normalized_text() {
    let (status, body) = send(
        full_state(),
        post_json("/api/predict", serde_json::json!({"text": "FREE prize!!!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "spam");
    assert_eq!(body["class"], 1);
    assert_eq!(body["normalized"], "free prize");

    let (_, body) = send(
        full_state(),
        post_json("/api/predict", serde_json::json!({"text": "lunch?"})),
    )
    .await;
    assert_eq!(body["label"], "not_spam");
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let (status, body) = send(
        empty_state(),
        post_json("/api/predict", serde_json::json!({"text": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("sieve download"));
}

#[tokio::test]
async fn recommend_returns_ranked_titles() {
    let (status, body) = send(full_state(), get("/api/recommend?title=spectre&count=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"]["title"], "Spectre");
    assert_eq!(body["tier"], "exact");

    let titles: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Skyfall", "Avatar"]);
}

#[tokio::test]
async fn recommend_reports_fuzzy_ratio() {
    let (status, body) = send(full_state(), get("/api/recommend?title=Skyfll")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"]["title"], "Skyfall");
    assert_eq!(body["tier"], "fuzzy");
    assert!(body["ratio"].as_f64().unwrap() > 0.9);
    // Default count of five is clamped to the three other titles
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn recommend_unknown_title_is_not_found() {
    let (status, body) = send(full_state(), get("/api/recommend?title=qqqqqqqqqqqq")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn recommend_without_title_is_a_json_bad_request() {
    let (status, body) = send(full_state(), get("/api/recommend?count=3")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn recommend_with_posters_attaches_urls() {
    let (status, body) = send(
        full_state(),
        get("/api/recommend?title=Avatar&count=3&posters=true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"]["title"], "Avatar");

    let items = body["recommendations"].as_array().unwrap();
    assert_eq!(items[0]["title"], "Up");
    assert!(items[0]["poster_url"].is_null());
    assert_eq!(items[1]["title"], "Skyfall");
    assert_eq!(items[1]["poster_url"], "https://posters.test/Skyfall.jpg");
}

#[tokio::test]
async fn titles_lists_and_filters_catalog() {
    let (status, body) = send(full_state(), get("/api/titles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["titles"].as_array().unwrap().len(), 4);

    let (_, body) = send(full_state(), get("/api/titles?search=SK&limit=10")).await;
    let titles = body["titles"].as_array().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["title"], "Skyfall");
    assert_eq!(titles[0]["index"], 2);
}

#[tokio::test]
async fn recommender_routes_without_artifacts_are_unavailable() {
    let (status, _) = send(empty_state(), get("/api/recommend?title=Up")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = send(empty_state(), get("/api/titles")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

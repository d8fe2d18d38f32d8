//! End-to-end tests for the curation engine API
//!
//! Drives the full workflow over HTTP against an in-memory database and a
//! stub classifier: catalog import, content admission with dedup, candidate
//! scoring, auto-linking, curator review, and coverage reporting.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use cradle_curation::services::{Classify, ClassifierError, ClassifyRequest, RelevanceRating};
use cradle_curation::AppState;

/// Deterministic classifier: content mentioning the milestone's first title
/// word rates 5, everything else rates 1.
struct KeywordClassifier;

#[async_trait::async_trait]
impl Classify for KeywordClassifier {
    async fn classify(&self, request: &ClassifyRequest) -> Result<RelevanceRating, ClassifierError> {
        let keyword = request
            .milestone_title
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();

        let score = if !keyword.is_empty() && request.content_text.to_lowercase().contains(&keyword)
        {
            5
        } else {
            1
        };

        Ok(RelevanceRating {
            score,
            reasoning: format!("keyword match on '{}'", keyword),
        })
    }
}

/// Test helper: create test app with in-memory database
async fn create_test_app() -> (Router, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    cradle_curation::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let state = AppState::new(pool.clone(), Arc::new(KeywordClassifier));
    (cradle_curation::build_router(state), pool)
}

async fn request_json(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    request_json(app, "GET", path, None).await
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    request_json(app, "POST", path, Some(body)).await
}

/// Seed two milestones and two content units, returning the "Rolls over"
/// milestone id and the admitted unit ids (relevant quiz, unrelated topic).
async fn seed_catalog_and_content(app: &Router) -> (String, String, String) {
    let (status, _) = post(
        app,
        "/api/milestones/import",
        json!({
            "milestones": [
                {
                    "title": "Rolls over in both directions",
                    "description": "Rolls from tummy to back and back to tummy",
                    "category": "motor",
                    "target_month": 6,
                    "source": "CDC"
                },
                {
                    "title": "Responds to own name",
                    "description": "Turns head when name is called",
                    "category": "social",
                    "target_month": 9
                }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, milestones) = get(app, "/api/milestones?category=motor").await;
    assert_eq!(status, StatusCode::OK);
    let milestone_id = milestones[0]["id"].as_str().unwrap().to_string();

    let (status, quiz) = post(
        app,
        "/api/content",
        json!({
            "kind": "quiz",
            "domain": "newborn_care",
            "week": 24,
            "text": "Has your baby started to rolls over during tummy time?",
            "classification": {"source": "rule"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let quiz_id = quiz["id"].as_str().unwrap().to_string();

    let (status, topic) = post(
        app,
        "/api/content",
        json!({
            "kind": "topic",
            "domain": "nutrition",
            "week": 24,
            "text": "Introducing iron-rich solid foods at six months",
            "classification": {"source": "manual"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let topic_id = topic["id"].as_str().unwrap().to_string();

    (milestone_id, quiz_id, topic_id)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = create_test_app().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cradle-curation");
}

#[tokio::test]
async fn test_score_link_verify_pipeline() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    // Score both active units against the motor milestone
    let (status, summary) = post(
        &app,
        "/api/score",
        json!({"milestone_id": milestone_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["scored"], 2);
    assert_eq!(summary["skipped"], 0);

    // Threshold 4 promotes only the relevant quiz (scored 5, not 1)
    let (status, summary) = post(&app, "/api/link/auto", json!({"threshold": 4})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_mappings"], 1);
    assert_eq!(summary["considered_pairs"], 1);

    let (status, mappings) = get(&app, "/api/mappings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mappings.as_array().unwrap().len(), 1);

    let mapping = &mappings[0];
    assert_eq!(mapping["anchor"]["milestone"].as_str().unwrap(), milestone_id);
    assert_eq!(mapping["content"]["quiz"].as_str().unwrap(), quiz_id);
    assert_eq!(mapping["weight"], 1.0); // 5 / 5.0
    assert_eq!(mapping["is_auto_generated"], true);
    assert!(mapping["verification"].is_null());

    // Re-running the linker creates nothing new
    let (status, summary) = post(&app, "/api/link/auto", json!({"threshold": 4})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_mappings"], 0);

    // Curator approves
    let mapping_id = mapping["id"].as_str().unwrap();
    let (status, verified) = post(
        &app,
        &format!("/api/mappings/{}/verify", mapping_id),
        json!({"curator": "reviewer-1", "notes": "good match"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["verification"]["verified_by"], "reviewer-1");
    assert_eq!(verified["notes"], "good match");

    let (status, verified_list) = get(&app, "/api/mappings?verified=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified_list.as_array().unwrap().len(), 1);

    let (_, pending_list) = get(&app, "/api/mappings?verified=false").await;
    assert_eq!(pending_list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_scoring_is_idempotent_across_runs() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    let (_, first) = post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    assert_eq!(first["scored"], 2);

    // Cached scores are skipped on the second run
    let (_, second) = post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    assert_eq!(second["scored"], 0);
    assert_eq!(second["skipped"], 2);

    // force_refresh re-rates everything
    let (_, third) = post(
        &app,
        "/api/score",
        json!({"milestone_id": milestone_id, "force_refresh": true}),
    )
    .await;
    assert_eq!(third["scored"], 2);
}

#[tokio::test]
async fn test_score_unknown_milestone_is_404() {
    let (app, _pool) = create_test_app().await;

    let (status, body) = post(
        &app,
        "/api/score",
        json!({"milestone_id": uuid::Uuid::new_v4()}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_content_is_rejected() {
    let (app, _pool) = create_test_app().await;

    let (status, _) = post(
        &app,
        "/api/content",
        json!({
            "kind": "topic",
            "domain": "nutrition",
            "week": 12,
            "text": "Folic acid matters in the first trimester",
            "classification": {"source": "rule"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same text modulo case and whitespace, same domain: rejected
    let (status, body) = post(
        &app,
        "/api/content",
        json!({
            "kind": "topic",
            "domain": "nutrition",
            "week": 30,
            "text": "  Folic   ACID matters in the first\ttrimester ",
            "classification": {"source": "manual"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Same text in a different domain is admitted
    let (status, _) = post(
        &app,
        "/api/content",
        json!({
            "kind": "topic",
            "domain": "warning_signs",
            "week": 12,
            "text": "Folic acid matters in the first trimester",
            "classification": {"source": "rule"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rejection_preserves_score_for_relink() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    post(&app, "/api/link/auto", json!({"threshold": 4})).await;

    let (_, mappings) = get(&app, "/api/mappings").await;
    let mapping_id = mappings[0]["id"].as_str().unwrap().to_string();

    // Curator rejects the mapping
    let (status, _) = request_json(
        &app,
        "DELETE",
        &format!("/api/mappings/{}", mapping_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mappings) = get(&app, "/api/mappings").await;
    assert_eq!(mappings.as_array().unwrap().len(), 0);

    // The score survived the rejection, so a re-run recreates the link
    let (_, summary) = post(&app, "/api/link/auto", json!({"threshold": 4})).await;
    assert_eq!(summary["total_mappings"], 1);
}

#[tokio::test]
async fn test_manual_mapping_validation() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, quiz_id, topic_id) = seed_catalog_and_content(&app).await;

    // Kind mismatch: the unit is a quiz, referenced as a topic
    let (status, body) = post(
        &app,
        "/api/mappings",
        json!({"milestone_id": milestone_id, "topic_id": quiz_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Both content references at once
    let (status, _) = post(
        &app,
        "/api/mappings",
        json!({"milestone_id": milestone_id, "quiz_id": quiz_id, "topic_id": topic_id}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown milestone
    let (status, _) = post(
        &app,
        "/api/mappings",
        json!({"milestone_id": uuid::Uuid::new_v4(), "quiz_id": quiz_id}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Valid manual link, anchored on a maternal domain
    let (status, mapping) = post(
        &app,
        "/api/mappings",
        json!({"domain": "nutrition", "topic_id": topic_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mapping["weight"], 1.0);
    assert_eq!(mapping["is_auto_generated"], false);

    // Identical manual link again: idempotent, same row
    let (status, again) = post(
        &app,
        "/api/mappings",
        json!({"domain": "nutrition", "topic_id": topic_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], mapping["id"]);
}

#[tokio::test]
async fn test_batch_verify_reports_per_id_outcomes() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, topic_id) = seed_catalog_and_content(&app).await;

    post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    post(&app, "/api/link/auto", json!({"threshold": 4})).await;
    post(
        &app,
        "/api/mappings",
        json!({"domain": "nutrition", "topic_id": topic_id}),
    )
    .await;

    let (_, mappings) = get(&app, "/api/mappings").await;
    let mut ids: Vec<String> = mappings
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    ids.push(uuid::Uuid::new_v4().to_string()); // unknown id

    let (status, outcomes) = post(
        &app,
        "/api/mappings/verify-batch",
        json!({"ids": ids, "curator": "reviewer-2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let outcomes = outcomes.as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["verified"], true);
    assert_eq!(outcomes[1]["verified"], true);
    assert_eq!(outcomes[2]["verified"], false);
    assert!(outcomes[2]["error"].as_str().unwrap().contains("not found"));

    // The unknown id did not prevent the real ones from verifying
    let (_, verified) = get(&app, "/api/mappings?verified=true").await;
    assert_eq!(verified.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_curation_view_buckets_and_filter() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    post(&app, "/api/link/auto", json!({"threshold": 4})).await;

    let (status, view) = get(&app, "/api/curation/view").await;
    assert_eq!(status, StatusCode::OK);
    let buckets = view.as_array().unwrap();
    assert_eq!(buckets.len(), 6);

    // Both milestones (target months 6 and 9) fall in the 4-6 and 7-12 buckets
    let bucket_4_6 = &buckets[1];
    assert_eq!(bucket_4_6["min_month"], 4);
    assert_eq!(bucket_4_6["milestones"].as_array().unwrap().len(), 1);

    let entry = &bucket_4_6["milestones"][0];
    assert_eq!(entry["milestone"]["id"].as_str().unwrap(), milestone_id);
    assert_eq!(entry["linked"].as_array().unwrap().len(), 1);
    // The linked quiz must not reappear as a candidate
    assert_eq!(entry["candidates"].as_array().unwrap().len(), 0);

    let bucket_7_12 = &buckets[2];
    assert_eq!(bucket_7_12["milestones"].as_array().unwrap().len(), 1);

    // Category filter narrows entries; the bucket set is unchanged
    let (status, filtered) = get(&app, "/api/curation/view?category=motor").await;
    assert_eq!(status, StatusCode::OK);
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 6);
    assert_eq!(filtered[1]["milestones"].as_array().unwrap().len(), 1);
    assert_eq!(filtered[2]["milestones"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_coverage_and_stats_reports() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    post(&app, "/api/score", json!({"milestone_id": milestone_id})).await;
    post(&app, "/api/link/auto", json!({"threshold": 4})).await;

    let (status, stats) = get(&app, "/api/curation/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_milestones"], 2);
    assert_eq!(stats["total_mappings"], 1);
    assert_eq!(stats["auto_generated"], 1);
    assert_eq!(stats["verified"], 0);
    assert_eq!(stats["pending_review"], 1);
    assert_eq!(stats["verification_rate"], 0);

    // Verify the one mapping and re-check
    let (_, mappings) = get(&app, "/api/mappings").await;
    let mapping_id = mappings[0]["id"].as_str().unwrap();
    post(
        &app,
        &format!("/api/mappings/{}/verify", mapping_id),
        json!({"curator": "reviewer-1"}),
    )
    .await;

    let (_, stats) = get(&app, "/api/curation/stats").await;
    assert_eq!(stats["verified"], 1);
    assert_eq!(stats["pending_review"], 0);
    assert_eq!(stats["verification_rate"], 100);

    // Motor: 1 of 1 milestones covered; social: 0 of 1
    let (status, coverage) = get(&app, "/api/coverage/categories").await;
    assert_eq!(status, StatusCode::OK);
    let coverage = coverage.as_array().unwrap();
    assert_eq!(coverage.len(), 6);
    assert_eq!(coverage[0]["category"], "motor");
    assert_eq!(coverage[0]["coverage_pct"], 100);
    assert_eq!(coverage[3]["category"], "social");
    assert_eq!(coverage[3]["coverage_pct"], 0);

    // All six fixed domains are reported, counted from admitted units
    let (status, domains) = get(&app, "/api/coverage/domains").await;
    assert_eq!(status, StatusCode::OK);
    let domains = domains.as_array().unwrap();
    assert_eq!(domains.len(), 6);
    let nutrition = domains
        .iter()
        .find(|d| d["domain"] == "nutrition")
        .unwrap();
    assert_eq!(nutrition["content_units"], 1);
}

#[tokio::test]
async fn test_deactivated_milestone_leaves_catalog_views() {
    let (app, _pool) = create_test_app().await;
    let (milestone_id, _quiz_id, _topic_id) = seed_catalog_and_content(&app).await;

    let (status, _) = post(
        &app,
        &format!("/api/milestones/{}/deactivate", milestone_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = get(&app, "/api/milestones").await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    // Deactivation hides, never deletes
    let (_, all) = get(&app, "/api/milestones?include_inactive=true").await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

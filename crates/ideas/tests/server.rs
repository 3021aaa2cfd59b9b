use async_trait::async_trait;
use axum::{
  body::{to_bytes, Body},
  http::{header, Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use ideas::models::{
  ClusterConfig, CriterionScore, EvaluationCriteria, IdeaCluster, IdeaEvaluation,
  SingleClusterSuggestion, SuggestionType,
};
use ideas::server::services::{AnalystError, ExistingCluster, IdeaAnalyst, IdeaBrief};
use ideas::server::{create_router, AppState};

/// Scores every idea 7 unless its title mentions "fail"
struct StubAnalyst;

#[async_trait]
impl IdeaAnalyst for StubAnalyst {
  async fn evaluate(
    &self,
    idea: &IdeaBrief,
    criteria: &EvaluationCriteria,
  ) -> Result<IdeaEvaluation, AnalystError> {
    if idea.title.contains("fail") {
      return Err(AnalystError::request("model unavailable"));
    }
    let score = |question: &str| CriterionScore { score: 7.0, reasoning: question.to_string() };
    Ok(IdeaEvaluation {
      summary: format!("Evaluated {}", idea.title),
      desirability: score(&criteria.desirability),
      feasibility: score(&criteria.feasibility),
      viability: score(&criteria.viability),
    })
  }

  async fn cluster(
    &self,
    ideas: &[IdeaBrief],
    config: &ClusterConfig,
  ) -> Result<Vec<IdeaCluster>, AnalystError> {
    Ok(vec![IdeaCluster {
      cluster_name: "Everything".to_string(),
      cluster_description: config.clustering_basis().to_string(),
      idea_ids: ideas.iter().map(|i| i.id.clone()).collect(),
    }])
  }

  async fn classify(
    &self,
    _idea: &IdeaBrief,
    existing: &[ExistingCluster],
  ) -> Result<SingleClusterSuggestion, AnalystError> {
    Ok(match existing.first() {
      Some(cluster) => SingleClusterSuggestion {
        reasoning: format!("Fits with {}", cluster.titles.join(", ")),
        suggestion_type: SuggestionType::ExistingCluster,
        cluster_name: cluster.name.clone(),
      },
      None => SingleClusterSuggestion {
        reasoning: "Nothing similar yet".to_string(),
        suggestion_type: SuggestionType::NewCluster,
        cluster_name: "Fresh".to_string(),
      },
    })
  }
}

/// Never answers, like a model call that outlives the client
struct StalledAnalyst;

#[async_trait]
impl IdeaAnalyst for StalledAnalyst {
  async fn evaluate(
    &self,
    _idea: &IdeaBrief,
    _criteria: &EvaluationCriteria,
  ) -> Result<IdeaEvaluation, AnalystError> {
    std::future::pending().await
  }

  async fn cluster(
    &self,
    _ideas: &[IdeaBrief],
    _config: &ClusterConfig,
  ) -> Result<Vec<IdeaCluster>, AnalystError> {
    std::future::pending().await
  }

  async fn classify(
    &self,
    _idea: &IdeaBrief,
    _existing: &[ExistingCluster],
  ) -> Result<SingleClusterSuggestion, AnalystError> {
    std::future::pending().await
  }
}

fn app() -> Router {
  create_router(AppState::new(Arc::new(StubAnalyst)))
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, body)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  read(app.clone().oneshot(request).await.unwrap()).await
}

async fn upload(app: &Router, file_name: &str, content: &str) -> (StatusCode, Value) {
  let boundary = "IDEAS-TEST-BOUNDARY";
  let body = format!(
    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
     Content-Type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
  );
  let request = Request::builder()
    .method("POST")
    .uri("/api/ideas/upload")
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
    .body(Body::from(body))
    .unwrap();
  read(app.clone().oneshot(request).await.unwrap()).await
}

async fn create(app: &Router, title: &str) -> String {
  let (status, idea) =
    call(app, "POST", "/api/ideas", Some(json!({"title": title, "description": "desc"}))).await;
  assert_eq!(status, StatusCode::OK);
  idea["id"].as_str().unwrap().to_string()
}

async fn create_published(app: &Router, title: &str) -> String {
  let id = create(app, title).await;
  let (status, _) = call(app, "POST", &format!("/api/ideas/{id}/publish"), None).await;
  assert_eq!(status, StatusCode::OK);
  id
}

#[tokio::test]
async fn test_status_counts_ideas() {
  let app = app();
  create(&app, "A").await;

  let (status, body) = call(&app, "GET", "/api/status", None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["ideas"], 1);
}

#[tokio::test]
async fn test_idea_lifecycle() {
  let app = app();
  let id = create(&app, "Garden robot").await;

  let (_, draft) = call(&app, "GET", &format!("/api/ideas/{id}"), None).await;
  assert_eq!(draft["status"], "DRAFT");
  assert_eq!(draft["votes"], 0);

  let (status, _) = call(&app, "POST", &format!("/api/ideas/{id}/vote"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  call(&app, "POST", &format!("/api/ideas/{id}/publish"), None).await;
  call(&app, "POST", &format!("/api/ideas/{id}/vote"), None).await;
  let (status, voted) = call(&app, "POST", &format!("/api/ideas/{id}/vote"), None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(voted["status"], "PUBLISHED");
  assert_eq!(voted["votes"], 2);
}

#[tokio::test]
async fn test_put_cannot_move_backwards() {
  let app = app();
  let id = create_published(&app, "A").await;
  let uri = format!("/api/ideas/{id}");

  let (status, _) = call(&app, "PUT", &uri, Some(json!({"status": "DRAFT"}))).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, updated) =
    call(&app, "PUT", &uri, Some(json!({"title": "B", "votes": 3}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["title"], "B");
  assert_eq!(updated["votes"], 3);

  let (status, body) = call(&app, "PUT", &uri, Some(json!({"votes": 1}))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["detail"].as_str().unwrap().contains("cannot decrease"));
}

#[tokio::test]
async fn test_unknown_idea_is_404() {
  let app = app();

  let (status, body) = call(&app, "DELETE", "/api/ideas/missing", None).await;

  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["detail"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_delete_removes_idea() {
  let app = app();
  let id = create(&app, "A").await;

  let (status, body) = call(&app, "DELETE", &format!("/api/ideas/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Idea deleted successfully");

  let (_, list) = call(&app, "GET", "/api/ideas", None).await;
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_upload_csv_creates_drafts() {
  let app = app();
  let csv = "title,description\n\"Idea A\",\"Desc, with comma\"\n,\"No title\"\nIdea B,Plain";

  let (status, body) = upload(&app, "ideas.csv", csv).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Successfully uploaded 2 ideas");
  let (_, list) = call(&app, "GET", "/api/ideas", None).await;
  let titles: Vec<&str> =
    list.as_array().unwrap().iter().map(|i| i["title"].as_str().unwrap()).collect();
  assert_eq!(titles, vec!["Idea A", "Idea B"]);
  assert!(list.as_array().unwrap().iter().all(|i| i["status"] == "DRAFT"));
}

#[tokio::test]
async fn test_upload_errors_are_400() {
  let app = app();

  let (status, body) = upload(&app, "ideas.csv", "title,summary\nA,B").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["detail"].as_str().unwrap().contains("'title' and 'description'"));

  let (status, _) = upload(&app, "ideas.xlsx", "whatever").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, list) = call(&app, "GET", "/api/ideas", None).await;
  assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_evaluate_uses_saved_criteria() {
  let app = app();
  let id = create_published(&app, "Garden robot").await;
  call(
    &app,
    "POST",
    "/api/evaluation-criteria",
    Some(json!({"desirability": "Do gardeners want it?", "feasibility": "f", "viability": "v"})),
  )
  .await;

  let (status, body) =
    call(&app, "POST", "/api/ideas/evaluate", Some(json!({"idea_ids": [id]}))).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Successfully evaluated 1 ideas");
  let (_, idea) = call(&app, "GET", &format!("/api/ideas/{id}"), None).await;
  assert_eq!(idea["is_evaluating"], false);
  assert_eq!(idea["evaluation"]["desirability"]["reasoning"], "Do gardeners want it?");
  assert_eq!(idea["evaluation"]["viability"]["score"], 7.0);
}

#[tokio::test]
async fn test_failed_evaluation_stores_nothing() {
  let app = app();
  let good = create_published(&app, "Good idea").await;
  let bad = create_published(&app, "Doomed to fail").await;

  let (status, body) =
    call(&app, "POST", "/api/ideas/evaluate", Some(json!({"idea_ids": [good, bad]}))).await;

  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["detail"].as_str().unwrap().contains("model unavailable"));
  let (_, list) = call(&app, "GET", "/api/ideas", None).await;
  for idea in list.as_array().unwrap() {
    assert_eq!(idea["is_evaluating"], false);
    assert!(idea.get("evaluation").is_none());
  }
}

#[tokio::test]
async fn test_cluster_validation() {
  let app = app();

  let config = json!({"numberOfClusters": 3, "clusteringBasis": "audience"});
  let (status, body) = call(&app, "POST", "/api/ideas/cluster", Some(config)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["detail"], "No ideas found to cluster");

  create(&app, "A").await;
  let config = json!({"numberOfClusters": 11, "clusteringBasis": "audience"});
  let (status, _) = call(&app, "POST", "/api/ideas/cluster", Some(config)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cluster_save_classify_and_clear() {
  let app = app();
  let first = create_published(&app, "Lamp").await;
  let config = json!({"numberOfClusters": 2, "clusteringBasis": "room"});

  let (status, clusters) = call(&app, "POST", "/api/ideas/cluster", Some(config)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(clusters[0]["clusterName"], "Everything");
  assert_eq!(clusters[0]["ideaIds"], json!([first]));

  let (_, saved) = call(&app, "POST", "/api/ideas/save-clusters", Some(clusters)).await;
  assert_eq!(saved["message"], "Successfully saved clusters for 1 ideas");

  let second = create_published(&app, "Desk").await;
  let (status, suggestion) =
    call(&app, "POST", &format!("/api/ideas/{second}/classify"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(suggestion["suggestionType"], "EXISTING_CLUSTER");
  assert_eq!(suggestion["reasoning"], "Fits with Lamp");

  let (_, classified) = call(
    &app,
    "POST",
    &format!("/api/ideas/{second}/apply-classification"),
    Some(suggestion),
  )
  .await;
  assert_eq!(classified["cluster_name"], "Everything");
  assert_eq!(classified["is_classifying"], false);

  let (_, cleared) = call(&app, "DELETE", "/api/ideas/clusters", None).await;
  assert_eq!(cleared["message"], "All clusters cleared successfully");
  let (_, list) = call(&app, "GET", "/api/ideas", None).await;
  assert!(list.as_array().unwrap().iter().all(|i| i.get("cluster_name").is_none()));
}

#[tokio::test]
async fn test_criteria_start_empty() {
  let app = app();

  let (status, body) = call(&app, "GET", "/api/evaluation-criteria", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, Value::Null);

  let criteria = json!({"desirability": "d", "feasibility": "f", "viability": "v"});
  let (_, saved) = call(&app, "POST", "/api/evaluation-criteria", Some(criteria)).await;
  assert_eq!(saved["id"], 1);

  let (_, body) = call(&app, "GET", "/api/evaluation-criteria", None).await;
  assert_eq!(body["viability"], "v");
}

#[tokio::test]
async fn test_abandoned_evaluation_resets_flags() {
  let state = AppState::new(Arc::new(StalledAnalyst));
  let app = create_router(state.clone());
  let id = create_published(&app, "Slow idea").await;

  let request = Request::post("/api/ideas/evaluate")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(json!({"idea_ids": [id]}).to_string()))
    .unwrap();
  let pending = app.clone().oneshot(request);
  assert!(tokio::time::timeout(Duration::from_millis(200), pending).await.is_err());
  tokio::task::yield_now().await;

  let idea = state.repo.read().await.get(&id).unwrap();
  assert!(!idea.is_evaluating);
  assert!(idea.evaluation.is_none());
}

#[tokio::test]
async fn test_abandoned_classification_resets_flag() {
  let state = AppState::new(Arc::new(StalledAnalyst));
  let app = create_router(state.clone());
  let id = create(&app, "Slow idea").await;

  let request =
    Request::post(format!("/api/ideas/{id}/classify")).body(Body::empty()).unwrap();
  let pending = app.clone().oneshot(request);
  assert!(tokio::time::timeout(Duration::from_millis(200), pending).await.is_err());
  tokio::task::yield_now().await;

  assert!(!state.repo.read().await.get(&id).unwrap().is_classifying);

  let (_, idea) = call(&app, "GET", &format!("/api/ideas/{id}"), None).await;
  assert_eq!(idea["is_classifying"], false);
}

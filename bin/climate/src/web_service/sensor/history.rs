use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::web_service::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize)]
pub struct HistoryQuery {
    limit: Option<String>,
}

impl HistoryQuery {
    // zero, negative and non-numeric limits fall back to the default
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|limit| limit.trim().parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT)
    }
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let readings = state.ingest.recent(query.limit()).await;

    Json(json!({
        "success": true,
        "count": readings.len(),
        "data": readings,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::web_service::testing::*;

    async fn temperatures(app: &TestApp, uri: &str) -> (Vec<f64>, u64) {
        let body = json_body(app.get(uri).await).await;

        let temperatures = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|reading| reading["temperature"].as_f64().unwrap())
            .collect();

        (temperatures, body["count"].as_u64().unwrap())
    }

    #[tokio::test]
    async fn test_limit() {
        let app = TestApp::new();
        for i in 0..15 {
            app.ingest(json!({ "temperatura": i, "timestamp": 1000 + i }))
                .await;
        }

        // capacity of the test app is 10
        let (all, count) = temperatures(&app, "/api/sensor-history").await;
        assert_eq!(all, (5..15).map(f64::from).collect::<Vec<_>>());
        assert_eq!(count, 10);

        let (last, count) = temperatures(&app, "/api/sensor-history?limit=3").await;
        assert_eq!(last, vec![12.0, 13.0, 14.0]);
        assert_eq!(count, 3);

        let (fallback, _) = temperatures(&app, "/api/sensor-history?limit=abc").await;
        assert_eq!(fallback.len(), 10);

        let (fallback, _) = temperatures(&app, "/api/sensor-history?limit=0").await;
        assert_eq!(fallback.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let app = TestApp::new();
        let body = json_body(app.get("/api/sensor-history?limit=5").await).await;

        assert_eq!(
            body,
            json!({ "success": true, "data": Value::Array(vec![]), "count": 0 })
        );
    }
}

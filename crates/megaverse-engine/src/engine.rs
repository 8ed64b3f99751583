//! Megaverse reconciliation engine
//!
//! The goal grid is loaded once and read-only afterwards. The remote grid is
//! never mirrored: reads re-fetch it and writes are fire-and-forget calls.

use crate::diff::{diff_grids, Mismatch};
use megaverse_client::{HttpExecutor, RequestClient, RetryPolicy};
use megaverse_core::{
    is_space, parse_token, Goal, GoalResponse, MapResponse, MegaverseConfig, MegaverseError,
    ObjectKind, ObjectRequest, Placement, Position, RemoteGrid, Result,
};
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

/// Outcome counts of a batch of placements or removals
///
/// Failures are also logged as they happen; the counts only summarise them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Calls issued
    pub attempted: usize,
    /// Calls (or tokens) that failed
    pub failed: usize,
    /// Cells left alone because they could not be decoded
    pub skipped: usize,
}

impl ReconcileReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Grid reconciliation engine bound to one candidate
pub struct Megaverse<E: HttpExecutor> {
    client: RequestClient<E>,
    base_url: String,
    candidate_id: String,
    goal: OnceCell<Goal>,
}

impl<E: HttpExecutor> Megaverse<E> {
    pub fn new(
        client: RequestClient<E>,
        base_url: impl Into<String>,
        candidate_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            candidate_id: candidate_id.into(),
            goal: OnceCell::new(),
        }
    }

    /// Build an engine from validated configuration
    pub fn from_config(executor: E, config: &MegaverseConfig) -> Result<Self> {
        config.validate()?;
        let client = RequestClient::with_policy(executor, RetryPolicy::from(&config.retry));
        Ok(Self::new(client, &config.base_url, config.candidate_id()?))
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    /// Load the goal grid if it has not been loaded yet
    ///
    /// Callers treat an error here as fatal: nothing else can run without a goal.
    pub async fn initialize(&self) -> Result<&Goal> {
        self.goal
            .get_or_try_init(|| async {
                let goal = self.fetch_goal().await?;
                info!("Megaverse goal loaded ({} rows)", goal.rows().len());
                Ok::<_, MegaverseError>(goal)
            })
            .await
    }

    /// The loaded goal grid
    pub fn goal(&self) -> Result<&Goal> {
        self.goal.get().ok_or(MegaverseError::NotInitialized)
    }

    async fn fetch_goal(&self) -> Result<Goal> {
        let url = format!("{}/map/{}/goal", self.base_url, self.candidate_id);
        let response: GoalResponse = self.client.get_json(&url).await.map_err(|e| {
            error!("Error fetching goal map: {}", e);
            e
        })?;
        response.into_goal()
    }

    /// Decode a symbolic token into a placement
    pub fn parse_token(&self, token: &str, position: Position) -> Result<Placement> {
        parse_token(token, position)
    }

    /// Create one object; failures are logged, never returned
    ///
    /// Returns whether the call succeeded.
    pub async fn place(&self, placement: &Placement) -> bool {
        let kind = placement.kind();
        let position = placement.position;
        log_action("Set", kind, position);

        let url = self.object_url(kind);
        let body = ObjectRequest::for_placement(&self.candidate_id, placement);
        match self.client.post(&url, &body).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Error setting astral object: {} at position {}: {}",
                    kind, position, e
                );
                false
            }
        }
    }

    /// Delete the object of `kind` at `position`; failures are logged, never returned
    ///
    /// Returns whether the call succeeded.
    pub async fn remove(&self, kind: ObjectKind, position: Position) -> bool {
        log_action("Delete", kind, position);

        let url = self.object_url(kind);
        let body = ObjectRequest::at(&self.candidate_id, position);
        match self.client.delete(&url, &body).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error deleting {} at position {}: {}", kind, position, e);
                false
            }
        }
    }

    /// Fetch the current remote grid
    pub async fn fetch_remote_grid(&self) -> Result<RemoteGrid> {
        let url = format!("{}/map/{}", self.base_url, self.candidate_id);
        let response: MapResponse = self.client.get_json(&url).await?;
        Ok(response.map.content)
    }

    /// Delete every occupied remote cell, row-major, one call at a time
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<ReconcileReport> {
        let content = self.fetch_remote_grid().await?;
        let mut report = ReconcileReport::default();

        for (row, cells) in content.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let Some(cell) = cell else {
                    continue;
                };

                let position = Position::new(row, column);
                let kind = match cell.kind() {
                    Ok(kind) => kind,
                    Err(e) => {
                        warn!("Skipping cell at position {}: {}", position, e);
                        report.skipped += 1;
                        continue;
                    }
                };

                report.attempted += 1;
                if !self.remove(kind, position).await {
                    report.failed += 1;
                }
            }
        }

        info!(
            "Reset complete: {} removed, {} failed, {} skipped",
            report.succeeded(),
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    /// Reset the remote grid, then place every non-SPACE goal cell
    ///
    /// A reset that cannot fetch the remote grid is logged and placement
    /// still runs over the whole goal.
    #[instrument(skip(self))]
    pub async fn populate_from_goal(&self) -> Result<ReconcileReport> {
        let goal = self.goal()?;
        if let Err(e) = self.reset().await {
            error!("Error resetting Megaverse: {}", e);
        }

        let mut report = ReconcileReport::default();

        for (row, tokens) in goal.rows().iter().enumerate() {
            for (column, token) in tokens.iter().enumerate() {
                let token = token.to_uppercase();
                if is_space(&token) {
                    continue;
                }

                report.attempted += 1;
                let placement = match parse_token(&token, Position::new(row, column)) {
                    Ok(placement) => placement,
                    Err(e) => {
                        error!("{}", e);
                        report.failed += 1;
                        continue;
                    }
                };

                if !self.place(&placement).await {
                    report.failed += 1;
                }
            }
        }

        info!(
            "Goal placement complete: {} placed, {} failed",
            report.succeeded(),
            report.failed
        );
        Ok(report)
    }

    /// Compare the remote grid with the goal, logging the first mismatch
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Result<bool> {
        let goal = self.goal()?;
        let content = self.fetch_remote_grid().await?;

        match diff_grids(goal, &content) {
            None => Ok(true),
            Some(mismatch) => {
                log_mismatch(&mismatch);
                Ok(false)
            }
        }
    }

    fn object_url(&self, kind: ObjectKind) -> String {
        format!("{}/{}", self.base_url, kind.endpoint())
    }
}

fn log_action(action: &str, kind: ObjectKind, position: Position) {
    info!(
        action,
        name = %kind,
        row = position.row,
        column = position.column,
        "{} astral object",
        action
    );
}

fn log_mismatch(mismatch: &Mismatch) {
    match mismatch {
        Mismatch::RowCount { expected, actual } => {
            warn!(expected, actual, "Megaverse row count does not match goal");
        }
        Mismatch::ColumnCount {
            row,
            expected,
            actual,
        } => {
            warn!(row, expected, actual, "Megaverse column count does not match goal");
        }
        Mismatch::Cell {
            position,
            expected,
            actual,
        } => {
            warn!(
                expected = %expected,
                actual = %actual,
                row = position.row,
                column = position.column,
                "Invalid astral object"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaverse_client::{HttpMethod, MockExecutor};
    use std::sync::Arc;
    use std::time::Duration;

    const BASE: &str = "http://megaverse.test/api";
    const GOAL: &str = r#"{"goal": [["SPACE", "POLYANET"], ["BLUE_SOLOON", "UP_COMETH"]]}"#;

    fn engine(mock: &Arc<MockExecutor>) -> Megaverse<Arc<MockExecutor>> {
        let client =
            RequestClient::with_policy(mock.clone(), RetryPolicy::new(5, Duration::from_millis(1)));
        Megaverse::new(client, BASE, "cand-1")
    }

    fn map_json(content: &str) -> String {
        format!(r#"{{"map": {{"_id": "x", "content": {}, "candidateId": "cand-1", "phase": 1}}}}"#, content)
    }

    #[tokio::test]
    async fn test_initialize_loads_goal_once() {
        let mock = Arc::new(MockExecutor::new().with_response(200, GOAL));
        let megaverse = engine(&mock);

        assert!(matches!(megaverse.goal(), Err(MegaverseError::NotInitialized)));

        let goal = megaverse.initialize().await.unwrap();
        assert_eq!(goal.get(Position::new(1, 0)), Some("BLUE_SOLOON"));

        // Second call must not hit the network; the mock has nothing queued.
        megaverse.initialize().await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, format!("{}/map/cand-1/goal", BASE));
    }

    #[tokio::test]
    async fn test_initialize_fails_on_empty_goal() {
        let mock = Arc::new(MockExecutor::new().with_response(200, r#"{"goal": []}"#));
        let megaverse = engine(&mock);
        assert!(matches!(
            megaverse.initialize().await,
            Err(MegaverseError::GoalMissing)
        ));
    }

    #[tokio::test]
    async fn test_initialize_fails_on_request_error() {
        let mock = Arc::new(MockExecutor::new().with_response(404, "not found"));
        let megaverse = engine(&mock);
        assert!(matches!(
            megaverse.initialize().await,
            Err(MegaverseError::RequestFailed)
        ));
        assert!(megaverse.goal().is_err());
    }

    #[tokio::test]
    async fn test_place_posts_to_kind_endpoint() {
        let mock = Arc::new(MockExecutor::new().with_response(200, "{}"));
        let megaverse = engine(&mock);

        let placement = megaverse
            .parse_token("RIGHT_COMETH", Position::new(3, 4))
            .unwrap();
        assert!(megaverse.place(&placement).await);

        let requests = mock.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, format!("{}/comeths", BASE));
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({
                "candidateId": "cand-1",
                "row": 3,
                "column": 4,
                "direction": "right"
            }))
        );
    }

    #[tokio::test]
    async fn test_place_failure_is_not_fatal() {
        let mock = Arc::new(MockExecutor::new().with_response(500, "oops"));
        let megaverse = engine(&mock);

        let placement = Placement::new(megaverse_core::ObjectSpec::Basic, Position::new(0, 0));
        assert!(!megaverse.place(&placement).await);
    }

    #[tokio::test]
    async fn test_remove_sends_delete_body() {
        let mock = Arc::new(MockExecutor::new().with_response(200, "{}"));
        let megaverse = engine(&mock);

        assert!(megaverse.remove(ObjectKind::ColoredMarker, Position::new(1, 2)).await);

        let requests = mock.requests();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].url, format!("{}/soloons", BASE));
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"candidateId": "cand-1", "row": 1, "column": 2}))
        );
    }

    #[tokio::test]
    async fn test_reset_removes_each_occupied_cell() {
        let content = r#"[[null, {"type": 0}], [{"type": 1, "color": "red"}, null]]"#;
        let mock = Arc::new(
            MockExecutor::new()
                .with_response(200, &map_json(content))
                .with_response(200, "{}")
                .with_response(500, "fail"),
        );
        let megaverse = engine(&mock);

        let report = megaverse.reset().await.unwrap();
        assert_eq!(
            report,
            ReconcileReport {
                attempted: 2,
                failed: 1,
                skipped: 0
            }
        );

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].url, format!("{}/polyanets", BASE));
        assert_eq!(requests[2].url, format!("{}/soloons", BASE));
        assert!(requests[1..].iter().all(|r| r.method == HttpMethod::Delete));
    }

    #[tokio::test]
    async fn test_reset_skips_unknown_type_codes() {
        let mock = Arc::new(MockExecutor::new().with_response(200, &map_json(r#"[[{"type": 5}]]"#)));
        let megaverse = engine(&mock);

        let report = megaverse.reset().await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.attempted, 0);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_fetch_failure_aborts() {
        let mock = Arc::new(MockExecutor::new().with_transport_error());
        let megaverse = engine(&mock);
        assert!(megaverse.reset().await.is_err());
    }

    #[tokio::test]
    async fn test_validate_requires_goal() {
        let mock = Arc::new(MockExecutor::new());
        let megaverse = engine(&mock);
        assert!(matches!(
            megaverse.validate().await,
            Err(MegaverseError::NotInitialized)
        ));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_validate_matching_and_mismatching() {
        let matching = r#"[[null, {"type": 0}], [{"type": 1, "color": "blue"}, {"type": 2, "direction": "up"}]]"#;
        let wrong = r#"[[null, {"type": 0}], [{"type": 1, "color": "red"}, {"type": 2, "direction": "up"}]]"#;
        let mock = Arc::new(
            MockExecutor::new()
                .with_response(200, GOAL)
                .with_response(200, &map_json(matching))
                .with_response(200, &map_json(wrong))
                .with_response(503, "down"),
        );
        let megaverse = engine(&mock);
        megaverse.initialize().await.unwrap();

        assert!(megaverse.validate().await.unwrap());
        assert!(!megaverse.validate().await.unwrap());
        assert!(megaverse.validate().await.is_err());
    }

    #[tokio::test]
    async fn test_populate_resets_then_places() {
        let mock = Arc::new(
            MockExecutor::new()
                .with_response(200, GOAL)
                .with_response(200, &map_json(r#"[[{"type": 0}, null], [null, null]]"#))
                .with_response(200, "{}")
                .with_response(200, "{}")
                .with_response(200, "{}")
                .with_response(200, "{}"),
        );
        let megaverse = engine(&mock);
        megaverse.initialize().await.unwrap();

        let report = megaverse.populate_from_goal().await.unwrap();
        assert_eq!(report.attempted, 3);
        assert!(report.is_clean());

        let calls: Vec<(HttpMethod, String)> = mock
            .requests()
            .into_iter()
            .skip(2)
            .map(|r| (r.method, r.url))
            .collect();
        assert_eq!(
            calls,
            vec![
                (HttpMethod::Delete, format!("{}/polyanets", BASE)),
                (HttpMethod::Post, format!("{}/polyanets", BASE)),
                (HttpMethod::Post, format!("{}/soloons", BASE)),
                (HttpMethod::Post, format!("{}/comeths", BASE)),
            ]
        );
    }

    #[tokio::test]
    async fn test_populate_places_goal_when_reset_fetch_fails() {
        let mock = Arc::new(
            MockExecutor::new()
                .with_response(200, r#"{"goal": [["POLYANET", "SPACE"]]}"#)
                .with_response(500, "map unavailable")
                .with_response(200, "{}"),
        );
        let megaverse = engine(&mock);
        megaverse.initialize().await.unwrap();

        let report = megaverse.populate_from_goal().await.unwrap();
        assert_eq!(report.attempted, 1);
        assert!(report.is_clean());

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].method, HttpMethod::Get);
        assert_eq!(requests[2].method, HttpMethod::Post);
        assert_eq!(requests[2].url, format!("{}/polyanets", BASE));
    }

    #[test]
    fn test_from_config_requires_candidate() {
        let config = MegaverseConfig::default();
        assert!(Megaverse::from_config(MockExecutor::new(), &config).is_err());

        let config = MegaverseConfig {
            candidate_id: Some("cand-9".to_string()),
            base_url: format!("{}/", BASE),
            ..Default::default()
        };
        let megaverse = Megaverse::from_config(MockExecutor::new(), &config).unwrap();
        assert_eq!(megaverse.candidate_id(), "cand-9");
        assert_eq!(megaverse.object_url(ObjectKind::Basic), format!("{}/polyanets", BASE));
    }
}

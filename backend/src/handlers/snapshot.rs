//! On-demand snapshot trigger

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use shared::RunTrigger;

use crate::error::RES_CODE_OK;
use crate::middleware::CurrentUser;
use crate::services::RunOutcome;
use crate::AppState;

/// Body returned after a successful run
#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(rename = "resCode")]
    pub res_code: &'static str,
    pub file: &'static str,
}

pub const FILE_PUBLISHED: &str = "berhasil";
pub const FILE_NOTHING_TO_DO: &str = "tidak ada data";

impl From<&RunOutcome> for RunResponse {
    fn from(outcome: &RunOutcome) -> Self {
        let file = match outcome {
            RunOutcome::Published(_) => FILE_PUBLISHED,
            RunOutcome::NothingToDo { .. } => FILE_NOTHING_TO_DO,
        };
        RunResponse {
            res_code: RES_CODE_OK,
            file,
        }
    }
}

/// Run the snapshot pipeline now and wait for it to finish
pub async fn run_snapshot(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    tracing::info!(user = %user.user_id, "Snapshot run requested");

    match state.snapshots.run(RunTrigger::OnDemand).await {
        Ok(outcome) => Json(RunResponse::from(&outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}

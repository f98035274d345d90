//! Move-suggestion service.
//!
//! Automated players post the current grid and get back the column chosen
//! by a [`MinimaxBot`]. Any client may call it, browsers included, so CORS
//! is wide open.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use connect4::{Board, PlayerId, SuggestionRequest, SuggestionResponse};
use connect4_bot_utils::MinimaxBot;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorModel {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

pub fn router(bot: MinimaxBot) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/make-move", post(make_move))
        .route("/api/health", get(health))
        .layer(cors)
        .with_state(bot)
}

/// Serves [`router()`] on `listener` until the process ends.
pub async fn serve(listener: tokio::net::TcpListener, bot: MinimaxBot) -> std::io::Result<()> {
    axum::serve(listener, router(bot)).await
}

async fn health() -> &'static str {
    "ok"
}

async fn make_move(
    State(bot): State<MinimaxBot>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    // Values that don't fit the wire types are bad requests too
    let Json(req) = payload.map_err(|rejection| bad_request(rejection.body_text()))?;
    let board = Board::from_grid(&req.board).map_err(bad_request)?;
    let player = PlayerId::try_from(req.player).map_err(bad_request)?;

    // The search is CPU-bound, keep it off the async workers
    let column = tokio::task::spawn_blocking(move || bot.best_column(&board, player))
        .await
        .map_err(|err| {
            error!(%err, "Search task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorModel {
                    detail: String::from("The search failed"),
                }),
            )
        })?;
    debug!(%player, ?column, "Suggested move");
    Ok(Json(SuggestionResponse { column }))
}

fn bad_request(err: impl std::fmt::Display) -> ApiError {
    warn!(%err, "Rejected suggestion request");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn post_json(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = router(MinimaxBot::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/make-move")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn suggests_the_blocking_column() {
        let mut board = Board::new();
        for column in [0, 1, 2] {
            board.play(column, PlayerId::P1).unwrap();
        }
        for column in [0, 1] {
            board.play(column, PlayerId::P2).unwrap();
        }
        // No player given: the service plays the second seat
        let (status, body) = post_json(serde_json::json!({ "board": board.to_grid() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "column": 3 }));
    }

    #[tokio::test]
    async fn full_board_has_no_move() {
        let mut board = Board::new();
        for column in 0..connect4::COLS {
            for _ in 0..connect4::ROWS {
                board.play(column, PlayerId::P1).unwrap();
            }
        }
        let (status, body) = post_json(serde_json::json!({
            "board": board.to_grid(),
            "player": 2,
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "column": null }));
    }

    #[tokio::test]
    async fn rejects_floating_pieces() {
        let mut grid = Board::new().to_grid();
        grid[0][3] = 1;
        let (status, body) = post_json(serde_json::json!({ "board": grid })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "The piece at (0, 3) has an empty cell beneath it"
        );
    }

    #[tokio::test]
    async fn rejects_unknown_player() {
        let (status, body) = post_json(serde_json::json!({
            "board": Board::new().to_grid(),
            "player": 3,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "3 is not a player, expected 1 or 2");
    }

    #[tokio::test]
    async fn out_of_range_numbers_are_bad_requests() {
        let (status, body) = post_json(serde_json::json!({
            "board": Board::new().to_grid(),
            "player": 300,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("player"));

        let (status, _) = post_json(serde_json::json!({
            "board": Board::new().to_grid(),
            "player": -1,
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut grid = serde_json::json!(Board::new().to_grid());
        grid[5][0] = serde_json::json!(256);
        let (status, body) = post_json(serde_json::json!({ "board": grid })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn health_check() {
        let response = router(MinimaxBot::default())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

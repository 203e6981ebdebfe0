//! The query-string-in, JSON-out transport described in the external
//! interfaces contract. This layer never touches matching state
//! directly — every handler is a thin translation into a `ServerFacade`
//! call and back into the `{code, msg, data}` envelope.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::facade::{RequestKind, ServerFacade};

pub fn router(facade: Arc<ServerFacade>) -> Router {
    Router::new()
        .route("/join", get(join))
        .route("/status", get(status))
        .route("/leave", get(leave))
        .route("/remove", get(remove))
        .route("/stats", get(stats))
        .route("/player_ids", get(player_ids))
        .route("/player_in_queue_ids", get(player_in_queue_ids))
        .route("/group_player_ids", get(group_player_ids))
        .with_state(facade)
}

fn ok(data: Value) -> Response {
    Json(json!({ "code": 0, "msg": "OK", "data": data })).into_response()
}

fn ok_no_data() -> Response {
    Json(json!({ "code": 0, "msg": "OK" })).into_response()
}

fn err(code: u32, msg: impl Into<String>) -> Response {
    Json(json!({ "code": code, "msg": msg.into() })).into_response()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, ()).into_response()
}

async fn join(State(facade): State<Arc<ServerFacade>>, Query(params): Query<HashMap<String, String>>) -> Response {
    facade.record_request(RequestKind::Join);
    let Some(id) = params.get("id") else {
        return bad_request();
    };
    let Some(score) = params.get("score").and_then(|s| s.parse::<i64>().ok()) else {
        return bad_request();
    };
    match facade.join(id, score) {
        Ok(wait_time) => ok(json!({ "wait_time": wait_time })),
        Err(e) => {
            log::warn!("join rejected for {id}: {e}");
            err(1, e.to_string())
        }
    }
}

async fn status(State(facade): State<Arc<ServerFacade>>, Query(params): Query<HashMap<String, String>>) -> Response {
    facade.record_request(RequestKind::Status);
    let Some(id) = params.get("id") else {
        return bad_request();
    };
    match facade.status(id) {
        Ok(ids) => ok(json!({ "ids": ids })),
        Err(e) => err(2, e.to_string()),
    }
}

async fn leave(State(facade): State<Arc<ServerFacade>>, Query(params): Query<HashMap<String, String>>) -> Response {
    facade.record_request(RequestKind::Leave);
    let Some(id) = params.get("id") else {
        return bad_request();
    };
    match facade.leave(id) {
        Ok(()) => ok_no_data(),
        Err(e) => err(3, e.to_string()),
    }
}

async fn remove(State(facade): State<Arc<ServerFacade>>, Query(params): Query<HashMap<String, String>>) -> Response {
    facade.record_request(RequestKind::Remove);
    let Some(id) = params.get("id") else {
        return bad_request();
    };
    facade.remove(id);
    ok_no_data()
}

async fn stats(State(facade): State<Arc<ServerFacade>>) -> Response {
    facade.record_request(RequestKind::Stats);
    let stats = facade.stats();
    ok(serde_json::to_value(stats).unwrap_or(Value::Null))
}

async fn player_ids(State(facade): State<Arc<ServerFacade>>) -> Response {
    facade.record_request(RequestKind::PlayerIds);
    ok(json!(facade.player_ids()))
}

async fn player_in_queue_ids(State(facade): State<Arc<ServerFacade>>) -> Response {
    facade.record_request(RequestKind::PlayerInQueueIds);
    ok(json!(facade.player_in_queue_ids()))
}

async fn group_player_ids(State(facade): State<Arc<ServerFacade>>) -> Response {
    facade.record_request(RequestKind::GroupPlayerIds);
    ok(json!(facade.group_player_ids()))
}

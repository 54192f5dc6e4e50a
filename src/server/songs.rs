use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::body::{MsgBody, SongBody, SongListBody};
use super::error::ApiError;
use super::state::AppState;
use crate::service::SongService;

async fn create_song(
  State(songs): State<SongService>,
  Json(body): Json<SongBody>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = songs
    .create_song(&body.song)
    .await
    .map_err(ApiError::with("Error creating song"))?;
  Ok(Json(outcome.into()))
}

async fn get_song(
  State(songs): State<SongService>,
  Path(name): Path<String>,
) -> Result<Json<SongBody>, ApiError> {
  let song = songs
    .get_song(&name)
    .await
    .map_err(ApiError::with("Error getting song"))?;
  Ok(Json(SongBody { song }))
}

async fn list_songs(State(songs): State<SongService>) -> Result<Json<SongListBody>, ApiError> {
  let songs = songs
    .list_songs()
    .await
    .map_err(ApiError::with("Error listing songs"))?;
  Ok(Json(SongListBody { songs }))
}

async fn update_song(
  State(songs): State<SongService>,
  Path(name): Path<String>,
  Json(body): Json<SongBody>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = songs
    .update_song(&name, body.song)
    .await
    .map_err(ApiError::with("Error updating song"))?;
  Ok(Json(outcome.into()))
}

async fn delete_song(
  State(songs): State<SongService>,
  Path(name): Path<String>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = songs
    .delete_song(&name)
    .await
    .map_err(ApiError::with("Error deleting song"))?;
  Ok(Json(outcome.into()))
}

pub fn routes() -> Router<AppState> {
  Router::new()
    .route("/songs", post(create_song).get(list_songs))
    .route(
      "/songs/{name}",
      get(get_song).put(update_song).delete(delete_song),
    )
}

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use super::body::{LikedSongsBody, MsgBody, UserBody, UserListBody};
use super::error::ApiError;
use super::state::AppState;
use crate::service::UserService;

async fn create_user(
  State(users): State<UserService>,
  Json(body): Json<UserBody>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = users
    .create_user(&body.user)
    .await
    .map_err(ApiError::with("Error creating user"))?;
  Ok(Json(outcome.into()))
}

async fn get_user(
  State(users): State<UserService>,
  Path(id): Path<String>,
) -> Result<Json<UserBody>, ApiError> {
  let user = users
    .get_user(&id)
    .await
    .map_err(ApiError::with("Error getting user"))?;
  Ok(Json(UserBody { user }))
}

async fn list_users(State(users): State<UserService>) -> Result<Json<UserListBody>, ApiError> {
  let users = users
    .list_users()
    .await
    .map_err(ApiError::with("Error listing users"))?;
  Ok(Json(UserListBody { users }))
}

async fn update_user(
  State(users): State<UserService>,
  Path(id): Path<String>,
  Json(body): Json<UserBody>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = users
    .update_user(&id, body.user)
    .await
    .map_err(ApiError::with("Error updating user"))?;
  Ok(Json(outcome.into()))
}

async fn delete_user(
  State(users): State<UserService>,
  Path(id): Path<String>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = users
    .delete_user(&id)
    .await
    .map_err(ApiError::with("Error deleting user"))?;
  Ok(Json(outcome.into()))
}

async fn like_song(
  State(users): State<UserService>,
  Path((id, song_name)): Path<(String, String)>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = users
    .like_song(&id, &song_name)
    .await
    .map_err(ApiError::with("Error liking song"))?;
  Ok(Json(outcome.into()))
}

async fn unlike_song(
  State(users): State<UserService>,
  Path((id, song_name)): Path<(String, String)>,
) -> Result<Json<MsgBody>, ApiError> {
  let outcome = users
    .unlike_song(&id, &song_name)
    .await
    .map_err(ApiError::with("Error unliking song"))?;
  Ok(Json(outcome.into()))
}

async fn list_liked_songs(
  State(users): State<UserService>,
  Path(id): Path<String>,
) -> Result<Json<LikedSongsBody>, ApiError> {
  let liked_songs = users
    .list_liked_songs(&id)
    .await
    .map_err(ApiError::with("Error getting liked songs"))?;
  Ok(Json(LikedSongsBody { liked_songs }))
}

pub fn routes() -> Router<AppState> {
  Router::new()
    .route("/users", post(create_user).get(list_users))
    .route(
      "/users/{id}",
      get(get_user).put(update_user).delete(delete_user),
    )
    .route("/users/{id}/like/{song_name}", post(like_song))
    .route("/users/{id}/unlike/{song_name}", delete(unlike_song))
    .route("/users/{id}/liked_songs", get(list_liked_songs))
}

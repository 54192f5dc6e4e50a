use std::sync::Arc;

use tracing::{debug, info};

use super::{KeyedLocks, Outcome};
use crate::error::Result;
use crate::model::User;
use crate::repository::UserRepository;
use crate::store::KvStore;

/// User CRUD plus the liked-songs relationship.
///
/// Like and unlike are fetch, mutate, store cycles on the whole user
/// record. The store offers no atomic update, so each cycle runs under a
/// per-user lock: concurrent cycles for one user are serialized and none
/// of their writes is lost. The lock is local to this service instance;
/// several processes writing the same user are not coordinated.
#[derive(Clone)]
pub struct UserService {
  users: UserRepository,
  locks: Arc<KeyedLocks>,
}

impl UserService {
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self {
      users: UserRepository::new(store),
      locks: Arc::new(KeyedLocks::new()),
    }
  }

  /// Overwrites an existing user, so it is serialized with like/unlike too
  pub async fn create_user(&self, user: &User) -> Result<Outcome> {
    let _guard = self.locks.lock(&user.id).await;
    self.users.create(user).await?;
    info!(user = %user.id, "created user");
    Ok(Outcome::Success)
  }

  pub async fn get_user(&self, id: &str) -> Result<User> {
    self.users.get(id).await
  }

  pub async fn list_users(&self) -> Result<Vec<User>> {
    self.users.list_all().await
  }

  /// Full overwrite; also serialized with like/unlike on the same user
  pub async fn update_user(&self, id: &str, user: User) -> Result<Outcome> {
    let key_id = if id.is_empty() { user.id.clone() } else { id.to_string() };
    let _guard = self.locks.lock(&key_id).await;
    let stored = self.users.update(id, user).await?;
    info!(user = %stored.id, "updated user");
    Ok(Outcome::Success)
  }

  pub async fn delete_user(&self, id: &str) -> Result<Outcome> {
    let _guard = self.locks.lock(id).await;
    self.users.delete(id).await?;
    info!(user = %id, "deleted user");
    Ok(Outcome::Success)
  }

  /// Add `song_name` to the user's liked songs.
  ///
  /// The song is not looked up; liking an unknown song name succeeds.
  /// A missing user is `Error::NotFound`.
  pub async fn like_song(&self, user_id: &str, song_name: &str) -> Result<Outcome> {
    let _guard = self.locks.lock(user_id).await;
    let mut user = self.users.get(user_id).await?;
    if !user.like(song_name) {
      debug!(user = %user_id, song = %song_name, "song already liked");
      return Ok(Outcome::AlreadyLiked);
    }
    self.users.update(user_id, user).await?;
    info!(user = %user_id, song = %song_name, "liked song");
    Ok(Outcome::Success)
  }

  /// Remove every occurrence of `song_name`; writes only if one was found
  pub async fn unlike_song(&self, user_id: &str, song_name: &str) -> Result<Outcome> {
    let _guard = self.locks.lock(user_id).await;
    let mut user = self.users.get(user_id).await?;
    if !user.unlike(song_name) {
      debug!(user = %user_id, song = %song_name, "song was not liked");
      return Ok(Outcome::NotLiked);
    }
    self.users.update(user_id, user).await?;
    info!(user = %user_id, song = %song_name, "unliked song");
    Ok(Outcome::Success)
  }

  /// Liked song names in like order; a missing user is `Error::NotFound`
  pub async fn list_liked_songs(&self, user_id: &str) -> Result<Vec<String>> {
    Ok(self.users.get(user_id).await?.liked_songs)
  }
}

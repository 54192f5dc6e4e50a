use std::sync::Arc;
use std::time::Instant;

use axum::extract::FromRef;

use crate::service::{SongService, UserService};
use crate::store::KvStore;

#[derive(Clone)]
pub struct AppState {
  pub start_time: Instant,
  pub songs: SongService,
  pub users: UserService,
}

impl AppState {
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self {
      start_time: Instant::now(),
      songs: SongService::new(store.clone()),
      users: UserService::new(store),
    }
  }
}

impl FromRef<AppState> for SongService {
  fn from_ref(input: &AppState) -> Self {
    input.songs.clone()
  }
}

impl FromRef<AppState> for UserService {
  fn from_ref(input: &AppState) -> Self {
    input.users.clone()
  }
}

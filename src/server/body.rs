//! JSON request and response bodies

use serde::{Deserialize, Serialize};

use crate::model::{Song, User};
use crate::service::Outcome;

/// Status message returned by every mutating route
#[derive(Debug, Serialize, Deserialize)]
pub struct MsgBody {
  pub msg: String,
}

impl From<Outcome> for MsgBody {
  fn from(outcome: Outcome) -> Self {
    Self {
      msg: outcome.to_string(),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongBody {
  #[serde(default)]
  pub song: Song,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongListBody {
  pub songs: Vec<Song>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
  #[serde(default)]
  pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListBody {
  pub users: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikedSongsBody {
  pub liked_songs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
  pub status: String,
  pub uptime: String,
}

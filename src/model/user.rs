use serde::{Deserialize, Serialize};

use crate::encoding::{Entity, Namespace, null_as_empty};

/// A user and the names of the songs they like
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  /// Set semantics, kept in insertion order
  #[serde(
    default,
    deserialize_with = "null_as_empty",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub liked_songs: Vec<String>,
  #[serde(
    default,
    deserialize_with = "null_as_empty",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub embedding: Vec<f64>,
}

impl User {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      ..Self::default()
    }
  }

  pub fn likes(&self, song_name: &str) -> bool {
    self.liked_songs.iter().any(|liked| liked == song_name)
  }

  /// Append `song_name` unless already present; returns whether it was added
  pub fn like(&mut self, song_name: &str) -> bool {
    if self.likes(song_name) {
      return false;
    }
    self.liked_songs.push(song_name.to_string());
    true
  }

  /// Drop every occurrence of `song_name`; returns whether any was removed
  pub fn unlike(&mut self, song_name: &str) -> bool {
    let before = self.liked_songs.len();
    self.liked_songs.retain(|liked| liked != song_name);
    self.liked_songs.len() != before
  }
}

impl Entity for User {
  const NAMESPACE: Namespace = Namespace::User;

  fn id(&self) -> &str {
    &self.id
  }

  fn set_id(&mut self, id: String) {
    self.id = id;
  }
}

use serde::{Deserialize, Serialize};

use crate::encoding::{Entity, Namespace, null_as_empty};

/// A song, identified by its name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
  #[serde(default)]
  pub name: String,
  /// Opaque feature vector, no dimensionality is enforced
  #[serde(default, deserialize_with = "null_as_empty")]
  pub embedding: Vec<f64>,
}

impl Song {
  pub fn new(name: impl Into<String>, embedding: Vec<f64>) -> Self {
    Self {
      name: name.into(),
      embedding,
    }
  }
}

impl Entity for Song {
  const NAMESPACE: Namespace = Namespace::Song;

  fn id(&self) -> &str {
    &self.name
  }

  fn set_id(&mut self, id: String) {
    self.name = id;
  }
}

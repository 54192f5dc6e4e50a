use std::sync::Arc;

use tracing::info;

use super::Outcome;
use crate::error::Result;
use crate::model::Song;
use crate::repository::SongRepository;
use crate::store::KvStore;

#[derive(Clone)]
pub struct SongService {
  songs: SongRepository,
}

impl SongService {
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self {
      songs: SongRepository::new(store),
    }
  }

  pub async fn create_song(&self, song: &Song) -> Result<Outcome> {
    self.songs.create(song).await?;
    info!(song = %song.name, "created song");
    Ok(Outcome::Success)
  }

  pub async fn get_song(&self, name: &str) -> Result<Song> {
    self.songs.get(name).await
  }

  pub async fn list_songs(&self) -> Result<Vec<Song>> {
    self.songs.list_all().await
  }

  pub async fn update_song(&self, name: &str, song: Song) -> Result<Outcome> {
    let stored = self.songs.update(name, song).await?;
    info!(song = %stored.name, "updated song");
    Ok(Outcome::Success)
  }

  pub async fn delete_song(&self, name: &str) -> Result<Outcome> {
    self.songs.delete(name).await?;
    info!(song = %name, "deleted song");
    Ok(Outcome::Success)
  }
}

//! Entity repositories over the key-value store
//!
//! A repository owns one namespace of the key space. Identifiers are the
//! only uniqueness key; writing an existing identifier overwrites it.

use std::marker::PhantomData;
use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::encoding::{Entity, decode, encode};
use crate::error::{Error, Result};
use crate::model::{Song, User};
use crate::store::KvStore;

/// Concurrent GETs issued while listing a namespace
const LIST_FETCH_CONCURRENCY: usize = 16;

pub type SongRepository = Repository<Song>;
pub type UserRepository = Repository<User>;

/// CRUD over the records of one entity type
pub struct Repository<E> {
  store: Arc<dyn KvStore>,
  _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      _entity: PhantomData,
    }
  }
}

impl<E: Entity> Repository<E> {
  pub fn new(store: Arc<dyn KvStore>) -> Self {
    Self {
      store,
      _entity: PhantomData,
    }
  }

  /// Store `entity` under its own identifier, replacing any previous record
  pub async fn create(&self, entity: &E) -> Result<()> {
    if entity.id().is_empty() {
      return Err(Error::MissingId {
        namespace: E::NAMESPACE,
      });
    }
    self.put(&entity.key(), entity).await
  }

  /// Fetch one record; `Ok(None)` when the key is absent
  pub async fn find(&self, id: &str) -> Result<Option<E>> {
    let key = E::NAMESPACE.key(id);
    match self.store.get(&key).await? {
      Some(bytes) => decode(&bytes)
        .map(Some)
        .map_err(|source| Error::Decode { key, source }),
      None => Ok(None),
    }
  }

  /// Fetch one record, failing with `NotFound` when absent
  pub async fn get(&self, id: &str) -> Result<E> {
    self.find(id).await?.ok_or_else(|| Error::NotFound {
      namespace: E::NAMESPACE,
      id: id.to_string(),
    })
  }

  /// Every decodable record of the namespace, ordered by key.
  ///
  /// Records that vanish, cannot be read or fail to decode are skipped so a
  /// single bad record never fails the listing. Keys with an empty
  /// identifier are ignored. Only a failed key scan is reported.
  pub async fn list_all(&self) -> Result<Vec<E>> {
    let mut keys = self.store.keys_by_prefix(&E::NAMESPACE.prefix()).await?;
    keys.retain(|key| E::NAMESPACE.id_of(key).is_some_and(|id| !id.is_empty()));
    keys.sort();

    let fetched: Vec<_> = stream::iter(keys)
      .map(|key| async move {
        let value = self.store.get(&key).await;
        (key, value)
      })
      .buffered(LIST_FETCH_CONCURRENCY)
      .collect()
      .await;

    let mut entities = Vec::with_capacity(fetched.len());
    for (key, value) in fetched {
      match value {
        Ok(Some(bytes)) => match decode::<E>(&bytes) {
          Ok(entity) => entities.push(entity),
          Err(e) => warn!(key = %key, error = %e, "skipping undecodable record"),
        },
        Ok(None) => debug!(key = %key, "record deleted while listing"),
        Err(e) => warn!(key = %key, error = %e, "skipping unreadable record"),
      }
    }
    Ok(entities)
  }

  /// Replace the record addressed by `id` wholesale.
  ///
  /// `id` decides the key; when it is empty the entity's own identifier is
  /// used instead. An empty identifier inside the entity is backfilled from
  /// the key, so both agree after the write. Returns what was stored.
  pub async fn update(&self, id: &str, mut entity: E) -> Result<E> {
    let key_id = if id.is_empty() {
      entity.id().to_string()
    } else {
      id.to_string()
    };
    if key_id.is_empty() {
      return Err(Error::MissingId {
        namespace: E::NAMESPACE,
      });
    }
    if entity.id().is_empty() {
      entity.set_id(key_id.clone());
    }
    self.put(&E::NAMESPACE.key(&key_id), &entity).await?;
    Ok(entity)
  }

  /// Remove the record; removing a missing record succeeds
  pub async fn delete(&self, id: &str) -> Result<()> {
    let key = E::NAMESPACE.key(id);
    self.store.delete(&key).await?;
    debug!(key = %key, "deleted record");
    Ok(())
  }

  async fn put(&self, key: &str, entity: &E) -> Result<()> {
    let bytes = encode(entity)?;
    self.store.set(key, bytes).await?;
    debug!(key, "stored record");
    Ok(())
  }
}

use super::{AmenityLinks, Repository, RepositoryError};
use crate::models::Entity;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

struct Slots<E> {
    by_id: HashMap<Uuid, E>,
    order: Vec<Uuid>,
}

/// Process-lifetime store. Enforces the entity's unique field groups itself.
pub struct InMemoryRepository<E> {
    inner: RwLock<Slots<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        InMemoryRepository {
            inner: RwLock::new(Slots {
                by_id: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn field(entity: &impl Entity, name: &str) -> Result<Value, RepositoryError> {
    let mut row = serde_json::to_value(entity)?;
    Ok(row.get_mut(name).map(Value::take).unwrap_or(Value::Null))
}

/// Rejects `candidate` when one of its unique groups matches another stored entity.
fn check_unique<E: Entity>(slots: &Slots<E>, candidate: &E) -> Result<(), RepositoryError> {
    let row = serde_json::to_value(candidate)?;
    for group in E::UNIQUE {
        let key: Vec<&Value> = group.iter().map(|f| row.get(*f).unwrap_or(&Value::Null)).collect();
        for other in slots.by_id.values().filter(|o| o.id() != candidate.id()) {
            let other_row = serde_json::to_value(other)?;
            if group
                .iter()
                .zip(&key)
                .all(|(f, v)| other_row.get(*f).unwrap_or(&Value::Null) == *v)
            {
                return Err(RepositoryError::DuplicateKey {
                    kind: E::KIND,
                    detail: group.join(", "),
                });
            }
        }
    }
    Ok(())
}

impl<E: Entity> InMemoryRepository<E> {
    fn matching(&self, name: &str, value: &Value, limit: usize) -> Result<Vec<E>, RepositoryError> {
        let slots = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        let mut out = Vec::new();
        if value.is_null() {
            return Ok(out);
        }
        for id in &slots.order {
            if out.len() == limit {
                break;
            }
            if let Some(entity) = slots.by_id.get(id) {
                if field(entity, name)? == *value {
                    out.push(entity.clone());
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn add(&self, entity: &E) -> Result<(), RepositoryError> {
        let mut slots = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if slots.by_id.contains_key(&entity.id()) {
            return Err(RepositoryError::DuplicateKey {
                kind: E::KIND,
                detail: "id".into(),
            });
        }
        check_unique(&slots, entity)?;
        slots.order.push(entity.id());
        slots.by_id.insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<E>, RepositoryError> {
        let slots = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots.by_id.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<E>, RepositoryError> {
        let slots = self.inner.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(slots
            .order
            .iter()
            .filter_map(|id| slots.by_id.get(id).cloned())
            .collect())
    }

    async fn get_by_attribute(&self, name: &str, value: &Value) -> Result<Option<E>, RepositoryError> {
        Ok(self.matching(name, value, 1)?.pop())
    }

    async fn find_by(&self, name: &str, value: &Value) -> Result<Vec<E>, RepositoryError> {
        self.matching(name, value, usize::MAX)
    }

    async fn update(&self, id: Uuid, patch: E::Patch) -> Result<Option<E>, RepositoryError> {
        let mut slots = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(current) = slots.by_id.get(&id) else {
            return Ok(None);
        };
        let mut next = current.clone();
        next.apply(patch)?;
        check_unique(&slots, &next)?;
        slots.by_id.insert(id, next.clone());
        Ok(Some(next))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut slots = self.inner.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if slots.by_id.remove(&id).is_none() {
            return Ok(false);
        }
        slots.order.retain(|o| *o != id);
        Ok(true)
    }
}

/// Links kept in insertion order.
#[derive(Default)]
pub struct InMemoryAmenityLinks {
    pairs: RwLock<Vec<(Uuid, Uuid)>>,
}

impl InMemoryAmenityLinks {
    pub fn new() -> Self {
        Self::default()
    }

    fn retain(&self, keep: impl Fn(&(Uuid, Uuid)) -> bool) -> Result<usize, RepositoryError> {
        let mut pairs = self.pairs.write().map_err(|_| RepositoryError::LockPoisoned)?;
        let before = pairs.len();
        pairs.retain(|p| keep(p));
        Ok(before - pairs.len())
    }
}

#[async_trait]
impl AmenityLinks for InMemoryAmenityLinks {
    async fn link(&self, place_id: Uuid, amenity_id: Uuid) -> Result<(), RepositoryError> {
        let mut pairs = self.pairs.write().map_err(|_| RepositoryError::LockPoisoned)?;
        if !pairs.contains(&(place_id, amenity_id)) {
            pairs.push((place_id, amenity_id));
        }
        Ok(())
    }

    async fn unlink(&self, place_id: Uuid, amenity_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.retain(|p| *p != (place_id, amenity_id))? > 0)
    }

    async fn amenities_of(&self, place_id: Uuid) -> Result<Vec<Uuid>, RepositoryError> {
        let pairs = self.pairs.read().map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(pairs
            .iter()
            .filter(|(p, _)| *p == place_id)
            .map(|(_, a)| *a)
            .collect())
    }

    async fn unlink_place(&self, place_id: Uuid) -> Result<(), RepositoryError> {
        self.retain(|(p, _)| *p != place_id).map(drop)
    }

    async fn unlink_amenity(&self, amenity_id: Uuid) -> Result<(), RepositoryError> {
        self.retain(|(_, a)| *a != amenity_id).map(drop)
    }
}

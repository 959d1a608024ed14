use crate::db::Database;
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{
    BusinessProject, BusinessScenario, Domain, Environment, Release, Squad, TechStackComponent, TestCase,
    UserJourney,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// A record type owned by exactly one domain collection.
pub trait DomainRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const DOMAIN: Domain;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! domain_record {
    ($record:ty => $domain:expr) => {
        impl DomainRecord for $record {
            const DOMAIN: Domain = $domain;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

domain_record!(BusinessProject => Domain::BusinessProjects);
domain_record!(TechStackComponent => Domain::TechStack);
domain_record!(Squad => Domain::Squads);
domain_record!(Environment => Domain::Environments);
domain_record!(Release => Domain::Releases);
domain_record!(UserJourney => Domain::UserJourneys);
domain_record!(BusinessScenario => Domain::BusinessScenarios);
domain_record!(TestCase => Domain::TestCases);

/// Per-domain persistent storage. Each collection is read and written whole.
pub trait CollectionStore: Send + Sync {
    /// `Ok(None)` when the domain was never written.
    fn read_raw(&self, domain: Domain) -> Result<Option<serde_json::Value>, SourceError>;
    fn write_raw(&self, domain: Domain, records: Vec<serde_json::Value>) -> AppResult<()>;
}

pub struct SqliteCollectionStore {
    db: Arc<Database>,
}

impl SqliteCollectionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn read_raw(&self, domain: Domain) -> Result<Option<serde_json::Value>, SourceError> {
        let Some(stored) = self.db.read_collection(domain)? else {
            return Ok(None);
        };
        let value = serde_json::from_str::<serde_json::Value>(&stored.records_json)?;
        Ok(Some(value))
    }

    fn write_raw(&self, domain: Domain, records: Vec<serde_json::Value>) -> AppResult<()> {
        self.db.write_collection(domain, &records)?;
        Ok(())
    }
}

/// Store backed by process memory, for fixtures and tests. Individual
/// domains can be switched to fail on read.
#[derive(Default)]
pub struct InMemoryCollectionStore {
    collections: Mutex<HashMap<Domain, serde_json::Value>>,
    failing: Mutex<HashSet<Domain>>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value without any shape checks.
    pub fn insert_raw(&self, domain: Domain, value: serde_json::Value) -> AppResult<()> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| AppError::Internal("collection mutex poisoned".to_string()))?;
        collections.insert(domain, value);
        Ok(())
    }

    pub fn fail_reads(&self, domain: Domain) -> AppResult<()> {
        let mut failing = self
            .failing
            .lock()
            .map_err(|_| AppError::Internal("collection mutex poisoned".to_string()))?;
        failing.insert(domain);
        Ok(())
    }
}

impl CollectionStore for InMemoryCollectionStore {
    fn read_raw(&self, domain: Domain) -> Result<Option<serde_json::Value>, SourceError> {
        let failing = self
            .failing
            .lock()
            .map_err(|_| SourceError::Unavailable("collection mutex poisoned".to_string()))?;
        if failing.contains(&domain) {
            return Err(SourceError::Unavailable(format!("{domain} store is offline")));
        }
        drop(failing);

        let collections = self
            .collections
            .lock()
            .map_err(|_| SourceError::Unavailable("collection mutex poisoned".to_string()))?;
        Ok(collections.get(&domain).cloned())
    }

    fn write_raw(&self, domain: Domain, records: Vec<serde_json::Value>) -> AppResult<()> {
        self.insert_raw(domain, serde_json::Value::Array(records))
    }
}

/// Typed read/write accessor for one domain collection.
pub struct Repository<T> {
    store: Arc<dyn CollectionStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T: DomainRecord> Repository<T> {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn read(&self) -> Result<Vec<T>, SourceError> {
        self.load().map(|collection| collection.records)
    }

    /// Reads the collection together with the stored items that did not
    /// decode, so an edit can write them back untouched.
    pub fn load(&self) -> Result<DecodedCollection<T>, SourceError> {
        match self.store.read_raw(T::DOMAIN)? {
            Some(value) => decode_collection(T::DOMAIN, value),
            None => Ok(DecodedCollection::default()),
        }
    }

    /// Replaces the collection. Records without an id receive a fresh one;
    /// duplicate ids are rejected before anything is written.
    pub fn write(&self, records: Vec<T>) -> AppResult<Vec<T>> {
        self.store(DecodedCollection::from(records))
    }

    /// Writes the typed records followed by the retained undecodable items.
    pub fn store(&self, collection: DecodedCollection<T>) -> AppResult<Vec<T>> {
        let DecodedCollection { records, skipped } = collection;
        let mut seen = HashSet::new();
        let mut prepared = Vec::with_capacity(records.len());
        for mut record in records {
            if record.id().trim().is_empty() {
                record.set_id(Uuid::new_v4().to_string());
            }
            if !seen.insert(record.id().to_string()) {
                return Err(AppError::Conflict(format!(
                    "duplicate id '{}' in {} collection",
                    record.id(),
                    T::DOMAIN
                )));
            }
            prepared.push(record);
        }

        let retained = skipped.len();
        let mut values = prepared
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        values.extend(skipped);
        let domain = T::DOMAIN;
        self.store.write_raw(domain, values)?;
        tracing::info!(domain = %domain, records = prepared.len(), retained, "collection replaced");
        Ok(prepared)
    }

    /// Read-modify-write that keeps undecodable stored items. A collection
    /// that cannot be read aborts the edit before anything is written.
    pub fn update<R>(&self, edit: impl FnOnce(&mut Vec<T>) -> AppResult<R>) -> AppResult<R> {
        let mut collection = self.load()?;
        let result = edit(&mut collection.records)?;
        self.store(collection)?;
        Ok(result)
    }
}

/// A decoded collection plus the raw items that were skipped while decoding.
#[derive(Debug, Clone)]
pub struct DecodedCollection<T> {
    pub records: Vec<T>,
    skipped: Vec<serde_json::Value>,
}

impl<T> DecodedCollection<T> {
    pub fn skipped(&self) -> &[serde_json::Value] {
        &self.skipped
    }
}

impl<T> Default for DecodedCollection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for DecodedCollection<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            records,
            skipped: Vec::new(),
        }
    }
}

/// Decodes a stored collection record by record. Records that are not
/// objects, lack an id, repeat an earlier id or fail to decode are skipped
/// and kept aside in raw form.
pub fn decode_collection<T: DomainRecord>(
    domain: Domain,
    value: serde_json::Value,
) -> Result<DecodedCollection<T>, SourceError> {
    let serde_json::Value::Array(items) = value else {
        return Err(SourceError::Corrupt(format!("{domain} collection is not a list")));
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let has_id = item
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false);
        if !has_id {
            tracing::debug!(domain = %domain, index, "skipping record without id");
            skipped.push(item);
            continue;
        }

        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => {
                if seen.insert(record.id().to_string()) {
                    records.push(record);
                } else {
                    tracing::debug!(domain = %domain, id = record.id(), "skipping duplicate record id");
                    skipped.push(item);
                }
            }
            Err(error) => {
                tracing::debug!(domain = %domain, index, error = %error, "skipping malformed record");
                skipped.push(item);
            }
        }
    }
    Ok(DecodedCollection { records, skipped })
}

use crate::core::cache::Cache;
use crate::core::holding::{Holding, HoldingPatch};
use crate::store::HoldingStore;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const HOLDINGS_PARTITION: &str = "holdings";
pub const QUOTES_PARTITION: &str = "quotes";

/// Opens the keyspace shared by every partition under the data directory.
pub fn open_keyspace(path: &Path) -> Result<Keyspace> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
    let keyspace = Config::new(path.join("store"))
        .open()
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    debug!("Opened store at {}", path.display());
    Ok(keyspace)
}

/// Syncs every partition of the keyspace to disk.
pub fn persist(keyspace: &Keyspace) -> Result<()> {
    keyspace
        .persist(PersistMode::SyncAll)
        .context("Failed to persist store")
}

/// Holdings persisted in a fjall partition, one JSON value per holding.
///
/// Keys are `"{owner}\0{id}"` so an owner's holdings share a prefix.
pub struct DiskHoldingStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    // Held by every write so `update` sees a stable record
    write_lock: Mutex<()>,
}

impl DiskHoldingStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(&open_keyspace(path)?)
    }

    pub fn new(keyspace: &Keyspace) -> Result<Self> {
        let partition = keyspace
            .open_partition(HOLDINGS_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open holdings partition")?;
        Ok(Self {
            keyspace: keyspace.clone(),
            partition,
            write_lock: Mutex::new(()),
        })
    }

    /// Syncs written holdings to disk.
    pub fn flush(&self) -> Result<()> {
        persist(&self.keyspace)
    }

    fn key(owner: &str, id: Uuid) -> Vec<u8> {
        let mut key = Self::owner_prefix(owner);
        key.extend_from_slice(id.to_string().as_bytes());
        key
    }

    fn owner_prefix(owner: &str) -> Vec<u8> {
        let mut prefix = owner.as_bytes().to_vec();
        prefix.push(0);
        prefix
    }

    fn write(&self, holding: &Holding) -> Result<()> {
        let value = serde_json::to_vec(holding)?;
        self.partition
            .insert(Self::key(&holding.owner, holding.id), value)
            .with_context(|| format!("Failed to write holding {}", holding.id))?;
        Ok(())
    }

    fn read(&self, owner: &str, id: Uuid) -> Result<Option<Holding>> {
        match self.partition.get(Self::key(owner, id))? {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt holding record {id}"))?,
            )),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HoldingStore for DiskHoldingStore {
    async fn list(&self, owner: &str) -> Result<Vec<Holding>> {
        let mut holdings = Vec::new();
        for item in self.partition.prefix(Self::owner_prefix(owner)) {
            let (_, value) = item?;
            let holding: Holding =
                serde_json::from_slice(&value).context("Corrupt holding record")?;
            holdings.push(holding);
        }
        holdings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(owner, count = holdings.len(), "Listed holdings");
        Ok(holdings)
    }

    async fn get(&self, owner: &str, id: Uuid) -> Result<Option<Holding>> {
        self.read(owner, id)
    }

    async fn create(&self, holding: Holding) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.read(&holding.owner, holding.id)?.is_some() {
            return Err(anyhow!("Holding {} already exists", holding.id));
        }
        self.write(&holding)?;
        debug!(id = %holding.id, symbol = %holding.symbol, "Created holding");
        Ok(())
    }

    async fn update(&self, owner: &str, id: Uuid, patch: &HoldingPatch) -> Result<Holding> {
        let _guard = self.write_lock.lock().await;
        let mut holding = self
            .read(owner, id)?
            .ok_or_else(|| anyhow!("Holding {} not found", id))?;
        patch.apply(&mut holding)?;
        self.write(&holding)?;
        debug!(%id, "Updated holding");
        Ok(holding)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.read(owner, id)?.is_none() {
            return Ok(false);
        }
        self.partition
            .remove(Self::key(owner, id))
            .with_context(|| format!("Failed to delete holding {id}"))?;
        debug!(%id, "Deleted holding");
        Ok(true)
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// TTL cache persisted in a fjall partition so entries outlive the process.
///
/// Keys are stored as their string form; values as JSON `CacheEntry`s. Read
/// or write failures degrade to a miss and are only logged.
pub struct DiskCache<V> {
    partition: PartitionHandle,
    _marker: PhantomData<V>,
}

impl<V> DiskCache<V> {
    pub fn new(keyspace: &Keyspace, name: &str) -> Result<Self> {
        let partition = keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open {name} partition"))?;
        Ok(Self {
            partition,
            _marker: PhantomData,
        })
    }
}

impl<V> DiskCache<V>
where
    V: DeserializeOwned,
{
    fn lookup(&self, key: &str) -> Result<Option<V>> {
        let Some(bytes) = self.partition.get(key.as_bytes())? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };
        let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
        if let Some(expires_at) = entry.expires_at
            && expires_at <= SystemTime::now()
        {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(key.as_bytes())?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<V>
where
    K: AsRef<str> + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.lookup(key.as_ref()).unwrap_or_else(|e| {
            debug!("DiskCache get error for {:?}: {}", key, e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| SystemTime::now() + d);
        let entry = CacheEntry { value, expires_at };
        let res: Result<()> = serde_json::to_vec(&entry)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| Ok(self.partition.insert(key.as_ref().as_bytes(), bytes)?));
        match res {
            Ok(()) => debug!("Cache PUT for key: {:?}", key),
            Err(e) => debug!("DiskCache put error for {:?}: {}", key, e),
        }
    }
}

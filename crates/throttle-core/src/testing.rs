//! Test doubles for the ports.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Notify;

use crate::clock::Clock;
use crate::domain::ClientConfig;
use crate::error::RepoError;
use crate::ports::{
    Cache, CacheError, ClientRepository, CounterError, CounterSnapshot, CounterStore,
};

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Counter store driven by a shared clock.
pub struct FakeCounterStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, (u64, DateTime<Utc>)>>,
    failing: AtomicBool,
}

impl FakeCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CounterError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CounterError::Backend("counter store down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for FakeCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<CounterSnapshot, CounterError> {
        self.check()?;
        let now = self.clock.now();
        let fresh_expiry = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| CounterError::Backend("ttl out of range".to_string()))?;
        let mut entries = self.entries.lock().unwrap();

        let entry = entries
            .entry(key.to_string())
            .and_modify(|(count, expires_at)| {
                if *expires_at <= now {
                    *count = 0;
                    *expires_at = fresh_expiry;
                }
            })
            .or_insert_with(|| (0, fresh_expiry));
        entry.0 += 1;

        Ok(CounterSnapshot {
            count: entry.0,
            ttl: (entry.1 - now).to_std().unwrap(),
        })
    }

    async fn get(&self, key: &str) -> Result<u64, CounterError> {
        self.check()?;
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(count, _)| *count)
            .unwrap_or(0))
    }
}

/// Cache that can be told to fail reads or writes.
#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FakeCache {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl Cache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("cache down".to_string()));
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Operation("cache down".to_string()));
        }
        self.insert_raw(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Operation("cache down".to_string()));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Holds the next repository read until released.
#[derive(Default)]
pub struct ReadGate {
    armed: AtomicBool,
    /// Signalled once the held read has started.
    pub entered: Notify,
    /// Lets the held read continue.
    pub release: Notify,
}

impl ReadGate {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    async fn pass(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

/// Repository with call counting and failure injection.
#[derive(Default)]
pub struct FakeRepository {
    clients: Mutex<HashMap<String, ClientConfig>>,
    pub reads: AtomicUsize,
    pub failing: AtomicBool,
    pub stall: AtomicBool,
    pub gate: ReadGate,
}

impl FakeRepository {
    async fn guard(&self) -> Result<(), RepoError> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Connection("database down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for FakeRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<ClientConfig>, RepoError> {
        self.gate.pass().await;
        self.guard().await?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.clients.lock().unwrap().get(name).cloned())
    }

    async fn insert(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        self.guard().await?;
        let mut clients = self.clients.lock().unwrap();
        if clients.contains_key(&client.name) {
            return Err(RepoError::Constraint("name already exists".to_string()));
        }
        clients.insert(client.name.clone(), client.clone());
        Ok(client)
    }

    async fn update(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        self.guard().await?;
        let mut clients = self.clients.lock().unwrap();
        match clients.get_mut(&client.name) {
            Some(existing) => {
                *existing = client.clone();
                Ok(client)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), RepoError> {
        self.guard().await?;
        self.clients
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

//! Persisted key-value store and typed configuration persistence
//!
//! The platform provides a bounded key-value store; this module wraps
//! it with postcard-serialized helpers for the values the device
//! persists. Persistence failures surface to the caller and are never
//! retried here.

use heapless::{LinearMap, String, Vec};

use crate::config::CoverConfig;

/// Longest key the store accepts
pub const MAX_KEY_LEN: usize = 32;
/// Largest serialized value the helpers handle
pub const MAX_VALUE_LEN: usize = 64;
/// Distinct keys the default store holds
pub const MAX_KEYS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Key not present
    NotFound,
    /// Key longer than [`MAX_KEY_LEN`]
    KeyTooLong,
    /// No slot left for a new key
    Full,
    /// Caller buffer smaller than the stored value
    BufferTooSmall,
    /// Stored bytes failed to deserialize
    Corrupt,
}

/// Bounded persisted key-value store provided by the platform
pub trait KeyValueStore {
    /// Copy the value of `key` into `buf`; returns the value length
    fn get(&self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile store used on platforms without flash and in host tests
pub struct RamKeyValueStore<const KEYS: usize = MAX_KEYS, const VALUE: usize = MAX_VALUE_LEN> {
    entries: LinearMap<String<MAX_KEY_LEN>, Vec<u8, VALUE>, KEYS>,
}

impl<const KEYS: usize, const VALUE: usize> RamKeyValueStore<KEYS, VALUE> {
    pub fn new() -> Self {
        Self {
            entries: LinearMap::new(),
        }
    }

    /// Drop every entry; used on factory reset
    pub fn clear(&mut self) {
        self.entries = LinearMap::new();
    }
}

impl<const KEYS: usize, const VALUE: usize> Default for RamKeyValueStore<KEYS, VALUE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const KEYS: usize, const VALUE: usize> KeyValueStore for RamKeyValueStore<KEYS, VALUE> {
    fn get(&self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let key: String<MAX_KEY_LEN> =
            String::try_from(key).map_err(|_| StorageError::KeyTooLong)?;
        let value = self.entries.get(&key).ok_or(StorageError::NotFound)?;
        if buf.len() < value.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buf[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let key: String<MAX_KEY_LEN> =
            String::try_from(key).map_err(|_| StorageError::KeyTooLong)?;
        let value: Vec<u8, VALUE> = Vec::from_slice(value).map_err(|_| StorageError::Full)?;
        self.entries
            .insert(key, value)
            .map(|_| ())
            .map_err(|_| StorageError::Full)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let key: String<MAX_KEY_LEN> =
            String::try_from(key).map_err(|_| StorageError::KeyTooLong)?;
        self.entries
            .remove(&key)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

fn cover_config_key(endpoint: u16) -> String<MAX_KEY_LEN> {
    let mut key = String::new();
    // Writing a u16 into a 32-byte string cannot fail
    let _ = core::fmt::Write::write_fmt(&mut key, format_args!("cover/{}", endpoint));
    key
}

/// Persist one covering's motion parameters under its endpoint key
pub fn save_cover_config(
    store: &mut impl KeyValueStore,
    endpoint: u16,
    config: &CoverConfig,
) -> Result<(), StorageError> {
    let mut buffer = [0u8; MAX_VALUE_LEN];
    let bytes = postcard::to_slice(config, &mut buffer).map_err(|_| StorageError::Full)?;
    store.put(&cover_config_key(endpoint), bytes)
}

/// Load one covering's persisted motion parameters
pub fn load_cover_config(
    store: &impl KeyValueStore,
    endpoint: u16,
) -> Result<CoverConfig, StorageError> {
    let mut buffer = [0u8; MAX_VALUE_LEN];
    let len = store.get(&cover_config_key(endpoint), &mut buffer)?;
    postcard::from_bytes(&buffer[..len]).map_err(|_| StorageError::Corrupt)
}

//! Whole-collection JSON codec over a [`Substrate`].
//!
//! A collection is always read and written in full. A missing key decodes to
//! the collection's `Default`; text that fails to parse is surfaced as
//! [`Error::Decode`] and never replaced with an empty value.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::storage::SharedSubstrate;

/// What a read-modify-write closure wants done with the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<R> {
    /// Write the mutated collection back, then return the value.
    Persist(R),
    /// Leave the stored text untouched.
    Discard(R),
}

impl<R> Outcome<R> {
    fn into_parts(self) -> (R, bool) {
        match self {
            Outcome::Persist(value) => (value, true),
            Outcome::Discard(value) => (value, false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentCodec {
    substrate: SharedSubstrate,
}

impl DocumentCodec {
    pub fn new(substrate: SharedSubstrate) -> Self {
        Self { substrate }
    }

    pub fn substrate(&self) -> &SharedSubstrate {
        &self.substrate
    }

    /// Read and parse the collection under `key`.
    pub fn decode<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.substrate.get(key)? else {
            tracing::debug!(key, "collection missing, using empty default");
            return Ok(T::default());
        };

        serde_json::from_str(&raw).map_err(|source| {
            tracing::error!(key, error = %source, "stored collection is corrupt");
            Error::Decode {
                key: key.to_string(),
                source,
            }
        })
    }

    /// Serialize `value` and replace whatever is stored under `key`.
    pub fn encode<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string_pretty(value)?;
        tracing::debug!(key, bytes = json.len(), "writing collection");
        self.substrate.set(key, &json)
    }

    /// Decode, mutate and (optionally) encode `key` as one step.
    ///
    /// The substrate's exclusive guard is held across the whole cycle.
    pub fn update<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> Result<Outcome<R>>,
    {
        let _guard = self.substrate.exclusive(key)?;

        let mut collection: T = self.decode(key)?;
        let (value, persist) = f(&mut collection)?.into_parts();
        if persist {
            self.encode(key, &collection)?;
        }
        Ok(value)
    }

    /// Drop the collection under `key` entirely.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.substrate.remove(key)
    }
}

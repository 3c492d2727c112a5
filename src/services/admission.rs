//! In-process admission gate for user creation.
//!
//! A reservation marks a key as "creation in progress". Reserving is a single
//! atomic insert-if-absent, so of any number of concurrent callers for the
//! same key exactly one wins until that reservation is released.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// What a reservation is held on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdmissionKey {
    /// A single login.
    Login(String),
    /// The whole Admin group; held while an Admin candidate is in flight.
    AdminGroup,
}

impl AdmissionKey {
    pub fn login(login: impl Into<String>) -> Self {
        Self::Login(login.into())
    }
}

impl fmt::Display for AdmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login(login) => write!(f, "login:{login}"),
            Self::AdminGroup => f.write_str("group:Admin"),
        }
    }
}

#[derive(Debug, Default)]
pub struct AdmissionRegistry {
    reservations: DashMap<AdmissionKey, Instant>,
}

impl AdmissionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` only if this call created the reservation.
    pub fn reserve(&self, key: AdmissionKey) -> bool {
        match self.reservations.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                true
            }
        }
    }

    /// Drops the reservation for `key`, whether or not one is held.
    pub fn release(&self, key: &AdmissionKey) {
        if let Some((key, since)) = self.reservations.remove(key) {
            debug!(%key, held = ?since.elapsed(), "Released reservation");
        }
    }

    /// Reserves `key` and hands back a guard that releases it on drop.
    pub fn try_reserve(&self, key: AdmissionKey) -> Option<Reservation<'_>> {
        self.reserve(key.clone()).then(|| Reservation {
            registry: self,
            key,
        })
    }

    #[must_use]
    pub fn is_reserved(&self, key: &AdmissionKey) -> bool {
        self.reservations.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

/// Held reservation. Releasing happens in `Drop`, so every exit path
/// (including a dropped future) frees the key.
#[must_use = "the reservation is released as soon as the guard is dropped"]
pub struct Reservation<'a> {
    registry: &'a AdmissionRegistry,
    key: AdmissionKey,
}

impl Reservation<'_> {
    #[must_use]
    pub const fn key(&self) -> &AdmissionKey {
        &self.key
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

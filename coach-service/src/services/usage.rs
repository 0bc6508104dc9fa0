//! In-memory free-question counters.
//!
//! Counts live only for the lifetime of the process. All counters of one
//! device (its anonymous key and every email key) sit in a single map entry,
//! so check-and-increment, refunds and email migration for that device are
//! serialized under the entry lock.

use crate::models::UsageKey;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Returned when a key has used up its free questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Free question limit reached ({used}/{limit})")]
pub struct LimitReached {
    pub used: u32,
    pub limit: u32,
}

/// Counters for one device.
#[derive(Debug, Default)]
struct DeviceUsage {
    anonymous: u32,
    by_email: HashMap<String, u32>,
    /// Outstanding reservations and the email slot currently holding each
    /// one (`None` is the anonymous slot). Migration re-points these.
    pending: HashMap<u64, Option<String>>,
}

impl DeviceUsage {
    fn count(&self, email: Option<&str>) -> u32 {
        match email {
            None => self.anonymous,
            Some(email) => self.by_email.get(email).copied().unwrap_or(0),
        }
    }

    fn slot_mut(&mut self, email: Option<&str>) -> &mut u32 {
        match email {
            None => &mut self.anonymous,
            Some(email) => self.by_email.entry(email.to_string()).or_insert(0),
        }
    }

    fn refund(&mut self, email: Option<&str>) {
        let count = self.slot_mut(email);
        *count = count.saturating_sub(1);
        if let Some(email) = email {
            if self.by_email.get(email) == Some(&0) {
                self.by_email.remove(email);
            }
        }
    }

    fn tracked_keys(&self) -> usize {
        usize::from(self.anonymous > 0) + self.by_email.len()
    }

    fn is_idle(&self) -> bool {
        self.anonymous == 0 && self.by_email.is_empty() && self.pending.is_empty()
    }
}

/// Per-key question counters shared by all request handlers.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    devices: Arc<DashMap<String, DeviceUsage>>,
    next_reservation: Arc<AtomicU64>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Questions recorded against `key` so far.
    pub fn usage(&self, key: &UsageKey) -> u32 {
        self.devices
            .get(key.device_id())
            .map(|device| device.count(key.email()))
            .unwrap_or(0)
    }

    /// Count one question for `key`, returning the count including it.
    ///
    /// `limit == 0` means unlimited; the count is still tracked.
    pub fn try_acquire(&self, key: &UsageKey, limit: u32) -> Result<u32, LimitReached> {
        let mut device = self.devices.entry(key.device_id().to_string()).or_default();
        Self::acquire_in(&mut device, key, limit)
    }

    fn acquire_in(
        device: &mut DeviceUsage,
        key: &UsageKey,
        limit: u32,
    ) -> Result<u32, LimitReached> {
        let used = device.count(key.email());
        if limit > 0 && used >= limit {
            return Err(LimitReached { used, limit });
        }

        let count = device.slot_mut(key.email());
        *count += 1;
        Ok(*count)
    }

    /// Like [`try_acquire`](Self::try_acquire), but the question is handed back
    /// automatically unless the returned guard is committed.
    pub fn reserve(&self, key: &UsageKey, limit: u32) -> Result<Reservation, LimitReached> {
        let id = self.next_reservation.fetch_add(1, Ordering::Relaxed);
        let count = {
            let mut device = self.devices.entry(key.device_id().to_string()).or_default();
            let count = Self::acquire_in(&mut device, key, limit)?;
            device.pending.insert(id, key.email().map(str::to_string));
            count
        };

        Ok(Reservation {
            tracker: self.clone(),
            key: key.clone(),
            id,
            count,
            committed: false,
        })
    }

    /// Settle reservation `id`: refunded unless `keep`. The refund goes to
    /// whichever slot holds the reservation now, which differs from the
    /// reserving key once the device has been migrated to an email.
    fn settle(&self, device_id: &str, id: u64, keep: bool) {
        if let Some(mut device) = self.devices.get_mut(device_id) {
            if let Some(slot) = device.pending.remove(&id) {
                if !keep {
                    device.refund(slot.as_deref());
                }
            }
        }
        self.devices.remove_if(device_id, |_, device| device.is_idle());
    }

    /// Move the anonymous counter of `device_id` onto its email-qualified key.
    ///
    /// Any count already held by the email key is kept and added to, and
    /// reservations still in flight on the anonymous key follow it. Once moved,
    /// the anonymous key is empty, so repeating the call changes nothing.
    /// Returns the email key's count afterwards.
    pub fn migrate_to_email(&self, device_id: &str, email: &str) -> u32 {
        let anonymous = UsageKey::anonymous(device_id);
        let target = UsageKey::with_email(device_id, email);
        let target_email = email.trim();

        let Some(mut device) = self.devices.get_mut(anonymous.device_id()) else {
            return 0;
        };

        let moved = std::mem::take(&mut device.anonymous);
        if moved == 0 {
            return device.count(Some(target_email));
        }

        let total = {
            let count = device.slot_mut(Some(target_email));
            *count += moved;
            *count
        };
        for slot in device.pending.values_mut().filter(|slot| slot.is_none()) {
            *slot = Some(target_email.to_string());
        }

        tracing::info!(
            from = %anonymous,
            to = %target,
            moved,
            total,
            "Migrated usage counter to email key"
        );
        total
    }

    pub fn contains(&self, key: &UsageKey) -> bool {
        self.usage(key) > 0
    }

    /// Number of keys with a non-zero count.
    pub fn len(&self) -> usize {
        self.devices
            .iter()
            .map(|device| device.tracked_keys())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One reserved question. Dropping it uncommitted (an error path, or the
/// request future being cancelled) returns the question.
#[derive(Debug)]
pub struct Reservation {
    tracker: UsageTracker,
    key: UsageKey,
    id: u64,
    count: u32,
    committed: bool,
}

impl Reservation {
    pub fn key(&self) -> &UsageKey {
        &self.key
    }

    /// Keep the question and return the key's count including it.
    pub fn commit(mut self) -> u32 {
        self.committed = true;
        self.tracker.settle(self.key.device_id(), self.id, true);
        self.count
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.committed {
            self.tracker.settle(self.key.device_id(), self.id, false);
        }
    }
}

//! Snowflake ID - Discord-compatible 64-bit unique identifier
//!
//! Layout (configurable bit widths, default shown):
//! - Bit 63: sign, always 0
//! - Bits 62-22: timestamp, ms since `Snowflake::EPOCH` (41 bits)
//! - Bits 21-12: datacenter id (`D` bits, default 0)
//! - Bits 11-2:  worker id (`W` bits, default 10)
//! - Bits 1-0:   sequence (`S` bits, default 12)
//!
//! `D + W + S` must be `<= 22`; `W >= 1` and `S >= 1`.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Discord-compatible Snowflake ID (64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1704067200000;

    /// Create a new Snowflake from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Check if the Snowflake is zero (uninitialized)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract timestamp (milliseconds since Unix epoch) assuming the default layout
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> 22) + Self::EPOCH
    }

    /// Convert timestamp to DateTime<Utc>
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl<'de> Visitor<'de> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value as i64))
            }

            fn visit_str<E>(self, value: &str) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                value
                    .parse::<i64>()
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Bit-width layout for a `SnowflakeGenerator`.
///
/// `datacenter_bits + worker_bits + sequence_bits` must be `<= 22`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnowflakeLayout {
    pub datacenter_bits: u8,
    pub worker_bits: u8,
    pub sequence_bits: u8,
}

impl SnowflakeLayout {
    /// Default layout: (D,W,S) = (0,10,12)
    pub const DEFAULT: Self = Self {
        datacenter_bits: 0,
        worker_bits: 10,
        sequence_bits: 12,
    };

    fn validate(&self) -> Result<(), DomainError> {
        let total = self.datacenter_bits + self.worker_bits + self.sequence_bits;
        if total > 22 {
            return Err(DomainError::InvalidSnowflakeLayout(
                "datacenter_bits + worker_bits + sequence_bits must be <= 22".into(),
            ));
        }
        if self.worker_bits == 0 {
            return Err(DomainError::InvalidSnowflakeLayout("worker_bits must be >= 1".into()));
        }
        if self.sequence_bits == 0 {
            return Err(DomainError::InvalidSnowflakeLayout("sequence_bits must be >= 1".into()));
        }
        Ok(())
    }

    fn sequence_mask(&self) -> i64 {
        (1i64 << self.sequence_bits) - 1
    }

    fn worker_mask(&self) -> i64 {
        (1i64 << self.worker_bits) - 1
    }

    fn datacenter_mask(&self) -> i64 {
        (1i64 << self.datacenter_bits) - 1
    }

    fn worker_shift(&self) -> u32 {
        u32::from(self.sequence_bits)
    }

    fn datacenter_shift(&self) -> u32 {
        u32::from(self.sequence_bits) + u32::from(self.worker_bits)
    }

    fn timestamp_shift(&self) -> u32 {
        self.datacenter_shift() + u32::from(self.datacenter_bits)
    }
}

impl Default for SnowflakeLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Thread-safe Snowflake ID generator
///
/// Generates unique, monotonically increasing IDs per (datacenter, worker) pair.
/// Uses a CAS loop over the last-seen timestamp, lock-free.
pub struct SnowflakeGenerator {
    datacenter_id: i64,
    worker_id: i64,
    layout: SnowflakeLayout,
    sequence: AtomicI64,
    last_timestamp: AtomicI64,
}

impl SnowflakeGenerator {
    /// Create a generator with the default layout `(D,W,S) = (0,10,12)`.
    ///
    /// # Panics
    /// Panics if `worker_id >= 1024`.
    pub fn new(worker_id: u16) -> Self {
        Self::with_layout(0, worker_id, SnowflakeLayout::DEFAULT)
            .expect("default layout is always valid")
    }

    /// Create a generator with an explicit datacenter id, worker id, and bit layout.
    pub fn with_layout(
        datacenter_id: u16,
        worker_id: u16,
        layout: SnowflakeLayout,
    ) -> Result<Self, DomainError> {
        layout.validate()?;

        let max_datacenter = if layout.datacenter_bits == 0 { 0 } else { layout.datacenter_mask() };
        let max_worker = layout.worker_mask();

        if i64::from(datacenter_id) > max_datacenter {
            return Err(DomainError::InvalidSnowflakeLayout(format!(
                "datacenter_id {datacenter_id} exceeds {max_datacenter} for {} datacenter bits",
                layout.datacenter_bits
            )));
        }
        if i64::from(worker_id) > max_worker {
            return Err(DomainError::InvalidSnowflakeLayout(format!(
                "worker_id {worker_id} exceeds {max_worker} for {} worker bits",
                layout.worker_bits
            )));
        }

        Ok(Self {
            datacenter_id: i64::from(datacenter_id),
            worker_id: i64::from(worker_id),
            layout,
            sequence: AtomicI64::new(0),
            last_timestamp: AtomicI64::new(0),
        })
    }

    /// Generate a new unique Snowflake ID.
    ///
    /// Fails with [`DomainError::ClockSkew`] if the system clock is observed to have
    /// moved backwards relative to the last id minted by this generator — the caller
    /// must not retry silently, per the fatal/non-retryable contract on message ids.
    pub fn generate(&self) -> Result<Snowflake, DomainError> {
        loop {
            let timestamp = self.current_timestamp();
            let last = self.last_timestamp.load(Ordering::Acquire);

            if timestamp < last {
                return Err(DomainError::ClockSkew {
                    now_ms: timestamp,
                    last_ms: last,
                });
            }

            let sequence = if timestamp == last {
                let seq = self.sequence.fetch_add(1, Ordering::Relaxed) & self.layout.sequence_mask();
                if seq == 0 {
                    // Sequence exhausted for this millisecond: busy-wait for the next one.
                    let mut next = timestamp;
                    while next <= last {
                        std::hint::spin_loop();
                        next = self.current_timestamp();
                    }
                    self.sequence.store(1, Ordering::Relaxed);
                    match self.last_timestamp.compare_exchange(
                        last,
                        next,
                        Ordering::Release,
                        Ordering::Relaxed,
                    ) {
                        Ok(_) => {
                            return Ok(self.encode(next, 0));
                        }
                        Err(_) => continue,
                    }
                } else {
                    seq
                }
            } else {
                self.sequence.store(1, Ordering::Relaxed);
                0
            };

            match self.last_timestamp.compare_exchange(
                last,
                timestamp,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(self.encode(timestamp, sequence)),
                Err(_) => continue,
            }
        }
    }

    fn encode(&self, timestamp_ms: i64, sequence: i64) -> Snowflake {
        let id = ((timestamp_ms - Snowflake::EPOCH) << self.layout.timestamp_shift())
            | (self.datacenter_id << self.layout.datacenter_shift())
            | (self.worker_id << self.layout.worker_shift())
            | sequence;
        Snowflake::new(id)
    }

    /// Get current timestamp in milliseconds since Unix epoch
    #[inline]
    fn current_timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }

    /// Get the worker ID of this generator
    pub fn worker_id(&self) -> u16 {
        self.worker_id as u16
    }

    /// Get the datacenter ID of this generator
    pub fn datacenter_id(&self) -> u16 {
        self.datacenter_id as u16
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

// SnowflakeGenerator is automatically Send + Sync: every field is a primitive or atomic.

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_snowflake_creation() {
        let sf = Snowflake::new(123456789);
        assert_eq!(sf.into_inner(), 123456789);
    }

    #[test]
    fn test_snowflake_zero() {
        let sf = Snowflake::default();
        assert!(sf.is_zero());

        let sf = Snowflake::new(1);
        assert!(!sf.is_zero());
    }

    #[test]
    fn test_snowflake_parse() {
        let sf = Snowflake::parse("123456789").unwrap();
        assert_eq!(sf.into_inner(), 123456789);

        assert!(Snowflake::parse("invalid").is_err());
    }

    #[test]
    fn test_snowflake_display() {
        let sf = Snowflake::new(123456789);
        assert_eq!(sf.to_string(), "123456789");
    }

    #[test]
    fn test_snowflake_serialize_json() {
        let sf = Snowflake::new(123456789012345678);
        let json = serde_json::to_string(&sf).unwrap();
        assert_eq!(json, "\"123456789012345678\"");
    }

    #[test]
    fn test_snowflake_deserialize_string() {
        let sf: Snowflake = serde_json::from_str("\"123456789012345678\"").unwrap();
        assert_eq!(sf.into_inner(), 123456789012345678);
    }

    #[test]
    fn test_snowflake_deserialize_number() {
        let sf: Snowflake = serde_json::from_str("12345").unwrap();
        assert_eq!(sf.into_inner(), 12345);
    }

    #[test]
    fn test_snowflake_ordering() {
        let sf1 = Snowflake::new(100);
        let sf2 = Snowflake::new(200);
        assert!(sf1 < sf2);
    }

    #[test]
    fn test_generator_creates_unique_ids() {
        let gen = SnowflakeGenerator::new(1);
        let mut ids = HashSet::new();

        for _ in 0..1000 {
            let id = gen.generate().unwrap();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_generator_ids_are_monotonic() {
        let gen = SnowflakeGenerator::new(1);
        let mut last = Snowflake::new(0);

        for _ in 0..1000 {
            let id = gen.generate().unwrap();
            assert!(id > last, "IDs should be monotonically increasing");
            last = id;
        }
    }

    #[test]
    fn test_generator_worker_id_preserved() {
        let gen = SnowflakeGenerator::new(42);
        let id = gen.generate().unwrap();
        assert_eq!(gen.worker_id(), 42);
        let _ = id;
    }

    #[test]
    fn test_generator_thread_safety() {
        let gen = Arc::new(SnowflakeGenerator::new(1));
        let mut handles = vec![];
        let ids = Arc::new(std::sync::Mutex::new(HashSet::new()));

        for _ in 0..4 {
            let gen = Arc::clone(&gen);
            let ids = Arc::clone(&ids);

            handles.push(thread::spawn(move || {
                let mut local_ids = Vec::with_capacity(1000);
                for _ in 0..1000 {
                    local_ids.push(gen.generate().unwrap());
                }
                ids.lock().unwrap().extend(local_ids);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ids.lock().unwrap().len(), 4000, "All IDs should be unique");
    }

    #[test]
    fn test_generator_invalid_worker_id() {
        let err = SnowflakeGenerator::with_layout(0, 1024, SnowflakeLayout::DEFAULT).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSnowflakeLayout(_)));
    }

    #[test]
    fn test_layout_bit_budget_enforced() {
        let layout = SnowflakeLayout {
            datacenter_bits: 10,
            worker_bits: 10,
            sequence_bits: 10,
        };
        let err = SnowflakeGenerator::with_layout(0, 0, layout).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSnowflakeLayout(_)));
    }

    #[test]
    fn test_clock_regression_is_fatal() {
        let gen = SnowflakeGenerator::new(1);
        gen.last_timestamp.store(i64::MAX / 2, Ordering::SeqCst);
        let err = gen.generate().unwrap_err();
        assert!(matches!(err, DomainError::ClockSkew { .. }));
    }

    #[test]
    fn test_snowflake_timestamp_extraction() {
        let gen = SnowflakeGenerator::new(1);
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;

        let id = gen.generate().unwrap();

        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;

        let timestamp = id.timestamp();
        assert!(
            timestamp >= before && timestamp <= after,
            "Timestamp should be within generation window"
        );
    }
}

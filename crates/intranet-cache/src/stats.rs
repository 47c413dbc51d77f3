use std::ops::Add;

use serde::Serialize;

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of entries currently stored, expired ones included.
    pub size: usize,
    /// Number of stored entries that are still within their TTL.
    pub valid_entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed by cleanup (expiry or size bound).
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl Add for CacheStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            size: self.size + other.size,
            valid_entries: self.valid_entries + other.valid_entries,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            evictions: self.evictions + other.evictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_empty_stats() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
    }

    #[test]
    fn stats_serialize_in_camel_case() {
        let json = serde_json::to_value(CacheStats {
            size: 2,
            valid_entries: 1,
            ..CacheStats::default()
        })
        .unwrap();
        assert_eq!(json["validEntries"], 1);
        assert_eq!(json["size"], 2);
    }
}

use crate::{QuotaConfig, RuleSet, WarbondSelection, MAX_PLAYER_LEVEL};
use serde::{Deserialize, Serialize};

/// Everything a roll depends on besides the catalog and the random source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadoutConfig {
    pub warbonds: WarbondSelection,
    #[serde(rename = "counts")]
    pub quotas: QuotaConfig,
    pub rules: RuleSet,
    #[serde(rename = "level")]
    pub player_level: u8,
}

impl Default for LoadoutConfig {
    fn default() -> Self {
        Self {
            warbonds: WarbondSelection::base_game_only(),
            quotas: QuotaConfig::default(),
            rules: RuleSet::defaults(),
            player_level: MAX_PLAYER_LEVEL,
        }
    }
}

/// Gap between staggered locks past the configured offsets.
const LOCK_STAGGER_MS: u64 = 500;

/// Reveal animation timing, in milliseconds from the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub tick_ms: u64,
    pub lock_offsets_ms: Vec<u64>,
    pub flash_ms: u64,
    pub grace_ms: u64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            tick_ms: 80,
            lock_offsets_ms: vec![1000, 1500, 2000, 2500],
            flash_ms: 400,
            grace_ms: 200,
        }
    }
}

impl RevealTiming {
    /// Lock offset for `slot`; slots past the configured list keep staggering.
    pub fn lock_offset(&self, slot: usize) -> u64 {
        if let Some(offset) = self.lock_offsets_ms.get(slot) {
            return *offset;
        }
        let last = self.lock_offsets_ms.last().copied().unwrap_or(0);
        let extra = (slot + 1 - self.lock_offsets_ms.len()) as u64;
        last + extra * LOCK_STAGGER_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offsets_match_the_four_slots() {
        let timing = RevealTiming::default();
        let offsets: Vec<u64> = (0..4).map(|slot| timing.lock_offset(slot)).collect();
        assert_eq!(offsets, vec![1000, 1500, 2000, 2500]);
    }

    #[test]
    fn short_offset_list_keeps_staggering() {
        let timing = RevealTiming {
            lock_offsets_ms: vec![300],
            ..RevealTiming::default()
        };
        assert_eq!(timing.lock_offset(0), 300);
        assert_eq!(timing.lock_offset(2), 1300);
    }

    #[test]
    fn partial_timing_fills_in_defaults() {
        let timing: RevealTiming = serde_json::from_str(r#"{"tick_ms": 40}"#).unwrap();
        assert_eq!(timing.tick_ms, 40);
        assert_eq!(timing.grace_ms, 200);
    }
}

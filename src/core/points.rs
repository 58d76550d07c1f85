use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

use super::storage::KeyValueStore;
use crate::config::{LAST_DAILY_KEY, PLUS_KEY, POINTS_KEY};

/// Directional Points balance, the Directional+ latch and the day of the
/// last login bonus.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PointsState {
    pub balance: u64,
    pub plus: bool,
    pub last_daily: Option<DateTime<FixedOffset>>,
}

impl PointsState {
    /// Read the persisted triple, replacing anything missing or malformed
    /// with its default.
    pub fn from_store(store: &dyn KeyValueStore) -> Self {
        Self {
            balance: read(store, POINTS_KEY)
                .map(|raw| parse_balance(&raw))
                .unwrap_or(0),
            plus: read(store, PLUS_KEY).as_deref() == Some("true"),
            last_daily: read(store, LAST_DAILY_KEY).and_then(|raw| parse_last_daily(&raw)),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store
            .set(POINTS_KEY, &self.balance.to_string())
            .with_context(|| format!("saving {POINTS_KEY}"))?;
        store
            .set(PLUS_KEY, if self.plus { "true" } else { "false" })
            .with_context(|| format!("saving {PLUS_KEY}"))?;
        if let Some(at) = &self.last_daily {
            store
                .set(LAST_DAILY_KEY, &format_timestamp(at))
                .with_context(|| format!("saving {LAST_DAILY_KEY}"))?;
        }
        Ok(())
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, %err, "storage read failed, using default");
            None
        }
    }
}

/// Decimal balance. Fractions truncate, negatives and garbage become 0.
pub fn parse_balance(raw: &str) -> u64 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.trunc().min(u64::MAX as f64) as u64,
        Ok(_) => 0,
        Err(_) => {
            if !raw.is_empty() {
                tracing::warn!(key = POINTS_KEY, value = raw, "non-numeric balance, using 0");
            }
            0
        }
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` read as UTC midnight.
pub fn parse_last_daily(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at);
    }
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset());
    if parsed.is_none() {
        tracing::warn!(key = LAST_DAILY_KEY, value = raw, "unparseable bonus date, ignoring");
    }
    parsed
}

/// `2026-10-18T09:30:00.000Z`
pub fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    #[test]
    fn empty_store_yields_defaults() {
        let state = PointsState::from_store(&MemoryStore::new());
        assert_eq!(state, PointsState::default());
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let store = MemoryStore::with_entries([
            (POINTS_KEY, "lots"),
            (PLUS_KEY, "TRUE"),
            (LAST_DAILY_KEY, "yesterday-ish"),
        ]);
        let state = PointsState::from_store(&store);
        assert_eq!(state, PointsState::default());
    }

    #[test]
    fn plus_flag_requires_exact_true() {
        for (raw, expected) in [("true", true), ("false", false), ("1", false), (" true", false)] {
            let store = MemoryStore::with_entries([(PLUS_KEY, raw)]);
            assert_eq!(PointsState::from_store(&store).plus, expected, "{raw:?}");
        }
    }

    #[test]
    fn balance_parsing_is_tolerant() {
        assert_eq!(parse_balance("120"), 120);
        assert_eq!(parse_balance(" 42 "), 42);
        assert_eq!(parse_balance("12.9"), 12);
        assert_eq!(parse_balance("-5"), 0);
        assert_eq!(parse_balance("NaN"), 0);
        assert_eq!(parse_balance(""), 0);
    }

    #[test]
    fn date_only_value_is_utc_midnight() {
        let at = parse_last_daily("2026-10-18").unwrap();
        assert_eq!(at.to_rfc3339(), "2026-10-18T00:00:00+00:00");
    }

    #[test]
    fn save_writes_three_keys_and_round_trips() {
        let mut store = MemoryStore::new();
        let state = PointsState {
            balance: 550,
            plus: true,
            last_daily: Some(DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z").unwrap()),
        };
        state.save(&mut store).unwrap();

        assert_eq!(store.entries()[POINTS_KEY], "550");
        assert_eq!(store.entries()[PLUS_KEY], "true");
        assert_eq!(store.entries()[LAST_DAILY_KEY], "2026-10-18T09:30:00.000Z");
        assert_eq!(PointsState::from_store(&store), state);
    }

    #[test]
    fn save_skips_unset_bonus_date() {
        let mut store = MemoryStore::new();
        PointsState::default().save(&mut store).unwrap();
        assert!(!store.entries().contains_key(LAST_DAILY_KEY));
        assert_eq!(store.entries()[PLUS_KEY], "false");
    }

    #[test]
    fn save_failure_names_the_key() {
        let mut store = MemoryStore::new();
        store.set_read_only(true);
        let err = PointsState::default().save(&mut store).unwrap_err();
        assert!(format!("{err:#}").contains(POINTS_KEY));
    }
}

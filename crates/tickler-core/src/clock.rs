//! Time normalization — every instant in the system is canonicalized to a
//! single reference timezone before storage or comparison.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone};

use crate::error::{Result, TicklerError};

/// The reference timezone, expressed as a fixed UTC offset (e.g. "+05:30").
///
/// A timestamp without zone information is assumed to already be expressed
/// in this zone and is tagged with it (no numeric shift). A timestamp
/// carrying another zone is converted into it, preserving the absolute
/// instant. Canonicalization is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefZone(FixedOffset);

impl RefZone {
    /// Parse an offset identifier of the form "+HH:MM" or "-HH:MM".
    pub fn parse(id: &str) -> Result<Self> {
        let bad = || TicklerError::MalformedTimestamp(format!("invalid reference offset '{id}'"));

        let (sign, rest) = if let Some(rest) = id.strip_prefix('+') {
            (1i32, rest)
        } else if let Some(rest) = id.strip_prefix('-') {
            (-1i32, rest)
        } else {
            return Err(bad());
        };
        let (h, m) = rest.split_once(':').ok_or_else(bad)?;
        let hours: u32 = h.parse().map_err(|_| bad())?;
        let minutes: u32 = m.parse().map_err(|_| bad())?;
        if hours > 23 || minutes > 59 {
            return Err(bad());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60) as i32)
            .map(Self)
            .ok_or_else(bad)
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Current instant in the reference zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        chrono::Utc::now().with_timezone(&self.0)
    }

    /// Shift an already-aware instant into the reference zone. Same absolute
    /// instant; idempotent when the input is already canonical.
    pub fn canonicalize(&self, dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        dt.with_timezone(&self.0)
    }

    /// Normalize a textual timestamp into the reference zone.
    ///
    /// Accepts RFC3339 (offset-carrying) input, which is shifted, or a naive
    /// `YYYY-MM-DDTHH:MM[:SS]` value, which is tagged with the reference
    /// zone. Anything else is rejected — never silently coerced.
    pub fn normalize(&self, s: &str) -> Result<DateTime<FixedOffset>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(self.canonicalize(dt));
        }
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .map_err(|_| TicklerError::MalformedTimestamp(format!("unparseable timestamp '{s}'")))?;
        self.0
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| TicklerError::MalformedTimestamp(format!("ambiguous timestamp '{s}'")))
    }

    /// Render an instant in the fixed-width canonical storage form
    /// (`YYYY-MM-DDTHH:MM:SS+HH:MM`). All rows share the reference offset,
    /// so lexicographic order on the stored text equals chronological order.
    pub fn to_storage(&self, dt: DateTime<FixedOffset>) -> String {
        self.canonicalize(dt)
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }
}

impl Default for RefZone {
    /// IST (+05:30), the default reference zone.
    fn default() -> Self {
        Self(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap_or_else(|| chrono::Utc.fix()))
    }
}

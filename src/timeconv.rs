//! Conversion between operator wall-clock input and absolute instants.
//!
//! Operators enter query bounds as a calendar day plus a time of day in the
//! rig's civil timezone (Europe/Copenhagen by default), independent of the
//! zone the dashboard host runs in. The backend wants UTC instants, and chart
//! labels go back the other way.

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Chart label rendering (`da-DK` short date and time).
pub const LABEL_FORMAT: &str = "%d.%m.%y %H.%M.%S";

/// Longest DST gap searched when a local time does not exist.
const MAX_GAP_MINUTES: i64 = 180;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeInputError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid time '{0}', expected HH:MM")]
    Time(String),
}

/// The civil timezone operator input is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CivilZone {
    Named(Tz),
    /// Fallback when the configured zone cannot be resolved. Times are read
    /// in the host's local zone, which is only an approximation.
    HostLocal,
}

impl CivilZone {
    /// Resolve an IANA zone name, falling back to the host zone.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        match name.trim().parse::<Tz>() {
            Ok(tz) => Self::Named(tz),
            Err(_) => {
                tracing::warn!(
                    timezone = %name,
                    "Unknown timezone, interpreting operator times in host local zone"
                );
                Self::HostLocal
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Named(tz) => tz.name().to_string(),
            Self::HostLocal => "host-local".to_string(),
        }
    }

    /// Absolute instant for a wall-clock reading in this zone.
    ///
    /// Uses the offset in force on that date. Ambiguous readings (DST fold)
    /// take the earlier instant; readings inside a DST gap map to the
    /// transition instant.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self {
            Self::Named(tz) => resolve_local(tz, local),
            Self::HostLocal => resolve_local(&Local, local),
        }
    }

    /// Human label for a chart axis.
    #[must_use]
    pub fn format_label(&self, instant: &DateTime<Utc>) -> String {
        match self {
            Self::Named(tz) => instant.with_timezone(tz).format(LABEL_FORMAT).to_string(),
            Self::HostLocal => instant.with_timezone(&Local).format(LABEL_FORMAT).to_string(),
        }
    }

    /// Current calendar day in this zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::Named(tz) => Utc::now().with_timezone(tz).date_naive(),
            Self::HostLocal => Local::now().date_naive(),
        }
    }
}

fn resolve_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    if let Some(instant) = zone.from_local_datetime(&local).earliest() {
        return instant.with_timezone(&Utc);
    }

    // Inside a gap: the first valid minute after it is the transition.
    (1..=MAX_GAP_MINUTES)
        .find_map(|m| {
            zone.from_local_datetime(&(local + TimeDelta::minutes(m)))
                .earliest()
        })
        .map_or_else(|| local.and_utc(), |instant| instant.with_timezone(&Utc))
}

/// Parse a `YYYY-MM-DD` day.
///
/// # Errors
///
/// Returns `TimeInputError::Date` for anything else.
pub fn parse_day(day: &str) -> Result<NaiveDate, TimeInputError> {
    NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")
        .map_err(|_| TimeInputError::Date(day.to_string()))
}

/// Parse an `HH:MM` time, accepting `HH:MM:SS` as well.
///
/// # Errors
///
/// Returns `TimeInputError::Time` for anything else.
pub fn parse_time_of_day(time: &str) -> Result<NaiveTime, TimeInputError> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| TimeInputError::Time(time.to_string()))
}

/// Convert a day and time of day entered in `zone` into a UTC instant.
///
/// Returns `Ok(None)` when either field is empty, meaning "no bound".
///
/// # Errors
///
/// Returns `TimeInputError` when a non-empty field does not parse.
pub fn local_input_to_utc(
    zone: &CivilZone,
    day: &str,
    time: &str,
) -> Result<Option<DateTime<Utc>>, TimeInputError> {
    if day.trim().is_empty() || time.trim().is_empty() {
        return Ok(None);
    }

    let date = parse_day(day)?;
    let time = parse_time_of_day(time)?;
    Ok(Some(zone.to_utc(date.and_time(time))))
}

/// Serialize an instant for a backend query parameter.
#[must_use]
pub fn query_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a backend timestamp.
///
/// The backend writes ISO-8601 from a UTC clock, sometimes without an
/// offset; naive values are read as UTC.
#[must_use]
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

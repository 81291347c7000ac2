use serde::{self, Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, macros::format_description};

/// Pulls the millisecond timestamp out of Xero's `/Date(1633046400000+0000)/` form.
fn dotnet_millis(value: &str) -> Option<i64> {
    let inner = value.strip_prefix("/Date(")?.strip_suffix(")/")?;
    // The offset suffix is informational; the timestamp is always UTC.
    let end = inner
        .get(1..)?
        .find(['+', '-'])
        .map_or(inner.len(), |index| index + 1);
    inner[..end].parse().ok()
}

fn from_millis(millis: i64) -> Result<OffsetDateTime, String> {
    OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000))
        .map_err(|e| format!("Invalid timestamp: {e}"))
}

/// Parses a date Xero sent either as `/Date(ms)/`, `2021-10-12` or
/// `2021-10-12T00:00:00`.
pub fn parse_dotnet_date(date_str: &str) -> Result<Date, String> {
    if let Some(millis) = dotnet_millis(date_str) {
        return from_millis(millis).map(OffsetDateTime::date);
    }

    let date_part = date_str.split('T').next().unwrap_or(date_str);
    Date::parse(date_part, &format_description!("[year]-[month]-[day]"))
        .map_err(|e| format!("Failed to parse date '{date_str}': {e}"))
}

/// Parses a timestamp in `/Date(ms)/`, RFC 3339, or a bare local timestamp that Xero
/// means as UTC (`2025-03-03T06:17:25.8448470`).
pub fn parse_dotnet_datetime(datetime_str: &str) -> Result<OffsetDateTime, String> {
    if let Some(millis) = dotnet_millis(datetime_str) {
        return from_millis(millis);
    }

    if let Ok(dt) = OffsetDateTime::parse(datetime_str, &Rfc3339) {
        return Ok(dt);
    }

    parse_naive(datetime_str)
        .map(PrimitiveDateTime::assume_utc)
        .ok_or_else(|| format!("Failed to parse datetime '{datetime_str}': no matching format"))
}

fn parse_naive(datetime_str: &str) -> Option<PrimitiveDateTime> {
    let with_subseconds =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let without_subseconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(datetime_str, &with_subseconds)
        .or_else(|_| PrimitiveDateTime::parse(datetime_str, &without_subseconds))
        .ok()
}

/// Reads a timestamp and pins it to `offset`.
///
/// A timestamp without an offset is taken to already be at `offset`. One that carries
/// its own offset is converted.
pub fn xero_datetime(datetime_str: &str, offset: UtcOffset) -> Result<OffsetDateTime, String> {
    if let Some(naive) = parse_naive(datetime_str) {
        return Ok(naive.assume_offset(offset));
    }
    parse_dotnet_datetime(datetime_str).map(|dt| dt.to_offset(offset))
}

/// [`xero_datetime`] pinned to UTC.
pub fn xero_datetime_utc(datetime_str: &str) -> Result<OffsetDateTime, String> {
    xero_datetime(datetime_str, UtcOffset::UTC)
}

/// Formats a date as the literal Xero's `where` filter expects, `DateTime(2021, 09, 02)`.
#[must_use]
pub fn where_date(date: Date) -> String {
    format!(
        "DateTime({}, {:02}, {:02})",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a timestamp for the `If-Modified-Since` header, in UTC.
pub fn if_modified_since(datetime: OffsetDateTime) -> Result<String, time::error::Format> {
    datetime
        .to_offset(time::UtcOffset::UTC)
        .format(&format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
}

pub mod xero_date_format {
    use super::{Date, Deserialize, Deserializer, Serializer, format_description, parse_dotnet_date, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(&format_description!("[year]-[month]-[day]"))
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date_str = String::deserialize(deserializer)?;
        parse_dotnet_date(&date_str).map_err(serde::de::Error::custom)
    }
}

pub mod xero_date_format_option {
    use super::{Date, Deserialize, Deserializer, Serializer, parse_dotnet_date};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => super::xero_date_format::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Empty or unparseable values read as `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .filter(|s| !s.is_empty())
            .and_then(|s| parse_dotnet_date(&s).ok()))
    }
}

pub mod xero_datetime_format {
    use super::{Deserialize, Deserializer, OffsetDateTime, Rfc3339, Serializer, serde};

    pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = datetime
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let datetime_str = String::deserialize(deserializer)?;
        super::parse_dotnet_datetime(&datetime_str).map_err(serde::de::Error::custom)
    }
}

pub mod xero_datetime_format_option {
    use super::{Deserialize, Deserializer, OffsetDateTime, Serializer, parse_dotnet_datetime};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => super::xero_datetime_format::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .filter(|s| !s.is_empty())
            .and_then(|s| parse_dotnet_datetime(&s).ok()))
    }
}

/// Token expiry, written as whole epoch seconds. Reads integer or fractional epoch
/// seconds, a numeric string, or a timestamp with or without an offset (UTC assumed).
pub mod epoch_seconds_option {
    use super::{Deserialize, Deserializer, OffsetDateTime, Serializer, serde, xero_datetime_utc};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => serializer.serialize_i64(dt.unix_timestamp()),
            None => serializer.serialize_none(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = match Option::<Raw>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Raw::Integer(seconds)) => seconds,
            Some(Raw::Float(seconds)) => seconds.floor() as i64,
            Some(Raw::Text(text)) => {
                let text = text.trim();
                if let Ok(dt) = xero_datetime_utc(text) {
                    return Ok(Some(dt));
                }
                let parsed: f64 = text.parse().map_err(serde::de::Error::custom)?;
                parsed.floor() as i64
            }
        };
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_dotnet_dates_with_offsets() {
        assert_eq!(
            parse_dotnet_date("/Date(1633046400000+0000)/").unwrap(),
            date!(2021 - 10 - 01)
        );
        assert_eq!(
            parse_dotnet_datetime("/Date(1633046400000-0700)/").unwrap(),
            datetime!(2021-10-01 00:00 UTC)
        );
    }

    #[test]
    fn parses_plain_dates_and_bare_timestamps() {
        assert_eq!(parse_dotnet_date("2025-01-31").unwrap(), date!(2025 - 01 - 31));
        assert_eq!(
            parse_dotnet_date("2025-01-31T00:00:00").unwrap(),
            date!(2025 - 01 - 31)
        );
        assert_eq!(
            parse_dotnet_datetime("2025-03-03T06:17:25").unwrap(),
            datetime!(2025-03-03 06:17:25 UTC)
        );
        assert!(parse_dotnet_datetime("yesterday").is_err());
    }

    #[test]
    fn pins_timestamps_to_an_offset() {
        let eastern = time::macros::offset!(-5);
        assert_eq!(
            xero_datetime("2025-01-31T12:00:00", eastern).unwrap(),
            datetime!(2025-01-31 12:00 -5)
        );
        assert_eq!(
            xero_datetime("2025-01-31T12:00:00Z", eastern).unwrap(),
            datetime!(2025-01-31 07:00 -5)
        );
        let utc = xero_datetime_utc("2025-01-31T12:00:00+02:00").unwrap();
        assert_eq!(utc, datetime!(2025-01-31 10:00 UTC));
        assert_eq!(utc.offset(), UtcOffset::UTC);
        assert!(xero_datetime_utc("").is_err());
    }

    #[test]
    fn formats_where_clause_dates() {
        assert_eq!(where_date(date!(2021 - 09 - 02)), "DateTime(2021, 09, 02)");
    }

    #[test]
    fn formats_if_modified_since_in_utc() {
        let local = datetime!(2021-10-12 10:30:00 +02:00);
        assert_eq!(if_modified_since(local).unwrap(), "2021-10-12T08:30:00");
    }
}

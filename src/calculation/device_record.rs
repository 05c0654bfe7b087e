//! Device record decoding.
//!
//! Terminals upload each punch as a fixed 40-byte little-endian record,
//! hex encoded:
//!
//! ```text
//! offset  size  field
//!      0     2  terminal-local user tag (u16)
//!      2    24  badge id, ASCII digits, zero padded
//!     26     1  status
//!     27     4  timestamp, custom epoch (u32)
//!     31     1  punch direction hint
//!     32     8  reserved
//! ```

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::error::{EngineError, EngineResult};
use crate::models::{BadgeId, RawDeviceEvent};

/// Length in bytes of one device record.
pub const DEVICE_RECORD_LEN: usize = 40;

const BADGE_RANGE: std::ops::Range<usize> = 2..26;
const STATUS_OFFSET: usize = 26;
const TIMESTAMP_RANGE: std::ops::Range<usize> = 27..31;
const PUNCH_OFFSET: usize = 31;

/// Decodes a terminal timestamp.
///
/// The value is unpacked by successive modulo and division into seconds,
/// minutes, hours, day of month (31 per month), month (12 per year) and
/// years since 2000. A day past the end of its month rolls into the next
/// month, so stored timestamps read back unchanged.
///
/// Returns `None` only if the year leaves chrono's supported range, which a
/// `u32` cannot reach.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::decode_time;
/// use chrono::NaiveDateTime;
///
/// let decoded = decode_time(777_976_215).unwrap();
/// let expected = NaiveDateTime::parse_from_str("2024-03-15 08:30:15", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(decoded, expected);
/// ```
pub fn decode_time(value: u32) -> Option<NaiveDateTime> {
    let mut t = value;

    let second = t % 60;
    t /= 60;
    let minute = t % 60;
    t /= 60;
    let hour = t % 24;
    t /= 24;
    let day = t % 31 + 1;
    t /= 31;
    let month = t % 12 + 1;
    t /= 12;
    let year = t as i32 + 2000;

    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(day - 1)))?
        .and_hms_opt(hour, minute, second)
}

/// Decodes one hex-encoded device record.
///
/// # Errors
///
/// Returns [`EngineError::Decode`] when the payload is not valid hex, is not
/// exactly [`DEVICE_RECORD_LEN`] bytes, or its badge id is not a decimal
/// number once trailing zero bytes are removed.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::decode_device_record;
///
/// let hex = "2F003230303100000000000000000000000000000000000000000197F95E2E000000000000000000";
/// let event = decode_device_record("CQZ7232260044", hex).unwrap();
/// assert_eq!(event.uid, 47);
/// assert_eq!(event.badge_id, 2001);
/// ```
pub fn decode_device_record(serial_number: &str, hex_payload: &str) -> EngineResult<RawDeviceEvent> {
    let bytes = hex::decode(hex_payload.trim())
        .map_err(|e| EngineError::decode(format!("invalid hex data: {}", e)))?;

    if bytes.len() != DEVICE_RECORD_LEN {
        return Err(EngineError::decode(format!(
            "payload is {} bytes, expected {}",
            bytes.len(),
            DEVICE_RECORD_LEN
        )));
    }

    let uid = u16::from_le_bytes([bytes[0], bytes[1]]);
    let badge_id = parse_badge_id(&bytes[BADGE_RANGE])?;
    let status = bytes[STATUS_OFFSET];
    let raw_time = u32::from_le_bytes([
        bytes[TIMESTAMP_RANGE.start],
        bytes[TIMESTAMP_RANGE.start + 1],
        bytes[TIMESTAMP_RANGE.start + 2],
        bytes[TIMESTAMP_RANGE.start + 3],
    ]);
    let punch_hint = bytes[PUNCH_OFFSET];

    let timestamp = decode_time(raw_time)
        .ok_or_else(|| EngineError::decode(format!("timestamp {} out of range", raw_time)))?;

    Ok(RawDeviceEvent {
        serial_number: serial_number.to_string(),
        uid,
        badge_id,
        status,
        punch_hint,
        timestamp,
    })
}

fn parse_badge_id(field: &[u8]) -> EngineResult<BadgeId> {
    let end = field.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    let text = std::str::from_utf8(&field[..end])
        .map_err(|_| EngineError::decode("badge id is not ASCII"))?;

    text.parse::<BadgeId>()
        .map_err(|_| EngineError::decode(format!("failed to parse badge id '{}'", text)))
}

//! Subtitle timestamp formatting.

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Times are taken to the microsecond, then truncated to the millisecond;
/// negative or non-finite values are clamped to zero.
///
/// # Examples
/// ```
/// use mediajob_models::timestamp::format_srt_timestamp;
/// assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
/// assert_eq!(format_srt_timestamp(3661.5), "01:01:01,500");
/// ```
pub fn format_srt_timestamp(total_secs: f64) -> String {
    let total_ms = to_millis(total_secs);

    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}

fn to_millis(total_secs: f64) -> u64 {
    if !total_secs.is_finite() || total_secs <= 0.0 {
        return 0;
    }
    let micros = (total_secs * 1_000_000.0).round() as u64;
    micros / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_seconds() {
        assert_eq!(format_srt_timestamp(1.0), "00:00:01,000");
        assert_eq!(format_srt_timestamp(90.0), "00:01:30,000");
        assert_eq!(format_srt_timestamp(3600.0), "01:00:00,000");
    }

    #[test]
    fn test_format_truncates_to_millis() {
        assert_eq!(format_srt_timestamp(0.6666666), "00:00:00,666");
        assert_eq!(format_srt_timestamp(1.2349), "00:00:01,234");
        assert_eq!(format_srt_timestamp(59.9996), "00:00:59,999");
        // sub-microsecond noise is absorbed before truncating
        assert_eq!(format_srt_timestamp(2.9999999), "00:00:03,000");
        assert_eq!(format_srt_timestamp(0.3), "00:00:00,300");
    }

    #[test]
    fn test_format_clamps_invalid() {
        assert_eq!(format_srt_timestamp(-1.5), "00:00:00,000");
        assert_eq!(format_srt_timestamp(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn test_format_long_media() {
        assert_eq!(format_srt_timestamp(100.0 * 3600.0 + 0.25), "100:00:00,250");
    }
}

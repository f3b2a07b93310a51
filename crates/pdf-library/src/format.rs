const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size, e.g. `1536 -> "1.5 KB"`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // Integer steps avoid log() rounding at exact powers of 1024
    let mut exponent = 0;
    let mut scale = 1u64;
    while exponent < UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        exponent += 1;
    }
    let value = bytes as f64 / scale as f64;

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_sizes_beyond_gb_stay_in_gb() {
        assert_eq!(format_file_size(2 * 1024u64.pow(4)), "2048 GB");
    }
}

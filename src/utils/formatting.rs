//! Formatting utilities used for CLI and export outputs.

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// `(85.5, 1)` → `"85.5%"`
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// Indonesian currency: `1000000` → `"Rp 1.000.000"`.
pub fn format_rupiah(amount: f64) -> String {
    let negative = amount < 0.0;
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

/// Human-readable byte size with two decimals (B, KB, MB, GB).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}

/// Cut `s` to `max` characters, ending with "..." when truncated.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupiah_groups_thousands_with_dots() {
        assert_eq!(format_rupiah(1_000_000.0), "Rp 1.000.000");
        assert_eq!(format_rupiah(950.0), "Rp 950");
        assert_eq!(format_rupiah(12_345.4), "Rp 12.345");
    }

    #[test]
    fn file_sizes_scale_units() {
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_file_size(1536), "1.50 KB");
    }

    #[test]
    fn percentage_and_rounding() {
        assert_eq!(format_percentage(85.5, 1), "85.5%");
        assert_eq!(format_percentage(100.0, 2), "100.00%");
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(truncate("Indikator Kinerja Utama", 10), "Indikat...");
    }
}

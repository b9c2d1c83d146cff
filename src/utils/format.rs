/// 千分位格式，例如 1234567.891 -> "1,234,567.89"
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.00 不顯示負號
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// 四捨五入到小數點後兩位
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(-45210.5, 2), "-45,210.50");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
        assert_eq!(format_thousands(f64::NAN, 2), "n/a");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3449), 12.34);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>Mumbai & \"Pune\"</b>"),
            "&lt;b&gt;Mumbai &amp; &quot;Pune&quot;&lt;/b&gt;"
        );
    }
}

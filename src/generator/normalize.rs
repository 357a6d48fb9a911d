//! Derives the three display strings (name, role|area, phone) from raw form
//! values, plus the export filename. All display strings come out uppercased
//! and trimmed; empty results mean the field is skipped at render time.

/// Name line: trimmed, uppercased.
pub fn display_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Role and area joined with `" | "` when both present, otherwise whichever
/// one is non-empty.
pub fn role_area_line(role: &str, area: &str) -> String {
    let role = role.trim();
    let area = area.trim();
    let joined = match (role.is_empty(), area.is_empty()) {
        (false, false) => format!("{role} | {area}"),
        (false, true) => role.to_string(),
        (true, false) => area.to_string(),
        (true, true) => return String::new(),
    };
    joined.to_uppercase()
}

pub fn clean_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Local-style digit grouping: 6 -> 3+3, 7 -> 3+4, 8 -> 4+4, 10 -> 3+3+4.
/// Other lengths stay ungrouped.
fn group_number(num: &str) -> String {
    match num.len() {
        6 | 7 => format!("{} {}", &num[..3], &num[3..]),
        8 => format!("{} {}", &num[..4], &num[4..]),
        10 => format!("{} {} {}", &num[..3], &num[3..6], &num[6..]),
        _ => num.to_string(),
    }
}

/// Assembles the phone display line, e.g. `TEL: +54 9 261 532 7691`.
///
/// The mobile marker digit is only inserted for the default domestic country.
/// Both sub-inputs empty means no phone line at all.
pub fn phone_line(
    country: &str,
    area_code: &str,
    number: &str,
    mobile: bool,
    default_country: &str,
) -> String {
    let country = {
        let c = country.trim();
        if c.is_empty() { default_country } else { c }
    };
    let area_code = clean_digits(area_code);
    let number = clean_digits(number);
    if area_code.is_empty() && number.is_empty() {
        return String::new();
    }

    let mobile = mobile && country == default_country;
    let grouped = group_number(&number);

    let mut out = format!("TEL: {country}");
    if mobile {
        out.push_str(" 9");
    }
    if !area_code.is_empty() {
        out.push(' ');
        out.push_str(&area_code);
    }
    if !grouped.is_empty() {
        out.push(' ');
        out.push_str(&grouped);
    }
    out.trim().to_uppercase()
}

/// Filesystem-safe slug of a name: accents transliterated away, lowercased,
/// non-alphanumeric runs collapsed to single hyphens.
pub fn safe_file_name(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw.trim()).to_lowercase();
    let mut out = String::with_capacity(ascii.len());
    let mut in_gap = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if in_gap && !out.is_empty() {
                out.push('-');
            }
            out.push(ch);
            in_gap = false;
        } else {
            in_gap = true;
        }
    }
    out
}

pub fn export_file_name(prefix: &str, raw_name: &str) -> String {
    let slug = safe_file_name(raw_name);
    if slug.is_empty() {
        format!("{prefix}.png")
    } else {
        format!("{prefix}-{slug}.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "+54";

    #[test]
    fn name_is_trimmed_and_uppercased() {
        assert_eq!(display_name("  José Pérez "), "JOSÉ PÉREZ");
        assert_eq!(display_name("   "), "");
    }

    #[test]
    fn role_and_area_join_with_separator() {
        assert_eq!(role_area_line("Gerente", "Ventas"), "GERENTE | VENTAS");
    }

    #[test]
    fn single_role_or_area_stands_alone() {
        assert_eq!(role_area_line("Gerente", ""), "GERENTE");
        assert_eq!(role_area_line("", " Ventas "), "VENTAS");
        assert_eq!(role_area_line(" ", ""), "");
    }

    #[test]
    fn phone_groups_ten_digits_as_3_3_4() {
        assert_eq!(
            phone_line(DEFAULT, "", "2615327691", false, DEFAULT),
            "TEL: +54 261 532 7691"
        );
    }

    #[test]
    fn phone_groups_seven_digits_as_3_4() {
        assert_eq!(
            phone_line(DEFAULT, "261", "1234567", false, DEFAULT),
            "TEL: +54 261 123 4567"
        );
    }

    #[test]
    fn phone_groups_six_and_eight_digits() {
        assert_eq!(phone_line(DEFAULT, "", "123456", false, DEFAULT), "TEL: +54 123 456");
        assert_eq!(phone_line(DEFAULT, "", "12345678", false, DEFAULT), "TEL: +54 1234 5678");
    }

    #[test]
    fn phone_leaves_other_lengths_ungrouped() {
        assert_eq!(
            phone_line(DEFAULT, "", "123456789", false, DEFAULT),
            "TEL: +54 123456789"
        );
    }

    #[test]
    fn phone_empty_when_no_digits() {
        assert_eq!(phone_line(DEFAULT, "", "", true, DEFAULT), "");
        assert_eq!(phone_line(DEFAULT, " - ", "()", true, DEFAULT), "");
    }

    #[test]
    fn mobile_marker_only_for_default_country() {
        assert_eq!(
            phone_line("+54", "261", "1234567", true, DEFAULT),
            "TEL: +54 9 261 123 4567"
        );
        assert_eq!(
            phone_line("+34", "91", "1234567", true, DEFAULT),
            "TEL: +34 91 123 4567"
        );
    }

    #[test]
    fn empty_country_falls_back_to_default() {
        assert_eq!(phone_line("", "", "123456", true, DEFAULT), "TEL: +54 9 123 456");
    }

    #[test]
    fn phone_strips_formatting_characters() {
        assert_eq!(
            phone_line(DEFAULT, "(261)", "532-76 91", false, DEFAULT),
            "TEL: +54 261 532 7691"
        );
    }

    #[test]
    fn file_name_strips_accents_and_hyphenates() {
        assert_eq!(safe_file_name("José Pérez"), "jose-perez");
        assert_eq!(safe_file_name("  María--del   Mar! "), "maria-del-mar");
        assert_eq!(safe_file_name("---"), "");
    }

    #[test]
    fn export_name_falls_back_to_prefix() {
        assert_eq!(export_file_name("tarjeta", "José Pérez"), "tarjeta-jose-perez.png");
        assert_eq!(export_file_name("tarjeta", ""), "tarjeta.png");
    }
}

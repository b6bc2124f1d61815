//! Vietnamese name ordering.
//!
//! Letters compare by the Vietnamese alphabet (`a < ă < â < b … d < đ … o < ô < ơ … u < ư …`),
//! ignoring case and tone marks. Ties are broken by tone (unmarked, grave,
//! hook, tilde, acute, dot below), then by case (lowercase first), then by the
//! raw string.

use std::cmp::Ordering;

const ALPHABET: &[char] = &[
    'a', 'ă', 'â', 'b', 'c', 'd', 'đ', 'e', 'ê', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'ô', 'ơ', 'p', 'q', 'r', 's', 't', 'u', 'ư', 'v', 'w', 'x', 'y', 'z',
];

// Each row: base letter, then forms with grave, hook above, tilde, acute, dot below.
const TONED_VOWELS: &[[char; 6]] = &[
    ['a', 'à', 'ả', 'ã', 'á', 'ạ'],
    ['ă', 'ằ', 'ẳ', 'ẵ', 'ắ', 'ặ'],
    ['â', 'ầ', 'ẩ', 'ẫ', 'ấ', 'ậ'],
    ['e', 'è', 'ẻ', 'ẽ', 'é', 'ẹ'],
    ['ê', 'ề', 'ể', 'ễ', 'ế', 'ệ'],
    ['i', 'ì', 'ỉ', 'ĩ', 'í', 'ị'],
    ['o', 'ò', 'ỏ', 'õ', 'ó', 'ọ'],
    ['ô', 'ồ', 'ổ', 'ỗ', 'ố', 'ộ'],
    ['ơ', 'ờ', 'ở', 'ỡ', 'ớ', 'ợ'],
    ['u', 'ù', 'ủ', 'ũ', 'ú', 'ụ'],
    ['ư', 'ừ', 'ử', 'ữ', 'ứ', 'ự'],
    ['y', 'ỳ', 'ỷ', 'ỹ', 'ý', 'ỵ'],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Group {
    Symbol,
    Letter,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Weights {
    primary: (Group, u32),
    tone: u8,
    upper: bool,
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn strip_tone(c: char) -> (char, u8) {
    for row in TONED_VOWELS {
        if let Some(tone) = row.iter().position(|&v| v == c) {
            return (row[0], tone as u8);
        }
    }
    (c, 0)
}

fn weights(c: char) -> Weights {
    let lc = lower(c);
    let (base, tone) = strip_tone(lc);
    let primary = match ALPHABET.iter().position(|&l| l == base) {
        Some(rank) => (Group::Letter, rank as u32),
        None if c.is_ascii() => (Group::Symbol, c as u32),
        None => (Group::Other, base as u32),
    };
    Weights {
        primary,
        tone,
        upper: lc != c,
    }
}

/// Locale-aware comparison of two display names.
pub fn compare(a: &str, b: &str) -> Ordering {
    let wa: Vec<Weights> = a.chars().map(weights).collect();
    let wb: Vec<Weights> = b.chars().map(weights).collect();

    let primary = wa.iter().map(|w| w.primary).cmp(wb.iter().map(|w| w.primary));
    let tone = || wa.iter().map(|w| w.tone).cmp(wb.iter().map(|w| w.tone));
    let case = || wa.iter().map(|w| w.upper).cmp(wb.iter().map(|w| w.upper));

    primary
        .then_with(tone)
        .then_with(case)
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        v.sort_by(|a, b| compare(a, b));
        v
    }

    #[test]
    fn test_vietnamese_letter_order() {
        assert_eq!(
            sorted(&["Đồng hồ", "Dây", "Ăn", "Ấm", "An"]),
            vec!["An", "Ăn", "Ấm", "Dây", "Đồng hồ"]
        );
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(compare("kính", "Lens"), Ordering::Less);
        assert_eq!(compare("Kính", "lens"), Ordering::Less);
    }

    #[test]
    fn test_tone_breaks_ties() {
        assert_eq!(
            sorted(&["má", "mạ", "ma", "mà", "mã", "mả"]),
            vec!["ma", "mà", "mả", "mã", "má", "mạ"]
        );
    }

    #[test]
    fn test_lowercase_before_uppercase() {
        assert_eq!(compare("gọng", "Gọng"), Ordering::Less);
        assert_eq!(compare("Gọng", "Gọng"), Ordering::Equal);
    }

    #[test]
    fn test_horn_letters_follow_plain() {
        assert_eq!(
            sorted(&["ơ", "ô", "o", "p"]),
            vec!["o", "ô", "ơ", "p"]
        );
        assert_eq!(compare("ư", "u"), Ordering::Greater);
        assert_eq!(compare("ư", "v"), Ordering::Less);
    }

    #[test]
    fn test_shorter_prefix_first() {
        assert_eq!(compare("Kính", "Kính mát"), Ordering::Less);
    }
}

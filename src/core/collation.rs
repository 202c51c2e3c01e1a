//! Purpose: Locale-aware string ordering for comparison operators.
//! Exports: `compare`, `equals`.
//! Role: Croatian collation used by `<`, `<=`, `>`, `>=`, `=` and `!=`.
//! Invariants: Three levels compared in order: base letter, accent, case (lowercase first).
//! Invariants: `dž`, `lj` and `nj` collate as single letters; hyphens are ignorable at level one.
use std::cmp::Ordering;

const ALPHABET: [&str; 34] = [
    "a", "b", "c", "č", "ć", "d", "dž", "đ", "e", "f", "g", "h", "i", "j", "k", "l", "lj", "m",
    "n", "nj", "o", "p", "q", "r", "s", "š", "t", "u", "v", "w", "x", "y", "z", "ž",
];

const IGNORABLE: u32 = 0;
const PUNCT_BASE: u32 = 0x100;
const DIGIT_BASE: u32 = 0x1000;
const LETTER_BASE: u32 = 0x2000;
const OTHER_BASE: u32 = 0x10000;

// Accent weights for the second level.
const ACUTE: u8 = 1;
const GRAVE: u8 = 2;
const CIRCUMFLEX: u8 = 3;
const TILDE: u8 = 4;
const DIAERESIS: u8 = 5;
const RING: u8 = 6;
const CARON: u8 = 7;
const CEDILLA: u8 = 8;
const STROKE: u8 = 9;
const HYPHEN: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Element {
    primary: u32,
    secondary: u8,
    tertiary: u8,
}

pub fn compare(left: &str, right: &str) -> Ordering {
    let left = elements(left);
    let right = elements(right);

    level(&left, |e| (e.primary != IGNORABLE).then_some(e.primary))
        .cmp(&level(&right, |e| (e.primary != IGNORABLE).then_some(e.primary)))
        .then_with(|| level(&left, |e| Some(e.secondary)).cmp(&level(&right, |e| Some(e.secondary))))
        .then_with(|| level(&left, |e| Some(e.tertiary)).cmp(&level(&right, |e| Some(e.tertiary))))
}

fn level<T>(elems: &[Element], weight: impl Fn(&Element) -> Option<T>) -> Vec<T> {
    elems.iter().filter_map(weight).collect()
}

pub fn equals(left: &str, right: &str) -> bool {
    compare(left, right) == Ordering::Equal
}

fn elements(text: &str) -> Vec<Element> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(&following) = chars.peek()
            && let Some(elem) = digraph(c, following)
        {
            chars.next();
            out.push(elem);
            continue;
        }
        out.push(single(c));
    }
    out
}

fn digraph(first: char, second: char) -> Option<Element> {
    let pair = format!("{}{}", lower(first), lower(second));
    let rank = letter_rank(&pair)?;
    let tertiary = u8::from(first.is_uppercase()) * 2 + u8::from(second.is_uppercase());
    Some(Element {
        primary: LETTER_BASE + rank,
        secondary: 0,
        tertiary,
    })
}

fn single(c: char) -> Element {
    let tertiary = u8::from(c.is_uppercase()) * 3;
    let folded = lower(c);

    let mut buf = [0u8; 4];
    if let Some(rank) = letter_rank(folded.encode_utf8(&mut buf)) {
        return Element {
            primary: LETTER_BASE + rank,
            secondary: 0,
            tertiary,
        };
    }
    if let Some((base, accent)) = fold_accent(folded)
        && let Some(rank) = letter_rank(base.encode_utf8(&mut buf))
    {
        return Element {
            primary: LETTER_BASE + rank,
            secondary: accent,
            tertiary,
        };
    }
    if c == '-' || c == '\u{00AD}' {
        return Element {
            primary: IGNORABLE,
            secondary: HYPHEN,
            tertiary: 0,
        };
    }
    if c.is_ascii_digit() {
        return Element {
            primary: DIGIT_BASE + (c as u32 - '0' as u32),
            secondary: 0,
            tertiary: 0,
        };
    }
    if c.is_ascii() || c.is_whitespace() {
        return Element {
            primary: PUNCT_BASE + c as u32,
            secondary: 0,
            tertiary: 0,
        };
    }
    Element {
        primary: OTHER_BASE + folded as u32,
        secondary: 0,
        tertiary,
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn letter_rank(letter: &str) -> Option<u32> {
    ALPHABET
        .iter()
        .position(|candidate| *candidate == letter)
        .map(|idx| idx as u32 * 4)
}

// Latin letters outside the Croatian alphabet collate as their base letter
// with an accent difference.
fn fold_accent(c: char) -> Option<(char, u8)> {
    let folded = match c {
        'á' => ('a', ACUTE),
        'à' => ('a', GRAVE),
        'â' => ('a', CIRCUMFLEX),
        'ã' => ('a', TILDE),
        'ä' => ('a', DIAERESIS),
        'å' => ('a', RING),
        'ă' => ('a', CARON),
        'ç' => ('c', CEDILLA),
        'ď' => ('d', CARON),
        'é' => ('e', ACUTE),
        'è' => ('e', GRAVE),
        'ê' => ('e', CIRCUMFLEX),
        'ë' => ('e', DIAERESIS),
        'ě' => ('e', CARON),
        'í' => ('i', ACUTE),
        'ì' => ('i', GRAVE),
        'î' => ('i', CIRCUMFLEX),
        'ï' => ('i', DIAERESIS),
        'ĺ' => ('l', ACUTE),
        'ľ' => ('l', CARON),
        'ł' => ('l', STROKE),
        'ñ' => ('n', TILDE),
        'ń' => ('n', ACUTE),
        'ň' => ('n', CARON),
        'ó' => ('o', ACUTE),
        'ò' => ('o', GRAVE),
        'ô' => ('o', CIRCUMFLEX),
        'õ' => ('o', TILDE),
        'ö' => ('o', DIAERESIS),
        'ø' => ('o', STROKE),
        'ŕ' => ('r', ACUTE),
        'ř' => ('r', CARON),
        'ś' => ('s', ACUTE),
        'ş' => ('s', CEDILLA),
        'ť' => ('t', CARON),
        'ú' => ('u', ACUTE),
        'ù' => ('u', GRAVE),
        'û' => ('u', CIRCUMFLEX),
        'ü' => ('u', DIAERESIS),
        'ů' => ('u', RING),
        'ý' => ('y', ACUTE),
        'ÿ' => ('y', DIAERESIS),
        'ź' => ('z', ACUTE),
        'ż' => ('z', STROKE),
        _ => return None,
    };
    Some(folded)
}

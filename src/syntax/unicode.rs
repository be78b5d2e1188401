/*!
Unicode data used by the parser and the matching engine.

The tables themselves come from `regex-syntax`. A property is looked up by
asking `regex-syntax` to parse the corresponding `\p{..}` class and then
converting the resulting ranges into a [`ClassSet`]. The classes needed while
matching are converted once and cached.
*/

use once_cell::sync::Lazy;
use regex_syntax::hir::{self, Hir, HirKind};

use crate::{
    syntax::class::{ClassRange, ClassSet},
    util::options::Options,
};

/// The Unicode `\w` class.
static PERL_WORD: Lazy<ClassSet> = Lazy::new(|| must_class(r"\w"));

/// Characters that count as part of a word under the general category word
/// boundary algorithm: letters, all numbers and spacing marks.
static WORD_LETTER: Lazy<ClassSet> =
    Lazy::new(|| must_class(r"[\p{L}\p{Nl}\p{Nd}\p{No}\p{Mc}]"));

/// Characters that are skipped when looking for the word type of the
/// previous character: format characters and non-spacing or enclosing marks.
static WORD_IGNORE: Lazy<ClassSet> =
    Lazy::new(|| must_class(r"[\p{Cf}\p{Mn}\p{Me}]"));

/// How a character participates in word boundary assertions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WordType {
    /// The character is invisible to word boundaries.
    Ignore,
    /// The character is part of a word.
    Letter,
    /// The character separates words.
    Other,
}

/// Classify a character for word boundary purposes.
///
/// Without the `w` option, a character is a letter if it is in `\w`: the
/// Unicode class with the `u` option and `[0-9A-Za-z_]` otherwise. With the
/// `w` option, the general category decides, and some characters are
/// ignored altogether.
pub(crate) fn word_type(ch: char, opts: Options) -> WordType {
    if !opts.contains(Options::UNICODE_WORD_BOUNDARY) {
        let is_word = if opts.contains(Options::UNICODE_CLASSES) {
            PERL_WORD.contains(ch)
        } else {
            ch.is_ascii_alphanumeric() || ch == '_'
        };
        return if is_word { WordType::Letter } else { WordType::Other };
    }
    if WORD_LETTER.contains(ch) {
        WordType::Letter
    } else if WORD_IGNORE.contains(ch) {
        WordType::Ignore
    } else if ch.is_control() {
        match ch {
            '\t' | '\n' | '\x0B' | '\x0C' | '\r' => WordType::Other,
            _ => WordType::Ignore,
        }
    } else {
        WordType::Other
    }
}

/// Returns true if and only if the given character terminates a line.
#[inline]
pub(crate) fn is_line_terminator(ch: char) -> bool {
    match ch {
        '\n' | '\r' | '\u{2028}' | '\u{2029}' => true,
        _ => false,
    }
}

/// Returns true if and only if the given character is a Unicode
/// noncharacter: U+FDD0 to U+FDEF, or the last two code points of a plane.
#[inline]
pub(crate) fn is_noncharacter(ch: char) -> bool {
    let cp = ch as u32;
    cp & 0xFFFE == 0xFFFE || (0xFDD0..=0xFDEF).contains(&cp)
}

/// Return the class for a Unicode property name. Names of the form `IsName`
/// denote a block, `ALL`, `ASSIGNED` and `UNASSIGNED` are special, and any
/// other name is a general category (`L`, `Lu`, `Letter`) or a script
/// (`Greek`). Returns `None` if the name is not known.
pub(crate) fn property(name: &str) -> Option<ClassSet> {
    match name {
        "ALL" => return Some(ClassSet::full()),
        "ASSIGNED" => return class(r"\P{Cn}"),
        "UNASSIGNED" => return class(r"\p{Cn}"),
        _ => {}
    }
    if let Some(block) = name.strip_prefix("Is") {
        return self::block(block);
    }
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ');
    if !valid {
        return None;
    }
    class(&format!(r"\p{{{}}}", name))
}

/// The characters of the named block. Block names are written without
/// spaces, as in `BasicLatin` or `Latin-1Supplement`. The surrogate blocks
/// are known but contain no characters.
pub(crate) fn block(name: &str) -> Option<ClassSet> {
    let mut found = false;
    let mut set = ClassSet::empty();
    for &(block, start, end) in BLOCKS {
        if block != name {
            continue;
        }
        found = true;
        let (start, end) = (core::char::from_u32(start), core::char::from_u32(end));
        if let (Some(start), Some(end)) = (start, end) {
            set.push_range(start, end);
        }
    }
    if found {
        Some(set)
    } else {
        None
    }
}

/// The Unicode `\d` class.
pub(crate) fn perl_digit() -> ClassSet {
    must_class(r"\d")
}

/// The Unicode `\s` class.
pub(crate) fn perl_space() -> ClassSet {
    must_class(r"\s")
}

/// The Unicode `\w` class.
pub(crate) fn perl_word() -> ClassSet {
    PERL_WORD.clone()
}

/// Every mark (`\p{M}`).
pub(crate) fn marks() -> ClassSet {
    must_class(r"\pM")
}

/// Every letter (`\p{L}`).
pub(crate) fn letters() -> ClassSet {
    must_class(r"\pL")
}

/// Assigned characters that are neither marks nor "other" characters,
/// which may begin a grapheme.
pub(crate) fn grapheme_base() -> ClassSet {
    must_class(r"[^\p{M}\p{C}]")
}

/// The XML Schema `\w` class: every character except punctuation,
/// separators and "other" characters.
pub(crate) fn xml_word() -> ClassSet {
    must_class(r"[^\p{P}\p{Z}\p{C}]")
}

/// Characters that may begin an XML name (`\i`).
pub(crate) fn xml_name_start() -> ClassSet {
    ClassSet::new(XML_NAME_START.iter().map(|&(s, e)| ClassRange::new(s, e)))
}

/// Characters that may appear in an XML name (`\c`).
pub(crate) fn xml_name_char() -> ClassSet {
    let mut set = xml_name_start();
    set.union(&ClassSet::new(
        XML_NAME_EXTRA.iter().map(|&(s, e)| ClassRange::new(s, e)),
    ));
    set
}

/// Unicode blocks as of Unicode 3.1, which XML Schema block escapes refer
/// to. A name may appear more than once. The bounds are code points so that
/// the surrogate blocks can be listed.
const BLOCKS: &[(&str, u32, u32)] = &[
    ("BasicLatin", 0x0000, 0x007F),
    ("Latin-1Supplement", 0x0080, 0x00FF),
    ("LatinExtended-A", 0x0100, 0x017F),
    ("LatinExtended-B", 0x0180, 0x024F),
    ("IPAExtensions", 0x0250, 0x02AF),
    ("SpacingModifierLetters", 0x02B0, 0x02FF),
    ("CombiningDiacriticalMarks", 0x0300, 0x036F),
    ("Greek", 0x0370, 0x03FF),
    ("Cyrillic", 0x0400, 0x04FF),
    ("Armenian", 0x0530, 0x058F),
    ("Hebrew", 0x0590, 0x05FF),
    ("Arabic", 0x0600, 0x06FF),
    ("Syriac", 0x0700, 0x074F),
    ("Thaana", 0x0780, 0x07BF),
    ("Devanagari", 0x0900, 0x097F),
    ("Bengali", 0x0980, 0x09FF),
    ("Gurmukhi", 0x0A00, 0x0A7F),
    ("Gujarati", 0x0A80, 0x0AFF),
    ("Oriya", 0x0B00, 0x0B7F),
    ("Tamil", 0x0B80, 0x0BFF),
    ("Telugu", 0x0C00, 0x0C7F),
    ("Kannada", 0x0C80, 0x0CFF),
    ("Malayalam", 0x0D00, 0x0D7F),
    ("Sinhala", 0x0D80, 0x0DFF),
    ("Thai", 0x0E00, 0x0E7F),
    ("Lao", 0x0E80, 0x0EFF),
    ("Tibetan", 0x0F00, 0x0FFF),
    ("Myanmar", 0x1000, 0x109F),
    ("Georgian", 0x10A0, 0x10FF),
    ("HangulJamo", 0x1100, 0x11FF),
    ("Ethiopic", 0x1200, 0x137F),
    ("Cherokee", 0x13A0, 0x13FF),
    ("UnifiedCanadianAboriginalSyllabics", 0x1400, 0x167F),
    ("Ogham", 0x1680, 0x169F),
    ("Runic", 0x16A0, 0x16FF),
    ("Khmer", 0x1780, 0x17FF),
    ("Mongolian", 0x1800, 0x18AF),
    ("LatinExtendedAdditional", 0x1E00, 0x1EFF),
    ("GreekExtended", 0x1F00, 0x1FFF),
    ("GeneralPunctuation", 0x2000, 0x206F),
    ("SuperscriptsandSubscripts", 0x2070, 0x209F),
    ("CurrencySymbols", 0x20A0, 0x20CF),
    ("CombiningMarksforSymbols", 0x20D0, 0x20FF),
    ("LetterlikeSymbols", 0x2100, 0x214F),
    ("NumberForms", 0x2150, 0x218F),
    ("Arrows", 0x2190, 0x21FF),
    ("MathematicalOperators", 0x2200, 0x22FF),
    ("MiscellaneousTechnical", 0x2300, 0x23FF),
    ("ControlPictures", 0x2400, 0x243F),
    ("OpticalCharacterRecognition", 0x2440, 0x245F),
    ("EnclosedAlphanumerics", 0x2460, 0x24FF),
    ("BoxDrawing", 0x2500, 0x257F),
    ("BlockElements", 0x2580, 0x259F),
    ("GeometricShapes", 0x25A0, 0x25FF),
    ("MiscellaneousSymbols", 0x2600, 0x26FF),
    ("Dingbats", 0x2700, 0x27BF),
    ("BraillePatterns", 0x2800, 0x28FF),
    ("CJKRadicalsSupplement", 0x2E80, 0x2EFF),
    ("KangxiRadicals", 0x2F00, 0x2FDF),
    ("IdeographicDescriptionCharacters", 0x2FF0, 0x2FFF),
    ("CJKSymbolsandPunctuation", 0x3000, 0x303F),
    ("Hiragana", 0x3040, 0x309F),
    ("Katakana", 0x30A0, 0x30FF),
    ("Bopomofo", 0x3100, 0x312F),
    ("HangulCompatibilityJamo", 0x3130, 0x318F),
    ("Kanbun", 0x3190, 0x319F),
    ("BopomofoExtended", 0x31A0, 0x31BF),
    ("EnclosedCJKLettersandMonths", 0x3200, 0x32FF),
    ("CJKCompatibility", 0x3300, 0x33FF),
    ("CJKUnifiedIdeographsExtensionA", 0x3400, 0x4DB5),
    ("CJKUnifiedIdeographs", 0x4E00, 0x9FFF),
    ("YiSyllables", 0xA000, 0xA48F),
    ("YiRadicals", 0xA490, 0xA4CF),
    ("HangulSyllables", 0xAC00, 0xD7A3),
    ("HighSurrogates", 0xD800, 0xDB7F),
    ("HighPrivateUseSurrogates", 0xDB80, 0xDBFF),
    ("LowSurrogates", 0xDC00, 0xDFFF),
    ("PrivateUse", 0xE000, 0xF8FF),
    ("CJKCompatibilityIdeographs", 0xF900, 0xFAFF),
    ("AlphabeticPresentationForms", 0xFB00, 0xFB4F),
    ("ArabicPresentationForms-A", 0xFB50, 0xFDFF),
    ("CombiningHalfMarks", 0xFE20, 0xFE2F),
    ("CJKCompatibilityForms", 0xFE30, 0xFE4F),
    ("SmallFormVariants", 0xFE50, 0xFE6F),
    ("ArabicPresentationForms-B", 0xFE70, 0xFEFE),
    ("Specials", 0xFEFF, 0xFEFF),
    ("HalfwidthandFullwidthForms", 0xFF00, 0xFFEF),
    ("Specials", 0xFFF0, 0xFFFD),
    ("OldItalic", 0x10300, 0x1032F),
    ("Gothic", 0x10330, 0x1034F),
    ("Deseret", 0x10400, 0x1044F),
    ("ByzantineMusicalSymbols", 0x1D000, 0x1D0FF),
    ("MusicalSymbols", 0x1D100, 0x1D1FF),
    ("MathematicalAlphanumericSymbols", 0x1D400, 0x1D7FF),
    ("CJKUnifiedIdeographsExtensionB", 0x20000, 0x2A6D6),
    ("CJKCompatibilityIdeographsSupplement", 0x2F800, 0x2FA1F),
    ("Tags", 0xE0000, 0xE007F),
    ("PrivateUse", 0xF0000, 0xFFFFD),
    ("PrivateUse", 0x100000, 0x10FFFD),
];

const XML_NAME_START: &[(char, char)] = &[
    (':', ':'),
    ('A', 'Z'),
    ('_', '_'),
    ('a', 'z'),
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

const XML_NAME_EXTRA: &[(char, char)] = &[
    ('-', '.'),
    ('0', '9'),
    ('\u{B7}', '\u{B7}'),
    ('\u{300}', '\u{36F}'),
    ('\u{203F}', '\u{2040}'),
];

/// The simple uppercase mapping of a character, or the character itself if
/// its uppercase form is not a single character.
#[inline]
pub(crate) fn simple_upper(ch: char) -> char {
    if ch.is_ascii() {
        return ch.to_ascii_uppercase();
    }
    let mut it = ch.to_uppercase();
    match (it.next(), it.next()) {
        (Some(up), None) => up,
        _ => ch,
    }
}

/// The simple lowercase mapping of a character, or the character itself if
/// its lowercase form is not a single character.
#[inline]
pub(crate) fn simple_lower(ch: char) -> char {
    if ch.is_ascii() {
        return ch.to_ascii_lowercase();
    }
    let mut it = ch.to_lowercase();
    match (it.next(), it.next()) {
        (Some(low), None) => low,
        _ => ch,
    }
}

/// The representative of the case folding equivalence class of a
/// character: the lowercase form of its uppercase form.
#[inline]
pub(crate) fn fold_key(ch: char) -> char {
    simple_lower(simple_upper(ch))
}

/// Compare two characters with simple case folding: they are equal if they
/// are the same or if they have the same fold key.
#[inline]
pub(crate) fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || fold_key(a) == fold_key(b)
}

/// Every character whose fold key is not itself, paired with that key and
/// sorted by key. A character outside this table is alone in its
/// equivalence class unless it is the key of some entry.
static CASE_FOLD: Lazy<Vec<(char, char)>> = Lazy::new(|| {
    let mut pairs: Vec<(char, char)> = (0..=0x10FFFF)
        .filter_map(core::char::from_u32)
        .filter_map(|ch| {
            let key = fold_key(ch);
            if key == ch {
                None
            } else {
                Some((key, ch))
            }
        })
        .collect();
    pairs.sort();
    pairs
});

/// The case folding table, as `(key, member)` pairs sorted by key.
pub(crate) fn case_fold_pairs() -> &'static [(char, char)] {
    &CASE_FOLD
}

/// The next character after `ch`, skipping the surrogate block.
#[inline]
pub(crate) fn increment(ch: char) -> Option<char> {
    match ch {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        _ => core::char::from_u32(ch as u32 + 1),
    }
}

/// The character before `ch`, skipping the surrogate block.
#[inline]
pub(crate) fn decrement(ch: char) -> Option<char> {
    match ch {
        '\u{E000}' => Some('\u{D7FF}'),
        '\0' => None,
        _ => core::char::from_u32(ch as u32 - 1),
    }
}

fn class(pattern: &str) -> Option<ClassSet> {
    let hir = regex_syntax::ParserBuilder::new().build().parse(pattern).ok()?;
    class_from_hir(&hir)
}

/// Like `class`, but for patterns that are fixed in this crate. These always
/// parse, since `regex-syntax` is built with its Unicode tables.
fn must_class(pattern: &str) -> ClassSet {
    match class(pattern) {
        Some(set) => set,
        None => panic!("Unicode table for {:?} is unavailable", pattern),
    }
}

fn class_from_hir(hir: &Hir) -> Option<ClassSet> {
    match *hir.kind() {
        HirKind::Class(hir::Class::Unicode(ref cls)) => Some(ClassSet::new(
            cls.iter().map(|r| ClassRange::new(r.start(), r.end())),
        )),
        HirKind::Literal(hir::Literal::Unicode(ch)) => Some(ClassSet::single(ch)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_case_mappings() {
        assert_eq!('A', simple_upper('a'));
        assert_eq!('Σ', simple_upper('σ'));
        // 'ß' uppercases to "SS", which is not a simple mapping.
        assert_eq!('ß', simple_upper('ß'));
        assert!(eq_ignore_case('k', 'K'));
        assert!(eq_ignore_case('σ', 'ς'));
        assert!(!eq_ignore_case('a', 'b'));
    }

    #[test]
    fn properties() {
        let lu = property("Lu").unwrap();
        assert!(lu.contains('A'));
        assert!(!lu.contains('a'));
        let greek = property("Greek").unwrap();
        assert!(greek.contains('λ'));
        assert!(property("NotAProperty").is_none());
        assert!(property("L}|.").is_none());
    }

    #[test]
    fn special_properties_and_blocks() {
        assert_eq!(ClassSet::full(), property("ALL").unwrap());
        let assigned = property("ASSIGNED").unwrap();
        assert!(assigned.contains('a'));
        assert!(!assigned.contains('\u{378}'));
        let unassigned = property("UNASSIGNED").unwrap();
        assert!(unassigned.contains('\u{378}'));
        assert!(!unassigned.contains('a'));

        let latin = property("IsBasicLatin").unwrap();
        assert_eq!(128, latin.len());
        assert!(latin.contains('\x7F'));
        assert!(!latin.contains('\u{80}'));
        assert!(property("IsLatin-1Supplement").unwrap().contains('é'));
        assert!(property("IsGreek").unwrap().contains('\u{3FF}'));
        assert!(property("IsHighSurrogates").unwrap().is_empty());

        let private = property("IsPrivateUse").unwrap();
        assert!(private.contains('\u{E000}'));
        assert!(private.contains('\u{10FFFD}'));
        assert!(!private.contains('\u{10FFFE}'));
        let specials = property("IsSpecials").unwrap();
        assert_eq!(15, specials.len());

        assert!(property("IsBasic Latin").is_none());
        assert!(property("IsNotABlock").is_none());
    }

    #[test]
    fn case_folding_table() {
        assert!(eq_ignore_case('\u{212A}', 'k'));
        assert!(eq_ignore_case('\u{212A}', 'K'));
        assert!(eq_ignore_case('ſ', 's'));
        let pairs = case_fold_pairs();
        assert!(pairs.windows(2).all(|w| w[0] <= w[1]));
        assert!(pairs.contains(&('k', 'K')));
        assert!(pairs.contains(&('k', '\u{212A}')));
        assert!(pairs.iter().all(|&(k, c)| k != c && fold_key(c) == k));
    }

    #[test]
    fn noncharacters() {
        assert!(is_noncharacter('\u{FFFE}'));
        assert!(is_noncharacter('\u{FFFF}'));
        assert!(is_noncharacter('\u{1FFFE}'));
        assert!(is_noncharacter('\u{10FFFF}'));
        assert!(is_noncharacter('\u{FDD0}'));
        assert!(!is_noncharacter('\u{FFFD}'));
        assert!(!is_noncharacter('a'));
    }

    #[test]
    fn word_types() {
        let empty = Options::empty();
        assert_eq!(WordType::Letter, word_type('a', empty));
        assert_eq!(WordType::Other, word_type('é', empty));
        assert_eq!(WordType::Letter, word_type('é', Options::UNICODE_CLASSES));

        let w = Options::UNICODE_WORD_BOUNDARY;
        assert_eq!(WordType::Letter, word_type('é', w));
        assert_eq!(WordType::Ignore, word_type('\u{0301}', w));
        assert_eq!(WordType::Other, word_type('\n', w));
        assert_eq!(WordType::Ignore, word_type('\u{0007}', w));
        assert_eq!(WordType::Other, word_type(' ', w));
    }

    #[test]
    fn xml_classes() {
        let start = xml_name_start();
        assert!(start.contains('_'));
        assert!(!start.contains('-'));
        assert!(!start.contains('1'));
        let name = xml_name_char();
        assert!(name.contains('-'));
        assert!(name.contains('1'));
        assert!(name.contains('\u{B7}'));
        let word = xml_word();
        assert!(word.contains('a'));
        assert!(word.contains('$'));
        assert!(!word.contains('.'));
        assert!(!word.contains(' '));
    }

    #[test]
    fn surrogate_skipping() {
        assert_eq!(Some('\u{E000}'), increment('\u{D7FF}'));
        assert_eq!(Some('\u{D7FF}'), decrement('\u{E000}'));
        assert_eq!(None, increment(char::MAX));
        assert_eq!(None, decrement('\0'));
    }
}

//! Language tags and language sets.
//!
//! A language tag pairs a language code with an optional country/region
//! code; a language set is an ordered, duplicate-free collection of tags.
//! The text form is `lang[-country]`, multiple tags joined with `+`,
//! e.g. `ja`, `en-us`, `en-us+en-gb+ja`.

use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::{DqError, DqResult};

/// Language codes (ISO 639 order as the server defines it).
pub mod language_code {
    pub const UNDEFINED: u16 = 0;
    /// First value outside the defined range.
    pub const LAST: u16 = 140;

    pub(super) static SYMBOLS: [&str; 140] = [
        "undefined",
        "aa", "ab", "af", "am", "ar", "as", "ay", "az",
        "ba", "be", "bg", "bh", "bi", "bn", "bo", "br",
        "ca", "co", "cs", "cy",
        "da", "de", "dz",
        "el", "en", "eo", "es", "et", "eu",
        "fa", "fi", "fj", "fo", "fr", "fy",
        "ga", "gd", "gl", "gn", "gu",
        "ha", "he", "hi", "hr", "hu", "hy",
        "ia", "id", "ie", "ik", "is", "it", "iu",
        "ja", "jw",
        "ka", "kk", "kl", "km", "kn", "ko", "ks", "ku", "ky",
        "la", "ln", "lo", "lt", "lv",
        "mg", "mi", "mk", "ml", "mn", "mo", "mr", "ms", "mt", "my",
        "na", "ne", "nl", "no",
        "oc", "om", "or",
        "pa", "pl", "ps", "pt",
        "qu",
        "rm", "rn", "ro", "ru", "rw",
        "sa", "sd", "sg", "sh", "si", "sk", "sl", "sm", "sn", "so", "sq",
        "sr", "ss", "st", "su", "sv", "sw",
        "ta", "te", "tg", "th", "ti", "tk", "tl", "tn", "to", "tr", "ts",
        "tt", "tw",
        "ug", "uk", "ur", "uz",
        "vi", "vo",
        "wo",
        "xh",
        "yi", "yo",
        "za", "zh", "zu",
    ];

    pub fn is_valid(code: u16) -> bool {
        code > UNDEFINED && code < LAST
    }

    /// Returns the two-letter symbol of a code, `"undefined"` for
    /// anything outside the defined range.
    pub fn to_symbol(code: u16) -> &'static str {
        if is_valid(code) {
            SYMBOLS[code as usize]
        } else {
            SYMBOLS[UNDEFINED as usize]
        }
    }

    /// Returns the code of a two-letter symbol, `UNDEFINED` when unknown.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_code(symbol: &str) -> u16 {
        if symbol.len() != 2 {
            return UNDEFINED;
        }
        SYMBOLS
            .iter()
            .position(|s| *s == symbol)
            .map_or(UNDEFINED, |p| p as u16)
    }
}

/// Country/region codes (ISO 3166 order as the server defines it).
pub mod country_code {
    pub const UNDEFINED: u16 = 0;
    /// First value outside the defined range.
    pub const LAST: u16 = 241;

    pub(super) static SYMBOLS: [&str; 241] = [
        "undefined",
        "af", "al", "dz", "as", "ad", "ao", "ai", "aq", "ag", "ar", "am",
        "aw", "au", "at", "az", "bs", "bh", "bd", "bb", "by", "be", "bz",
        "bj", "bm", "bt", "bo", "ba", "bw", "bv", "br", "io", "bn", "bg",
        "bf", "bi", "kh", "cm", "ca", "cv", "ky", "cf", "td", "cl", "cn",
        "cx", "cc", "co", "km", "cd", "cg", "ck", "cr", "ci", "hr", "cu",
        "cy", "cz", "dk", "dj", "dm", "do", "tl", "ec", "eg", "sv", "gq",
        "er", "ee", "et", "fk", "fo", "fj", "fi", "fr", "fx", "gf", "pf",
        "tf", "ga", "gm", "ge", "de", "gh", "gi", "gr", "gl", "gd", "gp",
        "gu", "gt", "gn", "gw", "gy", "ht", "hm", "hn", "hk", "hu", "is",
        "in", "id", "ir", "iq", "ie", "il", "it", "jm", "jp", "jo", "kz",
        "ke", "ki", "kp", "kr", "kw", "kg", "la", "lv", "lb", "ls", "lr",
        "ly", "li", "lt", "lu", "mo", "mk", "mg", "mw", "my", "mv", "ml",
        "mt", "mh", "mq", "mr", "mu", "yt", "mx", "fm", "md", "mc", "mn",
        "ms", "ma", "mz", "mm", "na", "nr", "np", "nl", "an", "nc", "nz",
        "ni", "ne", "ng", "nu", "nf", "mp", "no", "om", "pk", "pw", "ps",
        "pa", "pg", "py", "pe", "ph", "pn", "pl", "pt", "pr", "qa", "re",
        "ro", "ru", "rw", "kn", "lc", "vc", "ws", "sm", "st", "sa", "sn",
        "sc", "sl", "sg", "sk", "si", "sb", "so", "za", "gs", "es", "lk",
        "sh", "pm", "sd", "sr", "sj", "sz", "se", "ch", "sy", "tw", "tj",
        "tz", "th", "tg", "tk", "to", "tt", "tn", "tr", "tm", "tc", "tv",
        "ug", "ua", "ae", "gb", "us", "um", "uy", "uz", "vu", "va", "ve",
        "vn", "vg", "vi", "wf", "eh", "ye", "yu", "zm", "zw",
    ];

    pub fn is_valid(code: u16) -> bool {
        code > UNDEFINED && code < LAST
    }

    /// Returns the two-letter symbol of a code, `"undefined"` for
    /// anything outside the defined range.
    pub fn to_symbol(code: u16) -> &'static str {
        if is_valid(code) {
            SYMBOLS[code as usize]
        } else {
            SYMBOLS[UNDEFINED as usize]
        }
    }

    /// Returns the code of a two-letter symbol, `UNDEFINED` when unknown.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_code(symbol: &str) -> u16 {
        if symbol.len() != 2 {
            return UNDEFINED;
        }
        SYMBOLS
            .iter()
            .position(|s| *s == symbol)
            .map_or(UNDEFINED, |p| p as u16)
    }
}

/// A (language, country) pair.
///
/// The country may be undefined; a tag without a language is not a tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct LanguageTag {
    language: u16,
    country: u16,
}

impl LanguageTag {
    pub fn new(language: u16, country: u16) -> DqResult<Self> {
        if !language_code::is_valid(language) {
            return Err(DqError::UsageDetailed(format!(
                "illegal language code {language}"
            )));
        }
        if country != country_code::UNDEFINED && !country_code::is_valid(country) {
            return Err(DqError::UsageDetailed(format!(
                "illegal country code {country}"
            )));
        }
        Ok(Self { language, country })
    }

    pub fn language(self) -> u16 {
        self.language
    }

    pub fn country(self) -> u16 {
        self.country
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", language_code::to_symbol(self.language))?;
        if self.country != country_code::UNDEFINED {
            write!(f, "-{}", country_code::to_symbol(self.country))?;
        }
        Ok(())
    }
}

/// An ordered set of language tags.
///
/// Tags are kept sorted by (language, country); adding a tag that is
/// already contained is a no-op.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LanguageSet {
    tags: Vec<LanguageTag>,
}

impl LanguageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[LanguageTag] {
        &self.tags
    }

    pub fn add(&mut self, tag: LanguageTag) {
        if let Err(pos) = self.tags.binary_search(&tag) {
            self.tags.insert(pos, tag);
        }
    }

    pub fn add_language(&mut self, language: u16) -> DqResult<()> {
        self.add(LanguageTag::new(language, country_code::UNDEFINED)?);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Whether a language (regardless of country) is contained.
    pub fn contains_language(&self, language: u16) -> bool {
        self.tags.iter().any(|t| t.language == language)
    }

    pub fn contains(&self, tag: LanguageTag) -> bool {
        self.tags.binary_search(&tag).is_ok()
    }

    /// Returns this set with all country codes stripped.
    pub fn round(&self) -> Self {
        let mut rounded = Self::new();
        for tag in &self.tags {
            rounded.add(LanguageTag {
                language: tag.language,
                country: country_code::UNDEFINED,
            });
        }
        rounded
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let count = stream.read_i32()?;
        let mut set = Self::new();
        for _ in 0..count {
            #[allow(clippy::cast_sign_loss)]
            let language = stream.read_i16()? as u16;
            #[allow(clippy::cast_sign_loss)]
            let country = stream.read_i16()? as u16;
            if !language_code::is_valid(language) {
                return Err(DqError::InterfaceDetailed(format!(
                    "unknown language code {language} on the wire"
                )));
            }
            if country != country_code::UNDEFINED && !country_code::is_valid(country) {
                return Err(DqError::InterfaceDetailed(format!(
                    "unknown country code {country} on the wire"
                )));
            }
            set.add(LanguageTag { language, country });
        }
        Ok(set)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_i32(self.tags.len() as i32)?;
        for tag in &self.tags {
            stream.write_i16(tag.language as i16)?;
            stream.write_i16(tag.country as i16)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for LanguageSet {
    type Err = DqError;

    fn from_str(symbols: &str) -> DqResult<Self> {
        let mut set = Self::new();
        if symbols.is_empty() {
            return Ok(set);
        }
        for item in symbols.split('+') {
            let mut parts = item.splitn(2, '-');
            let lang_symbol = parts.next().unwrap_or("");
            let language = language_code::to_code(lang_symbol);
            if !language_code::is_valid(language) {
                return Err(DqError::UsageDetailed(format!(
                    "illegal language symbol {lang_symbol}"
                )));
            }
            let country = match parts.next() {
                Some(country_symbol) => {
                    let country = country_code::to_code(country_symbol);
                    if !country_code::is_valid(country) {
                        return Err(DqError::UsageDetailed(format!(
                            "illegal country symbol {country_symbol}"
                        )));
                    }
                    country
                }
                None => country_code::UNDEFINED,
            };
            set.add(LanguageTag { language, country });
        }
        Ok(set)
    }
}

impl std::fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

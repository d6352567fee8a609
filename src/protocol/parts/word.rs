use super::LanguageSet;
use crate::protocol::io_stream::{InputStream, OutputStream};
use crate::DqResult;

/// Category of a word produced by the full-text index.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WordCategory {
    #[default]
    Undefined = 0,
    Essential = 1,
    Important = 2,
    Helpful = 3,
    EssentialRelated = 4,
    ImportantRelated = 5,
    HelpfulRelated = 6,
    Prohibitive = 7,
    ProhibitiveRelated = 8,
}

impl WordCategory {
    pub fn to_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::Essential,
            2 => Self::Important,
            3 => Self::Helpful,
            4 => Self::EssentialRelated,
            5 => Self::ImportantRelated,
            6 => Self::HelpfulRelated,
            7 => Self::Prohibitive,
            8 => Self::ProhibitiveRelated,
            _ => Self::Undefined,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Essential => "Essential",
            Self::Important => "Important",
            Self::Helpful => "Helpful",
            Self::EssentialRelated => "EssentialRelated",
            Self::ImportantRelated => "ImportantRelated",
            Self::HelpfulRelated => "HelpfulRelated",
            Self::Prohibitive => "Prohibitive",
            Self::ProhibitiveRelated => "ProhibitiveRelated",
        }
    }
}

/// A term extracted by the full-text index, with its language, category,
/// weight and document frequency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Word {
    term: String,
    language: LanguageSet,
    category: WordCategory,
    scale: f64,
    doc_frequency: i32,
}

impl Word {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            ..Self::default()
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn language(&self) -> &LanguageSet {
        &self.language
    }

    pub fn set_language(&mut self, language: LanguageSet) {
        self.language = language;
    }

    pub fn category(&self) -> WordCategory {
        self.category
    }

    pub fn set_category(&mut self, category: WordCategory) {
        self.category = category;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn doc_frequency(&self) -> i32 {
        self.doc_frequency
    }

    pub fn set_doc_frequency(&mut self, doc_frequency: i32) {
        self.doc_frequency = doc_frequency;
    }

    pub(crate) fn parse<R: std::io::Read>(stream: &mut InputStream<R>) -> DqResult<Self> {
        let term = stream.read_string()?;
        let language = LanguageSet::parse(stream)?;
        let category = WordCategory::from_i32(stream.read_i32()?);
        let scale = stream.read_f64()?;
        let doc_frequency = stream.read_i32()?;
        Ok(Self {
            term,
            language,
            category,
            scale,
            doc_frequency,
        })
    }

    pub(crate) fn emit<W: std::io::Write>(&self, stream: &mut OutputStream<W>) -> DqResult<()> {
        stream.write_string(&self.term)?;
        self.language.emit(stream)?;
        stream.write_i32(self.category.to_i32())?;
        stream.write_f64(self.scale)?;
        stream.write_i32(self.doc_frequency)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.category == WordCategory::Undefined {
            write!(f, "{} scale {}", self.term, self.scale)
        } else {
            write!(
                f,
                "{} language {} category {} scale {} df {}",
                self.term,
                self.language,
                self.category.as_str(),
                self.scale,
                self.doc_frequency
            )
        }
    }
}

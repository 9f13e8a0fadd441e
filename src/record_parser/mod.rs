// Lesson-sheet record parser: raw delimited text in, three typed collections out.
// Best-effort by policy: rows that do not decode are skipped without diagnostics.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

pub mod records;
pub mod tokenizer;

pub use records::{DialogueRecord, QuizRecord, RowTag, TextRecord, TypedRecord};
pub use tokenizer::{split_rows, RowTokenizer};

/// Lexical rules for the sheet format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserRules {
    /// Field-delimiting character
    pub separator: char,
    /// Character wrapping fields that contain the separator
    pub quote: char,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            separator: ',',
            quote: '"',
        }
    }
}

/// Typed collections from one parse pass, each in input row order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLesson {
    pub quiz: Vec<QuizRecord>,
    pub dialogue: Vec<DialogueRecord>,
    pub texts: Vec<TextRecord>,
}

impl ParsedLesson {
    pub fn is_empty(&self) -> bool {
        self.quiz.is_empty() && self.dialogue.is_empty() && self.texts.is_empty()
    }

    fn push(&mut self, record: TypedRecord) {
        match record {
            TypedRecord::Quiz(q) => self.quiz.push(q),
            TypedRecord::Dialogue(d) => self.dialogue.push(d),
            TypedRecord::Text(t) => self.texts.push(t),
        }
    }
}

/// Record parser bound to a set of lexical rules
#[derive(Debug)]
pub struct RecordParser {
    tokenizer: RowTokenizer,
}

impl RecordParser {
    /// Create a parser with custom rules
    pub fn new(rules: ParserRules) -> Result<Self> {
        Ok(Self {
            tokenizer: RowTokenizer::new(rules.separator, rules.quote)?,
        })
    }

    /// Comma-separated, double-quoted
    pub fn with_default_rules() -> Result<Self> {
        Self::new(ParserRules::default())
    }

    /// Decode every data row. Row 0 is the header and is never decoded;
    /// blank rows, rows with fewer than two fields and unknown tags are skipped.
    pub fn parse(&self, text: &str) -> ParsedLesson {
        let mut lesson = ParsedLesson::default();

        for record in self.records(text) {
            lesson.push(record);
        }

        debug!(
            quiz = lesson.quiz.len(),
            dialogue = lesson.dialogue.len(),
            texts = lesson.texts.len(),
            "Parsed lesson sheet"
        );
        lesson
    }

    /// Decoded records in row order, across all variants
    pub fn records<'a>(&'a self, text: &'a str) -> impl Iterator<Item = TypedRecord> + 'a {
        split_rows(text)
            .skip(1)
            .filter(|row| !row.trim().is_empty())
            .filter_map(|row| self.parse_row(row))
    }

    /// Decode a single data row
    pub fn parse_row(&self, row: &str) -> Option<TypedRecord> {
        TypedRecord::from_fields(&self.tokenizer.fields(row))
    }
}

/// Parse with the default comma/double-quote rules
pub fn parse(text: &str) -> ParsedLesson {
    static DEFAULT_PARSER: OnceLock<RecordParser> = OnceLock::new();

    DEFAULT_PARSER
        .get_or_init(|| {
            RecordParser::with_default_rules().expect("default parser rules are valid")
        })
        .parse(text)
}

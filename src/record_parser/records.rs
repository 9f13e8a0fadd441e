// Typed records produced from lesson-sheet rows.
// One constructor per variant; field positions are relative to the row tag.

use serde::{Deserialize, Serialize};

/// Number of answer slots a quiz row carries
pub const QUIZ_CHOICE_SLOTS: usize = 4;

/// Row tag selecting which record variant a row decodes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowTag {
    Quiz,
    Dialogue,
    Text,
}

impl RowTag {
    /// Case-insensitive tag lookup; unknown tags yield `None`
    pub fn from_field(field: &str) -> Option<Self> {
        match field.to_uppercase().as_str() {
            "QUIZ" => Some(RowTag::Quiz),
            "DIALOGUE" => Some(RowTag::Dialogue),
            "TEXT" => Some(RowTag::Text),
            _ => None,
        }
    }
}

/// Multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub question: String,
    /// Always four slots; empty slots are skipped by presentation
    pub choices: Vec<String>,
    pub correct_choice_index: i64,
}

impl QuizRecord {
    /// Build from the fields following the `QUIZ` tag
    pub fn from_fields(fields: &[String]) -> Self {
        let choices = (1..=QUIZ_CHOICE_SLOTS)
            .map(|i| field_or_empty(fields, i))
            .collect();

        Self {
            question: field_or_empty(fields, 0),
            choices,
            correct_choice_index: fields
                .get(QUIZ_CHOICE_SLOTS + 1)
                .map(|f| parse_leading_int(f))
                .unwrap_or(0),
        }
    }

    /// Non-empty choices paired with their slot index
    pub fn visible_choices(&self) -> impl Iterator<Item = (usize, &str)> {
        self.choices
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, c)| (i, c.as_str()))
    }

    pub fn is_correct(&self, choice_index: usize) -> bool {
        i64::try_from(choice_index).is_ok_and(|i| i == self.correct_choice_index)
    }
}

/// One spoken line of a two-speaker dialogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub speaker: String,
    pub text: String,
}

impl DialogueRecord {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    pub fn from_fields(fields: &[String]) -> Self {
        Self::new(field_or_empty(fields, 0), field_or_empty(fields, 1))
    }

    /// Transcript form: `speaker: text`
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

/// Standalone titled text block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRecord {
    pub title: String,
    pub body: String,
}

impl TextRecord {
    pub fn from_fields(fields: &[String]) -> Self {
        Self {
            title: field_or_empty(fields, 0),
            body: field_or_empty(fields, 1),
        }
    }
}

/// Result of decoding a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypedRecord {
    Quiz(QuizRecord),
    Dialogue(DialogueRecord),
    Text(TextRecord),
}

impl TypedRecord {
    /// Decode a full field list (tag first). Rows with fewer than two fields
    /// or an unknown tag decode to `None`.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        if fields.len() < 2 {
            return None;
        }

        let payload = &fields[1..];
        let record = match RowTag::from_field(&fields[0])? {
            RowTag::Quiz => TypedRecord::Quiz(QuizRecord::from_fields(payload)),
            RowTag::Dialogue => TypedRecord::Dialogue(DialogueRecord::from_fields(payload)),
            RowTag::Text => TypedRecord::Text(TextRecord::from_fields(payload)),
        };
        Some(record)
    }

    pub fn tag(&self) -> RowTag {
        match self {
            TypedRecord::Quiz(_) => RowTag::Quiz,
            TypedRecord::Dialogue(_) => RowTag::Dialogue,
            TypedRecord::Text(_) => RowTag::Text,
        }
    }
}

fn field_or_empty(fields: &[String], index: usize) -> String {
    fields.get(index).cloned().unwrap_or_default()
}

/// Leading-integer parse: optional sign then digits, trailing text ignored.
/// Anything without leading digits resolves to 0; out-of-range values saturate.
pub fn parse_leading_int(field: &str) -> i64 {
    let trimmed = field.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return 0;
    }

    match rest[..digit_count].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

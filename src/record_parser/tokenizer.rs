// Row splitting and field tokenization for lesson sheets.
// Quoted fields may contain the separator; a literal quote inside a quoted
// field is not supported (no doubling convention).

use anyhow::Result;
use regex_automata::{meta::Regex, Anchored, Input};

/// Split raw text into rows on `\n` or `\r\n`, preserving order
pub fn split_rows(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|row| row.strip_suffix('\r').unwrap_or(row))
}

/// Field tokenizer for a single row
#[derive(Debug)]
pub struct RowTokenizer {
    separator: char,
    quote: char,
    /// Anchored `\s*(?:SEP|$)`: what must follow every token
    terminator: Regex,
}

impl RowTokenizer {
    pub fn new(separator: char, quote: char) -> Result<Self> {
        if separator == quote {
            anyhow::bail!("Separator and quote must differ, both are {:?}", separator);
        }

        let terminator = Regex::new(&format!(r"\s*(?:\x{{{:X}}}|$)", separator as u32))?;

        Ok(Self {
            separator,
            quote,
            terminator,
        })
    }

    /// Tokenize a row into cleaned fields: outer quotes stripped, whitespace trimmed
    pub fn fields(&self, row: &str) -> Vec<String> {
        self.raw_tokens(row)
            .into_iter()
            .map(|token| self.clean_token(token).to_string())
            .collect()
    }

    /// Raw tokens in row order, quotes still attached.
    ///
    /// A token is either a quoted run (shortest run from a quote to a later quote)
    /// or a maximal run free of separators and quotes. Either form only counts when
    /// followed by optional whitespace and then a separator or end of row; when no
    /// token starts at a position the scan moves on by one character.
    pub fn raw_tokens<'a>(&self, row: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < row.len() {
            match self.token_end_at(row, pos) {
                Some(end) => {
                    tokens.push(&row[pos..end]);
                    pos = end;
                }
                None => {
                    pos += row[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        tokens
    }

    fn token_end_at(&self, row: &str, start: usize) -> Option<usize> {
        let rest = &row[start..];
        let first = rest.chars().next()?;

        if first == self.quote {
            let body_start = start + first.len_utf8();
            // A quoted run never spans a line terminator such as a lone `\r`.
            let body_end = row[body_start..]
                .find(is_line_terminator)
                .map_or(row.len(), |offset| body_start + offset);
            return row[body_start..body_end]
                .match_indices(self.quote)
                .map(|(offset, q)| body_start + offset + q.len())
                .find(|&end| self.is_terminated(row, end));
        }

        if first == self.separator {
            return None;
        }

        // A shorter bare run would end before a non-separator character, so only
        // the maximal run can satisfy the terminator.
        let run = rest
            .find(|c| c == self.quote || c == self.separator)
            .unwrap_or(rest.len());
        let end = start + run;
        self.is_terminated(row, end).then_some(end)
    }

    fn is_terminated(&self, row: &str, at: usize) -> bool {
        self.terminator.is_match(Input::new(&row[at..]).anchored(Anchored::Yes))
    }

    fn clean_token<'a>(&self, token: &'a str) -> &'a str {
        let unquoted = token
            .strip_prefix(self.quote)
            .and_then(|t| t.strip_suffix(self.quote))
            .unwrap_or(token);
        unquoted.trim()
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

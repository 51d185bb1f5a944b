use std::iter::Peekable;
use std::str::Chars;

use crate::{Error, Result};

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | ',')
}

/// Splits a CPU list into words separated by any run of whitespace and commas.
///
/// A word may contain `'...'` or `"..."` sections in which delimiters are literal; the quotes
/// themselves are dropped. A backslash takes the next character literally. An unterminated quote
/// or a trailing backslash yields one error, after which iteration ends.
#[derive(Debug)]
pub(crate) struct Words<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    failed: bool,
}

impl<'a> Words<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            failed: false,
        }
    }

    fn read_word(&mut self) -> Result<String> {
        let mut word = String::new();
        let mut quote = None;

        while let Some(c) = self.chars.next() {
            match (quote, c) {
                (_, '\\') => {
                    let escaped = self.chars.next().ok_or_else(|| {
                        Error::malformed(
                            self.input,
                            "trailing backslash does not escape anything",
                        )
                    })?;
                    word.push(escaped);
                }
                (Some(open), c) if c == open => quote = None,
                (Some(_), c) => word.push(c),
                (None, '\'' | '"') => quote = Some(c),
                (None, c) if is_delimiter(c) => break,
                (None, c) => word.push(c),
            }
        }

        if let Some(open) = quote {
            return Err(Error::malformed(
                self.input,
                format!("quote {open} is never closed"),
            ));
        }

        Ok(word)
    }
}

impl Iterator for Words<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.chars.next_if(|c| is_delimiter(*c)).is_some() {}

        self.chars.peek()?;

        let word = self.read_word();
        self.failed = word.is_err();

        Some(word)
    }
}

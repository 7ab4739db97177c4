// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tokenizing cursor over a raw console line

use crate::error::CommandError;

/// A cursor over a console line that hands out words one at a time.
///
/// Indices are byte offsets that always sit on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringView {
    buffer: String,
    index: usize,
    previous: usize,
}

impl StringView {
    pub fn new(buffer: impl Into<String>) -> Self {
        Self {
            buffer: buffer.into(),
            index: 0,
            previous: 0,
        }
    }

    /// The full underlying text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current byte offset.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn eof(&self) -> bool {
        self.index >= self.buffer.len()
    }

    /// Text not yet consumed, without moving the cursor.
    pub fn remaining(&self) -> &str {
        &self.buffer[self.index..]
    }

    /// Rewind to the position before the last consuming call.
    pub fn undo(&mut self) {
        self.index = self.previous;
    }

    /// Skip whitespace. Returns true if anything was skipped.
    pub fn skip_ws(&mut self) -> bool {
        let rest = self.remaining();
        let skipped = rest.len() - rest.trim_start().len();
        if skipped == 0 {
            return false;
        }
        self.previous = self.index;
        self.index += skipped;
        true
    }

    /// Consume everything up to the next whitespace character.
    pub fn get_word(&mut self) -> Option<String> {
        let rest = self.remaining();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        let word = rest[..end].to_string();
        self.previous = self.index;
        self.index += end;
        Some(word)
    }

    /// Consume a word that may be wrapped in double quotes.
    ///
    /// Inside quotes, `\"` and `\\` are unescaped and whitespace is kept.
    /// An unclosed quote is a [`CommandError::BadArgument`].
    pub fn get_quoted_word(&mut self) -> Result<Option<String>, CommandError> {
        let rest = self.remaining();
        let mut chars = rest.char_indices();
        let first = match chars.next() {
            Some((_, c)) => c,
            None => return Ok(None),
        };
        if first != '"' {
            return Ok(self.get_word());
        }

        let mut word = String::new();
        let mut escaped = false;
        for (offset, c) in chars {
            if escaped {
                word.push(c);
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => {
                    let end = offset + c.len_utf8();
                    let tail = &rest[end..];
                    if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
                        return Err(CommandError::BadArgument(
                            "expected space after closing quotation".to_string(),
                        ));
                    }
                    self.previous = self.index;
                    self.index += end;
                    return Ok(Some(word));
                }
                _ => word.push(c),
            }
        }

        Err(CommandError::BadArgument(
            "expected closing quotation mark".to_string(),
        ))
    }

    /// Consume and return the rest of the buffer.
    pub fn read_rest(&mut self) -> String {
        let rest = self.remaining().to_string();
        self.previous = self.index;
        self.index = self.buffer.len();
        rest
    }
}

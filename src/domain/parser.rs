//! Manifest parser.
//!
//! ```text
//! manifest    := declaration*
//! declaration := path ':' kind
//! path        := '/' component ('/' component)*
//! component   := letter (letter | digit | '-' | '_')*
//! kind        := 'func' identifier
//! identifier  := letter (letter | digit | '_')*
//! ```
//!
//! Whitespace (newlines included) may appear between tokens. A path is a
//! single token. Any mismatch rejects the whole manifest.

use tracing::{instrument, trace};

use crate::domain::entities::{Declaration, EntryKind};
use crate::domain::error::SyntaxError;

/// Longest excerpt quoted back in a syntax error.
const MAX_EXCERPT: usize = 24;

/// Parse manifest text into declarations, preserving their order.
#[instrument(level = "debug", skip(input), fields(len = input.len()))]
pub fn parse_manifest(input: &str) -> Result<Vec<Declaration>, SyntaxError> {
    let mut scanner = Scanner::new(input);
    let mut declarations = Vec::new();

    loop {
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }
        let decl = scanner.declaration()?;
        trace!("parsed declaration: {}", decl);
        declarations.push(decl);
    }

    Ok(declarations)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn declaration(&mut self) -> Result<Declaration, SyntaxError> {
        let components = self.path()?;

        self.skip_whitespace();
        if self.peek() != Some(':') {
            return Err(self.error("':' after path"));
        }
        self.bump();
        self.skip_whitespace();

        let kind = self.kind()?;
        let handler = match kind {
            EntryKind::Func => {
                if !self.peek().is_some_and(char::is_whitespace) {
                    return Err(self.error("whitespace after 'func'"));
                }
                self.skip_whitespace();
                self.identifier()?
            }
        };

        Ok(Declaration::new(components, kind, handler))
    }

    fn path(&mut self) -> Result<Vec<String>, SyntaxError> {
        if self.peek() != Some('/') {
            return Err(self.error("'/' starting a path"));
        }
        let mut components = Vec::new();
        while self.peek() == Some('/') {
            self.bump();
            components.push(self.component()?);
        }
        Ok(components)
    }

    fn component(&mut self) -> Result<String, SyntaxError> {
        self.word("path component", |c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_'
        })
    }

    fn identifier(&mut self) -> Result<String, SyntaxError> {
        self.word("handler name", |c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn kind(&mut self) -> Result<EntryKind, SyntaxError> {
        let start = self.pos;
        let word = self.word("entry kind ('func')", |c| {
            c.is_ascii_alphanumeric() || c == '_'
        })?;
        EntryKind::from_keyword(&word).ok_or_else(|| {
            self.pos = start;
            self.error("entry kind ('func')")
        })
    }

    /// Scan a letter followed by any run of `continues` characters.
    fn word(
        &mut self,
        expected: &str,
        continues: impl Fn(char) -> bool,
    ) -> Result<String, SyntaxError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.bump();
            }
            _ => return Err(self.error(expected)),
        }
        while self.peek().is_some_and(&continues) {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn error(&self, expected: &str) -> SyntaxError {
        let consumed = &self.src[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let line_start = consumed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = consumed[line_start..].chars().count() + 1;

        SyntaxError {
            line,
            column,
            offset: self.pos,
            expected: expected.to_string(),
            found: self.excerpt(),
        }
    }

    fn excerpt(&self) -> String {
        let rest = self.rest();
        match rest.chars().next() {
            None => "end of input".to_string(),
            Some('\n') => "end of line".to_string(),
            Some(c) if c.is_whitespace() => "whitespace".to_string(),
            Some(_) => {
                let token: String = rest
                    .chars()
                    .take_while(|c| !c.is_whitespace())
                    .take(MAX_EXCERPT)
                    .collect();
                format!("'{}'", token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_text_when_parsing_then_returns_no_declarations() {
        assert_eq!(parse_manifest("").unwrap(), vec![]);
        assert_eq!(parse_manifest(" \n\t\n").unwrap(), vec![]);
    }

    #[test]
    fn given_missing_colon_when_parsing_then_reports_separator() {
        let err = parse_manifest("/bin/ls func cmd_ls").unwrap_err();
        assert_eq!(err.expected, "':' after path");
        assert_eq!(err.found, "'func'");
        assert_eq!((err.line, err.column, err.offset), (1, 9, 8));
    }

    #[test]
    fn given_error_on_later_line_when_parsing_then_position_is_line_relative() {
        let err = parse_manifest("/bin/ls:func cmd_ls\n  /bin/9cat:func cmd_cat\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 8);
        assert_eq!(err.expected, "path component");
    }

    #[test]
    fn given_unknown_kind_when_parsing_then_fails_at_keyword() {
        let err = parse_manifest("/bin/ls:file cmd_ls").unwrap_err();
        assert_eq!(err.expected, "entry kind ('func')");
        assert_eq!(err.found, "'file'");
        assert_eq!(err.column, 9);
    }
}

use memchr::{memchr, memchr_iter, memmem, memrchr};

use crate::constants::{is_ident_continue, is_ident_start};
use crate::num::number::{accumulate_float, accumulate_int};
use crate::types::StrView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexError {
    UnterminatedString,
    UnterminatedComment,
    UnexpectedChar,
    MalformedVector,
    NumberTooLong,
    NumberOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TokenKind {
    Key(StrView),
    Equals,
    String(StrView),
    Int(i32),
    Float(f32),
    Bool(bool),
    BraceLeft,
    BraceRight,
    BracketLeft,
    BracketRight,
    ParenLeft,
    ParenRight,
    Semicolon,
    Comma,
    /// `vec2`, `vec3` or `vec4`, carrying the arity.
    Vec(u8),
    Eof,
    Error(LexError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn start() -> Self {
        Self {
            kind: TokenKind::Eof,
            line: 1,
            column: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    position: usize,
    line: u32,
    column: u32,
}

/// Pull tokenizer over the arena's copy of the source. Views it hands out
/// are byte offsets into that same text.
pub(crate) struct Scanner<'s> {
    input: &'s [u8],
    position: usize,
    line: u32,
    column: u32,
    max_digits: usize,
}

impl<'s> Scanner<'s> {
    pub fn new(input: &'s [u8], max_digits: usize) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
            max_digits,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            match self.skip_comment() {
                Ok(true) => continue,
                Ok(false) => break,
                Err(token) => return token,
            }
        }

        let (line, column) = (self.line, self.column);
        let kind = self.scan_kind();
        Token { kind, line, column }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.position + offset).copied()
    }

    /// Moves past `len` bytes, keeping line and column in step with any
    /// newlines inside them.
    fn consume(&mut self, len: usize) {
        let end = (self.position + len).min(self.input.len());
        let consumed = &self.input[self.position..end];
        match memrchr(b'\n', consumed) {
            Some(last) => {
                self.line += memchr_iter(b'\n', consumed).count() as u32;
                self.column = (consumed.len() - last) as u32;
            }
            None => self.column += consumed.len() as u32,
        }
        self.position = end;
    }

    fn skip_whitespace(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\r' => {
                    self.position += 1;
                    self.column += 1;
                }
                b'\n' => {
                    self.position += 1;
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    /// `Ok(true)` when a comment was consumed.
    fn skip_comment(&mut self) -> Result<bool, Token> {
        if self.peek() != Some(b'/') {
            return Ok(false);
        }
        let input = self.input;
        let rest = &input[self.position..];
        match self.peek_at(1) {
            Some(b'/') => {
                let len = memchr(b'\n', rest).unwrap_or(rest.len());
                self.consume(len);
                Ok(true)
            }
            Some(b'*') => match memmem::find(&rest[2..], b"*/") {
                Some(offset) => {
                    self.consume(offset + 4);
                    Ok(true)
                }
                None => {
                    let token = Token {
                        kind: TokenKind::Error(LexError::UnterminatedComment),
                        line: self.line,
                        column: self.column,
                    };
                    self.consume(rest.len());
                    Err(token)
                }
            },
            _ => Ok(false),
        }
    }

    fn scan_kind(&mut self) -> TokenKind {
        let Some(byte) = self.peek() else {
            return TokenKind::Eof;
        };
        let punct = match byte {
            b'=' => Some(TokenKind::Equals),
            b'{' => Some(TokenKind::BraceLeft),
            b'}' => Some(TokenKind::BraceRight),
            b'[' => Some(TokenKind::BracketLeft),
            b']' => Some(TokenKind::BracketRight),
            b'(' => Some(TokenKind::ParenLeft),
            b')' => Some(TokenKind::ParenRight),
            b';' => Some(TokenKind::Semicolon),
            b',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = punct {
            self.consume(1);
            return kind;
        }

        match byte {
            b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            b'+' | b'-' if self.peek_at(1).is_some_and(|next| next.is_ascii_digit()) => {
                self.scan_number()
            }
            _ if is_ident_start(byte) => self.scan_identifier(),
            _ => {
                self.consume(1);
                TokenKind::Error(LexError::UnexpectedChar)
            }
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        let start = self.position + 1;
        match memchr(b'"', &self.input[start..]) {
            Some(len) => {
                self.consume(len + 2);
                TokenKind::String(StrView::new(start as u32, len as u32))
            }
            None => {
                self.consume(self.input.len() - self.position);
                TokenKind::Error(LexError::UnterminatedString)
            }
        }
    }

    fn digit_run(&self, from: usize) -> usize {
        self.input
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    }

    fn scan_number(&mut self) -> TokenKind {
        let negative = match self.peek() {
            Some(b'-') => {
                self.consume(1);
                true
            }
            Some(b'+') => {
                self.consume(1);
                false
            }
            _ => false,
        };

        let int_start = self.position;
        let int_end = int_start + self.digit_run(int_start);
        let mut end = int_end;
        let mut fraction = None;
        let has_fraction = self.input.get(int_end) == Some(&b'.')
            && self
                .input
                .get(int_end + 1)
                .is_some_and(|next| next.is_ascii_digit());
        if has_fraction {
            let frac_start = int_end + 1;
            end = frac_start + self.digit_run(frac_start);
            fraction = Some(frac_start..end);
        }

        let input = self.input;
        let int_digits = &input[int_start..int_end];
        let frac_digits = fraction.map_or(&[][..], |range| &input[range]);
        self.consume(end - self.position);

        if int_digits.len() + frac_digits.len() > self.max_digits {
            return TokenKind::Error(LexError::NumberTooLong);
        }
        if has_fraction {
            return TokenKind::Float(accumulate_float(int_digits, frac_digits, negative));
        }
        match accumulate_int(int_digits, negative) {
            Some(value) => TokenKind::Int(value),
            None => TokenKind::Error(LexError::NumberOverflow),
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let input = self.input;
        let start = self.position;
        let len = input[start..]
            .iter()
            .take_while(|&&b| is_ident_continue(b))
            .count();
        let text = &input[start..start + len];
        self.consume(len);

        match text {
            b"true" => TokenKind::Bool(true),
            b"false" => TokenKind::Bool(false),
            b"vec2" => TokenKind::Vec(2),
            b"vec3" => TokenKind::Vec(3),
            b"vec4" => TokenKind::Vec(4),
            [b'v', b'e', b'c', _] => TokenKind::Error(LexError::MalformedVector),
            _ => TokenKind::Key(StrView::new(start as u32, len as u32)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_DIGITS;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input.as_bytes(), DEFAULT_MAX_DIGITS);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token();
            out.push(token.kind);
            if matches!(token.kind, TokenKind::Eof | TokenKind::Error(_)) {
                return out;
            }
        }
    }

    fn first(input: &str) -> TokenKind {
        Scanner::new(input.as_bytes(), DEFAULT_MAX_DIGITS)
            .next_token()
            .kind
    }

    #[rstest::rstest]
    fn test_field_tokens() {
        assert_eq!(
            kinds("name = \"x\";"),
            vec![
                TokenKind::Key(StrView::new(0, 4)),
                TokenKind::Equals,
                TokenKind::String(StrView::new(8, 1)),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest::rstest]
    fn test_punctuation() {
        assert_eq!(
            kinds("{}[](),"),
            vec![
                TokenKind::BraceLeft,
                TokenKind::BraceRight,
                TokenKind::BracketLeft,
                TokenKind::BracketRight,
                TokenKind::ParenLeft,
                TokenKind::ParenRight,
                TokenKind::Comma,
                TokenKind::Eof,
            ]
        );
    }

    #[rstest::rstest]
    #[case("42", TokenKind::Int(42))]
    #[case("-5", TokenKind::Int(-5))]
    #[case("+5", TokenKind::Int(5))]
    #[case("2.5", TokenKind::Float(2.5))]
    #[case("-1.5", TokenKind::Float(-1.5))]
    #[case("2147483647", TokenKind::Int(i32::MAX))]
    #[case("-2147483648", TokenKind::Int(i32::MIN))]
    #[case("2147483648", TokenKind::Error(LexError::NumberOverflow))]
    #[case("1234567890123456", TokenKind::Error(LexError::NumberTooLong))]
    #[case("12345678.12345678", TokenKind::Error(LexError::NumberTooLong))]
    #[case("true", TokenKind::Bool(true))]
    #[case("false", TokenKind::Bool(false))]
    #[case("vec2", TokenKind::Vec(2))]
    #[case("vec4", TokenKind::Vec(4))]
    #[case("vec5", TokenKind::Error(LexError::MalformedVector))]
    #[case("vec1", TokenKind::Error(LexError::MalformedVector))]
    #[case("vecx", TokenKind::Error(LexError::MalformedVector))]
    #[case("vec_", TokenKind::Error(LexError::MalformedVector))]
    #[case("\"open", TokenKind::Error(LexError::UnterminatedString))]
    #[case("@", TokenKind::Error(LexError::UnexpectedChar))]
    #[case("/* open", TokenKind::Error(LexError::UnterminatedComment))]
    #[case("", TokenKind::Eof)]
    fn test_single_token(#[case] input: &str, #[case] expected: TokenKind) {
        assert_eq!(first(input), expected);
    }

    #[rstest::rstest]
    #[case("vector")]
    #[case("vec2_val")]
    #[case("True")]
    #[case("_private")]
    fn test_identifiers_that_are_keys(#[case] input: &str) {
        assert_eq!(
            first(input),
            TokenKind::Key(StrView::new(0, input.len() as u32))
        );
    }

    #[rstest::rstest]
    fn test_trailing_dot_is_not_a_fraction() {
        assert_eq!(
            kinds("1."),
            vec![
                TokenKind::Int(1),
                TokenKind::Error(LexError::UnexpectedChar)
            ]
        );
    }

    #[rstest::rstest]
    fn test_custom_digit_budget() {
        let mut scanner = Scanner::new(b"1234 123", 3);
        assert_eq!(
            scanner.next_token().kind,
            TokenKind::Error(LexError::NumberTooLong)
        );
        assert_eq!(scanner.next_token().kind, TokenKind::Int(123));
    }

    #[rstest::rstest]
    fn test_comments_are_skipped() {
        let input = "// line\na /* block\n spanning */ = 1; // tail";
        let mut scanner = Scanner::new(input.as_bytes(), DEFAULT_MAX_DIGITS);
        let key = scanner.next_token();
        assert_eq!((key.line, key.column), (2, 1));
        let equals = scanner.next_token();
        assert_eq!(equals.kind, TokenKind::Equals);
        assert_eq!((equals.line, equals.column), (3, 14));
        assert_eq!(scanner.next_token().kind, TokenKind::Int(1));
        assert_eq!(scanner.next_token().kind, TokenKind::Semicolon);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }

    #[rstest::rstest]
    fn test_positions_track_lines() {
        let mut scanner = Scanner::new(b"a = 1;\n  bb = \"x\ny\";\nc", DEFAULT_MAX_DIGITS);
        let positions: Vec<(u32, u32)> = std::iter::from_fn(|| {
            let token = scanner.next_token();
            (token.kind != TokenKind::Eof).then_some((token.line, token.column))
        })
        .collect();
        assert_eq!(
            positions,
            vec![
                (1, 1),
                (1, 3),
                (1, 5),
                (1, 6),
                (2, 3),
                (2, 6),
                (2, 8),
                (3, 3),
                (4, 1),
            ]
        );
    }

    #[rstest::rstest]
    fn test_strings_keep_backslashes() {
        let input = r#""C:\path\n""#;
        assert_eq!(
            first(input),
            TokenKind::String(StrView::new(1, input.len() as u32 - 2))
        );
    }

    #[rstest::rstest]
    fn test_checkpoint_restore() {
        let mut scanner = Scanner::new(b"[1, 2]", DEFAULT_MAX_DIGITS);
        assert_eq!(scanner.next_token().kind, TokenKind::BracketLeft);
        let checkpoint = scanner.checkpoint();
        assert_eq!(scanner.next_token().kind, TokenKind::Int(1));
        assert_eq!(scanner.next_token().kind, TokenKind::Comma);
        scanner.restore(checkpoint);
        let token = scanner.next_token();
        assert_eq!(token.kind, TokenKind::Int(1));
        assert_eq!(token.column, 2);
    }
}

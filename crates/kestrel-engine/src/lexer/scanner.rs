//! The scanner that produces tokens from source text.

use super::{Span, TemplateParts, Token, TokenKind};
use crate::runtime::string::JsString;

/// A scanner that tokenizes ECMAScript source code.
///
/// The scanner never backtracks; a `/` is always a division operator, so
/// regular expression literals surface as a `Slash` token that the parser
/// rejects.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    base: usize,
    current_pos: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_range(source, Span::new(0, source.len()))
    }

    /// Creates a scanner over a sub-range of `source`. Token spans stay
    /// relative to the whole source.
    pub fn with_range(source: &'a str, range: Span) -> Self {
        let slice = &source[range.start..range.end];
        Self {
            source: slice,
            chars: slice.char_indices().peekable(),
            base: range.start,
            current_pos: 0,
        }
    }

    /// Scans the whole input, returning every token up to and including `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let newline_before = self.skip_whitespace_and_comments();

        let start = self.current_pos;

        let Some((_pos, ch)) = self.advance() else {
            let mut token = Token::new(TokenKind::Eof, self.span(start, start));
            token.newline_before = newline_before;
            return token;
        };

        let kind = match ch {
            // Single-character tokens
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,

            // Numbers starting with a decimal point
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number('.'),

            // Multi-character tokens
            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equal(),
            '!' => self.scan_bang(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),
            '?' => self.scan_question(),

            // String literals
            '"' | '\'' => self.scan_string(ch),

            // Template literals
            '`' => self.scan_template(),

            // Numbers
            '0'..='9' => self.scan_number(ch),

            // Identifiers and keywords
            _ if is_id_start(ch) => self.scan_identifier(ch),

            '#' => TokenKind::Invalid("private names are not supported"),

            _ => TokenKind::Invalid("unexpected character"),
        };

        let mut token = Token::new(kind, self.span(start, self.current_pos));
        token.newline_before = newline_before;
        token
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.base + start, self.base + end)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and comments, reporting whether a line terminator
    /// was crossed (a multi-line comment containing one counts).
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.peek() {
                Some(ch) if is_line_terminator(ch) => {
                    newline = true;
                    self.advance();
                }
                Some(ch) if is_whitespace(ch) => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        let mut prev = ' ';
                        while let Some((_, ch)) = self.advance() {
                            if is_line_terminator(ch) {
                                newline = true;
                            }
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        newline
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            TokenKind::Ellipsis
        } else {
            TokenKind::Dot
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.eat('+') {
            TokenKind::PlusPlus
        } else if self.eat('=') {
            TokenKind::PlusEqual
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.eat('-') {
            TokenKind::MinusMinus
        } else if self.eat('=') {
            TokenKind::MinusEqual
        } else {
            TokenKind::Minus
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.eat('*') {
            if self.eat('=') {
                TokenKind::StarStarEqual
            } else {
                TokenKind::StarStar
            }
        } else if self.eat('=') {
            TokenKind::StarEqual
        } else {
            TokenKind::Star
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::SlashEqual
        } else {
            TokenKind::Slash
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::PercentEqual
        } else {
            TokenKind::Percent
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.eat('<') {
            if self.eat('=') {
                TokenKind::LeftShiftEqual
            } else {
                TokenKind::LeftShift
            }
        } else if self.eat('=') {
            TokenKind::LessThanEqual
        } else {
            TokenKind::LessThan
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.eat('>') {
            if self.eat('>') {
                if self.eat('=') {
                    TokenKind::UnsignedRightShiftEqual
                } else {
                    TokenKind::UnsignedRightShift
                }
            } else if self.eat('=') {
                TokenKind::RightShiftEqual
            } else {
                TokenKind::RightShift
            }
        } else if self.eat('=') {
            TokenKind::GreaterThanEqual
        } else {
            TokenKind::GreaterThan
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictEqual
            } else {
                TokenKind::EqualEqual
            }
        } else if self.eat('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Equal
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictNotEqual
            } else {
                TokenKind::NotEqual
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.eat('&') {
            if self.eat('=') {
                TokenKind::AmpersandAmpersandEqual
            } else {
                TokenKind::AmpersandAmpersand
            }
        } else if self.eat('=') {
            TokenKind::AmpersandEqual
        } else {
            TokenKind::Ampersand
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.eat('|') {
            if self.eat('=') {
                TokenKind::PipePipeEqual
            } else {
                TokenKind::PipePipe
            }
        } else if self.eat('=') {
            TokenKind::PipeEqual
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::CaretEqual
        } else {
            TokenKind::Caret
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.eat('?') {
            if self.eat('=') {
                TokenKind::QuestionQuestionEqual
            } else {
                TokenKind::QuestionQuestion
            }
        } else if self.peek() == Some('.') && !self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            // `a?.5:b` is a conditional, not an optional chain
            self.advance();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = Vec::new();

        loop {
            match self.advance() {
                None => return TokenKind::Invalid("unterminated string literal"),
                Some((_, ch)) if ch == quote => break,
                Some((_, '\n' | '\r')) => return TokenKind::Invalid("unterminated string literal"),
                Some((_, '\\')) => {
                    if let Err(reason) = self.scan_escape(&mut value, false) {
                        return TokenKind::Invalid(reason);
                    }
                }
                Some((_, ch)) => push_char(&mut value, ch),
            }
        }

        TokenKind::String(JsString::from(value))
    }

    /// Decodes one escape sequence (the backslash is already consumed) into
    /// `out`. `\u` escapes of surrogates are kept as single code units.
    fn scan_escape(&mut self, out: &mut Vec<u16>, in_template: bool) -> Result<(), &'static str> {
        let Some((_, escaped)) = self.advance() else {
            return Err("unterminated escape sequence");
        };
        match escaped {
            'n' => out.push(0x0A),
            'r' => out.push(0x0D),
            't' => out.push(0x09),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'v' => out.push(0x0B),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push(0),
            '0'..='7' if !in_template => {
                let mut value = escaped.to_digit(8).unwrap_or(0);
                let max_digits = if escaped <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            self.advance();
                        }
                        None => break,
                    }
                }
                out.push(value as u16);
            }
            '8' | '9' if !in_template => push_char(out, escaped),
            '0'..='9' => return Err("octal escape sequences are not allowed in templates"),
            'x' => {
                let value = self.scan_hex_digits(2).ok_or("invalid hexadecimal escape")?;
                out.push(value as u16);
            }
            'u' => {
                let code_point = self.scan_unicode_escape()?;
                match u16::try_from(code_point) {
                    Ok(unit) => out.push(unit),
                    Err(_) => push_char(out, char::from_u32(code_point).ok_or("invalid unicode escape")?),
                }
            }
            // Line continuation
            '\r' => {
                self.eat('\n');
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => push_char(out, other),
        }
        Ok(())
    }

    /// Scans the body of `\u` (after the `u`): `XXXX` or `{X...}`.
    fn scan_unicode_escape(&mut self) -> Result<u32, &'static str> {
        if self.eat('{') {
            let mut value: u32 = 0;
            let mut digits = 0;
            while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
                self.advance();
                value = value.saturating_mul(16).saturating_add(digit);
                digits += 1;
            }
            if digits == 0 || !self.eat('}') || value > 0x10FFFF {
                return Err("invalid unicode escape");
            }
            Ok(value)
        } else {
            self.scan_hex_digits(4).ok_or("invalid unicode escape")
        }
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut value = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            value = value * 16 + digit;
        }
        Some(value)
    }

    fn scan_template(&mut self) -> TokenKind {
        let mut parts = TemplateParts::default();
        let mut value = Vec::new();

        loop {
            match self.advance() {
                None => return TokenKind::Invalid("unterminated template literal"),
                Some((_, '`')) => break,
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    parts.quasis.push(JsString::from(std::mem::take(&mut value)));
                    match self.scan_substitution() {
                        Ok(span) => parts.substitutions.push(span),
                        Err(reason) => return TokenKind::Invalid(reason),
                    }
                }
                Some((_, '\\')) => {
                    if let Err(reason) = self.scan_escape(&mut value, true) {
                        return TokenKind::Invalid(reason);
                    }
                }
                // CRLF is normalised to LF in template values
                Some((_, '\r')) => {
                    self.eat('\n');
                    value.push(0x0A);
                }
                Some((_, ch)) => push_char(&mut value, ch),
            }
        }

        parts.quasis.push(JsString::from(value));
        TokenKind::Template(parts)
    }

    /// Consumes tokens up to the `}` closing a `${`, returning the span of
    /// the substitution expression text.
    fn scan_substitution(&mut self) -> Result<Span, &'static str> {
        let start = self.current_pos;
        let mut depth = 0usize;
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Eof => return Err("unterminated template literal"),
                TokenKind::Invalid(reason) => return Err(reason),
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace if depth == 0 => {
                    return Ok(self.span(start, token.span.start - self.base));
                }
                TokenKind::RightBrace => depth -= 1,
                _ => {}
            }
        }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);

        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.scan_radix_number(16),
                Some('o' | 'O') => return self.scan_radix_number(8),
                Some('b' | 'B') => return self.scan_radix_number(2),
                Some('0'..='9') => return self.scan_legacy_octal(),
                _ => {}
            }
        }

        if first != '.' {
            self.scan_digits(&mut value);
            if self.peek() == Some('.') {
                value.push('.');
                self.advance();
                self.scan_digits(&mut value);
            }
        } else {
            self.scan_digits(&mut value);
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            value.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                value.push(sign);
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return TokenKind::Invalid("missing exponent digits");
            }
            self.scan_digits(&mut value);
        }

        if let Some(reason) = self.reject_number_suffix() {
            return TokenKind::Invalid(reason);
        }

        match value.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Invalid("invalid numeric literal"),
        }
    }

    fn scan_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '_' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_radix_number(&mut self, radix: u32) -> TokenKind {
        self.advance(); // consume the radix letter
        let mut value = 0f64;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if let Some(digit) = ch.to_digit(radix) {
                value = value * radix as f64 + digit as f64;
                digits += 1;
                self.advance();
            } else if ch == '_' && digits > 0 {
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return TokenKind::Invalid("missing digits after radix prefix");
        }
        if let Some(reason) = self.reject_number_suffix() {
            return TokenKind::Invalid(reason);
        }
        TokenKind::Number(value)
    }

    /// `017` is octal, `019` is decimal.
    fn scan_legacy_octal(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
            text.push(ch);
            self.advance();
        }
        if let Some(reason) = self.reject_number_suffix() {
            return TokenKind::Invalid(reason);
        }
        if text.chars().all(|c| c < '8') {
            let value = text
                .chars()
                .filter_map(|c| c.to_digit(8))
                .fold(0f64, |acc, d| acc * 8.0 + d as f64);
            TokenKind::Number(value)
        } else {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Number(n),
                Err(_) => TokenKind::Invalid("invalid numeric literal"),
            }
        }
    }

    fn reject_number_suffix(&mut self) -> Option<&'static str> {
        match self.peek() {
            Some('n') => {
                self.advance();
                Some("BigInt literals are not supported")
            }
            Some(ch) if is_id_start(ch) || ch.is_ascii_digit() => {
                Some("identifier starts immediately after numeric literal")
            }
            _ => None,
        }
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        keyword(&name).unwrap_or(TokenKind::Identifier(name))
    }

    /// Returns the source text the scanner was created over.
    pub fn source(&self) -> &'a str {
        self.source
    }
}

/// Appends the UTF-16 encoding of `ch`.
fn push_char(out: &mut Vec<u16>, ch: char) {
    let mut buffer = [0; 2];
    out.extend_from_slice(ch.encode_utf16(&mut buffer));
}

fn keyword(name: &str) -> Option<TokenKind> {
    let kind = match name {
        "await" => TokenKind::Await,
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "debugger" => TokenKind::Debugger,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "export" => TokenKind::Export,
        "extends" => TokenKind::Extends,
        "false" => TokenKind::False,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "let" => TokenKind::Let,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "return" => TokenKind::Return,
        "super" => TokenKind::Super,
        "switch" => TokenKind::Switch,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
        "with" => TokenKind::With,
        "yield" => TokenKind::Yield,
        _ => return None,
    };
    Some(kind)
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\u{000B}' | '\u{000C}' | ' ' | '\u{00A0}' | '\u{FEFF}'
    ) || (ch > '\u{7F}' && ch.is_whitespace() && !is_line_terminator(ch))
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|token| token.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut scanner = Scanner::new("{ } ( )");
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::Eof));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.25 .5 1e3 0xff 0b1010 0o17 017 019 1_000"),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.25),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(255.0),
                TokenKind::Number(10.0),
                TokenKind::Number(15.0),
                TokenKind::Number(15.0),
                TokenKind::Number(19.0),
                TokenKind::Number(1000.0),
            ]
        );
    }

    #[test]
    fn test_bigint_is_rejected() {
        assert!(matches!(
            Scanner::new("10n").next_token().kind,
            TokenKind::Invalid(reason) if reason.contains("BigInt")
        ));
        assert!(matches!(Scanner::new("3in").next_token().kind, TokenKind::Invalid(_)));
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#""hello" 'world' "a\nb" "\x41B\u{43}" "😀" "\uD800""#),
            vec![
                TokenKind::String("hello".into()),
                TokenKind::String("world".into()),
                TokenKind::String("a\nb".into()),
                TokenKind::String("ABC".into()),
                TokenKind::String("\u{1F600}".into()),
                TokenKind::String(JsString::from_code_units(&[0xD800])),
            ]
        );
    }

    #[test]
    fn test_surrogate_escapes_are_kept_as_code_units() {
        assert_eq!(
            kinds(r#""\uD83D\uDE00" "\uDE00\uD83D" `\u{D800}`"#),
            vec![
                TokenKind::String("\u{1F600}".into()),
                TokenKind::String(JsString::from_code_units(&[0xDE00, 0xD83D])),
                TokenKind::Template(TemplateParts {
                    quasis: vec![JsString::from_code_units(&[0xD800])],
                    substitutions: Vec::new(),
                }),
            ]
        );
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(kinds("'a\\\nb'"), vec![TokenKind::String("ab".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(
            Scanner::new("'abc").next_token().kind,
            TokenKind::Invalid(_)
        ));
    }

    #[test]
    fn test_template_with_substitutions() {
        let source = "`a${x + {}.y}b${`n${1}`}c`";
        let mut scanner = Scanner::new(source);
        let TokenKind::Template(parts) = scanner.next_token().kind else {
            panic!("expected template");
        };
        assert_eq!(parts.quasis, vec!["a", "b", "c"]);
        assert_eq!(parts.substitutions.len(), 2);
        let first = parts.substitutions[0];
        assert_eq!(&source[first.start..first.end], "x + {}.y");
        let second = parts.substitutions[1];
        assert_eq!(&source[second.start..second.end], "`n${1}`");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("function const let var yield"),
            vec![
                TokenKind::Function,
                TokenKind::Const,
                TokenKind::Let,
                TokenKind::Var,
                TokenKind::Yield,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("foo _bar $baz café"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("_bar".into()),
                TokenKind::Identifier("$baz".into()),
                TokenKind::Identifier("café".into()),
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut scanner = Scanner::new("1 /* c */ 2 /* multi\nline */ 3 // tail\n4");
        let one = scanner.next_token();
        let two = scanner.next_token();
        let three = scanner.next_token();
        let four = scanner.next_token();
        assert_eq!(one.kind, TokenKind::Number(1.0));
        assert!(!two.newline_before);
        assert!(three.newline_before);
        assert!(four.newline_before);
        assert_eq!(four.kind, TokenKind::Number(4.0));
    }

    #[test]
    fn test_division_is_never_a_regex() {
        assert_eq!(
            kinds("6 / 2 /= x"),
            vec![
                TokenKind::Number(6.0),
                TokenKind::Slash,
                TokenKind::Number(2.0),
                TokenKind::SlashEqual,
                TokenKind::Identifier("x".into()),
            ]
        );
    }

    #[test]
    fn test_optional_chain_vs_conditional() {
        assert_eq!(
            kinds("a?.b c?.5:1"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::QuestionDot,
                TokenKind::Identifier("b".into()),
                TokenKind::Identifier("c".into()),
                TokenKind::Question,
                TokenKind::Number(0.5),
                TokenKind::Colon,
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_range_scanner_keeps_absolute_spans() {
        let source = "xx foo";
        let mut scanner = Scanner::with_range(source, Span::new(3, 6));
        let token = scanner.next_token();
        assert_eq!(token.kind, TokenKind::Identifier("foo".into()));
        assert_eq!(token.span, Span::new(3, 6));
    }
}

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// Comment first, then a quoted string, then a bare word. Anything the
// alternation cannot start a match on (a lone unterminated quote) is skipped.
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"#[^\n]*|"[^"]*"|[^\s"#]+"##).expect("token regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// `#` through end of line, newline excluded
    Comment,
    /// `"..."`, quotes included
    Quoted,
    Word,
}

/// A lexical unit together with the 1-based line and column of its first character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}

/// Split directive text into tokens.
///
/// `;` separates directives on a single line and is treated exactly like
/// whitespace. Quoted strings have no escape mechanism, so a quoted value can
/// never contain `"`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let normalized = source.replace(';', " ");

    let mut tokens = Vec::new();
    let mut line = 1;
    let mut line_start = 0;
    let mut scanned = 0;

    for m in TOKEN_REGEX.find_iter(&normalized) {
        for (idx, ch) in normalized[scanned..m.start()].char_indices() {
            if ch == '\n' {
                line += 1;
                line_start = scanned + idx + 1;
            }
        }
        scanned = m.start();

        let text = m.as_str();
        let kind = if text.starts_with('#') {
            TokenKind::Comment
        } else if text.starts_with('"') {
            TokenKind::Quoted
        } else {
            TokenKind::Word
        };

        tokens.push(Token {
            kind,
            text: text.to_string(),
            line,
            column: normalized[line_start..m.start()].chars().count() + 1,
        });
    }

    tokens
}

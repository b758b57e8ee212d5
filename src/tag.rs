//! Token kind and token type produced by the scanner.
//!
//! # Discriminant Layout
//!
//! Variants are organized into semantic ranges with gaps for future expansion:
//!
//! | Range   | Category    |
//! |---------|-------------|
//! | 16      | Trivia      |
//! | 32-35   | Literals    |
//! | 64-71   | Punctuation |
//! | 96-100  | Brackets    |
//! | 240     | Errors      |
//! | 255     | Control     |

/// Token kind produced by the scanner.
///
/// The set is deliberately coarse: operators are not split by lexeme (`+`,
/// `-`, `*`, ... are all [`TokenKind::Op`]) because disambiguating them is a
/// parser concern, not a scanning one.
///
/// # Stability
///
/// `#[non_exhaustive]` — new variants may be added without breaking
/// downstream code. Match arms should include a wildcard (`_`).
///
/// # Representation
///
/// `#[repr(u8)]` keeps each variant to a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum TokenKind {
    // === Trivia (16) ===
    /// `//` line comment or `/* */` block comment.
    Comment = 16,

    // === Literals (32-35) ===
    /// Maximal run of digits, `.`, and alphanumerics starting with a digit.
    Number = 32,
    /// Single-, double-, or backtick-quoted string content (including
    /// template-literal segments).
    String = 33,
    /// Regular-expression literal body plus trailing flag characters.
    Regexp = 34,
    /// Identifier-shaped run; semantic classification is left to the caller.
    Lit = 35,

    // === Punctuation (64-71) ===
    /// `;`
    Semicolon = 64,
    /// `:`
    Colon = 65,
    /// `,`
    Comma = 66,
    /// `.`
    Dot = 67,
    /// `...`
    Spread = 68,
    /// `?`
    Ternary = 69,
    /// Any run of operator characters (`= & | ^ ~ ! % * < > + -` and their
    /// compounds), excluding `=>` which is [`TokenKind::Arrow`].
    Op = 70,
    /// `=>`
    Arrow = 71,

    // === Brackets (96-100) ===
    /// `(`
    Paren = 96,
    /// `[`
    Array = 97,
    /// `{` opening an ordinary block or object literal.
    Brace = 98,
    /// `)`, `]`, or `}` closing any of the above.
    Close = 99,
    /// `${` opening a template substitution.
    TBrace = 100,

    // === Errors (240) ===
    /// No dispatch rule matched the byte at the cursor.
    Invalid = 240,

    // === Control (255) ===
    /// End of input (sentinel byte reached).
    Eof = 255,
}

impl TokenKind {
    /// Returns the fixed lexeme for this kind, if it always has the same text.
    ///
    /// Variable-text kinds (`Number`, `String`, `Regexp`, `Lit`, `Comment`,
    /// `Op`) return `None`.
    #[must_use]
    pub fn lexeme(self) -> Option<&'static str> {
        match self {
            Self::Semicolon => Some(";"),
            Self::Colon => Some(":"),
            Self::Comma => Some(","),
            Self::Dot => Some("."),
            Self::Spread => Some("..."),
            Self::Ternary => Some("?"),
            Self::Arrow => Some("=>"),
            Self::Paren => Some("("),
            Self::Array => Some("["),
            Self::Brace => Some("{"),
            Self::TBrace => Some("${"),
            _ => None,
        }
    }

    /// Returns a human-readable name for this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Number => "number literal",
            Self::String => "string",
            Self::Regexp => "regular expression",
            Self::Lit => "identifier-like literal",
            Self::Semicolon => "`;`",
            Self::Colon => "`:`",
            Self::Comma => "`,`",
            Self::Dot => "`.`",
            Self::Spread => "`...`",
            Self::Ternary => "`?`",
            Self::Op => "operator",
            Self::Arrow => "`=>`",
            Self::Paren => "`(`",
            Self::Array => "`[`",
            Self::Brace => "`{`",
            Self::Close => "closing bracket",
            Self::TBrace => "`${`",
            Self::Invalid => "invalid byte",
            Self::Eof => "end of file",
        }
    }

    /// Returns `true` if this kind is trivia (comments).
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Comment)
    }
}

/// Token produced by the scanner.
///
/// Carries an offset and length into the source buffer rather than an owned
/// byte slice; tokens are valid only for the buffer's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Byte offset of the token's first byte in the source buffer.
    pub offset: u32,
    /// Length of the token in bytes.
    pub len: u32,
    /// Source line (1-based) of the token's first byte.
    pub line: u32,
    /// `true` only on [`TokenKind::Lit`] tokens immediately followed (across
    /// whitespace and comments) by a `:` — a hint for downstream label
    /// classification.
    pub lit_next_colon: bool,
}

/// Size assertions: `TokenKind` is 1 byte, `Token` fits in 16 bytes.
const _: () = assert!(std::mem::size_of::<TokenKind>() == 1);
const _: () = assert!(std::mem::size_of::<Token>() == 16);

#[cfg(test)]
mod tests {
    use super::*;

    // === TokenKind discriminants ===

    #[test]
    fn repr_u8_semantic_ranges() {
        assert_eq!(TokenKind::Comment as u8, 16);

        assert_eq!(TokenKind::Number as u8, 32);
        assert_eq!(TokenKind::String as u8, 33);
        assert_eq!(TokenKind::Regexp as u8, 34);
        assert_eq!(TokenKind::Lit as u8, 35);

        assert_eq!(TokenKind::Semicolon as u8, 64);
        assert_eq!(TokenKind::Colon as u8, 65);
        assert_eq!(TokenKind::Comma as u8, 66);
        assert_eq!(TokenKind::Dot as u8, 67);
        assert_eq!(TokenKind::Spread as u8, 68);
        assert_eq!(TokenKind::Ternary as u8, 69);
        assert_eq!(TokenKind::Op as u8, 70);
        assert_eq!(TokenKind::Arrow as u8, 71);

        assert_eq!(TokenKind::Paren as u8, 96);
        assert_eq!(TokenKind::Array as u8, 97);
        assert_eq!(TokenKind::Brace as u8, 98);
        assert_eq!(TokenKind::Close as u8, 99);
        assert_eq!(TokenKind::TBrace as u8, 100);

        assert_eq!(TokenKind::Invalid as u8, 240);
        assert_eq!(TokenKind::Eof as u8, 255);
    }

    #[test]
    fn kind_is_one_byte() {
        assert_eq!(std::mem::size_of::<TokenKind>(), 1);
    }

    // === Lexeme ===

    #[test]
    fn fixed_lexeme_punctuation() {
        assert_eq!(TokenKind::Semicolon.lexeme(), Some(";"));
        assert_eq!(TokenKind::Colon.lexeme(), Some(":"));
        assert_eq!(TokenKind::Comma.lexeme(), Some(","));
        assert_eq!(TokenKind::Dot.lexeme(), Some("."));
        assert_eq!(TokenKind::Spread.lexeme(), Some("..."));
        assert_eq!(TokenKind::Ternary.lexeme(), Some("?"));
        assert_eq!(TokenKind::Arrow.lexeme(), Some("=>"));
    }

    #[test]
    fn fixed_lexeme_brackets() {
        assert_eq!(TokenKind::Paren.lexeme(), Some("("));
        assert_eq!(TokenKind::Array.lexeme(), Some("["));
        assert_eq!(TokenKind::Brace.lexeme(), Some("{"));
        assert_eq!(TokenKind::TBrace.lexeme(), Some("${"));
    }

    #[test]
    fn variable_lexeme_returns_none() {
        assert_eq!(TokenKind::Number.lexeme(), None);
        assert_eq!(TokenKind::String.lexeme(), None);
        assert_eq!(TokenKind::Regexp.lexeme(), None);
        assert_eq!(TokenKind::Lit.lexeme(), None);
        assert_eq!(TokenKind::Comment.lexeme(), None);
        assert_eq!(TokenKind::Op.lexeme(), None);
        assert_eq!(TokenKind::Close.lexeme(), None);
        assert_eq!(TokenKind::Invalid.lexeme(), None);
        assert_eq!(TokenKind::Eof.lexeme(), None);
    }

    // === Name ===

    #[test]
    fn name_returns_readable_description() {
        assert_eq!(TokenKind::Lit.name(), "identifier-like literal");
        assert_eq!(TokenKind::Number.name(), "number literal");
        assert_eq!(TokenKind::Regexp.name(), "regular expression");
        assert_eq!(TokenKind::Arrow.name(), "`=>`");
        assert_eq!(TokenKind::Eof.name(), "end of file");
        assert_eq!(TokenKind::Invalid.name(), "invalid byte");
    }

    // === Trivia ===

    #[test]
    fn trivia_classification() {
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Lit.is_trivia());
        assert!(!TokenKind::Eof.is_trivia());
    }

    // === Token ===

    #[test]
    fn token_construction() {
        let tok = Token {
            kind: TokenKind::Lit,
            offset: 3,
            len: 5,
            line: 1,
            lit_next_colon: false,
        };
        assert_eq!(tok.kind, TokenKind::Lit);
        assert_eq!(tok.offset, 3);
        assert_eq!(tok.len, 5);
        assert_eq!(tok.line, 1);
        assert!(!tok.lit_next_colon);
    }

    #[test]
    fn token_is_copy() {
        let tok = Token {
            kind: TokenKind::Op,
            offset: 0,
            len: 1,
            line: 1,
            lit_next_colon: false,
        };
        let tok2 = tok;
        assert_eq!(tok, tok2);
    }
}

//! Tokenizer for the scene description language.
//!
//! `InputStream` wraps the source text and hands out one `Token` at a
//! time, tracking the source location of everything it reads. One
//! character and one token of look-ahead can be pushed back, which is
//! all the grammar needs.

use std::fmt;
use std::str::Chars;

use crate::error::SceneError;

/// Characters that are tokens on their own.
const SYMBOLS: &str = "()<>[],*";

/// How many columns a tab character advances.
const TABULATIONS: u32 = 8;

/// A position in a source file, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file_name: String,
    pub line_num: u32,
    pub col_num: u32,
}

impl SourceLocation {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            line_num: 1,
            col_num: 1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_name.is_empty() {
            write!(f, "line {}:{}", self.line_num, self.col_num)
        } else {
            write!(f, "{}:{}:{}", self.file_name, self.line_num, self.col_num)
        }
    }
}

/// Reserved words of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Float,
    Material,
    Sphere,
    Plane,
    PointLight,
    Camera,
    Diffuse,
    Specular,
    Uniform,
    Checkered,
    Image,
    Identity,
    Translation,
    RotationX,
    RotationY,
    RotationZ,
    Scaling,
    Orthogonal,
    Perspective,
}

impl Keyword {
    /// The keyword spelled the way it appears in scene files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Material => "material",
            Self::Sphere => "sphere",
            Self::Plane => "plane",
            Self::PointLight => "pointlight",
            Self::Camera => "camera",
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Uniform => "uniform",
            Self::Checkered => "checkered",
            Self::Image => "image",
            Self::Identity => "identity",
            Self::Translation => "translation",
            Self::RotationX => "rotation_x",
            Self::RotationY => "rotation_y",
            Self::RotationZ => "rotation_z",
            Self::Scaling => "scaling",
            Self::Orthogonal => "orthogonal",
            Self::Perspective => "perspective",
        }
    }

    fn from_str(word: &str) -> Option<Self> {
        Some(match word {
            "float" => Self::Float,
            "material" => Self::Material,
            "sphere" => Self::Sphere,
            "plane" => Self::Plane,
            "pointlight" => Self::PointLight,
            "camera" => Self::Camera,
            "diffuse" => Self::Diffuse,
            "specular" => Self::Specular,
            "uniform" => Self::Uniform,
            "checkered" => Self::Checkered,
            "image" => Self::Image,
            "identity" => Self::Identity,
            "translation" => Self::Translation,
            "rotation_x" => Self::RotationX,
            "rotation_y" => Self::RotationY,
            "rotation_z" => Self::RotationZ,
            "scaling" => Self::Scaling,
            "orthogonal" => Self::Orthogonal,
            "perspective" => Self::Perspective,
            _ => return None,
        })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of token was read.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    LiteralString(String),
    LiteralNumber(f32),
    Symbol(char),
    /// End of input.
    Stop,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "keyword '{keyword}'"),
            Self::Identifier(name) => write!(f, "identifier '{name}'"),
            Self::LiteralString(s) => write!(f, "string \"{s}\""),
            Self::LiteralNumber(value) => write!(f, "number '{value}'"),
            Self::Symbol(symbol) => write!(f, "symbol '{symbol}'"),
            Self::Stop => write!(f, "end of file"),
        }
    }
}

/// A lexical token with the location it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub location: SourceLocation,
    pub kind: TokenKind,
}

/// A stream of characters with token-level look-ahead.
pub struct InputStream<'a> {
    chars: Chars<'a>,
    pub location: SourceLocation,
    saved_char: Option<char>,
    saved_location: SourceLocation,
    saved_token: Option<Token>,
}

impl<'a> InputStream<'a> {
    pub fn new(source: &'a str, file_name: &str) -> Self {
        let location = SourceLocation::new(file_name);
        Self {
            chars: source.chars(),
            saved_location: location.clone(),
            location,
            saved_char: None,
            saved_token: None,
        }
    }

    fn update_pos(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.location.line_num += 1;
                self.location.col_num = 1;
            }
            '\t' => self.location.col_num += TABULATIONS,
            _ => self.location.col_num += 1,
        }
    }

    /// Read the next character, honoring any pushed-back one.
    pub fn read_char(&mut self) -> Option<char> {
        let ch = match self.saved_char.take() {
            Some(saved) => Some(saved),
            None => self.chars.next(),
        };
        if let Some(ch) = ch {
            self.saved_location = self.location.clone();
            self.update_pos(ch);
        }
        ch
    }

    /// Push back the last character read. Only one character of
    /// look-ahead is kept.
    pub fn unread_char(&mut self, ch: char) {
        debug_assert!(self.saved_char.is_none());
        self.saved_char = Some(ch);
        self.location = self.saved_location.clone();
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.read_char() {
            if ch == '#' {
                // Comments run to the end of the line.
                while let Some(c) = self.read_char() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                }
            } else if !ch.is_whitespace() {
                self.unread_char(ch);
                return;
            }
        }
    }

    /// Read the next token, honoring any pushed-back one.
    pub fn read_token(&mut self) -> Result<Token, SceneError> {
        if let Some(token) = self.saved_token.take() {
            return Ok(token);
        }

        self.skip_whitespace_and_comments();
        let location = self.location.clone();

        let Some(ch) = self.read_char() else {
            return Ok(Token {
                location,
                kind: TokenKind::Stop,
            });
        };

        match ch {
            c if SYMBOLS.contains(c) => Ok(Token {
                location,
                kind: TokenKind::Symbol(c),
            }),
            '"' => self.read_string_token(location),
            c if c.is_ascii_digit() || c == '+' || c == '-' || c == '.' => {
                self.read_number_token(c, location)
            }
            c if c.is_alphabetic() || c == '_' => Ok(self.read_word_token(c, location)),
            c => Err(SceneError::Lex {
                location,
                message: format!("invalid character '{c}'"),
            }),
        }
    }

    /// Push back the last token read. Only one token of look-ahead is
    /// kept.
    pub fn unread_token(&mut self, token: Token) {
        debug_assert!(self.saved_token.is_none());
        self.saved_token = Some(token);
    }

    fn read_string_token(&mut self, location: SourceLocation) -> Result<Token, SceneError> {
        let mut value = String::new();
        loop {
            match self.read_char() {
                Some('"') => {
                    return Ok(Token {
                        location,
                        kind: TokenKind::LiteralString(value),
                    })
                }
                Some(ch) => value.push(ch),
                None => {
                    return Err(SceneError::Lex {
                        location,
                        message: "unterminated string".to_string(),
                    })
                }
            }
        }
    }

    fn read_number_token(
        &mut self,
        first: char,
        location: SourceLocation,
    ) -> Result<Token, SceneError> {
        let mut token = String::from(first);
        while let Some(ch) = self.read_char() {
            let after_exponent = matches!(token.chars().last(), Some('e' | 'E'));
            if ch.is_ascii_digit()
                || ch == '.'
                || ch == 'e'
                || ch == 'E'
                || (after_exponent && (ch == '+' || ch == '-'))
            {
                token.push(ch);
            } else {
                self.unread_char(ch);
                break;
            }
        }

        let value: f32 = token.parse().map_err(|_| SceneError::Lex {
            location: location.clone(),
            message: format!("'{token}' is an invalid floating-point number"),
        })?;
        Ok(Token {
            location,
            kind: TokenKind::LiteralNumber(value),
        })
    }

    fn read_word_token(&mut self, first: char, location: SourceLocation) -> Token {
        let mut word = String::from(first);
        while let Some(ch) = self.read_char() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                self.unread_char(ch);
                break;
            }
        }

        let kind = match Keyword::from_str(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(word),
        };
        Token { location, kind }
    }
}

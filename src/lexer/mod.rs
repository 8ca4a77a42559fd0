use logos::Logos;

/// Raw lexemes as seen by the scanner.
///
/// Markers only win over `Word` when they make up a whole whitespace-delimited
/// word: `cmd>file` is the single word `cmd>file` because the longest match wins.
/// On equal-length matches the lower `Word` priority lets the marker win.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum Lexeme {
    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("|")]
    Pipe,

    #[token("&")]
    Ampersand,

    #[regex(r"[^ \t\r\n]+", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    RedirectIn,
    RedirectOut,
    PipeSeparator,
    /// Only ever produced as the final token of a line.
    Background,
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Lexeme>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: Lexeme::lexer(input),
        }
    }

    /// Split one input line into tokens.
    ///
    /// A trailing `&` becomes [`Token::Background`]; an `&` anywhere else is
    /// an ordinary word. Blank lines produce an empty vector.
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Lexer::new(input).collect();

        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.iter_mut().enumerate() {
            if *token == Token::Background && i != last {
                *token = Token::Word("&".to_string());
            }
        }

        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Every non-whitespace run is some lexeme, so the scanner cannot fail;
    /// an `Err` from logos is still folded into a plain word.
    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        Some(match result {
            Ok(Lexeme::Less) => Token::RedirectIn,
            Ok(Lexeme::Greater) => Token::RedirectOut,
            Ok(Lexeme::Pipe) => Token::PipeSeparator,
            Ok(Lexeme::Ampersand) => Token::Background,
            Ok(Lexeme::Word(word)) => Token::Word(word),
            Err(()) => Token::Word(self.inner.slice().to_string()),
        })
    }
}

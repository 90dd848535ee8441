//! Very small hand-written lexer for the section/key text format.
//!
//! The lexer works line by line and only classifies lines; it knows
//! nothing about which sections or keys are meaningful.
//
//  Grammar excerpts (informal):
//
//      document ::= line*
//      line     ::= blank | comment | header | entry
//      comment  ::= (';' | '#') .*
//      header   ::= '[' name ']'      (name runs up to the LAST ']')
//      entry    ::= key '=' value
//      value    ::= '"' ( '\"' | '\\' | [^"] )* '"' | .*
//
//  Whitespace around keys and values is discarded.

use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Section(String),
    Entry { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            lines: src.lines().enumerate(),
        }
    }

    fn lex_line(line: &str) -> Result<Option<Token>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            return Ok(None);
        }

        if let Some(rest) = line.strip_prefix('[') {
            let end = rest.rfind(']').ok_or("section header has no closing ]")?;
            let name = rest[..end].trim();
            if name.is_empty() {
                return Err("empty section name".into());
            }
            return Ok(Some(Token::Section(name.to_string())));
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("expected `key = value`, found `{line}`"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err("entry has an empty key".into());
        }

        let value = value.trim();
        let value = match value.strip_prefix('"') {
            Some(quoted) => read_quoted(&mut quoted.chars())?,
            None => value.to_string(),
        };

        Ok(Some(Token::Entry {
            key: key.to_string(),
            value,
        }))
    }
}

fn read_quoted(chars: &mut Chars) -> Result<String, String> {
    let mut txt = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let trailing: String = chars.collect();
                let trailing = trailing.trim();
                if !trailing.is_empty() && !trailing.starts_with(';') && !trailing.starts_with('#')
                {
                    return Err(format!("unexpected text after closing quote: `{trailing}`"));
                }
                return Ok(txt);
            }
            '\\' => match chars.next() {
                Some('"') => txt.push('"'),
                Some('\\') => txt.push('\\'),
                Some(other) => return Err(format!("unknown escape \\{other}")),
                None => break,
            },
            c => txt.push(c),
        }
    }
    Err("no closing \" found".into())
}

impl<'a> Iterator for Lexer<'a> {
    /// Tokens are paired with their 1-based line number.
    type Item = Result<(usize, Token), LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            match Self::lex_line(line) {
                Ok(Some(tok)) => return Some(Ok((idx + 1, tok))),
                Ok(None) => continue,
                Err(message) => {
                    return Some(Err(LexError {
                        line: idx + 1,
                        message,
                    }));
                }
            }
        }
        None
    }
}

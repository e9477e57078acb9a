//! Tokenizer for command lines.
//!
//! Splits a typed line into tokens on whitespace, with support for:
//! - Double-quoted runs: `"John Doe"` stays one token
//! - Single-quoted runs: `'John Doe'` stays one token
//! - Text touching a quoted run: `name="John Doe"` is a single token
//!
//! Quotes are kept by default so that rejoining the tokens with single spaces
//! reproduces the line; callers ask for quote stripping when building handler
//! arguments.

use std::iter::Peekable;
use std::str::Chars;

/// Tokenizes a command line.
///
/// An opening quote only starts a quoted run if a matching closing quote
/// follows; an unmatched quote is an ordinary character.
pub fn tokenize(input: &str, strip_quotes: bool) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        // Skip whitespace
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = collect_token(&mut chars, strip_quotes);
        if !token.is_empty() {
            tokens.push(token);
        }
    }

    tokens
}

/// Collects one token, gluing quoted runs to any adjacent non-space text.
fn collect_token(chars: &mut Peekable<Chars<'_>>, strip_quotes: bool) -> String {
    let mut token = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();

        if (c == '"' || c == '\'') && has_closing_quote(chars, c) {
            let quoted = collect_quoted(chars, c);
            if strip_quotes {
                token.push_str(&quoted);
            } else {
                token.push(c);
                token.push_str(&quoted);
                token.push(c);
            }
            continue;
        }

        token.push(c);
    }

    token
}

/// Returns true if `quote` occurs again in the remaining input.
fn has_closing_quote(chars: &Peekable<Chars<'_>>, quote: char) -> bool {
    chars.clone().any(|c| c == quote)
}

/// Collects characters up to (and consuming) the closing quote.
fn collect_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> String {
    let mut result = String::new();
    for c in chars.by_ref() {
        if c == quote {
            break;
        }
        result.push(c);
    }
    result
}

/// Removes surrounding quotes from a single token, if both ends carry the same quote.
pub fn strip_quotes(token: &str) -> &str {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return &token[1..token.len() - 1];
        }
    }
    token
}

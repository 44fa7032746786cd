//! Quote-aware splitting of write literals.

use crate::{Error, Result};

/// Split `input` on whitespace, keeping quoted runs together.
///
/// `-string "Disable All" -bool true` becomes
/// `["-string", "Disable All", "-bool", "true"]`. Single and double quotes
/// both group; the quote characters themselves are dropped, since the result
/// goes straight into an argument vector. A quote of the other kind inside a
/// quoted run is literal.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(Error::Tokenize {
            input: input.to_string(),
            reason: format!("unterminated {q} quote"),
        });
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

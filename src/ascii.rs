//! Tokenizer for the `ascii_dump`/`ascii_load` text format.
//!
//! Dumps are whitespace-separated tokens. Loading is strict: an unexpected
//! keyword, an unparsable number, or a premature end of input is reported as
//! [`Error::MalformedInput`], never as a panic.

use std::fmt::Display;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{Error, Result};

pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    /// Next token, or an error at end of input.
    pub fn next_token(&mut self) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| Error::malformed("unexpected end of input"))
    }

    /// Consumes `keyword`, failing on anything else.
    pub fn expect(&mut self, keyword: &str) -> Result<()> {
        let token = self.next_token()?;
        if token != keyword {
            return Err(Error::malformed(format!("expected `{}`, found `{}`", keyword, token)));
        }
        Ok(())
    }

    /// Parses the next token as a `T`.
    pub fn parse<T>(&mut self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|e| Error::malformed(format!("invalid token `{}`: {}", token, e)))
    }

    /// Parses a `0`/`1` flag.
    pub fn parse_flag(&mut self) -> Result<bool> {
        match self.next_token()? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(Error::malformed(format!("expected flag `0` or `1`, found `{}`", other))),
        }
    }

    /// Fails unless the input is exhausted.
    pub fn finish(mut self) -> Result<()> {
        match self.inner.next() {
            None => Ok(()),
            Some(token) => Err(Error::malformed(format!("trailing token `{}`", token))),
        }
    }
}

pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use test_log::test;

    use super::*;

    #[test]
    fn test_tokens() {
        let mut tokens = Tokens::new("size 3\n -4 0 12 L");
        tokens.expect("size").unwrap();
        assert_eq!(tokens.parse::<usize>().unwrap(), 3);
        assert_eq!(tokens.parse::<BigInt>().unwrap(), BigInt::from(-4));
        assert!(tokens.expect("1").is_err());
        assert_eq!(tokens.next_token().unwrap(), "12");
        assert_eq!(tokens.next_token().unwrap(), "L");
        assert!(tokens.next_token().is_err());
    }

    #[test]
    fn test_bad_number() {
        let mut tokens = Tokens::new("x");
        assert!(matches!(tokens.parse::<BigInt>(), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_finish() {
        let tokens = Tokens::new("  \n");
        assert!(tokens.finish().is_ok());
        let tokens = Tokens::new("junk");
        assert!(tokens.finish().is_err());
    }
}

//! List literal encoding
//!
//! Serializes a list of strings the way Python's `repr` prints a `list[str]`
//! and parses it back with an explicit grammar:
//!
//! ```text
//! list   := '[' ws ( item ws ( ',' ws item ws )* ( ',' ws )? )? ']'
//! item   := '\'' char* '\'' | '"' char* '"'
//! escape := '\\' ( '\\' | '\'' | '"' | 'n' | 'r' | 't'
//!                | 'x' hex{2} | 'u' hex{4} | 'U' hex{8} )
//! ```
//!
//! Output is always canonical (`', '` separators, no trailing comma); the
//! parser also accepts the looser spacing a hand-edited file may contain.

use std::iter::Peekable;
use std::str::CharIndices;

use super::FormatError;

/// Encode a list of strings as a single-line literal
pub fn encode_list(items: &[String]) -> String {
    let mut out = String::with_capacity(2 + items.iter().map(|s| s.len() + 4).sum::<usize>());
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_quoted(&mut out, item);
    }
    out.push(']');
    out
}

/// Decode a literal produced by [`encode_list`] (or by Python's `repr`)
pub fn decode_list(input: &str) -> Result<Vec<String>, FormatError> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
    };
    parser.list()
}

fn push_quoted(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_unprintable(c) => out.push_str(&hex_escape(c)),
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// `\xhh`, `\uhhhh` or `\Uhhhhhhhh`, whichever is shortest
fn hex_escape(c: char) -> String {
    match c as u32 {
        n @ 0..=0xff => format!("\\x{n:02x}"),
        n @ 0x100..=0xffff => format!("\\u{n:04x}"),
        n => format!("\\U{n:08x}"),
    }
}

/// Characters `repr` escapes: controls, separators other than the ASCII
/// space, format characters and private use code points
///
/// Unassigned code points are written as-is.
fn is_unprintable(c: char) -> bool {
    matches!(
        c,
        // Cc
        '\u{0}'..='\u{1f}'
            | '\u{7f}'..='\u{9f}'
            // Zs, Zl, Zp
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            // Cf
            | '\u{ad}'
            | '\u{600}'..='\u{605}'
            | '\u{61c}'
            | '\u{6dd}'
            | '\u{70f}'
            | '\u{890}'..='\u{891}'
            | '\u{8e2}'
            | '\u{180e}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206f}'
            | '\u{feff}'
            | '\u{fff9}'..='\u{fffb}'
            | '\u{110bd}'
            | '\u{110cd}'
            | '\u{13430}'..='\u{1343f}'
            | '\u{1bca0}'..='\u{1bca3}'
            | '\u{1d173}'..='\u{1d17a}'
            | '\u{e0001}'
            | '\u{e0020}'..='\u{e007f}'
            // Co
            | '\u{e000}'..='\u{f8ff}'
            | '\u{f0000}'..='\u{ffffd}'
            | '\u{100000}'..='\u{10fffd}'
    )
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn list(&mut self) -> Result<Vec<String>, FormatError> {
        self.expect('[')?;

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            items.push(self.string()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect(']')?;
            break;
        }

        self.skip_ws();
        if let Some(&(offset, c)) = self.chars.peek() {
            return Err(error(offset, format!("unexpected {c:?} after list")));
        }
        Ok(items)
    }

    fn string(&mut self) -> Result<String, FormatError> {
        let (start, quote) = match self.chars.next() {
            Some((offset, c @ ('\'' | '"'))) => (offset, c),
            Some((offset, c)) => return Err(error(offset, format!("expected quote, found {c:?}"))),
            None => return Err(self.eof("expected string")),
        };

        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((offset, '\\')) => out.push(self.escape(offset)?),
                Some((_, c)) => out.push(c),
                None => return Err(error(start, "unterminated string".to_string())),
            }
        }
    }

    fn escape(&mut self, offset: usize) -> Result<char, FormatError> {
        let c = match self.chars.next() {
            Some((_, c)) => c,
            None => return Err(self.eof("dangling escape")),
        };

        match c {
            '\\' | '\'' | '"' => Ok(c),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'x' => self.hex(offset, 2),
            'u' => self.hex(offset, 4),
            'U' => self.hex(offset, 8),
            other => Err(error(offset, format!("unknown escape \\{other}"))),
        }
    }

    fn hex(&mut self, offset: usize, digits: usize) -> Result<char, FormatError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| error(offset, format!("escape needs {digits} hex digits")))?;
            value = value * 16 + digit;
        }
        char::from_u32(value)
            .ok_or_else(|| error(offset, format!("escape {value:#x} is not a scalar value")))
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, ' ' | '\t'))) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((offset, c)) => Err(error(offset, format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.eof(&format!("expected {expected:?}"))),
        }
    }

    fn eof(&self, reason: &str) -> FormatError {
        error(self.input.len(), format!("{reason} at end of input"))
    }
}

fn error(offset: usize, reason: String) -> FormatError {
    FormatError::Literal { offset, reason }
}

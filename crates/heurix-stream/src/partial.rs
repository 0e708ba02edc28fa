//! Tolerant parser for truncated JSON.
//!
//! Parses the first JSON object found in the input and stops where the input
//! ends, marking every node that was cut off as incomplete. Anything that can
//! never become valid JSON is reported as [`Malformed`].

use serde_json::Value;

const MAX_DEPTH: usize = 64;

/// A JSON value that may still be growing.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialValue {
    /// A value is expected but none of it is decidable yet.
    Pending,
    Null,
    Bool(bool),
    /// A number literal. Complete once a following character terminates it.
    Number { raw: String, complete: bool },
    String { value: String, complete: bool },
    Array { items: Vec<PartialValue>, complete: bool },
    Object { entries: Vec<(String, PartialValue)>, complete: bool },
}

impl PartialValue {
    /// Whether this node (not necessarily its children) is finished.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Pending => false,
            Self::Null | Self::Bool(_) => true,
            Self::Number { complete, .. }
            | Self::String { complete, .. }
            | Self::Array { complete, .. }
            | Self::Object { complete, .. } => *complete,
        }
    }

    /// Convert a fully complete subtree into a JSON value.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Pending => None,
            Self::Null => Some(Value::Null),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Number { raw, complete } => {
                if !complete {
                    return None;
                }
                serde_json::from_str::<Value>(raw).ok().filter(Value::is_number)
            }
            Self::String { value, complete } => complete.then(|| Value::String(value.clone())),
            Self::Array { items, complete } => {
                if !complete {
                    return None;
                }
                items.iter().map(Self::to_json).collect::<Option<Vec<_>>>().map(Value::Array)
            }
            Self::Object { entries, complete } => {
                if !complete {
                    return None;
                }
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json()?);
                }
                Some(Value::Object(map))
            }
        }
    }

    /// First value stored under `key`, if this is an object.
    pub fn field(&self, key: &str) -> Option<&PartialValue> {
        match self {
            Self::Object { entries, .. } => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// String content, complete or not.
    pub fn as_str(&self) -> Option<(&str, bool)> {
        match self {
            Self::String { value, complete } => Some((value, *complete)),
            _ => None,
        }
    }
}

/// The input can never become valid JSON from this byte offset on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    pub offset: usize,
}

/// Parse the first object in `input`. Input without any `{` yields [`PartialValue::Pending`].
pub fn parse_partial(input: &str) -> Result<PartialValue, Malformed> {
    let Some(start) = input.find('{') else {
        return Ok(PartialValue::Pending);
    };
    let mut parser = Parser {
        bytes: input.as_bytes(),
        src: input,
        pos: start,
        depth: 0,
    };
    parser.parse_value()
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\n' | b'\r' | b'\t')) {
            self.pos += 1;
        }
    }

    fn malformed(&self) -> Malformed {
        Malformed { offset: self.pos }
    }

    fn parse_value(&mut self) -> Result<PartialValue, Malformed> {
        self.skip_ws();
        let Some(byte) = self.peek() else {
            return Ok(PartialValue::Pending);
        };
        match byte {
            b'{' => self.parse_object(),
            b'[' => self.parse_array(),
            b'"' => {
                let (value, complete) = self.parse_string()?;
                Ok(PartialValue::String { value, complete })
            }
            b'-' | b'0'..=b'9' => self.parse_number(),
            b't' => self.parse_literal("true", PartialValue::Bool(true)),
            b'f' => self.parse_literal("false", PartialValue::Bool(false)),
            b'n' => self.parse_literal("null", PartialValue::Null),
            _ => Err(self.malformed()),
        }
    }

    fn enter(&mut self) -> Result<(), Malformed> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.malformed());
        }
        self.pos += 1;
        Ok(())
    }

    fn parse_object(&mut self) -> Result<PartialValue, Malformed> {
        self.enter()?;
        let mut entries = Vec::new();
        let incomplete = |entries: Vec<(String, PartialValue)>| {
            Ok(PartialValue::Object { entries, complete: false })
        };

        loop {
            self.skip_ws();
            match self.peek() {
                None => return incomplete(entries),
                Some(b'}') => {
                    self.pos += 1;
                    self.depth -= 1;
                    return Ok(PartialValue::Object { entries, complete: true });
                }
                Some(b'"') => {}
                Some(_) => return Err(self.malformed()),
            }

            let (key, key_complete) = self.parse_string()?;
            if !key_complete {
                return incomplete(entries);
            }

            self.skip_ws();
            match self.peek() {
                None => return incomplete(entries),
                Some(b':') => self.pos += 1,
                Some(_) => return Err(self.malformed()),
            }

            let value = self.parse_value()?;
            let done = value.is_complete();
            entries.push((key, value));
            if !done {
                return incomplete(entries);
            }

            self.skip_ws();
            match self.peek() {
                None => return incomplete(entries),
                Some(b',') => self.pos += 1,
                Some(b'}') => continue,
                Some(_) => return Err(self.malformed()),
            }
        }
    }

    fn parse_array(&mut self) -> Result<PartialValue, Malformed> {
        self.enter()?;
        let mut items = Vec::new();
        let incomplete = |items: Vec<PartialValue>| Ok(PartialValue::Array { items, complete: false });

        loop {
            self.skip_ws();
            match self.peek() {
                None => return incomplete(items),
                Some(b']') => {
                    self.pos += 1;
                    self.depth -= 1;
                    return Ok(PartialValue::Array { items, complete: true });
                }
                Some(_) => {}
            }

            let value = self.parse_value()?;
            let done = value.is_complete();
            if !matches!(value, PartialValue::Pending) {
                items.push(value);
            }
            if !done {
                return incomplete(items);
            }

            self.skip_ws();
            match self.peek() {
                None => return incomplete(items),
                Some(b',') => self.pos += 1,
                Some(b']') => continue,
                Some(_) => return Err(self.malformed()),
            }
        }
    }

    fn parse_number(&mut self) -> Result<PartialValue, Malformed> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        let raw = &self.src[start..self.pos];
        let complete = self.pos < self.bytes.len();
        if complete && serde_json::from_str::<serde_json::Number>(raw).is_err() {
            return Err(Malformed { offset: start });
        }
        Ok(PartialValue::Number {
            raw: raw.to_string(),
            complete,
        })
    }

    fn parse_literal(&mut self, word: &str, value: PartialValue) -> Result<PartialValue, Malformed> {
        let rest = &self.bytes[self.pos..];
        let word = word.as_bytes();
        if rest.len() < word.len() {
            if word.starts_with(rest) {
                self.pos = self.bytes.len();
                return Ok(PartialValue::Pending);
            }
            return Err(self.malformed());
        }
        if &rest[..word.len()] != word {
            return Err(self.malformed());
        }
        self.pos += word.len();
        Ok(value)
    }

    /// Parse a string starting at its opening quote. Returns the decoded
    /// content so far and whether the closing quote was reached.
    fn parse_string(&mut self) -> Result<(String, bool), Malformed> {
        self.pos += 1;
        let mut out = String::new();

        loop {
            let run_start = self.pos;
            while !matches!(self.peek(), None | Some(b'"' | b'\\')) {
                self.pos += 1;
            }
            out.push_str(&self.src[run_start..self.pos]);

            match self.peek() {
                None => return Ok((out, false)),
                Some(b'"') => {
                    self.pos += 1;
                    return Ok((out, true));
                }
                _ => {}
            }

            // Backslash.
            let Some(&escape) = self.bytes.get(self.pos + 1) else {
                self.pos = self.bytes.len();
                return Ok((out, false));
            };
            let decoded = match escape {
                b'"' => '"',
                b'\\' => '\\',
                b'/' => '/',
                b'b' => '\u{8}',
                b'f' => '\u{c}',
                b'n' => '\n',
                b'r' => '\r',
                b't' => '\t',
                b'u' => match self.parse_unicode_escape()? {
                    Some(c) => {
                        out.push(c);
                        continue;
                    }
                    None => {
                        self.pos = self.bytes.len();
                        return Ok((out, false));
                    }
                },
                _ => return Err(self.malformed()),
            };
            out.push(decoded);
            self.pos += 2;
        }
    }

    /// Decode `\uXXXX` (and a following low surrogate) at `pos`.
    /// Returns `None` when the input ends inside the escape.
    fn parse_unicode_escape(&mut self) -> Result<Option<char>, Malformed> {
        let Some(high) = self.hex4(self.pos + 2)? else {
            return Ok(None);
        };
        self.pos += 6;

        if !(0xD800..0xDC00).contains(&high) {
            return Ok(Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER)));
        }

        // High surrogate: a low surrogate escape should follow.
        match (self.bytes.get(self.pos), self.bytes.get(self.pos + 1)) {
            (None, _) | (Some(b'\\'), None) => return Ok(None),
            (Some(b'\\'), Some(b'u')) => {}
            _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
        }
        let Some(low) = self.hex4(self.pos + 2)? else {
            return Ok(None);
        };
        if !(0xDC00..0xE000).contains(&low) {
            return Ok(Some(char::REPLACEMENT_CHARACTER));
        }
        self.pos += 6;
        let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        Ok(Some(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER)))
    }

    fn hex4(&self, at: usize) -> Result<Option<u32>, Malformed> {
        let start = at.min(self.bytes.len());
        let end = (at + 4).min(self.bytes.len());
        let digits = &self.bytes[start..end];
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(Malformed { offset: at });
        }
        if digits.len() < 4 {
            return Ok(None);
        }
        let text = std::str::from_utf8(digits).map_err(|_| Malformed { offset: at })?;
        u32::from_str_radix(text, 16)
            .map(Some)
            .map_err(|_| Malformed { offset: at })
    }
}

#[cfg(test)]
#[path = "partial_tests.rs"]
mod tests;

use bytes::Bytes;
use std::collections::BTreeMap;

use super::error::BencodeError;
use super::value::Value;

const MAX_DEPTH: usize = 64;

/// Decode exactly one value; anything after it is an error.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let (value, consumed) = decode_prefix(data)?;
    if consumed != data.len() {
        return Err(BencodeError::TrailingData(data.len() - consumed));
    }
    Ok(value)
}

/// Decode the first value in `data` and report how many bytes it used.
///
/// Bytes after the value are left untouched, the way a stream decoder stops
/// reading once it has a complete value.
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    let mut cursor = Cursor { data, pos: 0 };
    let value = cursor.value(0)?;
    Ok((value, cursor.pos))
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof(self.pos))
    }

    /// Advance to the next `delim` and return the bytes before it.
    fn take_until(&mut self, delim: u8) -> Result<&[u8], BencodeError> {
        let start = self.pos;
        let len = self.data[start..]
            .iter()
            .position(|&b| b == delim)
            .ok_or(BencodeError::UnexpectedEof(self.data.len()))?;
        self.pos = start + len + 1;
        Ok(&self.data[start..start + len])
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep(MAX_DEPTH));
        }

        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => self.bytes().map(Value::Bytes),
            byte => Err(BencodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    fn integer(&mut self) -> Result<Value, BencodeError> {
        let offset = self.pos;
        self.pos += 1;
        let digits = self.take_until(b'e')?;
        let invalid = |reason: &str| BencodeError::InvalidInteger {
            offset,
            reason: reason.to_string(),
        };

        let text = std::str::from_utf8(digits).map_err(|_| invalid("not ascii"))?;
        if text.is_empty() {
            return Err(invalid("empty"));
        }
        if text.starts_with("-0") || (text.starts_with('0') && text.len() > 1) {
            return Err(invalid("leading zero"));
        }

        text.parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| invalid(text))
    }

    fn bytes(&mut self) -> Result<Bytes, BencodeError> {
        let offset = self.pos;
        let len: usize = std::str::from_utf8(self.take_until(b':')?)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidLength(offset))?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEof(self.data.len()))?;
        let bytes = Bytes::copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.value(depth + 1)?);
        }
        self.pos += 1;
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut entries = BTreeMap::new();
        while self.peek()? != b'e' {
            if !self.peek()?.is_ascii_digit() {
                return Err(BencodeError::NonStringKey(self.pos));
            }
            let key = self.bytes()?;
            let value = self.value(depth + 1)?;
            entries.insert(key, value);
        }
        self.pos += 1;
        Ok(Value::Dict(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integers() {
        assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
        assert_eq!(decode(b"i-7e").unwrap(), Value::Integer(-7));
        assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_decode_rejects_malformed_integers() {
        assert!(matches!(
            decode(b"i-0e"),
            Err(BencodeError::InvalidInteger { .. })
        ));
        assert!(matches!(
            decode(b"i03e"),
            Err(BencodeError::InvalidInteger { .. })
        ));
        assert!(matches!(decode(b"ie"), Err(BencodeError::InvalidInteger { .. })));
        assert!(matches!(decode(b"i12"), Err(BencodeError::UnexpectedEof(_))));
    }

    #[test]
    fn test_decode_byte_strings() {
        assert_eq!(decode(b"4:spam").unwrap(), Value::string("spam"));
        assert_eq!(decode(b"0:").unwrap(), Value::string(""));
        assert!(matches!(decode(b"5:spam"), Err(BencodeError::UnexpectedEof(_))));
        assert!(matches!(decode(b"4x:spam"), Err(BencodeError::InvalidLength(0))));
    }

    #[test]
    fn test_decode_nested_structures() {
        let value = decode(b"d4:listli1ei2ee5:named3:key5:valueee").unwrap();
        let list = value.get(b"list").and_then(Value::as_list).unwrap();
        assert_eq!(list, &[Value::Integer(1), Value::Integer(2)]);
        let inner = value.get(b"named").unwrap();
        assert_eq!(inner.get(b"key").and_then(Value::as_str), Some("value"));
    }

    #[test]
    fn test_decode_rejects_non_string_keys() {
        assert!(matches!(
            decode(b"di1e3:fooe"),
            Err(BencodeError::NonStringKey(1))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_data() {
        assert_eq!(decode(b"i1eXY"), Err(BencodeError::TrailingData(2)));
    }

    #[test]
    fn test_decode_prefix_stops_after_first_value() {
        let (value, used) = decode_prefix(b"d1:ai1ee\n").unwrap();
        assert_eq!(used, 8);
        assert_eq!(value.get(b"a").and_then(Value::as_integer), Some(1));
    }

    #[test]
    fn test_decode_limits_nesting() {
        let mut data = vec![b'l'; MAX_DEPTH + 2];
        data.extend(vec![b'e'; MAX_DEPTH + 2]);
        assert_eq!(decode(&data), Err(BencodeError::NestingTooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_decode_unexpected_byte() {
        assert_eq!(
            decode(b"x"),
            Err(BencodeError::UnexpectedByte { byte: b'x', offset: 0 })
        );
        assert!(matches!(decode(b""), Err(BencodeError::UnexpectedEof(0))));
    }
}

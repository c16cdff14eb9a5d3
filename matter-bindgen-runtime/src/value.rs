//! Generic value adapter for complex (struct/list) binding arguments.
//!
//! Struct/list shapes are unbounded in variety, so bindings route all complex
//! values through this single generic encoding path instead of per-shape
//! encoders. Struct fields encode in declaration order; that order is part of
//! the wire format, not cosmetic.

use crate::error::CodecError;

const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_UNSIGNED: u8 = 0x02;
const TAG_SIGNED: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_UTF8: u8 = 0x05;
const TAG_OCTETS: u8 = 0x06;
const TAG_STRUCT: u8 = 0x07;
const TAG_LIST: u8 = 0x08;

/// A dynamically-shaped value.
///
/// `Struct` holds `(field code, value)` pairs in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Utf8(String),
    Octets(Vec<u8>),
    Struct(Vec<(u8, Value)>),
    List(Vec<Value>),
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn take<const N: usize>(buf: &[u8]) -> Result<([u8; N], &[u8]), CodecError> {
    if buf.len() < N {
        return Err(CodecError::UnexpectedEnd);
    }
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&buf[..N]);
    Ok((bytes, &buf[N..]))
}

fn take_len(buf: &[u8]) -> Result<(usize, &[u8]), CodecError> {
    let (bytes, rest) = take::<4>(buf)?;
    let len = u32::from_be_bytes(bytes);
    usize::try_from(len)
        .map(|len| (len, rest))
        .map_err(|_| CodecError::LengthOverflow)
}

impl Value {
    /// Append the encoding of this value to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => out.push(TAG_NULL),
            Value::Bool(b) => {
                out.push(TAG_BOOL);
                out.push(*b as u8);
            }
            Value::Unsigned(n) => {
                out.push(TAG_UNSIGNED);
                out.extend_from_slice(&n.to_be_bytes());
            }
            Value::Signed(n) => {
                out.push(TAG_SIGNED);
                out.extend_from_slice(&n.to_be_bytes());
            }
            Value::Float(f) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&f.to_be_bytes());
            }
            Value::Utf8(s) => {
                out.push(TAG_UTF8);
                put_len(out, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Value::Octets(bytes) => {
                out.push(TAG_OCTETS);
                put_len(out, bytes.len());
                out.extend_from_slice(bytes);
            }
            Value::Struct(fields) => {
                out.push(TAG_STRUCT);
                put_len(out, fields.len());
                for (code, value) in fields {
                    out.push(*code);
                    value.encode(out);
                }
            }
            Value::List(items) => {
                out.push(TAG_LIST);
                put_len(out, items.len());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    /// Encode into a fresh buffer.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Decode one value from the front of `buf`, returning the rest.
    pub fn decode_prefix(buf: &[u8]) -> Result<(Value, &[u8]), CodecError> {
        let (&tag, rest) = buf.split_first().ok_or(CodecError::UnexpectedEnd)?;

        match tag {
            TAG_NULL => Ok((Value::Null, rest)),
            TAG_BOOL => {
                let (&b, rest) = rest.split_first().ok_or(CodecError::UnexpectedEnd)?;
                Ok((Value::Bool(b != 0), rest))
            }
            TAG_UNSIGNED => {
                let (bytes, rest) = take::<8>(rest)?;
                Ok((Value::Unsigned(u64::from_be_bytes(bytes)), rest))
            }
            TAG_SIGNED => {
                let (bytes, rest) = take::<8>(rest)?;
                Ok((Value::Signed(i64::from_be_bytes(bytes)), rest))
            }
            TAG_FLOAT => {
                let (bytes, rest) = take::<8>(rest)?;
                Ok((Value::Float(f64::from_be_bytes(bytes)), rest))
            }
            TAG_UTF8 => {
                let (len, rest) = take_len(rest)?;
                if rest.len() < len {
                    return Err(CodecError::UnexpectedEnd);
                }
                let s =
                    std::str::from_utf8(&rest[..len]).map_err(|_| CodecError::InvalidUtf8)?;
                Ok((Value::Utf8(s.into()), &rest[len..]))
            }
            TAG_OCTETS => {
                let (len, rest) = take_len(rest)?;
                if rest.len() < len {
                    return Err(CodecError::UnexpectedEnd);
                }
                Ok((Value::Octets(rest[..len].to_vec()), &rest[len..]))
            }
            TAG_STRUCT => {
                let (count, mut rest) = take_len(rest)?;
                let mut fields = Vec::with_capacity(count);
                for _ in 0..count {
                    let (&code, tail) = rest.split_first().ok_or(CodecError::UnexpectedEnd)?;
                    let (value, tail) = Value::decode_prefix(tail)?;
                    fields.push((code, value));
                    rest = tail;
                }
                Ok((Value::Struct(fields), rest))
            }
            TAG_LIST => {
                let (count, mut rest) = take_len(rest)?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    let (value, tail) = Value::decode_prefix(rest)?;
                    items.push(value);
                    rest = tail;
                }
                Ok((Value::List(items), rest))
            }
            other => Err(CodecError::UnknownTypeTag(other)),
        }
    }

    /// Decode a complete buffer into one value. Trailing bytes are an error.
    pub fn decode(buf: &[u8]) -> Result<Value, CodecError> {
        let (value, rest) = Value::decode_prefix(buf)?;
        if !rest.is_empty() {
            return Err(CodecError::TrailingData);
        }
        Ok(value)
    }
}

/// A lazily decoded, single-pass sequence of list elements.
///
/// Decoding one element never materializes the rest of the list; the iterator
/// walks the encoded buffer element by element.
#[derive(Debug, Clone)]
pub struct DecodableList<'a> {
    buf: &'a [u8],
    remaining: usize,
}

impl<'a> DecodableList<'a> {
    /// Open an encoded list. Fails if `buf` does not start with a list header.
    pub fn new(buf: &'a [u8]) -> Result<Self, CodecError> {
        let (&tag, rest) = buf.split_first().ok_or(CodecError::UnexpectedEnd)?;
        if tag != TAG_LIST {
            return Err(CodecError::UnknownTypeTag(tag));
        }
        let (remaining, buf) = take_len(rest)?;
        Ok(Self { buf, remaining })
    }

    /// Number of elements not yet decoded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<'a> Iterator for DecodableList<'a> {
    type Item = Result<Value, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        match Value::decode_prefix(self.buf) {
            Ok((value, rest)) => {
                self.buf = rest;
                self.remaining -= 1;
                Some(Ok(value))
            }
            Err(e) => {
                // a decode error is final: the sequence is single-pass
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null)]
    #[case(Value::Bool(true))]
    #[case(Value::Unsigned(0xdead_beef))]
    #[case(Value::Signed(-42))]
    #[case(Value::Utf8("identify".into()))]
    #[case(Value::Octets(vec![0, 1, 2, 255]))]
    fn simple_round_trip(#[case] value: Value) {
        assert_eq!(Value::decode(&value.encode_to_vec()), Ok(value));
    }

    #[test]
    fn struct_field_order_round_trip() {
        // field order is wire-relevant: nested structs and lists of structs
        // must come back exactly as declared
        let value = Value::Struct(vec![
            (2, Value::Unsigned(7)),
            (0, Value::Utf8("label".into())),
            (
                1,
                Value::List(vec![
                    Value::Struct(vec![(0, Value::Bool(true)), (1, Value::Signed(-1))]),
                    Value::Struct(vec![(0, Value::Bool(false)), (1, Value::Signed(2))]),
                ]),
            ),
        ]);

        let decoded = Value::decode(&value.encode_to_vec()).expect("decodes");
        assert_eq!(decoded, value);

        let Value::Struct(fields) = decoded else {
            panic!("expected a struct");
        };
        assert_eq!(
            fields.iter().map(|(code, _)| *code).collect::<Vec<_>>(),
            vec![2, 0, 1]
        );
    }

    #[test]
    fn decodable_list_is_lazy_and_single_pass() {
        let encoded = Value::List(vec![
            Value::Unsigned(1),
            Value::Unsigned(2),
            Value::Unsigned(3),
        ])
        .encode_to_vec();

        let mut list = DecodableList::new(&encoded).expect("list header");
        assert_eq!(list.remaining(), 3);

        assert_eq!(list.next(), Some(Ok(Value::Unsigned(1))));
        assert_eq!(list.remaining(), 2);

        // remaining elements decode on demand
        assert_eq!(list.next(), Some(Ok(Value::Unsigned(2))));
        assert_eq!(list.next(), Some(Ok(Value::Unsigned(3))));
        assert_eq!(list.next(), None);
        assert_eq!(list.next(), None);
    }

    #[test]
    fn decodable_list_rejects_non_list() {
        let encoded = Value::Unsigned(1).encode_to_vec();
        assert!(DecodableList::new(&encoded).is_err());
    }

    #[test]
    fn truncated_input_fails() {
        let mut encoded = Value::Utf8("truncate me".into()).encode_to_vec();
        encoded.truncate(encoded.len() - 3);
        assert_eq!(Value::decode(&encoded), Err(CodecError::UnexpectedEnd));
    }

    #[test]
    fn trailing_data_fails() {
        let mut encoded = Value::Bool(true).encode_to_vec();
        encoded.push(0);
        assert_eq!(Value::decode(&encoded), Err(CodecError::TrailingData));
    }
}

use super::value::Value;

/// Encode a value in canonical form (dictionary keys in byte order).
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_into(value, &mut buf);
    buf
}

fn encode_into(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            buf.push(b'i');
            buf.extend_from_slice(i.to_string().as_bytes());
            buf.push(b'e');
        }
        Value::Bytes(b) => write_bytes(b, buf),
        Value::List(items) => {
            buf.push(b'l');
            for item in items {
                encode_into(item, buf);
            }
            buf.push(b'e');
        }
        Value::Dict(entries) => {
            buf.push(b'd');
            for (key, val) in entries {
                write_bytes(key, buf);
                encode_into(val, buf);
            }
            buf.push(b'e');
        }
    }
}

fn write_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::decode;
    use bytes::Bytes;
    use std::collections::BTreeMap;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Integer(-3)), b"i-3e");
        assert_eq!(encode(&Value::string("spam")), b"4:spam");
        assert_eq!(encode(&Value::string("")), b"0:");
    }

    #[test]
    fn test_encode_sorts_dictionary_keys() {
        let mut dict = BTreeMap::new();
        dict.insert(Bytes::from_static(b"zeta"), Value::Integer(1));
        dict.insert(Bytes::from_static(b"alpha"), Value::Integer(2));
        assert_eq!(encode(&Value::Dict(dict)), b"d5:alphai2e4:zetai1ee");
    }

    #[test]
    fn test_reencoding_unsorted_input_is_canonical() {
        let unsorted = b"d4:zetai1e5:alphal1:xee";
        let value = decode(unsorted).unwrap();
        assert_eq!(encode(&value), b"d5:alphal1:xe4:zetai1ee");
    }
}

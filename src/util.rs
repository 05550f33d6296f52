use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose};
use hex::FromHexError;
use snafu::Snafu;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("length {len} is not a multiple of the block size {block_size}"))]
    LengthError { len: usize, block_size: usize },

    #[snafu(display("invalid PKCS#7 padding"))]
    PaddingError {},

    #[snafu(display("oracle does not appear to run in the expected cipher mode"))]
    ModeMismatchError {},

    // A byte-candidate sweep found no unique match where exactly one was
    // expected. `position` is the plaintext byte position the sweep was
    // resolving, so callers can retry with an adjusted probe
    #[snafu(display("candidate sweep found no unique match at byte position {position}"))]
    AttackFailure { position: usize },

    #[snafu(display("malformed key=value record"))]
    ParseError {},

    #[snafu(display("block cipher primitive failure"))]
    CipherError {},
}

/// Parse a `foo=bar&baz=qux&zap=zazzle` record into a map.
/// A pair with an empty key or no `=` at all is malformed.
pub fn key_equals_val_parse(buf: &[u8]) -> Result<HashMap<Vec<u8>, Vec<u8>>, Error> {
    buf.split(|&b| b == b'&')
        .map(|pair| {
            let mut kv = pair.splitn(2, |&b| b == b'=');
            let key = kv.next()
                .filter(|k| !k.is_empty())
                .ok_or(Error::ParseError {})?;
            let val = kv.next()
                .ok_or(Error::ParseError {})?;
            Ok((key.to_vec(), val.to_vec()))
        })
        .collect()
}

/// Encode ordered pairs as `k=v&k=v`. The metacharacters `&` and `=` are
/// eaten from keys and values, so no encoded record can smuggle extra pairs
pub fn key_equals_val_encode(pairs: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    pairs.iter()
        .map(|(k, v)| [eat_metacharacters(k), eat_metacharacters(v)].join(&b'='))
        .collect::<Vec<Vec<u8>>>()
        .join(&b'&')
}

fn eat_metacharacters(buf: &[u8]) -> Vec<u8> {
    buf.iter()
        .filter(|&&b| !(b == b'=' || b == b'&'))
        .copied()
        .collect()
}

#[test]
fn test_key_equals_val_parse() {
    let parsed = key_equals_val_parse(b"foo=bar&baz=qux&zap=zazzle").unwrap();
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.get(b"foo".as_slice()), Some(&b"bar".to_vec()));
    assert_eq!(parsed.get(b"baz".as_slice()), Some(&b"qux".to_vec()));
    assert_eq!(parsed.get(b"zap".as_slice()), Some(&b"zazzle".to_vec()));

    assert_eq!(Err(Error::ParseError {}), key_equals_val_parse(b"foo=bar&nope"));
    assert_eq!(Err(Error::ParseError {}), key_equals_val_parse(b"=bar"));
}

#[test]
fn test_key_equals_val_encode() {
    let pairs = [
        (b"email".to_vec(), b"foo@bar.com".to_vec()),
        (b"uid".to_vec(),   b"10".to_vec()),
        (b"role".to_vec(),  b"user".to_vec()),
    ];
    assert_eq!(b"email=foo@bar.com&uid=10&role=user".to_vec(), key_equals_val_encode(&pairs));

    // Metacharacters cannot survive into the record
    let hostile = [(b"email".to_vec(), b"foo@bar.com&role=admin".to_vec())];
    assert_eq!(b"email=foo@bar.comroleadmin".to_vec(), key_equals_val_encode(&hostile));
}

pub fn hex_to_b64(input: String) -> Result<String, FromHexError> {
    hex::decode(input)
        .and_then(|b| Ok(general_purpose::STANDARD.encode(&b)) )
}

#[test]
fn test_hex_to_b64() {
    let case = String::from("49276d206b696c6c696e6720796f757220627261696e206c696b65206120706f69736f6e6f7573206d757368726f6f6d");
    let expected = Ok(String::from("SSdtIGtpbGxpbmcgeW91ciBicmFpbiBsaWtlIGEgcG9pc29ub3VzIG11c2hyb29t"));
    let result = hex_to_b64(case);
    assert_eq!(result, expected);
}

use std::collections::HashSet;

use rand::RngCore;

use crate::util::Error;

// PKCS#7 per RFC 5652: the pad value equals the pad length, and a buffer
// already at a block boundary gains a whole block of `block_size` bytes.
// Pad values therefore always land in 1..=block_size
pub fn pad_pkcs_7(buf: &[u8], block_size: usize) -> Vec<u8> {
    let padding_length = block_size - (buf.len() % block_size);
    [buf, &vec![padding_length as u8; padding_length]].concat()
}

#[test]
fn test_pad_pkcs_7() {
    let case = b"YELLOW SUBMARINE";
    let expected = b"YELLOW SUBMARINE\x04\x04\x04\x04".to_vec();
    let result = pad_pkcs_7(case, 20);
    assert_eq!(expected, result);

    let expected_2 = [
        case.to_vec(),
        vec![16u8; 16],
    ].concat();
    let result_2 = pad_pkcs_7(case, case.len());
    assert_eq!(expected_2, result_2);
}

/// The padding-validity predicate: the final byte `v` must satisfy
/// `1 <= v <= min(block_size, len)` and the last `v` bytes must all equal `v`
pub fn is_valid_pkcs_7(buf: &[u8], block_size: usize) -> bool {
    let final_byte = match buf.last() {
        Some(&b) => b as usize,
        None     => return false,
    };
    final_byte >= 1
        && final_byte <= block_size.min(buf.len())
        && buf.iter()
            .rev()
            .take(final_byte)
            .all(|&b| b as usize == final_byte)
}

#[test]
fn test_is_valid_pkcs_7() {
    assert!(is_valid_pkcs_7(b"ICE ICE BABY\x04\x04\x04\x04", 16));
    assert!(is_valid_pkcs_7(&vec![16u8; 16], 16));
    assert!(!is_valid_pkcs_7(b"ICE ICE BABY\x05\x05\x05\x05", 16));
    assert!(!is_valid_pkcs_7(b"ICE ICE BABY\x01\x02\x03\x04", 16));
    assert!(!is_valid_pkcs_7(b"ICE ICE BABY\x04\x04\x04\x00", 16));
    assert!(!is_valid_pkcs_7(b"", 16));
}

pub fn strip_pad_pkcs_7(buf: &[u8], block_size: usize) -> Result<Vec<u8>, Error> {
    if buf.is_empty() || buf.len() % block_size != 0 {
        return Err(Error::LengthError { len: buf.len(), block_size });
    }
    if !is_valid_pkcs_7(buf, block_size) {
        return Err(Error::PaddingError {});
    }
    let padding_len = *buf.last().unwrap() as usize;
    Ok(buf[..buf.len() - padding_len].to_vec())
}

#[test]
fn test_strip_pad_pkcs_7() {
    let case = b"YELLOW SUBMARINE\x04\x04\x04\x04";
    let expected = b"YELLOW SUBMARINE".to_vec();
    assert_eq!(Ok(expected.clone()), strip_pad_pkcs_7(case, 20));

    let case_2 = [b"YELLOW SUBMARINE".as_slice(), &[16u8; 16]].concat();
    assert_eq!(Ok(expected), strip_pad_pkcs_7(&case_2, 16));

    // Cases from Challenge 15
    let case_3 = b"ICE ICE BABY\x04\x04\x04\x04";
    assert_eq!(Ok(b"ICE ICE BABY".to_vec()), strip_pad_pkcs_7(case_3, 16));

    let case_4 = b"ICE ICE BABY\x05\x05\x05\x05";
    assert_eq!(Err(Error::PaddingError {}), strip_pad_pkcs_7(case_4, 16));

    let case_5 = b"ICE ICE BABY\x01\x02\x03\x04";
    assert_eq!(Err(Error::PaddingError {}), strip_pad_pkcs_7(case_5, 16));

    let case_6 = b"ICE ICE BABY\x04\x04\x04";
    assert_eq!(
        Err(Error::LengthError { len: 15, block_size: 16 }),
        strip_pad_pkcs_7(case_6, 16)
    );
}

pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut data = [0u8; N];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

/// First block value to occur twice, along with the chunk index of its
/// second occurrence
pub fn repeating_block(arr: &[u8], size: usize) -> Option<(usize, Vec<u8>)> {
    let mut blocks: HashSet<&[u8]> = HashSet::new();
    for (idx, block) in arr.chunks(size).enumerate() {
        if blocks.contains(block) {
            return Some((idx, block.to_vec()));
        }
        blocks.insert(block);
    }
    None
}

#[test]
fn test_repeating_block() {
    let arr = b"aaabbbcccaaa";
    assert_eq!(Some((3, b"aaa".to_vec())), repeating_block(arr, 3));
    assert_eq!(None,                       repeating_block(arr, 4));
}

pub fn round_up_to_nearest_multiple(n: usize, m: usize) -> usize {
    m*( (n + (m-1)) / m )
}

#[test]
fn test_round_up_to_nearest_multiple() {
    assert_eq!(32, round_up_to_nearest_multiple(19, 16));
    assert_eq!(16, round_up_to_nearest_multiple(16, 16));
    assert_eq!(0,  round_up_to_nearest_multiple(0, 16));
}

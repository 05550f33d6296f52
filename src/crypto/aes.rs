use crate::crypto::common::repeating_block;
use crate::crypto::oracle::*;

pub mod ecb;
pub mod cbc;

/// ECB encrypts identical plaintext blocks to identical ciphertext blocks,
/// so any repeated block betrays the mode. Only reliable when the caller
/// arranged for at least two identical plaintext blocks (three blocks of one
/// repeated byte tolerates unknown prefix alignment)
pub fn looks_like_ecb(ciphertext: &[u8], block_size: usize) -> bool {
    repeating_block(ciphertext, block_size).is_some()
}

#[test]
fn test_looks_like_ecb() {
    let ecb_oracle = get_id_oracle().pushforward_ecb_encrypt_fixed_key();
    let cbc_oracle = get_id_oracle().pushforward_cbc_encrypt_fixed_key();
    let probe = vec![b'A'; 3*16];
    assert!(looks_like_ecb(&ecb_oracle(&probe), 16));
    assert!(!looks_like_ecb(&cbc_oracle(&probe), 16));
}

// Given an oracle of the form:
// (fixed ECB or CBC) . (fixed lpad ++) . (++ fixed rpad)
// Determine whether the oracle is using ECB or CBC
pub fn detect_ecb_or_cbc(oracle: &dyn Oracle) -> Option<bool> {
    // A constant run of one byte repeats after the first block under ECB
    // and never repeats under CBC
    let block_size = determine_block_size(oracle);

    // Take 4*block_size to ensure we aren't prevented by left or right padding
    let payload = vec![b'A'; 4*block_size];
    let encrypted = oracle(&payload);
    let repeated = repeating_block(&encrypted, block_size);
    let maybe_confident_ecb: Option<bool> = repeated.and_then(|(_, repeated_a)| {
        let payload = vec![b'B'; 4*block_size];
        let encrypted = oracle(&payload);
        let repeated = repeating_block(&encrypted, block_size);
        repeated.and_then(|(_, repeated_b)| {
            if repeated_a == repeated_b {
                Some(false)
            } else {
                Some(true)
            }
        })
    });
    match maybe_confident_ecb {
        Some(true)  => Some(true),  // We had different repeating blocks. ECB
        Some(false) => None,        // We had the same repeating block both times.
                                    // Thus, we cannot tell which mode it's in
        None        => Some(false), // We failed to reliably find repeating blocks. CBC
    }
}

#[test]
fn test_detect_ecb_or_cbc() {
    for _ in 0..100 {
        let cbc_oracle = get_id_oracle()
            .pullback_add_random_left_padding::<5,10>()
            .pullback_add_random_right_padding::<5,10>()
            .pushforward_cbc_encrypt_fixed_key();
        let ecb_oracle = get_id_oracle()
            .pullback_add_random_left_padding::<5,10>()
            .pullback_add_random_right_padding::<5,10>()
            .pushforward_ecb_encrypt_fixed_key();
        let (run_ecb, oracle) = choose_random(ecb_oracle, cbc_oracle);

        match detect_ecb_or_cbc(&oracle) {
            Some(detected_is_ecb) => assert_eq!(run_ecb, detected_is_ecb),
            None                  => assert!(false)
        };
    }
}

// Given an oracle of type
// (fixed block encryption function) . (fixed lpad ++) . (++ fixed rpad)
// Determine the block size in use. The ciphertext length climbs in steps of
// one block as the input grows; the step size is the block size
pub fn determine_block_size(oracle: &dyn Oracle) -> usize {
    let initial_size = oracle(&Vec::new()).len();
    let mut input: Vec<u8> = Vec::new();
    while oracle(&input).len() == initial_size { input.push(b'A'); }
    let block_size = input.len();
    let intermediate_size = oracle(&input).len();
    while oracle(&input).len() == intermediate_size { input.push(b'A'); }
    input.len() - block_size
}

#[test]
fn test_determine_block_size() {
    let oracle = get_id_oracle()
        .pullback_add_random_left_padding::<5,10>()
        .pushforward_ecb_encrypt_fixed_key();
    assert_eq!(16, determine_block_size(&oracle));
}

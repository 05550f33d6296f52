use std::iter::once;

use itertools::Itertools;

use crate::crypto::aes::ecb::BLOCK_SIZE;
use crate::crypto::oracle::ValidityOracle;
use crate::crypto::xor::{byte_xor, fixed_xor};
use crate::util::Error;

/// Recover the full (still padded) plaintext of a CBC ciphertext from
/// nothing but a padding-validity oracle `V(iv, ct) -> bool`.
///
/// Each ciphertext block is attacked through the block chained before it
/// (the IV for block 0): mutate that block so the target decrypts to forced
/// padding, and the oracle's yes/no answers leak one byte per 256-value
/// sweep. Blocks are processed last to first. Worst case 256 oracle calls
/// per byte.
///
/// The oracle must be a pure padding predicate; one that reports other
/// decryption failures the same way corrupts the recovery silently.
pub fn attack_cbc_padding(
    ciphertext: &[u8],
    iv: &[u8; BLOCK_SIZE],
    oracle: &impl ValidityOracle,
) -> Result<Vec<u8>, Error> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::LengthError { len: ciphertext.len(), block_size: BLOCK_SIZE });
    }

    // Chaining pairs (prev, block), prev being the IV for the first block
    let pairs: Vec<(&[u8], &[u8])> = once(iv.as_slice())
        .chain(ciphertext.chunks(BLOCK_SIZE))
        .tuple_windows()
        .collect();

    let mut recovered = vec![Vec::new(); pairs.len()];
    for (i, (prev, block)) in pairs.iter().enumerate().rev() {
        recovered[i] = attack_cbc_padding_single_block(block, prev, i*BLOCK_SIZE, oracle)?;
    }
    Ok(recovered.concat())
}

// Solve one block in isolation: present it as a one-block message under a
// crafted IV. `zero_iv` accumulates D(block) (the decryption before the
// chain XOR); the plaintext is then D(block) XOR prev.
fn attack_cbc_padding_single_block(
    block: &[u8],
    prev: &[u8],
    base_position: usize,
    oracle: &impl ValidityOracle,
) -> Result<Vec<u8>, Error> {
    let mut zero_iv = [0u8; BLOCK_SIZE];
    for pad in 1..=BLOCK_SIZE {
        // Force the already-solved tail to decrypt to `pad`, then sweep the
        // byte at BLOCK_SIZE - pad
        let mut tmp_iv = byte_xor(&zero_iv, pad as u8);
        let mut found = false;
        for v in 0..=u8::MAX {
            tmp_iv[BLOCK_SIZE - pad] = v;
            if !oracle(&tmp_iv, block) {
                continue;
            }
            // A first-round hit can be a \x02\x02 (or longer) coincidence
            // rather than \x01. Corrupt the second-to-last byte and ask
            // again; real \x01 padding doesn't care about that byte
            if pad == 1 {
                tmp_iv[BLOCK_SIZE - 2] ^= 0xff;
                let still_valid = oracle(&tmp_iv, block);
                tmp_iv[BLOCK_SIZE - 2] ^= 0xff;
                if !still_valid {
                    continue;
                }
            }
            zero_iv[BLOCK_SIZE - pad] = v ^ (pad as u8);
            found = true;
            break;
        }
        if !found {
            return Err(Error::AttackFailure { position: base_position + BLOCK_SIZE - pad });
        }
    }
    Ok(fixed_xor(&zero_iv, prev))
}

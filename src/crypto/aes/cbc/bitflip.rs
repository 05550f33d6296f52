use crate::crypto::aes::ecb::BLOCK_SIZE;
use crate::util::Error;

/// Force chosen bytes into a CBC plaintext block by editing the ciphertext
/// block before it.
///
/// CBC decryption computes `pt[i] = D(ct[i]) XOR ct[i-1]`, so XORing
/// `known XOR want` into `ct[target_block - 1]` at `offset` turns the bytes
/// we know decrypt there into the bytes we want. The edited block's own
/// plaintext is destroyed in the process; callers must sacrifice a filler
/// block immediately before the target.
pub fn forge_cbc_bytes(
    ciphertext: &mut [u8],
    block_size: usize,
    target_block: usize,
    offset: usize,
    known: &[u8],
    want: &[u8],
) -> Result<(), Error> {
    if ciphertext.len() % block_size != 0 {
        return Err(Error::LengthError { len: ciphertext.len(), block_size });
    }
    assert_eq!(known.len(), want.len());
    assert!(target_block >= 1, "block 0 chains off the IV, which is outside the ciphertext");
    assert!((target_block + 1) * block_size <= ciphertext.len());
    assert!(offset + want.len() <= block_size);

    let edit_base = (target_block - 1)*block_size + offset;
    for (k, (kb, wb)) in known.iter().zip(want.iter()).enumerate() {
        ciphertext[edit_base + k] ^= kb ^ wb;
    }
    Ok(())
}

/// The challenge-16 cookie scenario: the oracle sandwiches our userdata as
/// `comment1=cooking%20MCs;userdata=<input >;comment2=...` (eating `;` and
/// `=` from the input) and CBC-encrypts it. The prefix is exactly two
/// blocks, so our userdata starts block-aligned: one sacrificial filler
/// block, then a decoy block three flips away from `;admin=true;`
pub fn attack_cbc_bitflip(oracle: &impl Fn(&[u8]) -> Vec<u8>) -> Result<Vec<u8>, Error> {
    let known = b":admin<true:";
    let want = b";admin=true;";

    let payload = [
        vec![b'A'; BLOCK_SIZE],
        [known.as_slice(), b"AAAA"].concat(),
    ].concat();
    let mut ciphertext = oracle(&payload);
    forge_cbc_bytes(&mut ciphertext, BLOCK_SIZE, 3, 0, known, want)?;
    Ok(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::aes::cbc::{aes_cbc_decrypt_raw, aes_cbc_encrypt};
    use crate::crypto::aes::ecb::BLOCK_SIZE;
    use crate::crypto::common::generate_random_bytes;

    fn cookie_oracle(key: [u8; 16], iv: [u8; 16]) -> impl Fn(&[u8]) -> Vec<u8> {
        move |userdata: &[u8]| {
            let sanitized: Vec<u8> = userdata.iter()
                .filter(|&&b| !(b == b';' || b == b'='))
                .copied()
                .collect();
            let plaintext = [
                b"comment1=cooking%20MCs;userdata=".as_slice(),
                &sanitized,
                b";comment2=%20like%20a%20pound%20of%20bacon",
            ].concat();
            aes_cbc_encrypt(&plaintext, &key, &iv).unwrap()
        }
    }

    fn contains_admin(decrypted: &[u8]) -> bool {
        let target = b";admin=true;";
        decrypted.windows(target.len()).any(|w| w == target)
    }

    #[test]
    fn test_forge_cbc_bytes_edits_exactly_the_target_bytes() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let plaintext = b"block zero here!block one here !block two here !";
        let mut ciphertext = aes_cbc_encrypt(plaintext, &key, &iv).unwrap();

        forge_cbc_bytes(&mut ciphertext, BLOCK_SIZE, 1, 6, b"one", b"WON").unwrap();

        let decrypted = aes_cbc_decrypt_raw(&ciphertext, &key, &iv).unwrap();
        // Target block carries the forged bytes, rest of it untouched
        assert_eq!(b"block WON here !".as_slice(), &decrypted[16..32]);
        // The edited block's own plaintext is noise now
        assert_ne!(b"block zero here!".as_slice(), &decrypted[0..16]);
        // Blocks after the target are unaffected
        assert_eq!(b"block two here !".as_slice(), &decrypted[32..48]);
    }

    #[test]
    fn test_forge_cbc_bytes_rejects_misaligned_ciphertext() {
        let mut ciphertext = vec![0u8; 33];
        assert_eq!(
            Err(Error::LengthError { len: 33, block_size: 16 }),
            forge_cbc_bytes(&mut ciphertext, 16, 1, 0, b"a", b"b")
        );
    }

    #[test]
    fn test_attack_cbc_bitflip() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let oracle = cookie_oracle(key, iv);

        let forged = attack_cbc_bitflip(&oracle).unwrap();
        let decrypted = aes_cbc_decrypt_raw(&forged, &key, &iv).unwrap();
        assert!(contains_admin(&decrypted));
    }

    // The sanitizer invariant the attack sidesteps: no honest encryption
    // ever contains the admin marker
    #[test]
    fn test_oracle_never_emits_admin_directly() {
        let key: [u8; 16] = generate_random_bytes();
        let iv: [u8; 16] = generate_random_bytes();
        let oracle = cookie_oracle(key, iv);

        let ciphertext = oracle(b";admin=true;");
        let decrypted = aes_cbc_decrypt_raw(&ciphertext, &key, &iv).unwrap();
        assert!(!contains_admin(&decrypted));
    }
}

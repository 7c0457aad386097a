//! Strong-name key container codec.
//!
//! Key containers (`.snk` files) hold a CAPI RSA key blob:
//!
//! ```text
//! BLOBHEADER   bType:u8  bVersion:u8  reserved:u16  aiKeyAlg:u32
//! RSAPUBKEY    magic:u32 bitlen:u32   pubexp:u32
//! modulus      bitlen/8 bytes
//! (private blobs only)
//! prime1, prime2, exponent1, exponent2, coefficient   bitlen/16 bytes each
//! privateExponent                                     bitlen/8 bytes
//! ```
//!
//! Public signing needs the strong-name public key blob: a 12-byte header
//! (`SigAlgId`, `HashAlgId`, `cbPublicKey`) followed by a `PUBLICKEYBLOB`.
//! All integers are little-endian.

use thiserror::Error;

const PUBLIC_KEY_BLOB: u8 = 0x06;
const PRIVATE_KEY_BLOB: u8 = 0x07;
const BLOB_VERSION: u8 = 0x02;

const CALG_RSA_SIGN: u32 = 0x0000_2400;
const CALG_RSA_KEYX: u32 = 0x0000_A400;
const CALG_SHA1: u32 = 0x0000_8004;

/// "RSA1"
const RSA1_MAGIC: u32 = 0x3141_5352;
/// "RSA2"
const RSA2_MAGIC: u32 = 0x3241_5352;

const BLOB_HEADER_LEN: usize = 8;
const RSA_PUB_KEY_LEN: usize = 12;
const SN_HEADER_LEN: usize = 12;

/// The ECMA neutral public key, accepted as-is.
const ECMA_KEY: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];

/// Errors raised while parsing a key container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBlobError {
    #[error("key blob is truncated: expected at least {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unknown key blob type 0x{0:02x}")]
    UnknownBlobType(u8),

    #[error("unsupported key blob version {0}")]
    UnsupportedVersion(u8),

    #[error("unsupported key algorithm 0x{0:08x}")]
    UnsupportedAlgorithm(u32),

    #[error("unexpected RSA magic 0x{0:08x}")]
    BadMagic(u32),

    #[error("invalid RSA key length of {0} bits")]
    InvalidBitLength(u32),

    #[error("public key header declares {declared} bytes but {actual} follow")]
    LengthMismatch { declared: usize, actual: usize },
}

/// A parsed RSA key blob, borrowing from the container bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RsaKeyBlob<'a> {
    algorithm: u32,
    bit_length: u32,
    public_exponent: u32,
    modulus: &'a [u8],
}

/// Extract the strong-name public key blob from a key container.
///
/// Accepts a private key blob, a bare public key blob, or an already
/// wrapped strong-name public key.
///
/// # Errors
///
/// Returns [`KeyBlobError`] if the bytes are not a well-formed RSA key blob.
pub fn extract_public_key(bytes: &[u8]) -> Result<Vec<u8>, KeyBlobError> {
    if bytes == ECMA_KEY {
        return Ok(bytes.to_vec());
    }

    // Already a strong-name public key: header, then a PUBLICKEYBLOB.
    if bytes.len() > SN_HEADER_LEN && bytes[SN_HEADER_LEN] == PUBLIC_KEY_BLOB {
        let declared = read_u32(bytes, 8) as usize;
        let actual = bytes.len() - SN_HEADER_LEN;
        if declared != actual {
            return Err(KeyBlobError::LengthMismatch { declared, actual });
        }
        parse_key_blob(&bytes[SN_HEADER_LEN..])?;
        return Ok(bytes.to_vec());
    }

    let key = parse_key_blob(bytes)?;
    Ok(encode_public_key(&key))
}

fn parse_key_blob(bytes: &[u8]) -> Result<RsaKeyBlob<'_>, KeyBlobError> {
    ensure_len(bytes, BLOB_HEADER_LEN + RSA_PUB_KEY_LEN)?;

    let blob_type = bytes[0];
    let expected_magic = match blob_type {
        PUBLIC_KEY_BLOB => RSA1_MAGIC,
        PRIVATE_KEY_BLOB => RSA2_MAGIC,
        other => return Err(KeyBlobError::UnknownBlobType(other)),
    };

    if bytes[1] != BLOB_VERSION {
        return Err(KeyBlobError::UnsupportedVersion(bytes[1]));
    }

    let algorithm = read_u32(bytes, 4);
    if algorithm != CALG_RSA_SIGN && algorithm != CALG_RSA_KEYX {
        return Err(KeyBlobError::UnsupportedAlgorithm(algorithm));
    }

    let magic = read_u32(bytes, BLOB_HEADER_LEN);
    if magic != expected_magic {
        return Err(KeyBlobError::BadMagic(magic));
    }

    // Private blobs store half-length primes, so they need whole bytes there too.
    let bit_length = read_u32(bytes, BLOB_HEADER_LEN + 4);
    let granularity = if blob_type == PUBLIC_KEY_BLOB { 8 } else { 16 };
    if bit_length == 0 || bit_length % granularity != 0 {
        return Err(KeyBlobError::InvalidBitLength(bit_length));
    }
    let public_exponent = read_u32(bytes, BLOB_HEADER_LEN + 8);

    let modulus_len = (bit_length / 8) as usize;
    let half_len = (bit_length / 16) as usize;
    let key_start = BLOB_HEADER_LEN + RSA_PUB_KEY_LEN;
    let required = match blob_type {
        PUBLIC_KEY_BLOB => key_start + modulus_len,
        _ => key_start + modulus_len * 2 + half_len * 5,
    };
    ensure_len(bytes, required)?;

    Ok(RsaKeyBlob {
        algorithm,
        bit_length,
        public_exponent,
        modulus: &bytes[key_start..key_start + modulus_len],
    })
}

fn encode_public_key(key: &RsaKeyBlob<'_>) -> Vec<u8> {
    let public_blob_len = BLOB_HEADER_LEN + RSA_PUB_KEY_LEN + key.modulus.len();
    let mut out = Vec::with_capacity(SN_HEADER_LEN + public_blob_len);

    out.extend_from_slice(&CALG_RSA_SIGN.to_le_bytes());
    out.extend_from_slice(&CALG_SHA1.to_le_bytes());
    out.extend_from_slice(&(public_blob_len as u32).to_le_bytes());

    out.push(PUBLIC_KEY_BLOB);
    out.push(BLOB_VERSION);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&key.algorithm.to_le_bytes());

    out.extend_from_slice(&RSA1_MAGIC.to_le_bytes());
    out.extend_from_slice(&key.bit_length.to_le_bytes());
    out.extend_from_slice(&key.public_exponent.to_le_bytes());
    out.extend_from_slice(key.modulus);

    out
}

fn ensure_len(bytes: &[u8], expected: usize) -> Result<(), KeyBlobError> {
    if bytes.len() < expected {
        return Err(KeyBlobError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Read a little-endian `u32`; callers check the length first.
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a private key blob with recognizable filler bytes.
    pub(crate) fn private_key_blob(bits: u32) -> Vec<u8> {
        let modulus_len = (bits / 8) as usize;
        let half_len = (bits / 16) as usize;

        let mut blob = vec![PRIVATE_KEY_BLOB, BLOB_VERSION, 0, 0];
        blob.extend_from_slice(&CALG_RSA_SIGN.to_le_bytes());
        blob.extend_from_slice(&RSA2_MAGIC.to_le_bytes());
        blob.extend_from_slice(&bits.to_le_bytes());
        blob.extend_from_slice(&65537u32.to_le_bytes());
        blob.extend((0..modulus_len).map(|i| (i % 251) as u8));
        // Private material is all 0xEE so leaks are easy to spot.
        blob.extend(std::iter::repeat_n(0xEE, half_len * 5 + modulus_len));
        blob
    }

    /// The strong-name public key expected for a blob from [`private_key_blob`].
    pub(crate) fn public_key_blob_for(private_blob: &[u8]) -> Vec<u8> {
        let bits = read_u32(private_blob, 12);
        let modulus = &private_blob[20..20 + (bits / 8) as usize];

        let mut expected = vec![0x00, 0x24, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00];
        expected.extend_from_slice(&(20 + modulus.len() as u32).to_le_bytes());
        expected.extend_from_slice(&[0x06, 0x02, 0x00, 0x00, 0x00, 0x24, 0x00, 0x00]);
        expected.extend_from_slice(b"RSA1");
        expected.extend_from_slice(&bits.to_le_bytes());
        expected.extend_from_slice(&65537u32.to_le_bytes());
        expected.extend_from_slice(modulus);
        expected
    }

    #[test]
    fn test_extract_from_private_blob() {
        let blob = private_key_blob(1024);
        let public_key = extract_public_key(&blob).unwrap();

        assert_eq!(public_key, public_key_blob_for(&blob));
        assert!(!public_key.contains(&0xEE));
    }

    fn bare_public_blob(bits: u32, modulus: &[u8]) -> Vec<u8> {
        let mut public = vec![PUBLIC_KEY_BLOB, BLOB_VERSION, 0, 0];
        public.extend_from_slice(&CALG_RSA_SIGN.to_le_bytes());
        public.extend_from_slice(&RSA1_MAGIC.to_le_bytes());
        public.extend_from_slice(&bits.to_le_bytes());
        public.extend_from_slice(&65537u32.to_le_bytes());
        public.extend_from_slice(modulus);
        public
    }

    #[test]
    fn test_extract_from_bare_public_blob() {
        let private = private_key_blob(512);
        let public = bare_public_blob(512, &private[20..20 + 64]);

        assert_eq!(
            extract_public_key(&public).unwrap(),
            public_key_blob_for(&private)
        );
    }

    #[test]
    fn test_wrapped_public_key_is_returned_unchanged() {
        let wrapped = public_key_blob_for(&private_key_blob(1024));
        assert_eq!(extract_public_key(&wrapped).unwrap(), wrapped);
    }

    #[test]
    fn test_wrapped_public_key_length_mismatch() {
        let mut wrapped = public_key_blob_for(&private_key_blob(1024));
        wrapped.push(0);
        assert!(matches!(
            extract_public_key(&wrapped),
            Err(KeyBlobError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_ecma_key_is_accepted() {
        assert_eq!(extract_public_key(&ECMA_KEY).unwrap(), ECMA_KEY.to_vec());
    }

    #[test]
    fn test_truncated_private_blob() {
        let mut blob = private_key_blob(1024);
        blob.truncate(blob.len() - 1);
        assert!(matches!(
            extract_public_key(&blob),
            Err(KeyBlobError::Truncated { .. })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            extract_public_key(b"not a key"),
            Err(KeyBlobError::Truncated { .. })
        ));
        let mut blob = private_key_blob(1024);
        blob[0] = 0x01;
        assert_eq!(
            extract_public_key(&blob),
            Err(KeyBlobError::UnknownBlobType(0x01))
        );
    }

    #[test]
    fn test_rejects_wrong_magic_and_version() {
        let mut blob = private_key_blob(1024);
        blob[8..12].copy_from_slice(&RSA1_MAGIC.to_le_bytes());
        assert_eq!(
            extract_public_key(&blob),
            Err(KeyBlobError::BadMagic(RSA1_MAGIC))
        );

        let mut blob = private_key_blob(1024);
        blob[1] = 3;
        assert_eq!(
            extract_public_key(&blob),
            Err(KeyBlobError::UnsupportedVersion(3))
        );
    }

    #[test]
    fn test_rejects_bad_bit_length() {
        let mut blob = private_key_blob(1024);
        blob[12..16].copy_from_slice(&1001u32.to_le_bytes());
        assert_eq!(
            extract_public_key(&blob),
            Err(KeyBlobError::InvalidBitLength(1001))
        );

        let mut blob = private_key_blob(1024);
        blob[12..16].copy_from_slice(&1032u32.to_le_bytes());
        assert_eq!(
            extract_public_key(&blob),
            Err(KeyBlobError::InvalidBitLength(1032))
        );
    }

    #[test]
    fn test_public_blob_bit_length_needs_whole_bytes_only() {
        let modulus: Vec<u8> = (1..=129).collect();
        let public = bare_public_blob(1032, &modulus);

        let key = extract_public_key(&public).unwrap();
        assert_eq!(key.len(), 12 + 20 + 129);
        assert_eq!(&key[12 + 12..12 + 16], &1032u32.to_le_bytes());
        assert_eq!(&key[12 + 20..], &modulus[..]);
    }
}

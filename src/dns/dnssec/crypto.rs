use ring::signature::{self, RsaPublicKeyComponents, UnparsedPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::super::protocol::names;

// DNSSEC algorithm numbers from the IANA registry. RSASHA1's NSEC3 alias
// (7) verifies identically to 5.
pub const RSASHA1: u8 = 5;
pub const RSASHA1_NSEC3_SHA1: u8 = 7;
pub const RSASHA256: u8 = 8;
pub const RSASHA512: u8 = 10;
pub const ECDSAP256SHA256: u8 = 13;
pub const ECDSAP384SHA384: u8 = 14;

// DS digest algorithms (RFC 4034 appendix A.2)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DigestType {
    Sha1,
    Sha256,
}

impl DigestType {
    pub fn from_u8(value: u8) -> Option<DigestType> {
        match value {
            1 => Some(DigestType::Sha1),
            2 => Some(DigestType::Sha256),
            _ => None,
        }
    }
}

// The DS digest input is the canonical owner name (wire form, lowercased)
// followed by the DNSKEY rdata exactly as it appears on the wire
// (RFC 4034 section 5.1.4).
pub fn ds_digest(
    owner: &[String],
    flags: u16,
    protocol: u8,
    algorithm: u8,
    public_key: &[u8],
    digest_type: DigestType,
) -> Vec<u8> {
    let mut input = names::canonical_name(owner);
    input.extend_from_slice(&flags.to_be_bytes());
    input.push(protocol);
    input.push(algorithm);
    input.extend_from_slice(public_key);
    match digest_type {
        DigestType::Sha1 => Sha1::digest(&input).to_vec(),
        DigestType::Sha256 => Sha256::digest(&input).to_vec(),
    }
}

// RFC 4034 appendix B: the key tag is a 16-bit checksum over the DNSKEY
// rdata, used to pick candidate keys before attempting verification.
pub fn key_tag(flags: u16, protocol: u8, algorithm: u8, public_key: &[u8]) -> u16 {
    let mut rdata = Vec::with_capacity(4 + public_key.len());
    rdata.extend_from_slice(&flags.to_be_bytes());
    rdata.push(protocol);
    rdata.push(algorithm);
    rdata.extend_from_slice(public_key);

    let mut accumulator: u32 = 0;
    for chunk in rdata.chunks(2) {
        if chunk.len() == 2 {
            accumulator += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
        } else {
            accumulator += u32::from(chunk[0]) << 8;
        }
    }
    accumulator += accumulator >> 16;
    (accumulator & 0xffff) as u16
}

// Verifies an RRSIG signature over the prepared signed data with one
// DNSKEY. A `false` is a verification failure, never an error: the caller
// decides which error kind a failed set of candidates amounts to.
pub fn verify_signature(algorithm: u8, public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    match algorithm {
        RSASHA1 | RSASHA1_NSEC3_SHA1 => verify_rsa(
            &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
            public_key,
            message,
            signature,
        ),
        RSASHA256 => verify_rsa(
            &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
            public_key,
            message,
            signature,
        ),
        RSASHA512 => verify_rsa(
            &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
            public_key,
            message,
            signature,
        ),
        ECDSAP256SHA256 => verify_ecdsa(
            &signature::ECDSA_P256_SHA256_FIXED,
            public_key,
            message,
            signature,
        ),
        ECDSAP384SHA384 => verify_ecdsa(
            &signature::ECDSA_P384_SHA384_FIXED,
            public_key,
            message,
            signature,
        ),
        _ => false,
    }
}

// RFC 3110 wire layout for an RSA DNSKEY: a 1-byte exponent length (or a
// zero byte followed by a 2-byte length), the exponent, then the modulus.
fn verify_rsa(
    params: &'static signature::RsaParameters,
    public_key: &[u8],
    message: &[u8],
    sig: &[u8],
) -> bool {
    let (exponent, modulus) = match parse_rsa_key(public_key) {
        Some(parts) => parts,
        None => return false,
    };
    let components = RsaPublicKeyComponents {
        n: modulus,
        e: exponent,
    };
    components.verify(params, message, sig).is_ok()
}

fn parse_rsa_key(key: &[u8]) -> Option<(&[u8], &[u8])> {
    let first = *key.first()?;
    let (exp_len, exp_start) = if first == 0 {
        if key.len() < 3 {
            return None;
        }
        (u16::from_be_bytes([key[1], key[2]]) as usize, 3)
    } else {
        (first as usize, 1)
    };
    let exp_end = exp_start + exp_len;
    if exp_end >= key.len() {
        return None;
    }
    Some((&key[exp_start..exp_end], &key[exp_end..]))
}

// ECDSA DNSKEYs carry the raw curve point (x || y, RFC 6605 section 4);
// ring wants the uncompressed SEC1 form with its 0x04 prefix. Signatures
// are already the fixed-width r || s that ring's FIXED encodings expect.
fn verify_ecdsa(
    params: &'static signature::EcdsaVerificationAlgorithm,
    public_key: &[u8],
    message: &[u8],
    sig: &[u8],
) -> bool {
    let mut point = Vec::with_capacity(1 + public_key.len());
    point.push(0x04);
    point.extend_from_slice(public_key);
    UnparsedPublicKey::new(params, point).verify(message, sig).is_ok()
}

use super::super::protocol::DnsRecordData;
use super::crypto::{self, DigestType};

// A pinned root key digest in DS form, matching the operator trust-anchor
// files IANA publishes. The climb up the chain ends when a root KSK hashes
// to one of these; without that final comparison the whole chain would
// dangle from nothing.
#[derive(Clone, PartialEq, Debug)]
pub struct TrustAnchor {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: DigestType,
    // Lowercase hex of the DS digest
    pub digest: String,
}

impl TrustAnchor {
    // The IANA root anchors: KSK-2017 (20326) and its successor KSK-2024
    // (38696), both RSASHA256 with SHA-256 digests.
    // Source: https://data.iana.org/root-anchors/root-anchors.xml
    pub fn root_anchors() -> Vec<TrustAnchor> {
        vec![
            TrustAnchor {
                key_tag: 20326,
                algorithm: 8,
                digest_type: DigestType::Sha256,
                digest: "e06d44b80b8f1d39a95c0b0d7c65d08458e880409bbc683457104237c7f8ec8d"
                    .to_string(),
            },
            TrustAnchor {
                key_tag: 38696,
                algorithm: 8,
                digest_type: DigestType::Sha256,
                digest: "683d2d0acb8c9b712a1948b27f741219298d0a450d612c483af444a4c0fb2b16"
                    .to_string(),
            },
        ]
    }

    // True when `record` is a root-zone DNSKEY whose digest under this
    // anchor's algorithm reproduces the anchor.
    pub fn matches(&self, record: &DnsRecordData) -> bool {
        match record {
            DnsRecordData::DNSKEY {
                flags,
                protocol,
                algorithm,
                public_key,
            } => {
                if *algorithm != self.algorithm {
                    return false;
                }
                if crypto::key_tag(*flags, *protocol, *algorithm, public_key) != self.key_tag {
                    return false;
                }
                let digest = crypto::ds_digest(
                    &[],
                    *flags,
                    *protocol,
                    *algorithm,
                    public_key,
                    self.digest_type,
                );
                hex::encode(digest) == self.digest
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    #[test]
    fn built_in_anchor_recognizes_the_published_root_ksk() {
        let key = BASE64
            .decode(concat!(
                "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3",
                "+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kv",
                "ArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF",
                "0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+e",
                "oZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfd",
                "RUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwN",
                "R1AkUTV74bU="
            ))
            .expect("bad fixture");
        let record = DnsRecordData::DNSKEY {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: key,
        };
        let anchors = TrustAnchor::root_anchors();
        assert!(anchors[0].matches(&record));
        // KSK-2024 has a different tag and digest
        assert!(!anchors[1].matches(&record));
    }

    #[test]
    fn non_dnskey_records_never_match() {
        let anchors = TrustAnchor::root_anchors();
        assert!(!anchors[0].matches(&DnsRecordData::Other(vec![1, 2, 3])));
    }
}

use super::super::protocol::{names, DnsRecordData, DnsResourceRecord, DnsRRSet};

// RFC 4034 section 6 canonical form. Signer and verifier must reconstruct
// these bytes identically or nothing ever validates: owner names
// lowercased and uncompressed, records sorted by their canonical rdata
// treated as a left-justified unsigned octet sequence, duplicates dropped,
// and the RRSIG's original TTL substituted for whatever TTL the records
// arrived with.
pub fn canonical_rrset(rrset: &DnsRRSet, original_ttl: u32) -> Vec<u8> {
    let owner = names::canonical_name(&rrset.name);
    let rr_type = rrset.rr_type.to_u16();
    let class = rrset.class.to_u16();

    let mut rdatas: Vec<Vec<u8>> = rrset
        .records
        .iter()
        .map(|rr| rr.record.canonical_bytes())
        .collect();
    rdatas.sort();
    rdatas.dedup();

    let mut bytes = Vec::new();
    for rdata in &rdatas {
        bytes.extend_from_slice(&owner);
        bytes.extend_from_slice(&rr_type.to_be_bytes());
        bytes.extend_from_slice(&class.to_be_bytes());
        bytes.extend_from_slice(&original_ttl.to_be_bytes());
        bytes.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        bytes.extend_from_slice(rdata);
    }
    bytes
}

// RFC 4034 section 3.1.8.1: the signature is computed over the RRSIG rdata
// with the signature field left off, followed by the covered RRSet in
// canonical form. Returns None if `rrsig` isn't actually an RRSIG.
pub fn signed_data(rrsig: &DnsResourceRecord, rrset: &DnsRRSet) -> Option<Vec<u8>> {
    match &rrsig.record {
        DnsRecordData::RRSIG {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer_name,
            ..
        } => {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&type_covered.to_u16().to_be_bytes());
            bytes.push(*algorithm);
            bytes.push(*labels);
            bytes.extend_from_slice(&original_ttl.to_be_bytes());
            bytes.extend_from_slice(&expiration.to_be_bytes());
            bytes.extend_from_slice(&inception.to_be_bytes());
            bytes.extend_from_slice(&key_tag.to_be_bytes());
            bytes.extend_from_slice(&names::canonical_name(signer_name));
            bytes.extend_from_slice(&canonical_rrset(rrset, *original_ttl));
            Some(bytes)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::protocol::*;
    use std::net::Ipv4Addr;

    fn a_rrset(addresses: &[Ipv4Addr]) -> DnsRRSet {
        DnsRRSet {
            name: vec!["Example".to_string(), "COM".to_string()],
            rr_type: DnsRRType::A,
            class: DnsClass::IN,
            ttl: 120,
            records: addresses
                .iter()
                .map(|ip| DnsResourceRecord {
                    name: vec!["Example".to_string(), "COM".to_string()],
                    rr_type: DnsRRType::A,
                    class: DnsClass::IN,
                    ttl: 120,
                    record: DnsRecordData::A(*ip),
                })
                .collect(),
        }
    }

    #[test]
    fn permutations_canonicalize_identically() {
        let forward = a_rrset(&[
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(192, 168, 0, 1),
        ]);
        let shuffled = a_rrset(&[
            Ipv4Addr::new(192, 168, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 0, 0, 1),
        ]);
        assert_eq!(canonical_rrset(&forward, 300), canonical_rrset(&shuffled, 300));
    }

    #[test]
    fn canonical_form_substitutes_original_ttl_and_lowercases() {
        let rrset = a_rrset(&[Ipv4Addr::new(10, 0, 0, 1)]);
        let bytes = canonical_rrset(&rrset, 0x0102_0304);
        // owner: \x07example\x03com\x00, then type 1, class 1, the
        // substituted TTL, rdlength 4, and the address
        let mut expected = b"\x07example\x03com\x00".to_vec();
        expected.extend_from_slice(&[0x00, 0x01, 0x00, 0x01, 0x01, 0x02, 0x03, 0x04]);
        expected.extend_from_slice(&[0x00, 0x04, 10, 0, 0, 1]);
        assert_eq!(bytes, expected);
    }
}

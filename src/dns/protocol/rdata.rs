use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::{bigendians, names, DnsFormatError, DnsRRType};

// Record data as a tagged sum over the types the resolver interprets. The
// walker needs A/NS/CNAME (referrals and glue) and MX; the validator needs
// DS/RRSIG/DNSKEY; SOA shows up in authority sections and carries names
// that must be canonicalized, so it gets parsed too. Unfamiliar rdata is
// kept verbatim in `Other` and round-trips untouched.
#[derive(Clone, PartialEq, Debug)]
pub enum DnsRecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(Vec<String>),
    CNAME(Vec<String>),
    SOA {
        mname: Vec<String>,
        rname: Vec<String>,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    MX {
        preference: u16,
        exchange: Vec<String>,
    },
    // RFC 4034 section 5: a digest of a child zone's KSK, published in the
    // parent zone
    DS {
        key_tag: u16,
        algorithm: u8,
        digest_type: u8,
        digest: Vec<u8>,
    },
    // RFC 4034 section 3: the signature over one RRSet
    RRSIG {
        type_covered: DnsRRType,
        algorithm: u8,
        labels: u8,
        original_ttl: u32,
        expiration: u32,
        inception: u32,
        key_tag: u16,
        signer_name: Vec<String>,
        signature: Vec<u8>,
    },
    // RFC 4034 section 2: a zone public key; flags 257 marks a KSK (SEP
    // bit set), 256 a ZSK
    DNSKEY {
        flags: u16,
        protocol: u8,
        algorithm: u8,
        public_key: Vec<u8>,
    },
    Other(Vec<u8>),
}

impl DnsRecordData {
    // As with names, `packet_bytes` is the whole message: several rdata
    // layouts embed names which may point back into earlier bytes.
    pub fn from_bytes(
        packet_bytes: &[u8],
        pos: usize,
        rr_type: &DnsRRType,
        rd_length: u16,
    ) -> Result<(DnsRecordData, usize), DnsFormatError> {
        let rd_length = rd_length as usize;
        let end = pos + rd_length;
        if end > packet_bytes.len() {
            return Err(DnsFormatError::make_error(
                "Record data is longer than remainder of packet".to_string(),
            ));
        }
        let record_bytes = &packet_bytes[pos..end];
        let record = match rr_type {
            DnsRRType::A => {
                if rd_length != 4 {
                    return Err(DnsFormatError::make_error(format!(
                        "A record with rdata length {}",
                        rd_length
                    )));
                }
                DnsRecordData::A(Ipv4Addr::new(
                    record_bytes[0],
                    record_bytes[1],
                    record_bytes[2],
                    record_bytes[3],
                ))
            }
            DnsRRType::AAAA => {
                if rd_length != 16 {
                    return Err(DnsFormatError::make_error(format!(
                        "AAAA record with rdata length {}",
                        rd_length
                    )));
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(record_bytes);
                DnsRecordData::AAAA(Ipv6Addr::from(octets))
            }
            DnsRRType::NS => {
                let (name, _) = names::deserialize_name(packet_bytes, pos)?;
                DnsRecordData::NS(name)
            }
            DnsRRType::CNAME => {
                let (name, _) = names::deserialize_name(packet_bytes, pos)?;
                DnsRecordData::CNAME(name)
            }
            DnsRRType::SOA => {
                let (mname, after_mname) = names::deserialize_name(packet_bytes, pos)?;
                let (rname, after_rname) = names::deserialize_name(packet_bytes, after_mname)?;
                if after_rname + 20 > packet_bytes.len() {
                    return Err(DnsFormatError::make_error(
                        "SOA record data truncated".to_string(),
                    ));
                }
                DnsRecordData::SOA {
                    mname,
                    rname,
                    serial: bigendians::to_u32(&packet_bytes[after_rname..after_rname + 4]),
                    refresh: bigendians::to_u32(&packet_bytes[after_rname + 4..after_rname + 8]),
                    retry: bigendians::to_u32(&packet_bytes[after_rname + 8..after_rname + 12]),
                    expire: bigendians::to_u32(&packet_bytes[after_rname + 12..after_rname + 16]),
                    minimum: bigendians::to_u32(&packet_bytes[after_rname + 16..after_rname + 20]),
                }
            }
            DnsRRType::MX => {
                if rd_length < 3 {
                    return Err(DnsFormatError::make_error(
                        "MX record data truncated".to_string(),
                    ));
                }
                let preference = bigendians::to_u16(record_bytes);
                let (exchange, _) = names::deserialize_name(packet_bytes, pos + 2)?;
                DnsRecordData::MX {
                    preference,
                    exchange,
                }
            }
            DnsRRType::DS => {
                if rd_length < 4 {
                    return Err(DnsFormatError::make_error(
                        "DS record data truncated".to_string(),
                    ));
                }
                DnsRecordData::DS {
                    key_tag: bigendians::to_u16(&record_bytes[0..2]),
                    algorithm: record_bytes[2],
                    digest_type: record_bytes[3],
                    digest: record_bytes[4..].to_vec(),
                }
            }
            DnsRRType::RRSIG => {
                // 18 fixed bytes, then the signer name (never compressed
                // per RFC 4034, though we decode pointers anyway), then the
                // signature
                if rd_length < 19 {
                    return Err(DnsFormatError::make_error(
                        "RRSIG record data truncated".to_string(),
                    ));
                }
                let (signer_name, after_name) = names::deserialize_name(packet_bytes, pos + 18)?;
                if after_name > end {
                    return Err(DnsFormatError::make_error(
                        "RRSIG signer name overruns record data".to_string(),
                    ));
                }
                DnsRecordData::RRSIG {
                    type_covered: DnsRRType::from_u16(bigendians::to_u16(&record_bytes[0..2])),
                    algorithm: record_bytes[2],
                    labels: record_bytes[3],
                    original_ttl: bigendians::to_u32(&record_bytes[4..8]),
                    expiration: bigendians::to_u32(&record_bytes[8..12]),
                    inception: bigendians::to_u32(&record_bytes[12..16]),
                    key_tag: bigendians::to_u16(&record_bytes[16..18]),
                    signer_name,
                    signature: packet_bytes[after_name..end].to_vec(),
                }
            }
            DnsRRType::DNSKEY => {
                if rd_length < 4 {
                    return Err(DnsFormatError::make_error(
                        "DNSKEY record data truncated".to_string(),
                    ));
                }
                DnsRecordData::DNSKEY {
                    flags: bigendians::to_u16(&record_bytes[0..2]),
                    protocol: record_bytes[2],
                    algorithm: record_bytes[3],
                    public_key: record_bytes[4..].to_vec(),
                }
            }
            _ => DnsRecordData::Other(record_bytes.to_vec()),
        };
        Ok((record, end))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(false)
    }

    // RFC 4034 section 6.2 canonical rdata: names embedded in NS, CNAME,
    // SOA, and MX rdata are lowercased and never compressed. This is the
    // form records are sorted and signed in.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.serialize(true)
    }

    fn serialize(&self, canonical: bool) -> Vec<u8> {
        let write_name = |name: &[String]| {
            if canonical {
                names::canonical_name(name)
            } else {
                names::serialize_name(name)
            }
        };
        match &self {
            DnsRecordData::A(ipv4) => ipv4.octets().to_vec(),
            DnsRecordData::AAAA(ipv6) => ipv6.octets().to_vec(),
            DnsRecordData::NS(name) => write_name(name),
            DnsRecordData::CNAME(name) => write_name(name),
            DnsRecordData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                let mut bytes = write_name(mname);
                bytes.append(&mut write_name(rname));
                bytes.extend_from_slice(&bigendians::from_u32(*serial));
                bytes.extend_from_slice(&bigendians::from_u32(*refresh));
                bytes.extend_from_slice(&bigendians::from_u32(*retry));
                bytes.extend_from_slice(&bigendians::from_u32(*expire));
                bytes.extend_from_slice(&bigendians::from_u32(*minimum));
                bytes
            }
            DnsRecordData::MX {
                preference,
                exchange,
            } => {
                let mut bytes = bigendians::from_u16(*preference).to_vec();
                bytes.append(&mut write_name(exchange));
                bytes
            }
            DnsRecordData::DS {
                key_tag,
                algorithm,
                digest_type,
                digest,
            } => {
                let mut bytes = bigendians::from_u16(*key_tag).to_vec();
                bytes.push(*algorithm);
                bytes.push(*digest_type);
                bytes.extend_from_slice(digest);
                bytes
            }
            DnsRecordData::RRSIG {
                type_covered,
                algorithm,
                labels,
                original_ttl,
                expiration,
                inception,
                key_tag,
                signer_name,
                signature,
            } => {
                let mut bytes = bigendians::from_u16(type_covered.to_u16()).to_vec();
                bytes.push(*algorithm);
                bytes.push(*labels);
                bytes.extend_from_slice(&bigendians::from_u32(*original_ttl));
                bytes.extend_from_slice(&bigendians::from_u32(*expiration));
                bytes.extend_from_slice(&bigendians::from_u32(*inception));
                bytes.extend_from_slice(&bigendians::from_u16(*key_tag));
                // The signer name is always canonical in the signed form
                bytes.append(&mut write_name(signer_name));
                bytes.extend_from_slice(signature);
                bytes
            }
            DnsRecordData::DNSKEY {
                flags,
                protocol,
                algorithm,
                public_key,
            } => {
                let mut bytes = bigendians::from_u16(*flags).to_vec();
                bytes.push(*protocol);
                bytes.push(*algorithm);
                bytes.extend_from_slice(public_key);
                bytes
            }
            DnsRecordData::Other(record_bytes) => record_bytes.to_vec(),
        }
    }
}

// The presentation used in the ANSWER SECTION of the output block: just the
// rdata, dig-style.
impl fmt::Display for DnsRecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            DnsRecordData::A(ipv4) => write!(f, "{}", ipv4),
            DnsRecordData::AAAA(ipv6) => write!(f, "{}", ipv6),
            DnsRecordData::NS(name) => write!(f, "{}", names::display_name(name)),
            DnsRecordData::CNAME(name) => write!(f, "{}", names::display_name(name)),
            DnsRecordData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                names::display_name(mname),
                names::display_name(rname),
                serial,
                refresh,
                retry,
                expire,
                minimum
            ),
            DnsRecordData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, names::display_name(exchange)),
            DnsRecordData::DS {
                key_tag,
                algorithm,
                digest_type,
                digest,
            } => write!(
                f,
                "{} {} {} {}",
                key_tag,
                algorithm,
                digest_type,
                hex::encode_upper(digest)
            ),
            DnsRecordData::RRSIG {
                type_covered,
                algorithm,
                labels,
                original_ttl,
                expiration,
                inception,
                key_tag,
                signer_name,
                signature,
            } => write!(
                f,
                "{} {} {} {} {} {} {} {} {}",
                type_covered,
                algorithm,
                labels,
                original_ttl,
                expiration,
                inception,
                key_tag,
                names::display_name(signer_name),
                BASE64.encode(signature)
            ),
            DnsRecordData::DNSKEY {
                flags,
                protocol,
                algorithm,
                public_key,
            } => write!(
                f,
                "{} {} {} {}",
                flags,
                protocol,
                algorithm,
                BASE64.encode(public_key)
            ),
            DnsRecordData::Other(record_bytes) => {
                // RFC 3597 opaque presentation
                write!(f, "\\# {} {}", record_bytes.len(), hex::encode(record_bytes))
            }
        }
    }
}

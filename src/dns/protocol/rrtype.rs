use std::fmt;

// The record types this resolver actually interprets, which is the set the
// referral walk and the DNSSEC validator need. Everything else is carried
// through `Unknown` so an unfamiliar record survives a decode/encode round
// trip without being mangled or rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DnsRRType {
    // 1: A - IPv4 host address
    A,
    // 2: NS - authoritative nameserver
    NS,
    // 5: CNAME - canonical name for an alias
    CNAME,
    // 6: SOA - start of a zone of authority
    SOA,
    // 15: MX - mail exchange
    MX,
    // 16: TXT - text strings
    TXT,
    // 28: AAAA - IPv6 host address
    AAAA,
    // 41: OPT - EDNS pseudo-RR (RFC 6891); carries the DO bit
    OPT,
    // 43: DS - delegation signer (RFC 4034)
    DS,
    // 46: RRSIG - RRSet signature (RFC 4034)
    RRSIG,
    // 48: DNSKEY - zone public key (RFC 4034)
    DNSKEY,
    // Anything else, kept by numeric value
    Unknown(u16),
}

impl DnsRRType {
    pub fn from_u16(value: u16) -> DnsRRType {
        match value {
            1 => DnsRRType::A,
            2 => DnsRRType::NS,
            5 => DnsRRType::CNAME,
            6 => DnsRRType::SOA,
            15 => DnsRRType::MX,
            16 => DnsRRType::TXT,
            28 => DnsRRType::AAAA,
            41 => DnsRRType::OPT,
            43 => DnsRRType::DS,
            46 => DnsRRType::RRSIG,
            48 => DnsRRType::DNSKEY,
            other => DnsRRType::Unknown(other),
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            DnsRRType::A => 1,
            DnsRRType::NS => 2,
            DnsRRType::CNAME => 5,
            DnsRRType::SOA => 6,
            DnsRRType::MX => 15,
            DnsRRType::TXT => 16,
            DnsRRType::AAAA => 28,
            DnsRRType::OPT => 41,
            DnsRRType::DS => 43,
            DnsRRType::RRSIG => 46,
            DnsRRType::DNSKEY => 48,
            DnsRRType::Unknown(value) => *value,
        }
    }
}

impl fmt::Display for DnsRRType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DnsRRType::A => write!(f, "A"),
            DnsRRType::NS => write!(f, "NS"),
            DnsRRType::CNAME => write!(f, "CNAME"),
            DnsRRType::SOA => write!(f, "SOA"),
            DnsRRType::MX => write!(f, "MX"),
            DnsRRType::TXT => write!(f, "TXT"),
            DnsRRType::AAAA => write!(f, "AAAA"),
            DnsRRType::OPT => write!(f, "OPT"),
            DnsRRType::DS => write!(f, "DS"),
            DnsRRType::RRSIG => write!(f, "RRSIG"),
            DnsRRType::DNSKEY => write!(f, "DNSKEY"),
            // RFC 3597 presentation for types we don't know
            DnsRRType::Unknown(value) => write!(f, "TYPE{}", value),
        }
    }
}

use super::{DnsFormatError, DnsOpcode, DnsRCode};

// Bit positions of the single-bit flags inside the 16-bit flags word
// (RFC 1035 section 4.1.1). The opcode occupies bits 14-11 and the rcode
// bits 3-0; bit 6 is the reserved Z field and must stay clear.
const QR: u16 = 15;
const AA: u16 = 10;
const TC: u16 = 9;
const RD: u16 = 8;
const RA: u16 = 7;
const Z: u16 = 6;
const AD: u16 = 5;
const CD: u16 = 4;

#[derive(Clone, PartialEq, Debug)]
pub struct DnsFlags {
    // Query/Response: true if this is a response, false if it is a query
    pub qr_bit: bool,
    // The DNS operation being performed
    pub opcode: DnsOpcode,
    // Authoritative Answer: true if the responding server is the authority
    // for the queried domain
    pub aa_bit: bool,
    // TrunCation: true if the message was cut short for being too long;
    // the transport retries over TCP when it sees this
    pub tc_bit: bool,
    // Recursion Desired: we always send false, since the walker drives the
    // recursion itself
    pub rd_bit: bool,
    // Recursion Available: meaningful in responses only
    pub ra_bit: bool,
    // Authenticated Data (RFC 4035): the responder claims everything in the
    // response validated. We never take its word for it.
    pub ad_bit: bool,
    // Checking Disabled (RFC 4035): the querier will do its own validation
    pub cd_bit: bool,
    // Response status; ignored in queries
    pub rcode: DnsRCode,
}

impl DnsFlags {
    pub fn from_bytes(bytes: &[u8]) -> Result<DnsFlags, DnsFormatError> {
        let word = u16::from_be_bytes([bytes[0], bytes[1]]);
        let bit = |position: u16| word & (1 << position) != 0;

        if bit(Z) {
            return Err(DnsFormatError::make_error("Z bit was set".to_string()));
        }

        Ok(DnsFlags {
            qr_bit: bit(QR),
            opcode: DnsOpcode::from_u8(((word >> 11) & 0b1111) as u8),
            aa_bit: bit(AA),
            tc_bit: bit(TC),
            rd_bit: bit(RD),
            ra_bit: bit(RA),
            ad_bit: bit(AD),
            cd_bit: bit(CD),
            rcode: DnsRCode::from_u8((word & 0b1111) as u8),
        })
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        let mut word = ((self.opcode.to_u8() as u16) << 11) | (self.rcode.to_u8() as u16);
        let bits = [
            (self.qr_bit, QR),
            (self.aa_bit, AA),
            (self.tc_bit, TC),
            (self.rd_bit, RD),
            (self.ra_bit, RA),
            (self.ad_bit, AD),
            (self.cd_bit, CD),
        ];
        for (set, position) in bits {
            if set {
                word |= 1 << position;
            }
        }
        word.to_be_bytes()
    }

    // Flags for the queries this resolver sends: everything clear. RD stays
    // false because we iterate from the root ourselves.
    pub fn query_flags() -> DnsFlags {
        DnsFlags {
            qr_bit: false,
            opcode: DnsOpcode::Query,
            aa_bit: false,
            tc_bit: false,
            rd_bit: false,
            ra_bit: false,
            ad_bit: false,
            cd_bit: false,
            rcode: DnsRCode::NoError,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dns::protocol::flags::*;
    use crate::dns::protocol::*;

    #[test]
    fn response_bits_decode() {
        // An authoritative NXDOMAIN response: QR and AA set, rcode 3
        let flags = DnsFlags::from_bytes(&[0x84, 0x03]).expect("Unexpected error");
        assert!(flags.qr_bit);
        assert!(flags.aa_bit);
        assert_eq!(flags.opcode, DnsOpcode::Query);
        assert_eq!(flags.rcode, DnsRCode::NXDomain);
        assert!(!flags.tc_bit);
        assert!(!flags.rd_bit);
        assert!(!flags.ra_bit);

        // A truncated response from a recursive-capable server
        let flags = DnsFlags::from_bytes(&[0x82, 0x80]).expect("Unexpected error");
        assert!(flags.qr_bit);
        assert!(flags.tc_bit);
        assert!(flags.ra_bit);
        assert!(!flags.aa_bit);
        assert_eq!(flags.rcode, DnsRCode::NoError);
    }

    #[test]
    fn each_set_bit_lands_in_its_slot() {
        let mut flags = DnsFlags::query_flags();
        flags.rd_bit = true;
        flags.cd_bit = true;
        assert_eq!(flags.to_bytes(), [0x01, 0x10]);

        let mut truncated = DnsFlags::query_flags();
        truncated.qr_bit = true;
        truncated.tc_bit = true;
        truncated.ra_bit = true;
        assert_eq!(truncated.to_bytes(), [0x82, 0x80]);
    }

    #[test]
    fn unassigned_opcodes_and_rcodes_survive() {
        // Opcode 2 (a status request this resolver never sends) and rcode
        // 11 come back as their numeric values
        let flags = DnsFlags::from_bytes(&[0x90, 0x0b]).expect("Unexpected error");
        assert_eq!(flags.opcode, DnsOpcode::Unknown(2));
        assert_eq!(flags.rcode, DnsRCode::Unknown(11));
        let bytes = flags.to_bytes();
        assert_eq!(bytes, [0x90, 0x0b]);
    }

    #[test]
    fn reserved_z_bit_is_rejected() {
        assert!(DnsFlags::from_bytes(&[0x00, 0x40]).is_err());
    }

    #[test]
    fn flags_round_trip() {
        let flags = DnsFlags::query_flags();
        let bytes = flags.to_bytes();
        assert_eq!(bytes, [0x00u8, 0x00u8]);
        let parsed = DnsFlags::from_bytes(&bytes).expect("Unexpected error");
        assert_eq!(flags, parsed);
    }
}

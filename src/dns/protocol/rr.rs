use super::{bigendians, names, DnsClass, DnsFormatError, DnsRecordData, DnsRRType};

#[derive(Clone, PartialEq, Debug)]
pub struct DnsResourceRecord {
    pub name: Vec<String>,
    pub rr_type: DnsRRType,
    pub class: DnsClass,
    // How long the client may cache this answer; 0 means don't. RFC 1035
    // calls this signed in places, corrected to unsigned in errata.
    pub ttl: u32,
    pub record: DnsRecordData,
}

impl DnsResourceRecord {
    pub fn from_bytes(
        packet_bytes: &[u8],
        pos: usize,
    ) -> Result<(DnsResourceRecord, usize), DnsFormatError> {
        let (name, after_name) = names::deserialize_name(packet_bytes, pos)?;
        if after_name + 10 > packet_bytes.len() {
            return Err(DnsFormatError::make_error(
                "End of packet parsing resource record".to_string(),
            ));
        }
        let rrtype_num = bigendians::to_u16(&packet_bytes[after_name..after_name + 2]);
        let class_num = bigendians::to_u16(&packet_bytes[after_name + 2..after_name + 4]);
        let ttl = bigendians::to_u32(&packet_bytes[after_name + 4..after_name + 8]);
        let rd_length = bigendians::to_u16(&packet_bytes[after_name + 8..after_name + 10]);
        let rdata_pos = after_name + 10;

        let rr_type = DnsRRType::from_u16(rrtype_num);
        // OPT pseudo-RRs (RFC 6891) overload the class field with the
        // sender's UDP payload size, so it can hold any 16-bit value
        let class = if rr_type == DnsRRType::OPT {
            DnsClass::EdnsPayloadSize(class_num)
        } else {
            DnsClass::from_u16(class_num)
        };

        let (record, end) = DnsRecordData::from_bytes(packet_bytes, rdata_pos, &rr_type, rd_length)?;

        let rr = DnsResourceRecord {
            name,
            rr_type,
            class,
            ttl,
            record,
        };
        Ok((rr, end))
    }

    // Serializes without compression. The rdata length is recomputed from
    // the serialized rdata rather than echoed from the parse, since
    // decompressed names can change it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.append(&mut names::serialize_name(&self.name));
        bytes.extend_from_slice(&bigendians::from_u16(self.rr_type.to_u16()));
        bytes.extend_from_slice(&bigendians::from_u16(self.class.to_u16()));
        bytes.extend_from_slice(&bigendians::from_u32(self.ttl));
        let rdata = self.record.to_bytes();
        bytes.extend_from_slice(&bigendians::from_u16(rdata.len() as u16));
        bytes.extend_from_slice(&rdata);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use crate::dns::protocol::*;
    use std::net::Ipv4Addr;

    #[test]
    fn a_record_round_trips() {
        let rr = DnsResourceRecord {
            name: vec!["example".to_string(), "com".to_string()],
            rr_type: DnsRRType::A,
            class: DnsClass::IN,
            ttl: 300,
            record: DnsRecordData::A(Ipv4Addr::new(93, 184, 216, 34)),
        };
        let bytes = rr.to_bytes();
        let (parsed, end) = DnsResourceRecord::from_bytes(&bytes, 0).expect("Parse failed");
        assert_eq!(parsed, rr);
        assert_eq!(end, bytes.len());
    }

    #[test]
    fn opt_pseudo_rr_class_is_payload_size() {
        let rr = DnsResourceRecord {
            name: vec![],
            rr_type: DnsRRType::OPT,
            class: DnsClass::EdnsPayloadSize(4096),
            ttl: 0x0000_8000,
            record: DnsRecordData::Other(vec![]),
        };
        let bytes = rr.to_bytes();
        let (parsed, _) = DnsResourceRecord::from_bytes(&bytes, 0).expect("Parse failed");
        assert_eq!(parsed.class, DnsClass::EdnsPayloadSize(4096));
        assert_eq!(parsed.ttl, 0x0000_8000);
    }
}

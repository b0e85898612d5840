use super::{bigendians, names, DnsClass, DnsFormatError, DnsRRType};

#[derive(Clone, PartialEq, Debug)]
pub struct DnsQuestion {
    // The QNAME as a vector of labels, so "blog.example.com." is
    // `vec!["blog", "example", "com"]`
    pub qname: Vec<String>,
    // The type of records desired; some values (like ANY) are only legal
    // in questions
    pub qtype: DnsRRType,
    // Nearly always IN
    pub qclass: DnsClass,
}

impl DnsQuestion {
    pub fn from_bytes(
        packet_bytes: &[u8],
        pos: usize,
    ) -> Result<(DnsQuestion, usize), DnsFormatError> {
        let (qname, after_name) = names::deserialize_name(packet_bytes, pos)?;
        if after_name + 4 > packet_bytes.len() {
            return Err(DnsFormatError::make_error(
                "End of packet parsing question".to_string(),
            ));
        }
        let qtype_num = bigendians::to_u16(&packet_bytes[after_name..after_name + 2]);
        let qclass_num = bigendians::to_u16(&packet_bytes[after_name + 2..after_name + 4]);

        let qtype = DnsRRType::from_u16(qtype_num);
        let qclass = DnsClass::from_u16(qclass_num);

        let question = DnsQuestion {
            qname,
            qtype,
            qclass,
        };
        Ok((question, after_name + 4))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = names::serialize_name(&self.qname);
        bytes.extend_from_slice(&bigendians::from_u16(self.qtype.to_u16()));
        bytes.extend_from_slice(&bigendians::from_u16(self.qclass.to_u16()));
        bytes
    }
}

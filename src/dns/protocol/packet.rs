use super::{
    bigendians, DnsClass, DnsFlags, DnsFormatError, DnsQuestion, DnsRecordData,
    DnsResourceRecord, DnsRRType,
};

#[derive(Clone, PartialEq, Debug)]
pub struct DnsPacket {
    // The transaction id is arbitrary in a query and copied into the reply
    // so responses can be matched to their questions
    pub id: u16,
    pub flags: DnsFlags,
    // The four counted sections follow the 12-byte header in order:
    // question (QDCOUNT), answer (ANCOUNT), authority (NSCOUNT),
    // additional (ARCOUNT)
    pub questions: Vec<DnsQuestion>,
    pub answers: Vec<DnsResourceRecord>,
    pub nameservers: Vec<DnsResourceRecord>,
    pub addl_recs: Vec<DnsResourceRecord>,
}

impl DnsPacket {
    pub fn from_bytes(bytes: &[u8]) -> Result<DnsPacket, DnsFormatError> {
        if bytes.len() < 12 {
            return Err(DnsFormatError::make_error(
                "Packet shorter than the DNS header".to_string(),
            ));
        }
        let id = bigendians::to_u16(&bytes[0..2]);
        let flags = DnsFlags::from_bytes(&bytes[2..4])?;
        let qd_count = bigendians::to_u16(&bytes[4..6]);
        let an_count = bigendians::to_u16(&bytes[6..8]);
        let ns_count = bigendians::to_u16(&bytes[8..10]);
        let ar_count = bigendians::to_u16(&bytes[10..12]);

        let mut questions: Vec<DnsQuestion> = Vec::new();
        let mut answers: Vec<DnsResourceRecord> = Vec::new();
        let mut nameservers: Vec<DnsResourceRecord> = Vec::new();
        let mut addl_recs: Vec<DnsResourceRecord> = Vec::new();

        // The sections are variable length thanks to name encoding, so the
        // counts drive a single forward pass
        let mut pos: usize = 12;
        for _ in 0..qd_count {
            let (question, new_pos) = DnsQuestion::from_bytes(bytes, pos)?;
            pos = new_pos;
            questions.push(question);
        }
        for _ in 0..an_count {
            let (rr, new_pos) = DnsResourceRecord::from_bytes(bytes, pos)?;
            pos = new_pos;
            answers.push(rr);
        }
        for _ in 0..ns_count {
            let (rr, new_pos) = DnsResourceRecord::from_bytes(bytes, pos)?;
            pos = new_pos;
            nameservers.push(rr);
        }
        for _ in 0..ar_count {
            let (rr, new_pos) = DnsResourceRecord::from_bytes(bytes, pos)?;
            pos = new_pos;
            addl_recs.push(rr);
        }

        Ok(DnsPacket {
            id,
            flags,
            questions,
            answers,
            nameservers,
            addl_recs,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::new();
        bytes.extend_from_slice(&bigendians::from_u16(self.id));
        bytes.extend_from_slice(&self.flags.to_bytes());
        bytes.extend_from_slice(&bigendians::from_u16(self.questions.len() as u16));
        bytes.extend_from_slice(&bigendians::from_u16(self.answers.len() as u16));
        bytes.extend_from_slice(&bigendians::from_u16(self.nameservers.len() as u16));
        bytes.extend_from_slice(&bigendians::from_u16(self.addl_recs.len() as u16));

        for question in &self.questions {
            bytes.extend_from_slice(&question.to_bytes());
        }
        for answer in &self.answers {
            bytes.extend_from_slice(&answer.to_bytes());
        }
        for nameserver in &self.nameservers {
            bytes.extend_from_slice(&nameserver.to_bytes());
        }
        for addl_rec in &self.addl_recs {
            bytes.extend_from_slice(&addl_rec.to_bytes());
        }

        bytes
    }

    // Builds the one-question query the resolver sends at every hop. RD
    // stays clear because the walker performs the recursion itself; in
    // DNSSEC mode an OPT pseudo-RR advertises a 4096-byte payload and sets
    // the DO bit (the high bit of the OPT TTL field, RFC 4035 section 3).
    pub fn query(id: u16, qname: Vec<String>, qtype: DnsRRType, dnssec_ok: bool) -> DnsPacket {
        let question = DnsQuestion {
            qname,
            qtype,
            qclass: DnsClass::IN,
        };
        let mut addl_recs = Vec::new();
        if dnssec_ok {
            addl_recs.push(DnsResourceRecord {
                name: vec![],
                rr_type: DnsRRType::OPT,
                class: DnsClass::EdnsPayloadSize(4096),
                ttl: 0x0000_8000,
                record: DnsRecordData::Other(vec![]),
            });
        }
        DnsPacket {
            id,
            flags: DnsFlags::query_flags(),
            questions: vec![question],
            answers: vec![],
            nameservers: vec![],
            addl_recs,
        }
    }
}

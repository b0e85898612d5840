use super::{names, DnsClass, DnsRecordData, DnsResourceRecord, DnsRRType};

// An RRSet is the unit DNSSEC signatures cover: every record in a message
// that shares an owner name, class, and type (RFC 4034 covers sets, not
// individual records). Grouping preserves arrival order and compares owner
// names case-insensitively.
#[derive(Clone, PartialEq, Debug)]
pub struct DnsRRSet {
    pub name: Vec<String>,
    pub rr_type: DnsRRType,
    pub class: DnsClass,
    pub ttl: u32,
    pub records: Vec<DnsResourceRecord>,
}

impl DnsRRSet {
    // Groups records by (owner, type). RRSIGs are signatures over sets, not
    // set members, and OPT is header extension, so both are skipped; pull
    // signatures with `signatures` instead.
    pub fn group(records: &[DnsResourceRecord]) -> Vec<DnsRRSet> {
        let mut sets: Vec<DnsRRSet> = Vec::new();
        for rr in records {
            if rr.rr_type == DnsRRType::RRSIG || rr.rr_type == DnsRRType::OPT {
                continue;
            }
            let existing = sets
                .iter_mut()
                .find(|set| set.rr_type == rr.rr_type && names::names_equal(&set.name, &rr.name));
            match existing {
                Some(set) => set.records.push(rr.clone()),
                None => sets.push(DnsRRSet {
                    name: rr.name.clone(),
                    rr_type: rr.rr_type,
                    class: rr.class.clone(),
                    ttl: rr.ttl,
                    records: vec![rr.clone()],
                }),
            }
        }
        sets
    }

    pub fn signatures(records: &[DnsResourceRecord]) -> Vec<DnsResourceRecord> {
        records
            .iter()
            .filter(|rr| rr.rr_type == DnsRRType::RRSIG)
            .cloned()
            .collect()
    }

    // The RRSIG covering this set, if `rrsig` is one: owner names must
    // match and the signature's type-covered field must name our type.
    pub fn covered_by(&self, rrsig: &DnsResourceRecord) -> bool {
        if !names::names_equal(&self.name, &rrsig.name) {
            return false;
        }
        match &rrsig.record {
            DnsRecordData::RRSIG { type_covered, .. } => *type_covered == self.rr_type,
            _ => false,
        }
    }
}

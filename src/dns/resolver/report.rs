use std::fmt;

use super::super::protocol::DnsResourceRecord;

// The answer to one resolution, in the shape the CLI prints it. Everything
// needed for the output block is captured here so callers can also pick the
// records apart programmatically.
#[derive(Clone, PartialEq, Debug)]
pub struct Resolution {
    // Normalized hostname, with the trailing dot
    pub qname: String,
    pub qtype: String,
    pub records: Vec<DnsResourceRecord>,
    pub query_time_ms: u128,
    // "Sat Aug 01 12:34:56 2026"
    pub when: String,
    // Wire size of the final authoritative response
    pub msg_size: usize,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "QUESTION SECTION:")?;
        writeln!(f, "{}\t\tIN\t{}", self.qname, self.qtype)?;
        writeln!(f)?;
        writeln!(f, "ANSWER SECTION:")?;
        for record in &self.records {
            writeln!(f, "{}", record.record)?;
        }
        writeln!(f)?;
        writeln!(f, "Query time: {} msec", self.query_time_ms)?;
        writeln!(f, "WHEN: {}", self.when)?;
        write!(f, "MSG SIZE rcvd: {}", self.msg_size)
    }
}

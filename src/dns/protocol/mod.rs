mod bigendians;
mod class;
mod errors;
mod flags;
pub mod names;
mod opcode;
mod packet;
mod question;
mod rcode;
mod rdata;
mod rr;
mod rrset;
mod rrtype;

// Reference RFC 1035 (https://tools.ietf.org/html/rfc1035) and the pile of
// RFCs that amended it; RFC 4034 adds the DNSSEC record types handled here.
// See: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml
pub use class::DnsClass;
pub use errors::DnsFormatError;
pub use flags::DnsFlags;
pub use opcode::DnsOpcode;
pub use packet::DnsPacket;
pub use question::DnsQuestion;
pub use rcode::DnsRCode;
pub use rdata::DnsRecordData;
pub use rr::DnsResourceRecord;
pub use rrset::DnsRRSet;
pub use rrtype::DnsRRType;

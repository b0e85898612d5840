// Response codes. The walker only ever branches on "NoError or not";
// anything else just advances to the next candidate server. The named
// variants keep diagnostics readable and cover what nameservers actually
// send a stub resolver. The dynamic-update and stateful-operation codes
// (6-11) stay numeric.
#[derive(Clone, PartialEq, Debug)]
pub enum DnsRCode {
    // 0: query completed
    NoError,
    // 1: server couldn't interpret the query
    FormError,
    // 2: server-side failure
    ServFail,
    // 3: the domain does not exist
    NXDomain,
    // 4: operation not implemented by this server
    NotImp,
    // 5: refused for policy reasons
    Refused,
    Unknown(u8),
}

impl DnsRCode {
    pub fn from_u8(value: u8) -> DnsRCode {
        match value & 0b1111 {
            0 => DnsRCode::NoError,
            1 => DnsRCode::FormError,
            2 => DnsRCode::ServFail,
            3 => DnsRCode::NXDomain,
            4 => DnsRCode::NotImp,
            5 => DnsRCode::Refused,
            other => DnsRCode::Unknown(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            DnsRCode::NoError => 0,
            DnsRCode::FormError => 1,
            DnsRCode::ServFail => 2,
            DnsRCode::NXDomain => 3,
            DnsRCode::NotImp => 4,
            DnsRCode::Refused => 5,
            DnsRCode::Unknown(value) => value & 0b1111,
        }
    }
}

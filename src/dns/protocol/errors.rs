use std::error::Error;
use std::fmt;

// Raised whenever a DNS message can't be decoded from (or encoded to) its
// wire representation. These never leave the transport layer: a response we
// can't parse just moves the walker on to the next candidate server.
#[derive(Clone, PartialEq, Debug)]
pub struct DnsFormatError {
    message: String,
}

impl DnsFormatError {
    pub fn make_error(message: String) -> DnsFormatError {
        DnsFormatError { message }
    }

    pub fn get_message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DnsFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DNS packet had format error: {}", self.message)
    }
}

impl Error for DnsFormatError {}

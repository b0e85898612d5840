use thiserror::Error;

// The terminal conditions a resolution can end in. They are deliberately a
// sum type rather than a pile of boxed errors: the validator's control flow
// reads directly off which variant fired, and nothing here is retried at
// the resolve level. Local recovery (trying the next candidate server,
// falling back from UDP to TCP on truncation) happens inside the transport
// and never surfaces.
#[derive(Clone, PartialEq, Error, Debug)]
pub enum ResolveError {
    // Requested type outside {A, NS, MX}; raised before any network I/O
    #[error("{0} is not a valid resource record type")]
    ResourceRecordType(String),

    // A hop ran out of candidate servers without a NOERROR response
    #[error("cannot find resource records for {zone} in any of the following nameservers: {servers:?}")]
    Resolution { zone: String, servers: Vec<String> },

    // The authoritative server answered the DNSKEY query with an empty
    // answer section
    #[error("DNSSEC not enabled for '{0}'")]
    NoDnssecSupport(String),

    // No DS digest published by the parent matched any KSK at this cut
    #[error("KSK verification for '{0}' failed")]
    KskVerification(String),

    // The DNSKEY RRSet's own signature did not verify under its KSK
    #[error("ZSK verification for '{0}' failed")]
    ZskVerification(String),

    // A data RRSet's signature did not verify with any zone key
    #[error("RRSet verification for '{0}' failed")]
    RrsetVerification(String),

    // The caller's cancellation flag was observed between I/O operations
    #[error("resolution cancelled")]
    Cancelled,
}

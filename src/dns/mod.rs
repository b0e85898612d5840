// An iterative DNS resolver: the wire codec lives in `protocol`, the
// socket plumbing in `transport`, the root-to-authoritative referral walk
// in `resolver`, and the chain-of-trust validation in `dnssec`.
//
// Reference RFC 1035 (https://tools.ietf.org/html/rfc1035) for the message
// format, RFC 4034/4035 for DNSSEC records and canonical form, and RFC 6605
// for the ECDSA algorithms.

pub mod dnssec;
pub mod errors;
pub mod protocol;
pub mod resolver;
pub mod transport;

pub use errors::ResolveError;
pub use resolver::{Resolution, Resolver, ResolverConfig};

// DNSSEC chain-of-trust validation. The walker hands over its redirection
// history; this module replays DNSKEY and DS queries against those same
// servers to prove every key-signing key up the chain against its parent's
// DS digest, ending at the built-in root anchors, then verifies the zone's
// own keys and finally the answer RRSets.

mod anchor;
pub mod canonical;
pub mod crypto;

pub use anchor::TrustAnchor;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use super::errors::ResolveError;
use super::protocol::{
    names, DnsPacket, DnsRecordData, DnsResourceRecord, DnsRRSet, DnsRRType,
};
use super::resolver::Hop;
use super::transport::{Exchange, Nameserver, Protocol, Transport};

// A DNSKEY with flags 257 has the SEP bit set and is the zone's
// key-signing key; 256 marks a zone-signing key.
const KSK_FLAGS: u16 = 257;

pub struct ChainValidator<'a, E: Exchange> {
    transport: &'a Transport<E>,
    anchors: &'a [TrustAnchor],
}

impl<'a, E: Exchange> ChainValidator<'a, E> {
    pub fn new(transport: &'a Transport<E>, anchors: &'a [TrustAnchor]) -> ChainValidator<'a, E> {
        ChainValidator { transport, anchors }
    }

    // Validates `response` (the authoritative answer for `zone`) against
    // the chain of trust along `history`. The ordering matters: the
    // KSK-at-each-cut climb is the only step that needs the ordered
    // parental state in the history, so it runs first; the ZSK and data
    // checks are local to the terminal zone and run last.
    pub fn check_trust(
        &self,
        zone: &[String],
        response: &DnsPacket,
        history: &[Hop],
    ) -> Result<(), ResolveError> {
        let zone_display = names::display_name(zone);
        // Consecutive hops that queried the same zone (the walker's final
        // A/MX fetch) collapse into one cut; what's left is one entry per
        // zone cut, root first.
        let cuts = collapse_cuts(history);
        let authoritative = match cuts.last() {
            Some(hop) => hop,
            None => return Err(ResolveError::NoDnssecSupport(zone_display)),
        };

        // Step A: the authoritative server's own DNSKEY RRSet. An empty
        // answer section means the zone isn't signed at all.
        let authoritative_keys = self.fetch_dnskey(zone, authoritative.server)?;
        if authoritative_keys.answers.is_empty() {
            return Err(ResolveError::NoDnssecSupport(zone_display));
        }

        // Step B: climb from the leaf cut to the root. At each cut the
        // child's KSKs must hash to a DS digest published by the parent;
        // one matching (DS, KSK) pair proves the cut.
        let mut current_keys = authoritative_keys.clone();
        for i in (1..cuts.len()).rev() {
            let child = cuts[i];
            let parent = cuts[i - 1];
            let child_display = names::display_name(&child.zone);
            // The deepest cut's delegation owner is the zone itself; DS
            // queries use the cut's name, not the full query name
            let ds_response = self.fetch(&child.zone, DnsRRType::DS, parent.server)?;
            if !self.cut_is_proven(&child.zone, &current_keys, &ds_response) {
                return Err(ResolveError::KskVerification(child_display));
            }
            debug!(zone = %child_display, parent = %parent.server, "Zone cut proven");
            current_keys = self.fetch_dnskey(&parent.zone, parent.server)?;
        }

        // The climb ends at the root: its KSKs must reproduce one of the
        // built-in anchor digests, or the chain hangs from nothing.
        let root_proven = ksks(&current_keys)
            .iter()
            .any(|rr| self.anchors.iter().any(|anchor| anchor.matches(&rr.record)));
        if !root_proven {
            return Err(ResolveError::KskVerification(".".to_string()));
        }

        // Step C: the authoritative DNSKEY RRSet must be signed by its own
        // KSK (the one the climb just proved)
        if !self.dnskey_rrset_verifies(&authoritative_keys) {
            return Err(ResolveError::ZskVerification(zone_display));
        }

        // Step D: every signed RRSet in the answer verifies with a zone key
        if !self.response_rrsets_verify(response, &authoritative_keys) {
            return Err(ResolveError::RrsetVerification(zone_display));
        }
        Ok(())
    }

    // DNSKEY and DS lookups go over TCP with DO set: over UDP the
    // accompanying RRSIGs routinely fall victim to truncation.
    fn fetch(
        &self,
        zone: &[String],
        qtype: DnsRRType,
        server: std::net::Ipv4Addr,
    ) -> Result<DnsPacket, ResolveError> {
        let query = DnsPacket::query(rand::random(), zone.to_vec(), qtype, true);
        let response = self.transport.query(
            &names::display_name(zone),
            &query,
            &[Nameserver::Ip(server)],
            Protocol::Tcp,
        )?;
        Ok(response.packet)
    }

    fn fetch_dnskey(
        &self,
        zone: &[String],
        server: std::net::Ipv4Addr,
    ) -> Result<DnsPacket, ResolveError> {
        self.fetch(zone, DnsRRType::DNSKEY, server)
    }

    // Whether any DS entry the parent published matches any of the child's
    // KSKs. A single match suffices: parents publish one DS per digest
    // algorithm for the same key, and requiring all of them to agree would
    // reject perfectly valid zones.
    fn cut_is_proven(
        &self,
        child_zone: &[String],
        child_keys: &DnsPacket,
        ds_response: &DnsPacket,
    ) -> bool {
        let candidate_ksks = ksks(child_keys);
        if candidate_ksks.is_empty() {
            return false;
        }
        // DS records can arrive in any section of the reply
        let ds_records = ds_response
            .answers
            .iter()
            .chain(ds_response.nameservers.iter())
            .chain(ds_response.addl_recs.iter())
            .filter_map(|rr| match &rr.record {
                DnsRecordData::DS {
                    key_tag,
                    algorithm,
                    digest_type,
                    digest,
                } => Some((*key_tag, *algorithm, *digest_type, digest)),
                _ => None,
            });

        for (_key_tag, _algorithm, digest_type, digest) in ds_records {
            let digest_type = match crypto::DigestType::from_u8(digest_type) {
                Some(dt) => dt,
                // Digest types we can't compute prove nothing either way
                None => continue,
            };
            for ksk in &candidate_ksks {
                if let DnsRecordData::DNSKEY {
                    flags,
                    protocol,
                    algorithm,
                    public_key,
                } = &ksk.record
                {
                    let computed = crypto::ds_digest(
                        child_zone,
                        *flags,
                        *protocol,
                        *algorithm,
                        public_key,
                        digest_type,
                    );
                    if &computed == digest {
                        return true;
                    }
                }
            }
        }
        false
    }

    // Step C: the DNSKEY RRSet carries its own RRSIG, made with the KSK.
    fn dnskey_rrset_verifies(&self, dnskey_response: &DnsPacket) -> bool {
        let sets = DnsRRSet::group(&dnskey_response.answers);
        let keyset = match sets.iter().find(|set| set.rr_type == DnsRRType::DNSKEY) {
            Some(set) => set,
            None => return false,
        };
        let signatures = DnsRRSet::signatures(&dnskey_response.answers);
        signatures
            .iter()
            .filter(|sig| keyset.covered_by(sig))
            .any(|sig| self.rrsig_verifies(sig, keyset, &keyset.records))
    }

    // Step D: match every RRSIG in the answer and authority sections to
    // the RRSet it covers and verify it with the zone keys fetched in Step
    // A. A signature with no matching set, or a set whose signature fails
    // under every candidate key, fails the whole response.
    fn response_rrsets_verify(&self, response: &DnsPacket, dnskey_response: &DnsPacket) -> bool {
        let records: Vec<DnsResourceRecord> = response
            .answers
            .iter()
            .chain(response.nameservers.iter())
            .cloned()
            .collect();
        let sets = DnsRRSet::group(&records);
        let signatures = DnsRRSet::signatures(&records);
        let zone_keys: Vec<DnsResourceRecord> = dnskey_response
            .answers
            .iter()
            .filter(|rr| rr.rr_type == DnsRRType::DNSKEY)
            .cloned()
            .collect();

        for sig in &signatures {
            let covered = match sets.iter().find(|set| set.covered_by(sig)) {
                Some(set) => set,
                None => return false,
            };
            if !self.rrsig_verifies(sig, covered, &zone_keys) {
                return false;
            }
        }
        true
    }

    // One RRSIG against one RRSet: the signature must be inside its
    // validity window, and some key with the right tag and algorithm must
    // verify the canonical signed data.
    fn rrsig_verifies(
        &self,
        sig: &DnsResourceRecord,
        rrset: &DnsRRSet,
        keys: &[DnsResourceRecord],
    ) -> bool {
        let (sig_key_tag, sig_algorithm, signature) = match &sig.record {
            DnsRecordData::RRSIG {
                key_tag,
                algorithm,
                expiration,
                inception,
                signature,
                ..
            } => {
                if !timestamps_valid(*inception, *expiration) {
                    return false;
                }
                (*key_tag, *algorithm, signature)
            }
            _ => return false,
        };
        let message = match canonical::signed_data(sig, rrset) {
            Some(message) => message,
            None => return false,
        };
        keys.iter().any(|key| match &key.record {
            DnsRecordData::DNSKEY {
                flags,
                protocol,
                algorithm,
                public_key,
            } => {
                *algorithm == sig_algorithm
                    && crypto::key_tag(*flags, *protocol, *algorithm, public_key) == sig_key_tag
                    && crypto::verify_signature(*algorithm, public_key, &message, signature)
            }
            _ => false,
        })
    }
}

fn ksks(packet: &DnsPacket) -> Vec<&DnsResourceRecord> {
    packet
        .answers
        .iter()
        .filter(|rr| match &rr.record {
            DnsRecordData::DNSKEY { flags, .. } => *flags == KSK_FLAGS,
            _ => false,
        })
        .collect()
}

// Drops hops that re-queried the same zone, leaving one entry per cut.
fn collapse_cuts(history: &[Hop]) -> Vec<&Hop> {
    let mut cuts: Vec<&Hop> = Vec::new();
    for hop in history {
        if let Some(last) = cuts.last_mut() {
            if names::names_equal(&last.zone, &hop.zone) {
                // Same zone, newer server: the later hop is the one that
                // actually answered
                *last = hop;
                continue;
            }
        }
        cuts.push(hop);
    }
    cuts
}

fn timestamps_valid(inception: u32, expiration: u32) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    inception <= now && now <= expiration
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn consecutive_same_zone_hops_collapse() {
        let history = vec![
            Hop {
                server: Ipv4Addr::new(198, 41, 0, 4),
                zone: vec![],
            },
            Hop {
                server: Ipv4Addr::new(192, 5, 6, 30),
                zone: vec!["com".to_string()],
            },
            Hop {
                server: Ipv4Addr::new(10, 0, 0, 1),
                zone: vec!["example".to_string(), "com".to_string()],
            },
            // the walker's final fetch hits the same zone again
            Hop {
                server: Ipv4Addr::new(10, 0, 0, 2),
                zone: vec!["example".to_string(), "com".to_string()],
            },
        ];
        let cuts = collapse_cuts(&history);
        assert_eq!(cuts.len(), 3);
        // the collapsed cut keeps the later server
        assert_eq!(cuts[2].server, Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn expired_windows_are_rejected() {
        assert!(!timestamps_valid(0, 1));
        assert!(timestamps_valid(0, u32::MAX));
    }
}

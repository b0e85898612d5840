use super::DnsFormatError;

// Functions for handling DNS names. A name is kept as a vector of label
// strings ("blog.example.com." becomes `vec!["blog", "example", "com"]`);
// the empty vector is the root. Comparisons are case-insensitive per RFC
// 1035 section 2.3.3, and the canonical (RFC 4034 section 6.1) form used
// for DNSSEC digests lowercases every label.

// Upper bound on compression pointer jumps while decoding a single name.
// No real message chains anywhere near this many pointers; hitting the cap
// means the pointers form a cycle.
const MAX_POINTER_JUMPS: usize = 64;

// Decode a name starting at `start`. Unlike the other decoders, `bytes`
// here must be the WHOLE packet, because compression pointers refer back to
// earlier offsets in the message. Returns the labels and the position just
// past the name in the original (unjumped) byte stream.
pub fn deserialize_name(
    bytes: &[u8],
    start: usize,
) -> Result<(Vec<String>, usize), DnsFormatError> {
    let mut labels = Vec::new();
    let mut pos = start;
    // Where the caller resumes reading: fixed by the first pointer we take.
    let mut resume_at = None;
    let mut jumps = 0;
    loop {
        if pos >= bytes.len() {
            return Err(DnsFormatError::make_error(
                "Reached end of packet while parsing name".to_string(),
            ));
        }
        let len_byte = bytes[pos];
        // A length byte starting with bits 11 is a compression pointer,
        // bits 00 a literal label length. The other two patterns are
        // unassigned (RFC 6891 proposed one; nothing uses it).
        match (len_byte >> 6) & 0b11u8 {
            0b11 => {
                if pos + 1 >= bytes.len() {
                    return Err(DnsFormatError::make_error(
                        "Unexpected end of packet at label pointer".to_string(),
                    ));
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(DnsFormatError::make_error(
                        "Label compression pointers form a loop".to_string(),
                    ));
                }
                if resume_at.is_none() {
                    resume_at = Some(pos + 2);
                }
                // Pointer target is the low 6 bits of this byte plus all of
                // the next one.
                pos = (((len_byte & 0b111111u8) as usize) << 8) + (bytes[pos + 1] as usize);
            }
            0b00 => {
                let length = len_byte as usize;
                pos += 1;
                if length == 0 {
                    // The root label terminates the name
                    break;
                }
                if pos + length > bytes.len() {
                    return Err(DnsFormatError::make_error(
                        "Label length is longer than remainder of packet".to_string(),
                    ));
                }
                // RFC 1035 talks about ASCII without quite requiring it;
                // treat labels as (lossy) UTF-8 and preserve their case.
                let label = String::from_utf8_lossy(&bytes[pos..pos + length]).into_owned();
                labels.push(label);
                pos += length;
            }
            _ => {
                return Err(DnsFormatError::make_error(
                    "Unsupported or invalid label type".to_string(),
                ));
            }
        }
    }
    Ok((labels, resume_at.unwrap_or(pos)))
}

// Serialize without compression, preserving label case. Assumes labels fit
// in 63 bytes, which `deserialize_name` guarantees for anything it
// produced.
pub fn serialize_name(name: &[String]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for label in name {
        bytes.push(label.len() as u8);
        bytes.extend_from_slice(label.as_bytes());
    }
    // End with the null (root) label
    bytes.push(0x00);
    bytes
}

// RFC 4034 section 6.1 canonical form: uncompressed, every label
// lowercased. This is the byte layout DS digests and RRSIG signatures are
// computed over.
pub fn canonical_name(name: &[String]) -> Vec<u8> {
    let lowered: Vec<String> = name.iter().map(|l| l.to_ascii_lowercase()).collect();
    serialize_name(&lowered)
}

// Owner-name comparison is case-insensitive.
pub fn names_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| x.eq_ignore_ascii_case(y))
}

// Presentation form with the trailing dot; the root is ".".
pub fn display_name(name: &[String]) -> String {
    if name.is_empty() {
        return ".".to_string();
    }
    let mut text = name.join(".");
    text.push('.');
    text
}

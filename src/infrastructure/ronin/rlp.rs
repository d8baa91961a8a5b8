//! Minimal RLP encoder, enough for legacy transaction envelopes.

pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return bytes.to_vec();
    }
    let mut out = header(0x80, 0xb7, bytes.len());
    out.extend_from_slice(bytes);
    out
}

/// Integers are encoded big-endian without leading zeros; zero is the empty string.
pub fn encode_u64(value: u64) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// `items` must already be RLP encoded.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len = items.iter().map(Vec::len).sum();
    let mut out = header(0xc0, 0xf7, payload_len);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn header(short: u8, long: u8, len: usize) -> Vec<u8> {
    if len <= 55 {
        return vec![short + len as u8];
    }
    let len_bytes = (len as u64).to_be_bytes();
    let len_bytes = trim_leading_zeros(&len_bytes);
    let mut out = vec![long + len_bytes.len() as u8];
    out.extend_from_slice(len_bytes);
    out
}

use crc32fast::Hasher;

/// CRC-32 (IEEE) of a byte slice.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Render bytes as a bracketed decimal list, e.g. `[72 105 0]`.
pub fn format_decimal(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 2);
    out.push('[');
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&b.to_string());
    }
    out.push(']');
    out
}

/// Render bytes as lowercase hex, one round per group.
pub fn format_hex(data: &[u8], group: usize) -> String {
    if group == 0 {
        return hex::encode(data);
    }
    data.chunks(group)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(" ")
}

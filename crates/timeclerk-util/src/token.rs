//! Clock-out token generation

use rand::RngCore;

/// Entropy in a clock-out token, in bytes.
pub const TOKEN_BYTES: usize = 16;

/// Generate an opaque clock-out token: TOKEN_BYTES of CSPRNG output,
/// lowercase hex. URL-safe without encoding.
pub fn clock_out_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buf);
    let mut out = String::with_capacity(TOKEN_BYTES * 2);
    for b in buf {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

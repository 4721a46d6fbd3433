use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Bytes of entropy in a session id.
pub const SESSION_ID_BYTES: usize = 32;

/// Generates a fresh session id: 32 random bytes, base64url without padding.
///
/// Ids are not checked for collisions; at 256 bits of entropy one is not
/// expected to occur.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

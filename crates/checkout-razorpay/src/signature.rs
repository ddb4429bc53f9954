//! # Payment Signature Verification
//!
//! Razorpay signs a completed payment as
//! `HMAC-SHA256(key_secret, "{order_id}|{payment_id}")`, hex-encoded.
//! Verifying the signature locally lets the client reject a tampered
//! confirmation before it ever reaches the server's authoritative check.

/// Compute the signature Razorpay attaches to a completed payment.
/// Exposed for test harnesses and simulated overlay surfaces.
pub fn compute_signature(key_secret: &str, order_id: &str, payment_id: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let message = format!("{}|{}", order_id, payment_id);
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// Constant-time check of a gateway-reported signature
pub(crate) fn verify_signature(
    key_secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = compute_signature(key_secret, order_id, payment_id);
    constant_time_compare(signature, &expected)
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

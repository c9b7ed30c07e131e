use uuid::Uuid;

/// Opaque single-use token embedded in the redemption QR code.
pub fn generate_qr_token() -> String {
    format!("BALLS-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_tokens_are_prefixed_and_unique() {
        let a = generate_qr_token();
        let b = generate_qr_token();
        assert!(a.starts_with("BALLS-"));
        assert_eq!(a.len(), "BALLS-".len() + 36);
        assert_ne!(a, b);
    }
}

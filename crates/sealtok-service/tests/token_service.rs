//! End-to-end issue/redeem behaviour across all backends.
//!
//! Run with: cargo test --package sealtok-service --test token_service

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use sealtok_backend::{
    BoxSecretKey, SealedBox, SealingBackend, SignedBox, SignedOpenKey, SignedSealKey,
    SigningSecretKey, Symmetric, SymmetricKey,
};
use sealtok_core::{ManualClock, Token};
use sealtok_service::{TokenError, TokenService, armor, dearmor, issue, redeem};
use std::sync::Arc;

fn symmetric_keys() -> (SymmetricKey, SymmetricKey) {
    let key = SymmetricKey::generate().unwrap();
    (key.clone(), key)
}

fn sealed_box_keys() -> (sealtok_backend::BoxPublicKey, BoxSecretKey) {
    let recipient = BoxSecretKey::generate().unwrap();
    (recipient.public_key(), recipient)
}

fn signed_box_keys() -> (SignedSealKey, SignedOpenKey) {
    let sender = SigningSecretKey::generate().unwrap();
    let recipient = BoxSecretKey::generate().unwrap();
    (
        SignedSealKey {
            sender: sender.clone(),
            recipient: recipient.public_key(),
        },
        SignedOpenKey {
            recipient,
            sender: sender.public_key(),
        },
    )
}

fn check_roundtrip<B: SealingBackend>(backend: B, seal: &B::SealKey, open: &B::OpenKey) {
    let payloads: [&[u8]; 3] = [b"", b"user:42", &[0xeeu8; 2048]];
    for payload in payloads {
        let wire = issue(
            &backend,
            seal,
            Duration::minutes(1),
            Some(payload),
            Some(b"ad".as_slice()),
        )
        .unwrap();
        let token = redeem(&backend, open, &wire, Some(b"ad".as_slice())).unwrap();
        assert_eq!(token.payload(), payload);
    }
}

#[test]
fn test_roundtrip_all_backends() {
    let (seal, open) = symmetric_keys();
    check_roundtrip(Symmetric, &seal, &open);

    let (seal, open) = sealed_box_keys();
    check_roundtrip(SealedBox, &seal, &open);

    let (seal, open) = signed_box_keys();
    check_roundtrip(SignedBox, &seal, &open);
}

#[test]
fn test_expiry_with_real_clock() {
    let (seal, open) = symmetric_keys();
    let payload = [0x42u8; 32];

    let wire = issue(
        &Symmetric,
        &seal,
        Duration::milliseconds(100),
        Some(payload.as_slice()),
        None,
    )
    .unwrap();

    std::thread::sleep(std::time::Duration::from_millis(50));
    let token = redeem(&Symmetric, &open, &wire, None).unwrap();
    assert_eq!(token.payload(), payload);

    std::thread::sleep(std::time::Duration::from_millis(150));
    let err = redeem(&Symmetric, &open, &wire, None).unwrap_err();
    assert!(matches!(err, TokenError::Expired { .. }));
    assert_eq!(err.expired_token().unwrap().payload(), payload);
}

#[test]
fn test_expiry_boundary_exact() {
    let start: DateTime<Utc> = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let service = TokenService::new(Symmetric).with_clock(Arc::clone(&clock));
    let (seal, open) = symmetric_keys();

    let wire = service
        .issue(
            &seal,
            Duration::milliseconds(100),
            Some(b"p".as_slice()),
            None,
        )
        .unwrap();

    clock.set(start + Duration::milliseconds(50));
    assert_eq!(service.redeem(&open, &wire, None).unwrap().payload(), b"p");

    clock.set(start + Duration::milliseconds(99));
    assert!(service.redeem(&open, &wire, None).is_ok());

    clock.set(start + Duration::milliseconds(100));
    let err = service.redeem(&open, &wire, None).unwrap_err();
    assert_eq!(err.expired_token().unwrap().payload(), b"p");

    clock.set(start + Duration::milliseconds(150));
    assert!(matches!(
        service.redeem(&open, &wire, None),
        Err(TokenError::Expired { .. })
    ));
}

#[test]
fn test_tampered_token_is_authentication_error() {
    let (seal, open) = signed_box_keys();
    let wire = issue(
        &SignedBox,
        &seal,
        Duration::minutes(1),
        Some(b"p".as_slice()),
        None,
    )
    .unwrap();

    for byte in 0..wire.len() {
        let mut tampered = wire.clone();
        tampered[byte] ^= 0x01;
        assert!(matches!(
            redeem(&SignedBox, &open, &tampered, None),
            Err(TokenError::Authentication)
        ));
    }
}

#[test]
fn test_wrong_key_is_authentication_error() {
    let (seal, _) = symmetric_keys();
    let (_, other) = symmetric_keys();
    let wire = issue(&Symmetric, &seal, Duration::minutes(1), None, None).unwrap();

    let err = redeem(&Symmetric, &other, &wire, None).unwrap_err();
    assert!(matches!(err, TokenError::Authentication));
    assert!(!err.is_retryable());
}

#[test]
fn test_associated_data_binding() {
    let (seal, open) = sealed_box_keys();
    let wire = issue(
        &SealedBox,
        &seal,
        Duration::minutes(1),
        None,
        Some(b"client-a".as_slice()),
    )
    .unwrap();

    let client_a = Some(b"client-a".as_slice());
    assert!(redeem(&SealedBox, &open, &wire, client_a).is_ok());
    assert!(matches!(
        redeem(&SealedBox, &open, &wire, Some(b"client-b".as_slice())),
        Err(TokenError::Authentication)
    ));
    assert!(matches!(
        redeem(&SealedBox, &open, &wire, None),
        Err(TokenError::Authentication)
    ));
}

#[test]
fn test_expired_token_still_authenticates_first() {
    // An expired token sealed under another key is an authentication failure,
    // not an expiry.
    let (seal, _) = symmetric_keys();
    let (_, other) = symmetric_keys();
    let past = DateTime::from_timestamp_millis(0).unwrap();
    let wire = issue(&Symmetric, &seal, past, None, None).unwrap();

    assert!(matches!(
        redeem(&Symmetric, &other, &wire, None),
        Err(TokenError::Authentication)
    ));
}

#[test]
fn test_short_plaintext_is_malformed() {
    let (seal, open) = symmetric_keys();
    let wire = Symmetric.seal(&seal, &[1, 2, 3], b"").unwrap();

    let err = redeem(&Symmetric, &open, &wire, None).unwrap_err();
    assert!(matches!(err, TokenError::MalformedToken(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_wire_layout_symmetric() {
    let (seal, open) = symmetric_keys();
    let expires_at = DateTime::from_timestamp_millis(4_102_444_800_000).unwrap();
    let wire = issue(&Symmetric, &seal, expires_at, Some(b"abc".as_slice()), None).unwrap();

    // nonce (12) || timestamp (8) + payload (3) || tag (16)
    assert_eq!(wire.len(), 12 + 8 + 3 + 16);

    let plaintext = Symmetric.open(&open, &wire, b"").unwrap();
    assert_eq!(&plaintext[..8], &4_102_444_800_000i64.to_be_bytes());
    assert_eq!(&plaintext[8..], b"abc");
    assert_eq!(
        Token::decode(&plaintext).unwrap(),
        Token::from_time(expires_at, Some(b"abc".as_slice()))
    );
}

#[test]
fn test_signed_box_cross_check() {
    let (seal, open) = signed_box_keys();
    let wire = issue(
        &SignedBox,
        &seal,
        Duration::minutes(1),
        Some(b"x->y".as_slice()),
        None,
    )
    .unwrap();
    assert!(redeem(&SignedBox, &open, &wire, None).is_ok());

    // Y tries to pass the token off as coming from itself.
    let swapped = SignedOpenKey {
        recipient: open.recipient.clone(),
        sender: SigningSecretKey::generate().unwrap().public_key(),
    };
    assert!(matches!(
        redeem(&SignedBox, &swapped, &wire, None),
        Err(TokenError::Authentication)
    ));
}

#[test]
fn test_armored_roundtrip() {
    let (seal, open) = symmetric_keys();
    let wire = issue(
        &Symmetric,
        &seal,
        Duration::minutes(1),
        Some(b"armored".as_slice()),
        None,
    )
    .unwrap();

    let text = armor(&wire);
    assert!(text.starts_with("st1."));

    let token = redeem(&Symmetric, &open, &dearmor(&text).unwrap(), None).unwrap();
    assert_eq!(token.payload(), b"armored");
}

#[test]
fn test_parallel_redeem() {
    let (seal, open) = symmetric_keys();
    let wire = issue(
        &Symmetric,
        &seal,
        Duration::minutes(1),
        Some(b"shared".as_slice()),
        None,
    )
    .unwrap();
    let open = Arc::new(open);
    let wire = Arc::new(wire);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let open = Arc::clone(&open);
            let wire = Arc::clone(&wire);
            std::thread::spawn(move || {
                redeem(&Symmetric, &open, &wire, None).map(Token::into_payload)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), b"shared");
    }
}

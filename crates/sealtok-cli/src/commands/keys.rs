//! Key management commands.
//!
//! `sealtok keys generate` - Generate seal/open key material for a backend.

use sealtok_backend::{
    BoxSecretKey, HexKey, SignedOpenKey, SignedSealKey, SigningSecretKey, SymmetricKey,
};
use sealtok_core::BackendKind;
use std::fs;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Hex-encoded seal and open keys for one backend.
pub struct GeneratedKeys {
    pub seal_hex: Zeroizing<String>,
    pub open_hex: Zeroizing<String>,
}

/// Generate fresh key material for `backend`.
pub fn generate_keys(backend: BackendKind) -> anyhow::Result<GeneratedKeys> {
    let keys = match backend {
        BackendKind::Symmetric => {
            let key = SymmetricKey::generate()?;
            GeneratedKeys {
                seal_hex: Zeroizing::new(key.to_hex()),
                open_hex: Zeroizing::new(key.to_hex()),
            }
        }
        BackendKind::SealedBox => {
            let recipient = BoxSecretKey::generate()?;
            GeneratedKeys {
                seal_hex: Zeroizing::new(recipient.public_key().to_hex()),
                open_hex: Zeroizing::new(recipient.to_hex()),
            }
        }
        BackendKind::SignedBox => {
            let sender = SigningSecretKey::generate()?;
            let recipient = BoxSecretKey::generate()?;
            let seal = SignedSealKey {
                sender: sender.clone(),
                recipient: recipient.public_key(),
            };
            let open = SignedOpenKey {
                recipient,
                sender: sender.public_key(),
            };
            GeneratedKeys {
                seal_hex: Zeroizing::new(seal.to_hex()),
                open_hex: Zeroizing::new(open.to_hex()),
            }
        }
    };
    Ok(keys)
}

/// Generate keys and write them to `output` (as `seal.key` / `open.key`) or stdout.
pub fn generate(backend: BackendKind, output: Option<PathBuf>) -> anyhow::Result<()> {
    let keys = generate_keys(backend)?;

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let seal_path = output_dir.join("seal.key");
        let open_path = output_dir.join("open.key");

        fs::write(&seal_path, keys.seal_hex.as_bytes())?;
        fs::write(&open_path, keys.open_hex.as_bytes())?;

        println!("✔ Generated {backend} keys:");
        println!("  Seal key: {}", seal_path.display());
        println!("  Open key: {}", open_path.display());
        println!();
        if backend == BackendKind::Symmetric {
            println!("⚠️  Both files hold the same shared secret. Keep them secure!");
        } else {
            println!("⚠️  The open key contains a secret key. Keep it secure!");
        }
        println!();
        println!("Set as environment variables:");
        println!("  export SEALTOK_SEAL_KEY=$(cat {})", seal_path.display());
        println!("  export SEALTOK_OPEN_KEY=$(cat {})", open_path.display());
    } else {
        println!("Seal key:");
        println!("{}", keys.seal_hex.as_str());
        println!();
        println!("Open key:");
        println!("{}", keys.open_hex.as_str());
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealtok_backend::BoxPublicKey;
    use tempfile::tempdir;

    #[test]
    fn test_generate_symmetric_keys_to_files() {
        let dir = tempdir().unwrap();
        generate(BackendKind::Symmetric, Some(dir.path().to_path_buf())).unwrap();

        let seal = fs::read_to_string(dir.path().join("seal.key")).unwrap();
        let open = fs::read_to_string(dir.path().join("open.key")).unwrap();

        // Hex keys should be 64 characters (32 bytes)
        assert_eq!(seal.len(), 64);
        assert_eq!(seal, open);
    }

    #[test]
    fn test_generate_sealed_box_keys() {
        let keys = generate_keys(BackendKind::SealedBox).unwrap();
        let secret = BoxSecretKey::from_hex(&keys.open_hex).unwrap();
        let public = BoxPublicKey::from_hex(&keys.seal_hex).unwrap();
        assert_eq!(secret.public_key(), public);
    }

    #[test]
    fn test_generated_secrets_are_zeroizing() {
        fn zeroized_on_drop(_: &Zeroizing<String>) {}

        let keys = generate_keys(BackendKind::Symmetric).unwrap();
        zeroized_on_drop(&keys.seal_hex);
        zeroized_on_drop(&keys.open_hex);
        assert_eq!(keys.seal_hex.as_str(), keys.open_hex.as_str());
    }

    #[test]
    fn test_generate_signed_box_keys() {
        let keys = generate_keys(BackendKind::SignedBox).unwrap();
        let seal = SignedSealKey::from_hex(&keys.seal_hex).unwrap();
        let open = SignedOpenKey::from_hex(&keys.open_hex).unwrap();

        assert_eq!(seal.recipient, open.recipient.public_key());
        assert_eq!(seal.sender.public_key(), open.sender);
    }
}

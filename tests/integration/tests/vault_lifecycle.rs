//! End-to-end vault behaviour through the public facade.

use driveward_core::config::{CorruptStorePolicy, FallbackPolicy};
use driveward_integration_tests::{build_vault, FakeVerifier, ScriptedConfirmer, VerifierMode};
use driveward_vault::{AvailabilityState, FallbackCause};
use tempfile::TempDir;

#[tokio::test]
async fn test_save_get_remove_scenario() {
    let dir = TempDir::new().unwrap();
    let verifier = FakeVerifier::new(VerifierMode::Grant);
    let vault = build_vault(
        dir.path(),
        "alice",
        verifier.clone(),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );

    assert!(vault.save("D:", "hunter2").await);
    assert!(vault.has_saved("D:").await);
    assert_eq!(vault.list_drives().await, vec!["D:".to_string()]);
    assert_eq!(vault.get("D:").await.unwrap().expose_secret(), "hunter2");

    assert!(vault.remove("D:").await);
    assert!(!vault.has_saved("D:").await);
    assert!(vault.get("D:").await.is_none());

    // save, get, remove, get: one prompt each.
    assert_eq!(verifier.prompts(), 4);
}

#[tokio::test]
async fn test_store_file_holds_base64_only() {
    let dir = TempDir::new().unwrap();
    let vault = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );

    assert!(vault.save("D:", "hunter2").await);
    assert!(vault.save("E:", "swordfish").await);

    let raw = std::fs::read_to_string(vault.store_file().path()).unwrap();
    assert!(raw.contains("\"D:\""));
    assert!(raw.contains("\"E:\""));
    assert!(!raw.contains("hunter2"));
    assert!(!raw.contains("swordfish"));
}

#[tokio::test]
async fn test_presence_checks_never_prompt() {
    let dir = TempDir::new().unwrap();
    let verifier = FakeVerifier::new(VerifierMode::Grant);
    let vault = build_vault(
        dir.path(),
        "alice",
        verifier.clone(),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );
    assert!(vault.save("D:", "hunter2").await);

    verifier.set_mode(VerifierMode::Cancel);
    assert!(vault.has_saved("D:").await);
    assert!(!vault.has_saved("E:").await);
    assert_eq!(vault.list_drives().await.len(), 1);
    assert_eq!(verifier.prompts(), 1);
}

#[tokio::test]
async fn test_cancel_leaves_store_unchanged() {
    let dir = TempDir::new().unwrap();
    let verifier = FakeVerifier::new(VerifierMode::Grant);
    let confirmer = ScriptedConfirmer::new([true]);
    let vault = build_vault(
        dir.path(),
        "alice",
        verifier.clone(),
        confirmer.clone(),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );
    assert!(vault.save("D:", "hunter2").await);
    let before = std::fs::read(vault.store_file().path()).unwrap();

    verifier.set_mode(VerifierMode::Cancel);
    assert!(!vault.save("D:", "changed").await);
    assert!(!vault.remove("D:").await);
    assert!(vault.get("D:").await.is_none());

    assert_eq!(std::fs::read(vault.store_file().path()).unwrap(), before);
    // A cancelled verification is final; the fallback is not offered.
    assert!(confirmer.seen().is_empty());
}

#[tokio::test]
async fn test_unavailable_verifier_uses_fallback() {
    let dir = TempDir::new().unwrap();
    let confirmer = ScriptedConfirmer::new([true, false]);
    let vault = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Unavailable(AvailabilityState::NoDevice)),
        confirmer.clone(),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );

    assert!(!vault.is_verifier_available().await);
    assert!(vault.save("D:", "hunter2").await);
    assert!(vault.get("D:").await.is_none());

    let seen = confirmer.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].cause, FallbackCause::Unavailable(AvailabilityState::NoDevice));
    assert_eq!(seen[0].reason, "Save password for drive D:");
    assert_eq!(seen[1].reason, "Access saved password for drive D:");
    assert_eq!(
        seen[0].message(),
        "No biometric device found.\n\nSave password for drive D:\n\nContinue with basic authentication?"
    );
}

#[tokio::test]
async fn test_verifier_error_uses_fallback() {
    let dir = TempDir::new().unwrap();
    let confirmer = ScriptedConfirmer::new([true]);
    let vault = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Error),
        confirmer.clone(),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );

    assert!(vault.save("D:", "hunter2").await);
    let seen = confirmer.seen();
    assert!(matches!(seen[0].cause, FallbackCause::VerifierError(_)));
    assert_eq!(seen[0].title(), "Authentication Error");
}

#[tokio::test]
async fn test_deny_fallback_policy() {
    let dir = TempDir::new().unwrap();
    let confirmer = ScriptedConfirmer::new([true]);
    let vault = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Unavailable(AvailabilityState::DisabledByPolicy)),
        confirmer.clone(),
        FallbackPolicy::Deny,
        CorruptStorePolicy::Fail,
    );

    assert!(!vault.save("D:", "hunter2").await);
    assert!(!vault.store_file().path().exists());
    assert!(confirmer.seen().is_empty());
}

#[tokio::test]
async fn test_other_user_cannot_decrypt() {
    let dir = TempDir::new().unwrap();
    let alice = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );
    let bob = build_vault(
        dir.path(),
        "bob",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );

    assert!(alice.save("D:", "hunter2").await);
    assert!(bob.has_saved("D:").await);
    assert!(bob.get("D:").await.is_none());
    assert_eq!(alice.get("D:").await.unwrap().expose_secret(), "hunter2");
}

#[tokio::test]
async fn test_store_survives_new_vault_instance() {
    let dir = TempDir::new().unwrap();
    {
        let vault = build_vault(
            dir.path(),
            "alice",
            FakeVerifier::new(VerifierMode::Grant),
            ScriptedConfirmer::new([]),
            FallbackPolicy::Confirm,
            CorruptStorePolicy::Fail,
        );
        assert!(vault.save("D:", "hunter2").await);
    }

    let reopened = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );
    assert_eq!(reopened.get("D:").await.unwrap().expose_secret(), "hunter2");
}

#[tokio::test]
async fn test_corrupt_store_policies() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("BitLockerPasswords.dat");
    std::fs::write(&path, "<<not json>>").unwrap();

    let strict = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Fail,
    );
    assert!(!strict.save("D:", "hunter2").await);
    assert_eq!(strict.status().await.saved_drives, None);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<<not json>>");

    let lossy = build_vault(
        dir.path(),
        "alice",
        FakeVerifier::new(VerifierMode::Grant),
        ScriptedConfirmer::new([]),
        FallbackPolicy::Confirm,
        CorruptStorePolicy::Empty,
    );
    assert!(lossy.list_drives().await.is_empty());
    assert!(lossy.save("D:", "hunter2").await);
    assert_eq!(lossy.status().await.saved_drives, Some(1));
}

#[tokio::test]
async fn test_blank_and_null_files_are_empty() {
    for content in ["", "   \n", "null"] {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("BitLockerPasswords.dat"), content).unwrap();
        let vault = build_vault(
            dir.path(),
            "alice",
            FakeVerifier::new(VerifierMode::Grant),
            ScriptedConfirmer::new([]),
            FallbackPolicy::Confirm,
            CorruptStorePolicy::Fail,
        );
        assert!(vault.list_drives().await.is_empty(), "content {content:?}");
        assert!(vault.save("D:", "x").await);
    }
}

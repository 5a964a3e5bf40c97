use taskdesk::auth::*;
use taskdesk::models::{EmployeeId, Role, User};
use taskdesk::storage::{Collection, MemoryStorage, Storage};
use taskdesk::Error;

fn users() -> Vec<User> {
    vec![
        User {
            username: "manager".into(),
            password: "admin123".into(),
            role: Role::Manager,
            employee_id: None,
        },
        User {
            username: "asha".into(),
            password: hash_password_with_iterations("s3cret", 10).unwrap(),
            role: Role::Employee,
            employee_id: Some("1".into()),
        },
        User {
            username: "ben".into(),
            password: "pass".into(),
            role: Role::Employee,
            employee_id: Some("2".into()),
        },
    ]
}

fn test_store() -> MemoryStorage {
    MemoryStorage::new().with(Collection::Users, &users()).unwrap()
}

#[test]
fn test_authenticate_returns_exact_record() {
    let store = test_store();
    let expected = users();

    assert_eq!(authenticate(&store, "manager", "admin123").unwrap().as_ref(), Some(&expected[0]));
    assert_eq!(authenticate(&store, "ben", "pass").unwrap().as_ref(), Some(&expected[2]));

    let asha = authenticate(&store, "asha", "s3cret").unwrap().unwrap();
    assert_eq!(asha.username, "asha");
    assert_eq!(asha.employee_id, Some(EmployeeId::from("1")));
}

#[test]
fn test_authenticate_rejects_other_pairs() {
    let store = test_store();
    for (user, password) in [
        ("manager", "wrong"),
        ("Manager", "admin123"),
        ("ben", "admin123"),
        ("asha", "wrong"),
        ("nobody", "pass"),
        ("", ""),
    ] {
        assert!(authenticate(&store, user, password).unwrap().is_none(), "{}/{}", user, password);
    }
}

#[test]
fn test_login_builds_session() {
    let store = test_store();
    let session = login(&store, "asha", "s3cret").unwrap();
    assert_eq!(session.role, Role::Employee);
    assert_eq!(session.employee_id, Some(EmployeeId::from("1")));
    assert!(session.require(Role::Employee).is_ok());
    assert!(matches!(session.require(Role::Manager), Err(Error::PermissionDenied(Role::Manager))));

    assert!(matches!(login(&store, "asha", "nope"), Err(Error::InvalidCredentials)));
}

#[test]
fn test_missing_users_collection_is_an_error() {
    let store = MemoryStorage::new();
    assert!(matches!(
        authenticate(&store, "manager", "admin123"),
        Err(Error::MissingCollection(Collection::Users))
    ));
}

#[test]
fn test_hash_password_is_salted() {
    let a = hash_password_with_iterations("same", 10).unwrap();
    let b = hash_password_with_iterations("same", 10).unwrap();
    assert_ne!(a, b);
    assert!(a.starts_with("pbkdf2-sha256$10$"));
    assert!(verify_password(&a, "same"));
    assert!(verify_password(&b, "same"));
    assert!(!verify_password(&a, "other"));
}

#[test]
fn test_verify_plaintext_and_malformed_hashes() {
    assert!(verify_password("plain", "plain"));
    assert!(!verify_password("plain", "Plain"));
    assert!(!verify_password("pbkdf2-sha256$10$zz$00", "anything"));
    assert!(!verify_password("pbkdf2-sha256$0$00$00", "anything"));
    assert!(!verify_password("pbkdf2-sha256$10$00", "anything"));
}

#[test]
fn test_users_file_with_numeric_employee_ids() {
    let raw = br#"[
        {"username": "manager", "password": "admin", "role": "Manager"},
        {"username": "emp", "password": "pw", "role": "Employee", "employee_id": 5}
    ]"#;
    let store = MemoryStorage::new();
    store.write(Collection::Users, raw).unwrap();

    let user = authenticate(&store, "emp", "pw").unwrap().unwrap();
    assert_eq!(user.employee_id, Some(EmployeeId::from("5")));
    assert_eq!(authenticate(&store, "manager", "admin").unwrap().unwrap().employee_id, None);
}

#[test]
fn test_salt_is_sixteen_unconstrained_bytes() {
    let salts: Vec<Vec<u8>> = (0..8)
        .map(|_| {
            let encoded = hash_password_with_iterations("x", 1).unwrap();
            let salt = encoded.split('$').nth(2).unwrap().to_string();
            hex::decode(salt).unwrap()
        })
        .collect();

    assert!(salts.iter().all(|s| s.len() == 16));
    // A v4 UUID would pin the high nibble of byte 6 to 4 in every salt.
    assert!(salts.iter().any(|s| s[6] >> 4 != 4));
}

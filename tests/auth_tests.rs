use hotelbook::core::auth::{Authenticator, hash_password, verify_password};
use hotelbook::errors::AppError;
use hotelbook::forms::Form;
use hotelbook::store::{MemoryStore, UserStore};
use std::collections::HashMap;
use std::sync::Arc;

fn form(pairs: &[(&str, &str)]) -> Form {
    let values: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Form::new(values)
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("supersecret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("supersecret", &hash));
    assert!(!verify_password("supersecret!", &hash));
    assert!(!verify_password("supersecret", "not a hash"));
}

#[test]
fn test_authenticate() {
    let store = Arc::new(MemoryStore::new());
    let auth = Authenticator::new(store.clone());

    let id = auth
        .create_user("Ada", "Admin", "admin@hotelbook.local", "supersecret", 3)
        .unwrap();

    // stored hashed
    let user = store.user_by_id(id).unwrap();
    assert_ne!(user.password, "supersecret");

    assert_eq!(
        auth.authenticate("admin@hotelbook.local", "supersecret").unwrap(),
        id
    );
    assert!(matches!(
        auth.authenticate("admin@hotelbook.local", "wrong-password"),
        Err(AppError::Unauthorized)
    ));
    assert!(matches!(
        auth.authenticate("nobody@hotelbook.local", "supersecret"),
        Err(AppError::Unauthorized)
    ));
}

#[test]
fn test_create_user_needs_long_password() {
    let auth = Authenticator::new(Arc::new(MemoryStore::new()));
    assert!(matches!(
        auth.create_user("Ada", "Admin", "admin@hotelbook.local", "short", 3),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_form_required() {
    let mut f = form(&[("first-name", "Yusuf"), ("last-name", "   ")]);
    f.required(&["first-name", "last-name", "email"]);

    assert!(!f.valid());
    assert!(f.errors.get("first-name").is_none());
    assert_eq!(f.errors.get("last-name"), Some("This field cannot be blank"));
    assert_eq!(f.errors.get("email"), Some("This field cannot be blank"));
    assert_eq!(f.errors.fields().collect::<Vec<_>>(), vec!["email", "last-name"]);
}

#[test]
fn test_form_min_length_counts_characters() {
    let mut f = form(&[("first-name", "Zoë"), ("last-name", "Jo"), ("phone", " ab ")]);
    assert!(f.min_length("first-name", 3));
    assert!(!f.min_length("last-name", 3));
    // surrounding blanks do not count
    assert!(!f.min_length("phone", 3));
    assert_eq!(
        f.errors.get("last-name"),
        Some("This field must be at least 3 characters long")
    );
}

#[test]
fn test_form_email_shape() {
    for ok in ["yg@yg.com", "first.last+tag@mail.example.org"] {
        let mut f = form(&[("email", ok)]);
        f.is_email("email");
        assert!(f.valid(), "{} should be accepted", ok);
    }
    for bad in ["", "yg", "yg@", "@yg.com", "yg@yg", "y g@yg.com"] {
        let mut f = form(&[("email", bad)]);
        f.is_email("email");
        assert!(!f.valid(), "{} should be rejected", bad);
    }
}

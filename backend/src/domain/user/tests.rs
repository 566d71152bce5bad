//! Tests for the domain user model.

use super::*;
use crate::domain::password::MIN_PASSWORD_COST;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const USER_ID: &str = "0190c9a4-0000-7000-8000-000000000001";

#[fixture]
fn stored_user() -> Value {
    let password = PlainPassword::new("yahoo!XD123").expect("valid password");
    let hash = PasswordHash::derive(&password, MIN_PASSWORD_COST).expect("hash");
    json!({
        "_id": USER_ID,
        "firstName": "first",
        "lastName": "last",
        "email": "ahmed@gmail.com",
        "password": String::from(hash),
        "role": "admin",
    })
}

#[rstest]
#[case("", "last", "a@x.com", "yahoo!XD123", UserValidationError::EmptyName { field: "first name" })]
#[case("first", "  ", "a@x.com", "yahoo!XD123", UserValidationError::EmptyName { field: "last name" })]
#[case("first", "last", "radomText", "yahoo!XD123", UserValidationError::InvalidEmail)]
#[case(
    "first",
    "last",
    "a@x.com",
    "short",
    UserValidationError::Password(PasswordValidationError::TooShort { min: 8 })
)]
fn signup_validation_rejects_bad_fields(
    #[case] first: &str,
    #[case] last: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: UserValidationError,
) {
    let err = NewUser::try_from_parts(first, last, email, password).expect_err("invalid signup");
    assert_eq!(err, expected);
}

#[rstest]
fn names_longer_than_limit_are_rejected() {
    let long = "x".repeat(NAME_MAX + 1);
    assert_eq!(
        PersonName::first(&long),
        Err(UserValidationError::NameTooLong {
            field: "first name",
            max: NAME_MAX
        })
    );
}

#[rstest]
fn signup_draft_defaults_to_regular_role_and_stores_only_the_hash() {
    let signup = NewUser::try_from_parts("first", "last", "A@X.com", "yahoo!XD123")
        .expect("valid signup");
    let hash = PasswordHash::derive(signup.password(), MIN_PASSWORD_COST).expect("hash");
    let encoded = serde_json::to_value(signup.into_draft(hash.clone())).expect("serialise draft");

    assert_eq!(encoded["role"], json!("regular"));
    assert_eq!(encoded["email"], json!("a@x.com"));
    assert_eq!(encoded["password"], json!(String::from(hash)));
}

#[rstest]
fn stored_documents_decode(stored_user: Value) {
    let user: User = serde_json::from_value(stored_user).expect("decode user");
    assert_eq!(user.id().to_string(), USER_ID);
    assert_eq!(user.role(), Role::Admin);
    assert!(user.password().verify(&PlainPassword::attempt("yahoo!XD123")));
}

#[rstest]
fn missing_role_defaults_to_regular(mut stored_user: Value) {
    if let Some(map) = stored_user.as_object_mut() {
        map.remove("role");
    }
    let user: User = serde_json::from_value(stored_user).expect("decode user");
    assert_eq!(user.role(), Role::Regular);
}

#[rstest]
fn view_hides_password_and_mirrors_id(stored_user: Value) {
    let user: User = serde_json::from_value(stored_user).expect("decode user");
    let view = serde_json::to_value(UserView::from(&user)).expect("serialise view");

    assert!(view.get("password").is_none());
    assert_eq!(view["id"], view["userId"]);
}

#[rstest]
fn changes_serialise_only_provided_fields() {
    let patch = UserPatch::try_from_parts(Some("new first name"), None, None, None, None)
        .expect("valid patch");
    let encoded = serde_json::to_value(patch.into_changes(None)).expect("serialise changes");
    assert_eq!(encoded, json!({ "firstName": "new first name" }));
}

#[rstest]
fn patch_password_is_validated_like_signup() {
    let err = UserPatch::try_from_parts(None, None, None, Some("short"), None)
        .expect_err("short password");
    assert_eq!(
        err,
        UserValidationError::Password(PasswordValidationError::TooShort { min: 8 })
    );
}

//! Integration tests for the authentication extractors and authorization gates.
//!
//! These live as an integration test (rather than an inline `#[cfg(test)]`
//! module) because they exercise the crate through `mediq-auth-memory`, which
//! depends on `mediq-auth`. Driving them from inside the `mediq-auth` unit-test
//! build would pull in two distinct instances of this crate, so the trait
//! implementations in `mediq-auth-memory` would not satisfy the in-crate
//! trait. Referencing everything via `mediq_auth::` keeps a single instance.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Request, header::AUTHORIZATION};
use std::sync::Arc;
use uuid::Uuid;

use mediq_auth::identity::{IdentityProvider, NewAccount};
use mediq_auth::middleware::{
    AdminAuth, AuthState, BearerAuth, DoctorAuth, OptionalBearerAuth, PatientAuth,
    VerifiedDoctorAuth, require_owner_or_admin,
};
use mediq_auth::storage::{RoleProfile, Specialization, UserRecord, UserStore};
use mediq_auth::error::AuthError;
use mediq_auth_memory::{MemoryIdentityProvider, MemoryUserStore};

async fn seeded_state() -> (AuthState, Arc<MemoryIdentityProvider>) {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let users = Arc::new(MemoryUserStore::new());
    let state = AuthState::new(identity.clone(), users);
    (state, identity)
}

async fn register(
    state: &AuthState,
    identity: &MemoryIdentityProvider,
    name: &str,
    email: &str,
    profile: RoleProfile,
) -> (UserRecord, String) {
    let subject = identity
        .create_account(&NewAccount {
            email: email.to_string(),
            password: "pw12345".to_string(),
            display_name: name.to_string(),
        })
        .await
        .unwrap();
    let record = UserRecord::new(subject.clone(), name, email, profile);
    state.users.create(&record).await.unwrap();
    let token = identity.issue_token(&subject).unwrap();
    (record, token)
}

fn parts_with_token(token: &str) -> Parts {
    Request::builder()
        .uri("/test")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(())
        .unwrap()
        .into_parts()
        .0
}

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let (state, _identity) = seeded_state().await;
    let mut parts = Request::builder().uri("/test").body(()).unwrap().into_parts().0;

    let err = BearerAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_verified_identity_without_record_is_not_found() {
    let (state, identity) = seeded_state().await;
    let subject = identity
        .create_account(&NewAccount {
            email: "ghost@x.com".to_string(),
            password: "pw12345".to_string(),
            display_name: "Ghost".to_string(),
        })
        .await
        .unwrap();
    let token = identity.issue_token(&subject).unwrap();
    let mut parts = parts_with_token(&token);

    let err = BearerAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound { .. }));
}

#[tokio::test]
async fn test_inactive_account_is_forbidden() {
    let (state, identity) = seeded_state().await;
    let (mut record, token) =
        register(&state, &identity, "P", "p@x.com", RoleProfile::Patient).await;
    record.active = false;
    record.touch();
    state.users.update(&record).await.unwrap();

    let mut parts = parts_with_token(&token);
    let err = BearerAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));
}

#[tokio::test]
async fn test_doctor_gate() {
    let (state, identity) = seeded_state().await;
    let profile = RoleProfile::doctor(Specialization::Neurology, "L-1", "MC-1");
    let (_, doctor_token) =
        register(&state, &identity, "Dr. D", "d@x.com", profile).await;
    let (_, patient_token) =
        register(&state, &identity, "P", "p@x.com", RoleProfile::Patient).await;

    let mut parts = parts_with_token(&doctor_token);
    assert!(DoctorAuth::from_request_parts(&mut parts, &state).await.is_ok());

    let mut parts = parts_with_token(&patient_token);
    let err = DoctorAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));
}

#[tokio::test]
async fn test_verified_doctor_gate() {
    let (state, identity) = seeded_state().await;
    let profile = RoleProfile::doctor(Specialization::Neurology, "L-1", "MC-1");
    let (mut record, token) = register(&state, &identity, "Dr. D", "d@x.com", profile).await;

    // Unverified doctors clear the doctor gate but not this one.
    let mut parts = parts_with_token(&token);
    let err = VerifiedDoctorAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));

    if let RoleProfile::Doctor { verified, .. } = &mut record.profile {
        *verified = true;
    }
    record.touch();
    state.users.update(&record).await.unwrap();

    let mut parts = parts_with_token(&token);
    assert!(
        VerifiedDoctorAuth::from_request_parts(&mut parts, &state)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_patient_and_admin_gates() {
    let (state, identity) = seeded_state().await;
    let (_, patient_token) =
        register(&state, &identity, "P", "p@x.com", RoleProfile::Patient).await;
    let (_, admin_token) =
        register(&state, &identity, "Root", "root@x.com", RoleProfile::Admin).await;

    let mut parts = parts_with_token(&patient_token);
    assert!(PatientAuth::from_request_parts(&mut parts, &state).await.is_ok());

    let mut parts = parts_with_token(&admin_token);
    let err = PatientAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));

    let mut parts = parts_with_token(&admin_token);
    assert!(AdminAuth::from_request_parts(&mut parts, &state).await.is_ok());

    let mut parts = parts_with_token(&patient_token);
    let err = AdminAuth::from_request_parts(&mut parts, &state)
        .await
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));
}

#[tokio::test]
async fn test_optional_auth_never_rejects() {
    let (state, _identity) = seeded_state().await;

    let mut parts = Request::builder().uri("/test").body(()).unwrap().into_parts().0;
    let OptionalBearerAuth(user) = OptionalBearerAuth::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert!(user.is_none());

    let mut parts = parts_with_token("garbage-token");
    let OptionalBearerAuth(user) = OptionalBearerAuth::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_optional_auth_attaches_principal() {
    let (state, identity) = seeded_state().await;
    let (record, token) =
        register(&state, &identity, "P", "p@x.com", RoleProfile::Patient).await;

    let mut parts = parts_with_token(&token);
    let OptionalBearerAuth(user) = OptionalBearerAuth::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(user.map(|u| u.id()), Some(record.id));
}

#[tokio::test]
async fn test_owner_or_admin_predicate() {
    let (state, identity) = seeded_state().await;
    let (patient, patient_token) =
        register(&state, &identity, "P", "p@x.com", RoleProfile::Patient).await;
    let (_, admin_token) =
        register(&state, &identity, "Root", "root@x.com", RoleProfile::Admin).await;

    let mut parts = parts_with_token(&patient_token);
    let BearerAuth(owner) = BearerAuth::from_request_parts(&mut parts, &state).await.unwrap();
    assert!(require_owner_or_admin(&owner, patient.id).is_ok());
    assert!(require_owner_or_admin(&owner, Uuid::new_v4()).is_err());

    let mut parts = parts_with_token(&admin_token);
    let BearerAuth(admin) = BearerAuth::from_request_parts(&mut parts, &state).await.unwrap();
    assert!(require_owner_or_admin(&admin, patient.id).is_ok());
    assert!(require_owner_or_admin(&admin, Uuid::new_v4()).is_ok());
}

use nextube_accounts::error::AccountsServiceError;
use nextube_accounts::usecase::federated::{
    CompleteProfileInput, CompleteProfileUseCase, FederatedLoginUseCase,
};
use nextube_accounts::usecase::session::{LoginInput, LoginUseCase};
use nextube_domain::account::Provider;

use crate::helpers::{
    GOOGLE_TOKEN, MockAccountRepo, MockFederatedIdentity, MockMailer, TEST_PASSWORD,
    google_profile, local_account, pending_account, test_keys,
};

fn federated(
    accounts: &MockAccountRepo,
    email: &str,
    verified: bool,
) -> FederatedLoginUseCase<MockAccountRepo, MockFederatedIdentity, MockMailer> {
    FederatedLoginUseCase {
        accounts: accounts.clone(),
        identity: MockFederatedIdentity::new(GOOGLE_TOKEN, google_profile(email, verified)),
        mailer: MockMailer::new(),
        keys: test_keys(),
    }
}

// ── FederatedLoginUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_account_on_first_login() {
    let accounts = MockAccountRepo::empty();

    let out = federated(&accounts, "Gale@Example.com", true)
        .execute(GOOGLE_TOKEN)
        .await
        .unwrap();

    assert!(out.created);
    assert_eq!(out.account.email, "gale@example.com");
    assert_eq!(out.account.provider, Provider::Google);
    assert_eq!(out.account.username, None);
    assert!(!out.account.profile_complete);
    assert_eq!(out.account.avatar, "https://lh3.test/photo.jpg");

    let stored = accounts.get(out.account.id).unwrap();
    assert_eq!(
        stored.refresh_token.as_deref(),
        Some(out.tokens.refresh_token.as_str())
    );
}

#[tokio::test]
async fn should_log_into_existing_account_on_second_login() {
    let accounts = MockAccountRepo::empty();
    let first = federated(&accounts, "gale@example.com", true)
        .execute(GOOGLE_TOKEN)
        .await
        .unwrap();

    let second = federated(&accounts, "gale@example.com", true)
        .execute(GOOGLE_TOKEN)
        .await
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.account.id, first.account.id);
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn should_merge_into_local_account_when_email_verified() {
    let local = local_account("ada@example.com", "ada");
    let accounts = MockAccountRepo::new(vec![local.clone()]);

    let out = federated(&accounts, "ada@example.com", true)
        .execute(GOOGLE_TOKEN)
        .await
        .unwrap();

    assert!(!out.created);
    assert_eq!(out.account.id, local.id);
    assert_eq!(out.account.provider, Provider::Local);
    assert!(out.account.profile_complete);
}

#[tokio::test]
async fn should_refuse_merge_when_email_unverified() {
    let local = local_account("ada@example.com", "ada");
    let accounts = MockAccountRepo::new(vec![local.clone()]);

    let result = federated(&accounts, "ada@example.com", false)
        .execute(GOOGLE_TOKEN)
        .await;

    assert!(
        matches!(result, Err(AccountsServiceError::UnverifiedFederatedEmail)),
        "expected UnverifiedFederatedEmail, got {result:?}"
    );
    assert!(accounts.get(local.id).unwrap().refresh_token.is_none());
}

#[tokio::test]
async fn should_reject_token_the_provider_does_not_vouch_for() {
    let accounts = MockAccountRepo::empty();
    let result = federated(&accounts, "gale@example.com", true)
        .execute("forged-token")
        .await;
    assert!(matches!(result, Err(AccountsServiceError::InvalidFederatedToken)));
    assert_eq!(accounts.len(), 0);
}

#[tokio::test]
async fn should_require_id_token() {
    let result = federated(&MockAccountRepo::empty(), "gale@example.com", true)
        .execute("   ")
        .await;
    assert!(matches!(result, Err(AccountsServiceError::Validation(_))));
}

// ── CompleteProfileUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_complete_pending_profile_and_allow_password_login() {
    let pending = pending_account("gale@example.com");
    let accounts = MockAccountRepo::new(vec![pending.clone()]);

    let view = CompleteProfileUseCase {
        accounts: accounts.clone(),
    }
    .execute(CompleteProfileInput {
        account_id: pending.id,
        username: "Gale".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await
    .unwrap();

    assert!(view.profile_complete);
    assert_eq!(view.username.as_deref(), Some("gale"));

    LoginUseCase {
        accounts,
        keys: test_keys(),
    }
    .execute(LoginInput {
        identifier: "gale".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn should_refuse_completing_a_complete_profile() {
    let account = local_account("ada@example.com", "ada");
    let result = CompleteProfileUseCase {
        accounts: MockAccountRepo::new(vec![account.clone()]),
    }
    .execute(CompleteProfileInput {
        account_id: account.id,
        username: "ada2".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await;
    assert!(matches!(result, Err(AccountsServiceError::ProfileAlreadyComplete)));
}

#[tokio::test]
async fn should_refuse_taken_username_on_completion() {
    let pending = pending_account("gale@example.com");
    let accounts = MockAccountRepo::new(vec![
        pending.clone(),
        local_account("ada@example.com", "ada"),
    ]);

    let result = CompleteProfileUseCase {
        accounts: accounts.clone(),
    }
    .execute(CompleteProfileInput {
        account_id: pending.id,
        username: "ada".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await;

    assert!(
        matches!(result, Err(AccountsServiceError::UsernameTaken)),
        "expected UsernameTaken, got {result:?}"
    );
    assert!(!accounts.get(pending.id).unwrap().is_profile_complete());
}

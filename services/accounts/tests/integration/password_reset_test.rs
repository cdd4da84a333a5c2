use url::Url;

use nextube_auth_types::token::{TokenType, validate_token};

use nextube_accounts::error::AccountsServiceError;
use nextube_accounts::usecase::password_reset::{
    RequestPasswordResetUseCase, ResetPasswordInput, ResetPasswordUseCase,
};
use nextube_accounts::usecase::session::{LoginInput, LoginUseCase};

use crate::helpers::{
    MockAccountRepo, MockMailer, TEST_PASSWORD, local_account, pending_account, test_keys,
};

const RESET_BASE: &str = "https://nextube.test/reset-password";

fn request_usecase(
    accounts: &MockAccountRepo,
    mailer: &MockMailer,
) -> RequestPasswordResetUseCase<MockAccountRepo, MockMailer> {
    RequestPasswordResetUseCase {
        accounts: accounts.clone(),
        mailer: mailer.clone(),
        keys: test_keys(),
        reset_url_base: RESET_BASE.to_owned(),
    }
}

fn grant_from_link(link: &str) -> String {
    Url::parse(link)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .expect("token query parameter")
}

#[tokio::test]
async fn should_mail_reset_link_for_known_email() {
    let account = local_account("ada@example.com", "ada");
    let accounts = MockAccountRepo::new(vec![account]);
    let mailer = MockMailer::new();

    request_usecase(&accounts, &mailer)
        .execute("Ada@Example.com")
        .await
        .unwrap();

    let link = mailer.last_reset_link().expect("reset link sent");
    assert!(link.starts_with(RESET_BASE));
    assert!(!grant_from_link(&link).is_empty());
}

#[tokio::test]
async fn should_carry_no_hash_material_in_grant() {
    let account = local_account("ada@example.com", "ada");
    let hash = account.password_hash().unwrap().to_owned();
    let accounts = MockAccountRepo::new(vec![account]);
    let mailer = MockMailer::new();

    request_usecase(&accounts, &mailer)
        .execute("ada@example.com")
        .await
        .unwrap();

    let grant = grant_from_link(&mailer.last_reset_link().unwrap());
    let claims = validate_token(&grant, &test_keys().reset_secret, TokenType::Reset).unwrap();
    let pwv = claims.pwv.expect("fingerprint claim");
    assert!(!pwv.is_empty());
    assert!(!hash.contains(&pwv));
    assert!(!pwv.contains(&hash[hash.len() - 16..]));
}

#[tokio::test]
async fn should_report_unknown_email() {
    let result = request_usecase(&MockAccountRepo::empty(), &MockMailer::new())
        .execute("ghost@example.com")
        .await;
    assert!(matches!(result, Err(AccountsServiceError::AccountNotFound)));
}

#[tokio::test]
async fn should_refuse_reset_for_pending_account() {
    let accounts = MockAccountRepo::new(vec![pending_account("gale@example.com")]);
    let result = request_usecase(&accounts, &MockMailer::new())
        .execute("gale@example.com")
        .await;
    assert!(matches!(result, Err(AccountsServiceError::ProfileIncomplete)));
}

#[tokio::test]
async fn should_accept_request_even_if_mail_fails() {
    let accounts = MockAccountRepo::new(vec![local_account("ada@example.com", "ada")]);
    request_usecase(&accounts, &MockMailer::failing())
        .execute("ada@example.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reset_once_and_end_sessions() {
    let mut account = local_account("ada@example.com", "ada");
    account.refresh_token = Some("live-refresh-token".to_owned());
    let accounts = MockAccountRepo::new(vec![account.clone()]);
    let mailer = MockMailer::new();

    request_usecase(&accounts, &mailer)
        .execute("ada@example.com")
        .await
        .unwrap();
    let grant = grant_from_link(&mailer.last_reset_link().unwrap());

    let reset = ResetPasswordUseCase {
        accounts: accounts.clone(),
        keys: test_keys(),
    };
    reset
        .execute(ResetPasswordInput {
            token: grant.clone(),
            new_password: "brand-new-pass".to_owned(),
        })
        .await
        .unwrap();

    assert!(accounts.get(account.id).unwrap().refresh_token.is_none());

    let login = LoginUseCase {
        accounts: accounts.clone(),
        keys: test_keys(),
    };
    login
        .execute(LoginInput {
            identifier: "ada".to_owned(),
            password: "brand-new-pass".to_owned(),
        })
        .await
        .unwrap();
    assert!(
        login
            .execute(LoginInput {
                identifier: "ada".to_owned(),
                password: TEST_PASSWORD.to_owned(),
            })
            .await
            .is_err()
    );

    // The grant is bound to the old hash and cannot be replayed.
    let replay = reset
        .execute(ResetPasswordInput {
            token: grant,
            new_password: "another-pass".to_owned(),
        })
        .await;
    assert!(
        matches!(replay, Err(AccountsServiceError::InvalidResetGrant)),
        "expected InvalidResetGrant, got {replay:?}"
    );
}

#[tokio::test]
async fn should_reject_tampered_grant() {
    let reset = ResetPasswordUseCase {
        accounts: MockAccountRepo::new(vec![local_account("ada@example.com", "ada")]),
        keys: test_keys(),
    };
    let result = reset
        .execute(ResetPasswordInput {
            token: "a.b.c".to_owned(),
            new_password: "brand-new-pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AccountsServiceError::InvalidResetGrant)));
}

#[tokio::test]
async fn should_not_accept_session_token_as_reset_grant() {
    let account = local_account("ada@example.com", "ada");
    let keys = test_keys();
    let tokens = nextube_accounts::usecase::token::issue_session(account.id, &keys).unwrap();
    let reset = ResetPasswordUseCase {
        accounts: MockAccountRepo::new(vec![account]),
        keys,
    };

    let result = reset
        .execute(ResetPasswordInput {
            token: tokens.access_token,
            new_password: "brand-new-pass".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(AccountsServiceError::InvalidResetGrant)));
}

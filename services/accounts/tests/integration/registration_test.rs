use nextube_accounts::domain::types::EmailKind;
use nextube_accounts::error::AccountsServiceError;
use nextube_accounts::usecase::registration::{
    CompleteRegistrationInput, CompleteRegistrationUseCase, RegisterInput, RegisterUseCase,
    ResendOtpUseCase,
};
use nextube_domain::account::Provider;

use crate::helpers::{
    MockAccountRepo, MockMailer, MockMediaStorage, MockOtpRegister, TEST_PASSWORD, local_account,
    upload,
};

fn complete_input(email: &str, code: &str, username: &str) -> CompleteRegistrationInput {
    CompleteRegistrationInput {
        email: email.to_owned(),
        code: code.to_owned(),
        full_name: "Ada Lovelace".to_owned(),
        username: username.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        avatar: Some(upload("avatar.png")),
        cover_image: None,
    }
}

// ── RegisterUseCase ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_and_mail_otp_for_new_email() {
    let otps = MockOtpRegister::empty();
    let mailer = MockMailer::new();
    let usecase = RegisterUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };

    usecase
        .execute(RegisterInput {
            email: "  Ada@Example.com ".to_owned(),
            username: Some("ada".to_owned()),
        })
        .await
        .unwrap();

    let stored = otps.code_for("ada@example.com").expect("code stored");
    assert_eq!(stored.len(), 4);
    assert_eq!(mailer.last_otp_to("ada@example.com"), Some(stored));
}

#[tokio::test]
async fn should_reject_registration_for_existing_email() {
    let existing = local_account("ada@example.com", "ada");
    let otps = MockOtpRegister::empty();
    let usecase = RegisterUseCase {
        accounts: MockAccountRepo::new(vec![existing]),
        otps: otps.clone(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(RegisterInput {
            email: "ada@example.com".to_owned(),
            username: None,
        })
        .await;

    assert!(
        matches!(result, Err(AccountsServiceError::AccountAlreadyExists)),
        "expected AccountAlreadyExists, got {result:?}"
    );
    assert!(otps.code_for("ada@example.com").is_none());
}

#[tokio::test]
async fn should_reject_registration_for_taken_username() {
    let existing = local_account("someone@example.com", "ada");
    let usecase = RegisterUseCase {
        accounts: MockAccountRepo::new(vec![existing]),
        otps: MockOtpRegister::empty(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(RegisterInput {
            email: "ada@example.com".to_owned(),
            username: Some("ADA".to_owned()),
        })
        .await;

    assert!(matches!(result, Err(AccountsServiceError::AccountAlreadyExists)));
}

#[tokio::test]
async fn should_reject_second_register_while_code_is_live() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let usecase = RegisterUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(RegisterInput {
            email: "ada@example.com".to_owned(),
            username: None,
        })
        .await;

    assert!(matches!(result, Err(AccountsServiceError::OtpAlreadyIssued)));
    assert_eq!(otps.code_for("ada@example.com").as_deref(), Some("1234"));
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let usecase = RegisterUseCase {
        accounts: MockAccountRepo::empty(),
        otps: MockOtpRegister::empty(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(RegisterInput {
            email: "not-an-email".to_owned(),
            username: None,
        })
        .await;

    assert!(matches!(result, Err(AccountsServiceError::Validation(_))));
}

// ── ResendOtpUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_resend_during_cooldown_and_keep_original_code() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "4321");
    let mailer = MockMailer::new();
    let usecase = ResendOtpUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };

    let result = usecase.execute("ada@example.com").await;

    assert!(
        matches!(result, Err(AccountsServiceError::TooManyOtpRequests)),
        "expected TooManyOtpRequests, got {result:?}"
    );
    assert!(mailer.sent().is_empty());

    // The original code still completes registration.
    let complete = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps,
        media: MockMediaStorage::new(),
        mailer,
    };
    complete
        .execute(complete_input("ada@example.com", "4321", "ada"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_resend_after_code_expired() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "4321");
    otps.expire("ada@example.com");
    let mailer = MockMailer::new();
    let usecase = ResendOtpUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };

    usecase.execute("ada@example.com").await.unwrap();

    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(
        mailer.last_otp_to("ada@example.com"),
        otps.code_for("ada@example.com")
    );
}

#[tokio::test]
async fn should_refuse_resend_for_registered_email() {
    let usecase = ResendOtpUseCase {
        accounts: MockAccountRepo::new(vec![local_account("ada@example.com", "ada")]),
        otps: MockOtpRegister::empty(),
        mailer: MockMailer::new(),
    };

    let result = usecase.execute("ada@example.com").await;
    assert!(matches!(result, Err(AccountsServiceError::AccountAlreadyExists)));
}

// ── CompleteRegistrationUseCase ──────────────────────────────────────────────

#[tokio::test]
async fn should_create_account_without_exposing_secrets() {
    let accounts = MockAccountRepo::empty();
    let mailer = MockMailer::new();
    let usecase = CompleteRegistrationUseCase {
        accounts: accounts.clone(),
        otps: MockOtpRegister::with_entry("ada@example.com", "1234"),
        media: MockMediaStorage::new(),
        mailer: mailer.clone(),
    };

    let mut input = complete_input("ada@example.com", "1234", "Ada_L");
    input.cover_image = Some(upload("cover.png"));
    let view = usecase.execute(input).await.unwrap();

    assert_eq!(view.email, "ada@example.com");
    assert_eq!(view.username.as_deref(), Some("ada_l"));
    assert_eq!(view.provider, Provider::Local);
    assert_eq!(view.avatar, "https://media.test/avatar.png");
    assert_eq!(view.cover_image.as_deref(), Some("https://media.test/cover.png"));
    assert!(view.profile_complete);

    let json = serde_json::to_value(&view).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password").is_none());
    assert!(json.get("refresh_token").is_none());

    let stored = accounts.get(view.id).unwrap();
    assert_ne!(stored.password_hash(), Some(TEST_PASSWORD));
    assert!(
        mailer
            .sent()
            .iter()
            .any(|m| matches!(m.kind, EmailKind::Welcome { .. }))
    );
}

#[tokio::test]
async fn should_consume_otp_exactly_once() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let usecase = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };

    usecase
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await
        .unwrap();
    assert!(otps.code_for("ada@example.com").is_none());

    // Same code against a fresh store: the code is gone.
    let again = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps,
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };
    let result = again
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await;
    assert!(matches!(result, Err(AccountsServiceError::InvalidOtp)));
}

#[tokio::test]
async fn should_keep_otp_on_wrong_code() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let accounts = MockAccountRepo::empty();
    let usecase = CompleteRegistrationUseCase {
        accounts: accounts.clone(),
        otps: otps.clone(),
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(complete_input("ada@example.com", "9999", "ada"))
        .await;

    assert!(matches!(result, Err(AccountsServiceError::InvalidOtp)));
    assert_eq!(otps.code_for("ada@example.com").as_deref(), Some("1234"));
    assert_eq!(accounts.len(), 0);
}

#[tokio::test]
async fn should_reject_expired_otp() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    otps.expire("ada@example.com");
    let usecase = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await;

    assert!(
        matches!(result, Err(AccountsServiceError::OtpExpired)),
        "expected OtpExpired, got {result:?}"
    );
    assert!(otps.code_for("ada@example.com").is_none());
}

#[tokio::test]
async fn should_require_avatar_before_touching_otp() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let media = MockMediaStorage::new();
    let usecase = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        media: media.clone(),
        mailer: MockMailer::new(),
    };

    let mut input = complete_input("ada@example.com", "1234", "ada");
    input.avatar = None;
    let result = usecase.execute(input).await;

    assert!(matches!(result, Err(AccountsServiceError::AvatarRequired)));
    assert_eq!(otps.code_for("ada@example.com").as_deref(), Some("1234"));
    assert!(media.uploaded().is_empty());
}

#[tokio::test]
async fn should_reject_short_password_before_touching_otp() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let usecase = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::empty(),
        otps: otps.clone(),
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };

    let mut input = complete_input("ada@example.com", "1234", "ada");
    input.password = "123".to_owned();
    let result = usecase.execute(input).await;

    assert!(matches!(result, Err(AccountsServiceError::Validation(_))));
    assert!(otps.code_for("ada@example.com").is_some());
}

#[tokio::test]
async fn should_reject_completion_when_username_was_taken_meanwhile() {
    let otps = MockOtpRegister::with_entry("ada@example.com", "1234");
    let usecase = CompleteRegistrationUseCase {
        accounts: MockAccountRepo::new(vec![local_account("other@example.com", "ada")]),
        otps: otps.clone(),
        media: MockMediaStorage::new(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await;

    assert!(matches!(result, Err(AccountsServiceError::AccountAlreadyExists)));
    assert!(otps.code_for("ada@example.com").is_some());
}

#[tokio::test]
async fn should_not_create_account_when_avatar_upload_fails() {
    let accounts = MockAccountRepo::empty();
    let usecase = CompleteRegistrationUseCase {
        accounts: accounts.clone(),
        otps: MockOtpRegister::with_entry("ada@example.com", "1234"),
        media: MockMediaStorage::failing(),
        mailer: MockMailer::new(),
    };

    let result = usecase
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await;

    assert!(matches!(result, Err(AccountsServiceError::Internal(_))));
    assert_eq!(accounts.len(), 0);
}

#[tokio::test]
async fn should_register_even_if_welcome_email_fails() {
    let accounts = MockAccountRepo::empty();
    let usecase = CompleteRegistrationUseCase {
        accounts: accounts.clone(),
        otps: MockOtpRegister::with_entry("ada@example.com", "1234"),
        media: MockMediaStorage::new(),
        mailer: MockMailer::failing(),
    };

    usecase
        .execute(complete_input("ada@example.com", "1234", "ada"))
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
}

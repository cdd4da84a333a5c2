use uuid::Uuid;

use nextube_accounts::error::AccountsServiceError;
use nextube_accounts::usecase::account::{
    CurrentAccountUseCase, MediaSlot, UpdateDetailsInput, UpdateDetailsUseCase, UpdateMediaUseCase,
};

use crate::helpers::{MockAccountRepo, MockMediaStorage, local_account, upload};

#[tokio::test]
async fn should_return_current_account_view() {
    let account = local_account("ada@example.com", "ada");
    let view = CurrentAccountUseCase {
        accounts: MockAccountRepo::new(vec![account.clone()]),
    }
    .execute(account.id)
    .await
    .unwrap();

    assert_eq!(view.id, account.id);
    assert_eq!(view.username.as_deref(), Some("ada"));
}

#[tokio::test]
async fn should_report_missing_current_account() {
    let result = CurrentAccountUseCase {
        accounts: MockAccountRepo::empty(),
    }
    .execute(Uuid::now_v7())
    .await;
    assert!(matches!(result, Err(AccountsServiceError::AccountNotFound)));
}

#[tokio::test]
async fn should_update_name_and_normalized_email() {
    let account = local_account("ada@example.com", "ada");
    let view = UpdateDetailsUseCase {
        accounts: MockAccountRepo::new(vec![account.clone()]),
    }
    .execute(UpdateDetailsInput {
        account_id: account.id,
        full_name: Some("  Augusta Ada  ".to_owned()),
        email: Some("Augusta@Example.com".to_owned()),
    })
    .await
    .unwrap();

    assert_eq!(view.full_name, "Augusta Ada");
    assert_eq!(view.email, "augusta@example.com");
}

#[tokio::test]
async fn should_refuse_email_owned_by_someone_else() {
    let ada = local_account("ada@example.com", "ada");
    let bob = local_account("bob@example.com", "bob");
    let result = UpdateDetailsUseCase {
        accounts: MockAccountRepo::new(vec![ada.clone(), bob]),
    }
    .execute(UpdateDetailsInput {
        account_id: ada.id,
        full_name: None,
        email: Some("bob@example.com".to_owned()),
    })
    .await;
    assert!(matches!(result, Err(AccountsServiceError::EmailTaken)));
}

#[tokio::test]
async fn should_require_at_least_one_detail() {
    let ada = local_account("ada@example.com", "ada");
    let result = UpdateDetailsUseCase {
        accounts: MockAccountRepo::new(vec![ada.clone()]),
    }
    .execute(UpdateDetailsInput {
        account_id: ada.id,
        full_name: None,
        email: None,
    })
    .await;
    assert!(matches!(result, Err(AccountsServiceError::Validation(_))));
}

#[tokio::test]
async fn should_replace_avatar_and_cover_image() {
    let ada = local_account("ada@example.com", "ada");
    let accounts = MockAccountRepo::new(vec![ada.clone()]);
    let usecase = UpdateMediaUseCase {
        accounts: accounts.clone(),
        media: MockMediaStorage::new(),
    };

    let view = usecase
        .execute(ada.id, MediaSlot::Avatar, Some(upload("new-face.png")))
        .await
        .unwrap();
    assert_eq!(view.avatar, "https://media.test/new-face.png");

    let view = usecase
        .execute(ada.id, MediaSlot::CoverImage, Some(upload("banner.png")))
        .await
        .unwrap();
    assert_eq!(view.cover_image.as_deref(), Some("https://media.test/banner.png"));
    assert_eq!(view.avatar, "https://media.test/new-face.png");
}

#[tokio::test]
async fn should_require_file_for_media_update() {
    let ada = local_account("ada@example.com", "ada");
    let media = MockMediaStorage::new();
    let usecase = UpdateMediaUseCase {
        accounts: MockAccountRepo::new(vec![ada.clone()]),
        media: media.clone(),
    };

    let avatar = usecase.execute(ada.id, MediaSlot::Avatar, None).await;
    assert!(matches!(avatar, Err(AccountsServiceError::AvatarRequired)));

    let cover = usecase.execute(ada.id, MediaSlot::CoverImage, None).await;
    assert!(matches!(cover, Err(AccountsServiceError::Validation(_))));
    assert!(media.uploaded().is_empty());
}

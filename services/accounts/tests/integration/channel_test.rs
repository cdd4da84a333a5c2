use uuid::Uuid;

use nextube_accounts::error::AccountsServiceError;
use nextube_accounts::usecase::channel::{ChannelProfileUseCase, DashboardStatsUseCase};
use nextube_accounts::usecase::like::ToggleLikeUseCase;
use nextube_accounts::usecase::subscription::ToggleSubscriptionUseCase;
use nextube_domain::relationship::LikeTargetKind;

use crate::helpers::{
    MockAccountRepo, MockLikeRepo, MockSubscriptionRepo, MockVideoRepo, local_account, test_video,
};

#[tokio::test]
async fn should_aggregate_channel_counts_for_viewer() {
    let a = local_account("a@example.com", "alpha");
    let b = local_account("b@example.com", "bravo");
    let c = local_account("c@example.com", "charlie");
    let mut channel = local_account("ch@example.com", "channel");
    channel.cover_image = Some("https://media.test/cover.png".to_owned());
    let accounts = MockAccountRepo::new(vec![a.clone(), b.clone(), c.clone(), channel.clone()]);
    let subscriptions = MockSubscriptionRepo::empty();

    let toggle = ToggleSubscriptionUseCase {
        accounts: accounts.clone(),
        subscriptions: subscriptions.clone(),
    };
    toggle.execute(a.id, channel.id).await.unwrap();
    toggle.execute(b.id, channel.id).await.unwrap();
    toggle.execute(channel.id, c.id).await.unwrap();

    let usecase = ChannelProfileUseCase {
        accounts,
        subscriptions,
    };

    let as_a = usecase.execute("Channel", Some(a.id)).await.unwrap();
    assert_eq!(as_a.account.id, channel.id);
    assert_eq!(as_a.cover_image.as_deref(), Some("https://media.test/cover.png"));
    assert_eq!(as_a.stats.subscriber_count, 2);
    assert_eq!(as_a.stats.following_count, 1);
    assert!(as_a.stats.is_subscribed);

    let as_c = usecase.execute("channel", Some(c.id)).await.unwrap();
    assert!(!as_c.stats.is_subscribed);

    let anonymous = usecase.execute("channel", None).await.unwrap();
    assert!(!anonymous.stats.is_subscribed);

    let json = serde_json::to_value(&anonymous).unwrap();
    assert_eq!(json["username"], "channel");
    assert_eq!(json["subscriber_count"], 2);
    assert!(json.get("email").is_none());
}

#[tokio::test]
async fn should_report_unknown_channel() {
    let usecase = ChannelProfileUseCase {
        accounts: MockAccountRepo::empty(),
        subscriptions: MockSubscriptionRepo::empty(),
    };

    let missing = usecase.execute("nobody", None).await;
    assert!(matches!(missing, Err(AccountsServiceError::ChannelNotFound)));

    let garbled = usecase.execute("not a username!", None).await;
    assert!(matches!(garbled, Err(AccountsServiceError::ChannelNotFound)));
}

#[tokio::test]
async fn should_compute_dashboard_stats() {
    let owner = local_account("o@example.com", "owner");
    let fan = local_account("f@example.com", "fan");
    let mut v1 = test_video(owner.id, "one");
    v1.views = 120;
    let mut v2 = test_video(owner.id, "two");
    v2.views = 3;
    let mut elsewhere = test_video(fan.id, "other");
    elsewhere.views = 1000;

    let accounts = MockAccountRepo::new(vec![owner.clone(), fan.clone()]);
    let subscriptions = MockSubscriptionRepo::empty();
    ToggleSubscriptionUseCase {
        accounts,
        subscriptions: subscriptions.clone(),
    }
    .execute(fan.id, owner.id)
    .await
    .unwrap();

    let likes = MockLikeRepo::empty();
    let like = ToggleLikeUseCase {
        likes: likes.clone(),
    };
    like.execute(fan.id, v1.id, LikeTargetKind::Video).await.unwrap();
    like.execute(owner.id, v1.id, LikeTargetKind::Video).await.unwrap();
    like.execute(fan.id, v2.id, LikeTargetKind::Video).await.unwrap();
    like.execute(fan.id, elsewhere.id, LikeTargetKind::Video).await.unwrap();
    like.execute(fan.id, v2.id, LikeTargetKind::Comment).await.unwrap();
    like.execute(owner.id, elsewhere.id, LikeTargetKind::Video).await.unwrap();
    like.execute(owner.id, Uuid::now_v7(), LikeTargetKind::Tweet).await.unwrap();

    let stats = DashboardStatsUseCase {
        subscriptions,
        likes,
        videos: MockVideoRepo::new(vec![v1, v2, elsewhere]),
    }
    .execute(owner.id)
    .await
    .unwrap();

    assert_eq!(stats.view_count, 123);
    assert_eq!(stats.subscriber_count, 1);
    assert_eq!(stats.video_count, 2);
    // Given by the owner: v1, elsewhere and a tweet.
    assert_eq!(stats.like_count, 3);
    // Received on v1 and v2 as videos; the comment like does not count.
    assert_eq!(stats.video_like_count, 3);
}

#[tokio::test]
async fn should_return_zero_stats_for_empty_channel() {
    let stats = DashboardStatsUseCase {
        subscriptions: MockSubscriptionRepo::empty(),
        likes: MockLikeRepo::empty(),
        videos: MockVideoRepo::default(),
    }
    .execute(Uuid::now_v7())
    .await
    .unwrap();

    assert_eq!(stats.view_count, 0);
    assert_eq!(stats.subscriber_count, 0);
    assert_eq!(stats.video_count, 0);
    assert_eq!(stats.like_count, 0);
    assert_eq!(stats.video_like_count, 0);
}

mod common;

use anyhow::Result;
use common::{principal, signed_in_session};
use futures::future::join_all;
use pictura_lib::domain::entities::{ExternalBlob, Post, Profile};
use pictura_lib::domain::value_objects::{QueryKey, QueryKind};
use pictura_lib::infrastructure::backend::InMemoryBackend;
use pictura_lib::shared::AppError;

#[tokio::test]
async fn concurrent_reads_share_one_request() -> Result<()> {
    let backend = InMemoryBackend::new();
    let alice = signed_in_session(&backend, "alice");
    alice
        .state
        .profile_service
        .create_or_update_profile("Alice", "")
        .await?;

    let bob = signed_in_session(&backend, "bob");
    let alice_id = principal("alice");
    let reads = (0..8).map(|_| bob.state.profile_service.profile(&alice_id));
    let results = join_all(reads).await;

    assert!(results.iter().all(|result| result.is_ok()));
    assert_eq!(backend.call_count("get_profile").await, 1);
    assert_eq!(bob.state.queries.in_flight_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn comment_invalidates_post_and_every_author_list() -> Result<()> {
    let backend = InMemoryBackend::new();
    let bob = signed_in_session(&backend, "bob");
    let post_id = bob
        .state
        .post_service
        .create_post("", ExternalBlob::from_url("https://img.example.invalid/p.png"))
        .await?;

    let alice = signed_in_session(&backend, "alice");
    let queries = &alice.state.queries;
    alice.state.post_service.post(post_id).await?;
    alice.state.post_service.posts_by_user(&principal("bob")).await?;
    alice.state.post_service.posts_by_user(&principal("carol")).await?;

    alice
        .state
        .post_service
        .add_comment(post_id, "  nice  ")
        .await?;

    assert!(queries.cached::<Post>(&QueryKey::Post(post_id)).await.is_none());
    assert!(queries
        .cached::<Vec<Post>>(&QueryKey::UserPosts(principal("carol")))
        .await
        .is_none());

    let refreshed = alice.state.post_service.post(post_id).await?;
    assert_eq!(refreshed.comments.len(), 1);
    assert_eq!(refreshed.comments[0].text, "nice");
    Ok(())
}

#[tokio::test]
async fn failed_mutation_keeps_cached_values() -> Result<()> {
    let backend = InMemoryBackend::new();
    let alice = signed_in_session(&backend, "alice");
    alice
        .state
        .profile_service
        .create_or_update_profile("Alice", "")
        .await?;
    let before = alice.state.profile_service.current_profile().await?;

    backend
        .inject_failure("create_or_update_profile", AppError::Backend("trap".into()))
        .await;
    let err = alice
        .state
        .profile_service
        .create_or_update_profile("Renamed", "")
        .await
        .unwrap_err();
    assert_eq!(err, AppError::Backend("trap".into()));

    let cached = alice
        .state
        .queries
        .cached::<Option<Profile>>(&QueryKey::CurrentUserProfile)
        .await;
    assert_eq!(cached, Some(before));
    assert_eq!(backend.call_count("get_profile").await, 1);
    Ok(())
}

#[tokio::test]
async fn missing_profile_is_not_an_error_but_other_failures_are() -> Result<()> {
    let backend = InMemoryBackend::new();
    let alice = signed_in_session(&backend, "alice");
    assert_eq!(alice.state.profile_service.current_profile().await?, None);

    let bob = signed_in_session(&backend, "bob");
    backend
        .inject_failure("get_profile", AppError::Network("reset".into()))
        .await;
    let err = bob.state.profile_service.current_profile().await.unwrap_err();
    assert_eq!(err, AppError::Network("reset".into()));

    // 失敗はキャッシュされない
    assert_eq!(bob.state.profile_service.current_profile().await?, None);
    Ok(())
}

#[tokio::test]
async fn kind_wide_invalidation_reaches_every_parameter() -> Result<()> {
    let backend = InMemoryBackend::new();
    let alice = signed_in_session(&backend, "alice");
    let search = &alice.state.search_service;
    search.search_profiles("a").await?;
    search.search_profiles("b").await?;
    assert_eq!(backend.call_count("search_profiles").await, 2);

    let affected = alice
        .state
        .queries
        .invalidate(&QueryKind::SearchProfiles.into())
        .await;
    assert_eq!(affected, 2);

    search.search_profiles("a").await?;
    assert_eq!(backend.call_count("search_profiles").await, 3);
    Ok(())
}

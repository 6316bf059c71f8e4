//! End-to-end tests for the candidate feed and the swipe/match flow

mod common;

use common::{
    raw_profile, raw_track, TestClient, TestServer, ALICE_EMAIL, ALICE_ONLY_ARTIST_ID,
    ALICE_ONLY_ARTIST_NAME, BOB_EMAIL, BOB_ONLY_ARTIST_ID, BOB_ONLY_ARTIST_NAME, CAROL_EMAIL,
    SHARED_ARTIST_ID, SHARED_ARTIST_NAME,
};
use reqwest::StatusCode;

async fn sync_alice(client: &TestClient) {
    client
        .sync_profile(&raw_profile(
            &[
                (SHARED_ARTIST_ID, SHARED_ARTIST_NAME, &["rock"]),
                (ALICE_ONLY_ARTIST_ID, ALICE_ONLY_ARTIST_NAME, &["pop"]),
            ],
            &[raw_track("t-a1", "Alice Jam", SHARED_ARTIST_NAME)],
        ))
        .await;
}

async fn sync_bob(client: &TestClient) {
    client
        .sync_profile(&raw_profile(
            &[
                (SHARED_ARTIST_ID, SHARED_ARTIST_NAME, &["rock"]),
                (BOB_ONLY_ARTIST_ID, BOB_ONLY_ARTIST_NAME, &["metal"]),
            ],
            &[raw_track("t-b1", "Bob Jam", SHARED_ARTIST_NAME)],
        ))
        .await;
}

#[tokio::test]
async fn feed_requires_a_synced_profile() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let response = alice.get_feed().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_lists_scored_candidates() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;
    let _carol = TestClient::authenticated(server.base_url.clone(), CAROL_EMAIL, "Carol").await;
    sync_alice(&alice).await;
    sync_bob(&bob).await;
    // Carol never syncs and must not appear.

    let response = alice.get_feed().await;
    assert_eq!(response.status(), StatusCode::OK);
    let feed: serde_json::Value = response.json().await.unwrap();
    let entries = feed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_id"], bob.user_id as u64);
    assert_eq!(
        entries[0]["breakdown"]["shared_artists"][0],
        SHARED_ARTIST_NAME
    );
    // 1 shared of max 2 artists.
    assert_eq!(entries[0]["breakdown"]["artist_overlap_pct"], 0.5);
    assert!(entries[0]["compatibility_score"].as_u64().unwrap() > 0);
    assert_eq!(entries[0]["top_artists"][0], SHARED_ARTIST_NAME);
}

#[tokio::test]
async fn feed_excludes_already_swiped_users() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;
    sync_alice(&alice).await;
    sync_bob(&bob).await;

    // A pass excludes the target just as a like would.
    alice.swipe(bob.user_id, "pass").await;
    let feed: serde_json::Value = alice.get_feed().await.json().await.unwrap();
    assert!(feed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn feed_filters_are_exact_match() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated_with_attrs(
        server.base_url.clone(),
        BOB_EMAIL,
        "Bob",
        Some("Physics"),
        Some(2),
        None,
    )
    .await;
    let carol = TestClient::authenticated_with_attrs(
        server.base_url.clone(),
        CAROL_EMAIL,
        "Carol",
        Some("History"),
        Some(2),
        None,
    )
    .await;
    sync_alice(&alice).await;
    sync_bob(&bob).await;
    sync_bob(&carol).await;

    let feed: serde_json::Value = alice
        .get_feed_filtered(&[("course", "Physics")])
        .await
        .json()
        .await
        .unwrap();
    let entries = feed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_id"], bob.user_id as u64);
}

#[tokio::test]
async fn swipe_rejects_bad_input() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;

    // Unknown action value.
    let response = alice.swipe(bob.user_id, "superlike").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Swiping on oneself.
    let response = alice.swipe(alice.user_id, "like").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown target.
    let response = alice.swipe(99999, "like").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_swipe_on_the_same_pair_conflicts() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;

    assert_eq!(alice.swipe(bob.user_id, "pass").await.status(), StatusCode::OK);
    // Regardless of the action chosen the second time.
    assert_eq!(
        alice.swipe(bob.user_id, "like").await.status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        alice.swipe(bob.user_id, "pass").await.status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn mutual_like_forms_a_match_with_a_snapshot() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;
    sync_alice(&alice).await;
    sync_bob(&bob).await;

    let first: serde_json::Value = alice.swipe(bob.user_id, "like").await.json().await.unwrap();
    assert_eq!(first["is_match"], false);
    assert!(first["match_id"].is_null());

    let second: serde_json::Value = bob.swipe(alice.user_id, "like").await.json().await.unwrap();
    assert_eq!(second["is_match"], true);
    assert_eq!(second["message"], "It's a match!");
    let match_id = second["match_id"].as_u64().unwrap() as usize;

    // Both parties see the match with the stored breakdown.
    for client in [&alice, &bob] {
        let detail: serde_json::Value =
            client.get_match_detail(match_id).await.json().await.unwrap();
        assert_eq!(detail["breakdown"]["shared_artists"][0], SHARED_ARTIST_NAME);
        assert!(detail["compatibility_score"].as_u64().unwrap() > 0);
    }

    let matches: serde_json::Value = alice.get_matches().await.json().await.unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["other_user"]["display_name"], "Bob");
}

#[tokio::test]
async fn like_then_pass_never_matches() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;

    alice.swipe(bob.user_id, "like").await;
    let outcome: serde_json::Value = bob.swipe(alice.user_id, "pass").await.json().await.unwrap();
    assert_eq!(outcome["is_match"], false);

    let matches: serde_json::Value = alice.get_matches().await.json().await.unwrap();
    assert!(matches.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn match_detail_is_membership_checked() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;
    let carol = TestClient::authenticated(server.base_url.clone(), CAROL_EMAIL, "Carol").await;

    alice.swipe(bob.user_id, "like").await;
    let outcome: serde_json::Value = bob.swipe(alice.user_id, "like").await.json().await.unwrap();
    let match_id = outcome["match_id"].as_u64().unwrap() as usize;

    assert_eq!(
        carol.get_match_detail(match_id).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        alice.get_match_detail(99999).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn matching_without_profiles_still_works() {
    // Profiles are treated as empty for the snapshot; the match still
    // forms because consent, not taste, drives the state machine.
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), ALICE_EMAIL, "Alice").await;
    let bob = TestClient::authenticated(server.base_url.clone(), BOB_EMAIL, "Bob").await;

    alice.swipe(bob.user_id, "like").await;
    let outcome: serde_json::Value = bob.swipe(alice.user_id, "like").await.json().await.unwrap();
    assert_eq!(outcome["is_match"], true);

    let match_id = outcome["match_id"].as_u64().unwrap() as usize;
    let detail: serde_json::Value = alice.get_match_detail(match_id).await.json().await.unwrap();
    // Two empty profiles sit at the pattern-similarity floor.
    assert_eq!(detail["compatibility_score"], 20);
    assert!(detail["breakdown"]["shared_artists"].as_array().unwrap().is_empty());
}

use std::sync::Arc;
use std::thread;

use magnet_feed::{FeedError, FeedService, RssEncoder};
use magnet_token::{TokenError, generate};
use magnet_types::{Storage, User};

mod common;
use common::{Harness, TestStore, SALT};

fn registers_once<S: TestStore>(h: Harness<S>) {
    let users = h.service.users();

    let first = users.register_or_get(42, "alice").unwrap();
    h.clock.advance(chrono::Duration::minutes(5));
    let second = users.register_or_get(42, "alice-renamed").unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.feed_token, second.feed_token);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.account_name, "alice");
    assert_eq!(h.store.users(), 1);

    let expected = generate(42, SALT).unwrap();
    assert_eq!(second.feed_token.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_register_is_idempotent_sqlite() {
    registers_once(common::sqlite());
}

#[test]
fn test_register_is_idempotent_memory() {
    registers_once(common::memory());
}

fn lookups<S: TestStore>(h: Harness<S>) {
    let users = h.service.users();
    let registered = users.register_or_get(7, "bob").unwrap();
    let token = registered.feed_token.clone().unwrap();

    assert_eq!(users.get_by_account_id(7).unwrap().id, registered.id);
    assert_eq!(users.get_by_feed_token(&token).unwrap().id, registered.id);

    let err = users.get_by_account_id(8).unwrap_err();
    assert!(matches!(err, FeedError::NotFound(_)));
}

#[test]
fn test_lookups_sqlite() {
    lookups(common::sqlite());
}

#[test]
fn test_lookups_memory() {
    lookups(common::memory());
}

fn token_misses_look_alike<S: TestStore>(h: Harness<S>) {
    let users = h.service.users();
    users.register_or_get(1, "carol").unwrap();

    // Well-formed, but nobody registered account 999.
    let unassigned = generate(999, SALT).unwrap();
    let unassigned_err = users.get_by_feed_token(&unassigned).unwrap_err();
    let malformed_err = users.get_by_feed_token("<script>").unwrap_err();
    let empty_err = users.get_by_feed_token("").unwrap_err();

    assert!(unassigned_err.is_not_found());
    assert!(malformed_err.is_not_found());
    assert_eq!(unassigned_err.to_string(), malformed_err.to_string());
    assert_eq!(unassigned_err.to_string(), empty_err.to_string());
}

#[test]
fn test_token_misses_look_alike_sqlite() {
    token_misses_look_alike(common::sqlite());
}

#[test]
fn test_token_misses_look_alike_memory() {
    token_misses_look_alike(common::memory());
}

#[test]
fn test_negative_account_is_rejected_before_insert() {
    let h = common::sqlite();
    let err = h.service.users().register_or_get(-5, "mallory").unwrap_err();

    assert!(matches!(err, FeedError::Encoding(TokenError::NegativeAccountId(-5))));
    assert_eq!(h.store.users(), 0);
}

#[test]
fn test_created_at_uses_clock_and_updated_at_moves() {
    let h = common::memory();
    let users = h.service.users();

    let mut user = users.register_or_get(3, "dave").unwrap();
    assert_eq!(user.created_at, common::start());

    h.clock.advance(chrono::Duration::hours(2));
    users.touch_feed_checked(&mut user).unwrap();

    let stored = users.get_by_account_id(3).unwrap();
    assert_eq!(stored.created_at, common::start());
    assert_eq!(stored.updated_at, common::start() + chrono::Duration::hours(2));
    assert_eq!(stored.feed_checked_at, Some(stored.updated_at));
}

#[test]
fn test_concurrent_registration_converges() {
    let h = common::sqlite();
    let users = Arc::new(h.service.users().clone());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let users = users.clone();
                scope.spawn(move || users.register_or_get(42, &format!("worker-{}", i)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    let first = &results[0];
    for user in &results {
        assert_eq!(user.id, first.id);
        assert_eq!(user.feed_token, first.feed_token);
    }
    assert_eq!(h.store.users(), 1);
}

fn service_with_salt<S: TestStore>(h: &Harness<S>, salt: &str) -> FeedService {
    let mut config = common::test_config();
    config.salt = salt.to_string();
    FeedService::with_parts(h.store.clone(), config, Arc::new(RssEncoder), h.clock.clone()).unwrap()
}

/// Account 3 under "old-salt" and account 5 under "new-salt" both hash to "72".
fn token_clash_leaves_no_row<S: TestStore>(h: Harness<S>) {
    let old = service_with_salt(&h, "old-salt");
    let new = service_with_salt(&h, "new-salt");
    assert_eq!(generate(3, "old-salt").unwrap(), generate(5, "new-salt").unwrap());

    old.users().register_or_get(3, "frank").unwrap();
    let err = new.users().register_or_get(5, "grace").unwrap_err();

    assert!(matches!(err, FeedError::Persistence(_)));
    assert_eq!(h.store.users(), 1);
    assert!(new.users().get_by_account_id(5).unwrap_err().is_not_found());

    // Tokens are not decoded on lookup, so the older-salt token still resolves.
    assert_eq!(new.users().get_by_feed_token("72").unwrap().account_id, 3);
}

#[test]
fn test_token_clash_leaves_no_row_sqlite() {
    token_clash_leaves_no_row(common::sqlite());
}

#[test]
fn test_token_clash_leaves_no_row_memory() {
    token_clash_leaves_no_row(common::memory());
}

fn tokenless_row_gets_token<S: TestStore>(h: Harness<S>) {
    let legacy = User::new(11, "heidi", common::start());
    assert!(h.store.insert_user_if_absent(&legacy).unwrap());

    h.clock.advance(chrono::Duration::minutes(1));
    let user = h.service.users().register_or_get(11, "heidi").unwrap();

    assert_eq!(user.id, legacy.id);
    assert_eq!(user.feed_token, Some(generate(11, SALT).unwrap()));
    assert_eq!(user.updated_at, common::start() + chrono::Duration::minutes(1));

    let token = user.feed_token.unwrap();
    assert_eq!(h.service.users().get_by_feed_token(&token).unwrap().id, legacy.id);
}

#[test]
fn test_tokenless_row_gets_token_sqlite() {
    tokenless_row_gets_token(common::sqlite());
}

#[test]
fn test_tokenless_row_gets_token_memory() {
    tokenless_row_gets_token(common::memory());
}

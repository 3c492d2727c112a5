//! Integration tests for the user service against a SQLite store.
//!
//! Covers the creation protocol under concurrency as well as lookup, listing
//! and blocking.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use usergate::db::{Store, StoreError, UserStore};
use usergate::models::{
    GroupCode, Includes, NewUser, StatusCode, Tracking, UserFilter, UserRecord,
};
use usergate::services::{AdmissionKey, AdmissionRegistry, DefaultUserService, UserError, UserService};

async fn spawn_service(delay_ms: u64) -> (Arc<DefaultUserService>, Store) {
    let db_path =
        std::env::temp_dir().join(format!("usergate-test-{}.db", uuid::Uuid::new_v4()));

    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("Failed to open test database");

    let service = DefaultUserService::new(
        Arc::new(store.clone()),
        Arc::new(AdmissionRegistry::new()),
        Duration::from_millis(delay_ms),
    );

    (Arc::new(service), store)
}

async fn all_users(store: &Store) -> Vec<usergate::models::User> {
    store
        .query_users(None, 0, 1000, Includes::ALL)
        .await
        .expect("Failed to list users")
}

async fn wait_until_reserved(service: &DefaultUserService, login: &str) {
    let key = AdmissionKey::login(login);
    tokio::time::timeout(Duration::from_secs(5), async {
        while !service.admission().is_reserved(&key) {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("Reservation never appeared");
}

#[tokio::test]
async fn test_create_user_persists_group_and_active_state() {
    let (service, store) = spawn_service(10).await;
    let before = Utc::now();

    let candidate = NewUser::new("login", "password", GroupCode::User)
        .with_group_description("description")
        .with_state(StatusCode::Blocked, Some("description".to_string()));

    let created = service.create_user(Some(candidate)).await.unwrap();
    assert!(created.id > 0);

    let users = all_users(&store).await;
    assert_eq!(users.len(), 1);

    let user = &users[0];
    assert_eq!(user.login, "login");
    assert_eq!(user.password, "password");
    assert!(user.created_at >= before - chrono::Duration::seconds(1));
    assert!(user.created_at <= Utc::now());

    let group = user.group.as_ref().unwrap();
    assert_eq!(group.code, GroupCode::User);
    assert_eq!(group.description.as_deref(), Some("description"));

    let state = user.state.as_ref().unwrap();
    assert_eq!(state.code, StatusCode::Active);
    assert_eq!(state.description.as_deref(), Some("description"));

    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_second_admin_is_rejected() {
    let (service, store) = spawn_service(10).await;

    service
        .create_user(Some(NewUser::new("login", "password", GroupCode::Admin)))
        .await
        .unwrap();

    let err = service
        .create_user(Some(NewUser::new("login2", "password", GroupCode::Admin)))
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::AdminConflict), "{err}");

    let admins = store
        .query_users(
            Some(&UserFilter::default().with_group(GroupCode::Admin)),
            0,
            10,
            Includes::NONE,
        )
        .await
        .unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(all_users(&store).await.len(), 1);
    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_concurrent_same_login_only_first_succeeds() {
    let (service, store) = spawn_service(300).await;

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_user(Some(NewUser::new("alice", "pw1", GroupCode::User)))
                .await
        })
    };

    wait_until_reserved(&service, "alice").await;

    let err = service
        .create_user(Some(NewUser::new("alice", "pw2", GroupCode::User)))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::LoginInFlight(ref login) if login == "alice"), "{err}");

    first.await.unwrap().unwrap();

    let users = all_users(&store).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login, "alice");
    assert_eq!(users[0].password, "pw1");
    assert!(!service.admission().is_reserved(&AdmissionKey::login("alice")));
}

#[tokio::test]
async fn test_many_racers_for_one_login_yield_single_user() {
    let (service, store) = spawn_service(200).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create_user(Some(NewUser::new("bob", format!("pw{i}"), GroupCode::User)))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(err.is_conflict(), "{err}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(all_users(&store).await.len(), 1);
    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_sequential_duplicate_login_is_rejected() {
    let (service, store) = spawn_service(10).await;

    service
        .create_user(Some(NewUser::new("login", "password", GroupCode::User)))
        .await
        .unwrap();

    let err = service
        .create_user(Some(NewUser::new("login", "password", GroupCode::User)))
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::LoginTaken(_)), "{err}");
    assert_eq!(all_users(&store).await.len(), 1);
    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_concurrent_admins_with_different_logins() {
    let (service, store) = spawn_service(200).await;

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_user(Some(NewUser::new("root", "pw", GroupCode::Admin)))
                .await
        })
    };

    wait_until_reserved(&service, "root").await;

    let err = service
        .create_user(Some(NewUser::new("toor", "pw", GroupCode::Admin)))
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::AdminConflict), "{err}");

    first.await.unwrap().unwrap();

    let users = all_users(&store).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login, "root");
    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_different_logins_proceed_in_parallel() {
    let (service, store) = spawn_service(200).await;

    let (a, b) = tokio::join!(
        service.create_user(Some(NewUser::new("carol", "pw", GroupCode::User))),
        service.create_user(Some(NewUser::new("dave", "pw", GroupCode::User))),
    );

    a.unwrap();
    b.unwrap();
    assert_eq!(all_users(&store).await.len(), 2);
}

#[tokio::test]
async fn test_invalid_candidates_do_not_touch_store() {
    let (service, store) = spawn_service(10).await;

    for candidate in [
        None,
        Some(NewUser::new("", "password", GroupCode::User)),
        Some(NewUser::new("login", "", GroupCode::User)),
        Some(NewUser::new("login", "   ", GroupCode::User)),
    ] {
        let err = service.create_user(candidate).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidInput(_)), "{err}");
    }

    assert!(all_users(&store).await.is_empty());
    assert!(service.admission().is_empty());
}

#[tokio::test]
async fn test_deactivate_blocks_user() {
    let (service, store) = spawn_service(10).await;

    let user = service
        .create_user(Some(NewUser::new("login", "password", GroupCode::User)))
        .await
        .unwrap();

    service.deactivate_user(user.id).await.unwrap();

    let users = all_users(&store).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].state.as_ref().unwrap().code, StatusCode::Blocked);

    // Blocking twice is allowed.
    service.deactivate_user(user.id).await.unwrap();
    let state = store.find_user_state(user.id).await.unwrap().unwrap();
    assert_eq!(state.code, StatusCode::Blocked);
}

#[tokio::test]
async fn test_deactivate_unknown_user_is_not_found() {
    let (service, _store) = spawn_service(10).await;

    let err = service.deactivate_user(999).await.unwrap_err();
    assert!(matches!(err, UserError::NotFound(999)), "{err}");
}

#[tokio::test]
async fn test_get_user_by_login() {
    let (service, _store) = spawn_service(10).await;

    service
        .create_user(Some(
            NewUser::new("login", "password", GroupCode::User).with_group_description("staff"),
        ))
        .await
        .unwrap();

    let user = service
        .get_user(&UserFilter::by_login("login"), Includes::ALL, Tracking::NoTracking)
        .await
        .unwrap()
        .expect("user should exist");

    assert_eq!(user.password, "password");
    assert_eq!(user.group.as_ref().unwrap().code, GroupCode::User);
    assert_eq!(
        user.group.as_ref().unwrap().description.as_deref(),
        Some("staff")
    );
    assert_eq!(user.state.as_ref().unwrap().code, StatusCode::Active);

    let bare = service
        .get_user(&UserFilter::by_id(user.id), Includes::NONE, Tracking::Tracked)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bare.login, "login");
    assert!(bare.group.is_none());
    assert!(bare.state.is_none());
}

#[tokio::test]
async fn test_get_missing_user_is_success() {
    let (service, _store) = spawn_service(10).await;

    let user = service
        .get_user(&UserFilter::by_login("login"), Includes::NONE, Tracking::NoTracking)
        .await
        .unwrap();

    assert!(user.is_none());
}

#[tokio::test]
async fn test_list_users_pages_in_id_order() {
    let (service, _store) = spawn_service(0).await;

    for login in ["login1", "login2", "login3"] {
        service
            .create_user(Some(NewUser::new(login, "password", GroupCode::User)))
            .await
            .unwrap();
    }

    let all = service
        .list_users(None, 0, 10, "UserGroup,UserState".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|u| u.group.is_some() && u.state.is_some()));

    let page = service
        .list_users(None, 1, 1, Includes::NONE)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].login, "login2");
    assert!(page[0].group.is_none());

    service.deactivate_user(all[2].id).await.unwrap();
    let blocked = service
        .list_users(
            Some(&UserFilter::default().with_state(StatusCode::Blocked)),
            0,
            10,
            Includes::ALL,
        )
        .await
        .unwrap();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].login, "login3");
}

#[tokio::test]
async fn test_list_users_on_empty_store() {
    let (service, _store) = spawn_service(0).await;

    let users = service
        .list_users(None, 0, 10, Includes::NONE)
        .await
        .unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_list_users_rejects_skip_beyond_sqlite_range() {
    let (service, _store) = spawn_service(0).await;

    service
        .create_user(Some(NewUser::new("login", "password", GroupCode::User)))
        .await
        .unwrap();

    let err = service
        .list_users(None, u64::MAX, 10, Includes::NONE)
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::InvalidInput(_)), "{err}");

    let err = service
        .list_users(None, 0, u64::MAX, Includes::NONE)
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::InvalidInput(_)), "{err}");

    let past_end = service
        .list_users(None, 100, 10, Includes::NONE)
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_store_rejects_duplicate_login_on_insert() {
    let (_service, store) = spawn_service(0).await;

    let record = UserRecord {
        login: "alice".to_string(),
        password: "pw".to_string(),
        created_at: Utc::now(),
        group: GroupCode::User,
        group_description: None,
        state: StatusCode::Active,
        state_description: None,
    };

    store.insert_user(&record).await.unwrap();
    let err = store.insert_user(&record).await.unwrap_err();

    assert!(matches!(err, StoreError::DuplicateLogin(ref login) if login == "alice"), "{err}");
    assert!(matches!(UserError::from(err), UserError::LoginTaken(_)));
    assert_eq!(all_users(&store).await.len(), 1);
}

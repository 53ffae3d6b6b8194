//! Integration tests for `SqliteStore` against an in-memory database.

use parlor_core::{
  entry::{EntryBody, EntryId, NewEntry, RequestStatus, Timestamp},
  store::{EntryStore, UserStore},
  user::{Profile, UserId},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn profile(name: &str) -> Profile {
  Profile {
    full_name: name.into(),
    email:     format!("{}@example.com", name.to_lowercase()),
    image:     None,
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_increasing_ids() {
  let s = store().await;

  let first = s
    .create_entry(NewEntry::request("1".into(), "2".into()))
    .await
    .unwrap();
  let second = s
    .create_entry(NewEntry::message("2".into(), "1".into(), "hello"))
    .await
    .unwrap();

  assert_eq!(first.id, EntryId::new("1"));
  assert_eq!(second.id, EntryId::new("2"));
  assert_eq!(second.text(), Some("hello"));
}

#[tokio::test]
async fn list_returns_everything_in_id_order() {
  let s = store().await;
  for i in 0..3 {
    s.create_entry(NewEntry::message("a".into(), "b".into(), format!("m{i}")))
      .await
      .unwrap();
  }

  let all = s.list_entries().await.unwrap();
  let texts: Vec<_> = all.iter().filter_map(|e| e.text()).collect();
  assert_eq!(texts, vec!["m0", "m1", "m2"]);
}

#[tokio::test]
async fn created_at_round_trips_verbatim() {
  let s = store().await;
  let mut new = NewEntry::request("a".into(), "b".into());
  new.created_at = Timestamp::parse("2024-01-01T00:00:00Z");

  let created = s.create_entry(new).await.unwrap();
  let fetched = s.get_entry(created.id.clone()).await.unwrap().unwrap();
  assert_eq!(fetched.created_at.as_str(), "2024-01-01T00:00:00Z");
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn update_changes_request_status() {
  let s = store().await;
  let mut request = s
    .create_entry(NewEntry::request("a".into(), "b".into()))
    .await
    .unwrap();

  request.body = EntryBody::Request { status: RequestStatus::Accepted };
  let updated = s.update_entry(request.clone()).await.unwrap();
  assert_eq!(updated, Some(request.clone()));

  let fetched = s.get_entry(request.id).await.unwrap().unwrap();
  assert_eq!(fetched.request_status(), Some(RequestStatus::Accepted));
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let ghost = NewEntry::request("a".into(), "b".into()).into_entry("99".into());
  assert_eq!(s.update_entry(ghost).await.unwrap(), None);

  let odd = NewEntry::request("a".into(), "b".into()).into_entry("not-a-row".into());
  assert_eq!(s.update_entry(odd).await.unwrap(), None);
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
  let s = store().await;
  let request = s
    .create_entry(NewEntry::request("a".into(), "b".into()))
    .await
    .unwrap();

  assert!(s.delete_entry(request.id.clone()).await.unwrap());
  assert!(!s.delete_entry(request.id.clone()).await.unwrap());
  assert!(!s.delete_entry("nope".into()).await.unwrap());
  assert!(s.list_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
  let s = store().await;
  let first = s
    .create_entry(NewEntry::request("a".into(), "b".into()))
    .await
    .unwrap();
  s.delete_entry(first.id.clone()).await.unwrap();

  let second = s
    .create_entry(NewEntry::request("a".into(), "b".into()))
    .await
    .unwrap();
  assert_ne!(first.id, second.id);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_users() {
  let s = store().await;
  let amy = s.create_user(profile("Amy")).await.unwrap();
  s.create_user(profile("John")).await.unwrap();

  assert_eq!(amy.id, UserId::new("1"));
  assert_eq!(amy.email.as_deref(), Some("amy@example.com"));

  let users = s.list_users().await.unwrap();
  let names: Vec<_> = users.iter().map(|u| u.display_name()).collect();
  assert_eq!(names, vec!["Amy", "John"]);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user("1".into()).await.unwrap().is_none());
  assert!(s.get_user("amy".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_profile_overwrites_fields() {
  let s = store().await;
  let amy = s.create_user(profile("Amy")).await.unwrap();

  let updated = s
    .update_profile(
      amy.id.clone(),
      Profile {
        full_name: "Amy Pond".into(),
        email:     "pond@example.com".into(),
        image:     Some("https://example.com/amy.png".into()),
      },
    )
    .await
    .unwrap()
    .expect("user exists");
  assert_eq!(updated.full_name, "Amy Pond");

  let fetched = s.get_user(amy.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);

  assert!(
    s.update_profile("42".into(), profile("Nobody"))
      .await
      .unwrap()
      .is_none()
  );
}

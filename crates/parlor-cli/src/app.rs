//! Command implementations. Each command opens a session, loads what it
//! needs once, acts through the engine, and prints the result.

use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use parlor_client::HttpStore;
use parlor_core::{
  entry::EntryId,
  relationship::Relationship,
  store::UserStore,
  user::{Profile, User, UserId},
};
use parlor_engine::{ChatView, Dispatcher, Session, SyncConfig, Synchronizer, register, view};
use tokio::sync::mpsc;

use crate::print;

pub struct App {
  store: Arc<HttpStore>,
  user:  Option<UserId>,
  poll:  Duration,
}

/// Stdin lines, read on a plain thread so a pending read never holds up
/// runtime shutdown.
fn stdin_lines() -> mpsc::Receiver<std::io::Result<String>> {
  let (tx, rx) = mpsc::channel(16);
  std::thread::spawn(move || {
    for line in std::io::stdin().lines() {
      if tx.blocking_send(line).is_err() {
        break;
      }
    }
  });
  rx
}

/// Find `who` by exact id, then by case-insensitive display name.
pub fn find_user<'a>(users: &'a [User], who: &str) -> Result<&'a User> {
  let who = who.trim();
  if let Some(user) = users.iter().find(|u| u.id.as_str() == who) {
    return Ok(user);
  }
  let wanted = who.to_lowercase();
  let matches: Vec<&User> = users
    .iter()
    .filter(|u| u.display_name().to_lowercase() == wanted)
    .collect();
  match matches.as_slice() {
    [] => bail!("no user matches {who:?}"),
    [user] => Ok(user),
    many => {
      let ids: Vec<&str> = many.iter().map(|u| u.id.as_str()).collect();
      bail!("{who:?} matches several users ({}); use an id", ids.join(", "))
    }
  }
}

impl App {
  pub fn new(store: HttpStore, user: Option<String>, poll: Duration) -> Self {
    Self { store: Arc::new(store), user: user.map(UserId::new), poll }
  }

  async fn session(&self) -> Result<Session> {
    let id = self
      .user
      .clone()
      .ok_or_else(|| anyhow!("no user selected; pass --user or set PARLOR_USER"))?;
    Ok(Session::open(&*self.store, id).await?)
  }

  async fn all_users(&self) -> Result<Vec<User>> {
    self.store.list_users().await.context("loading users")
  }

  /// The session plus the user `who` names.
  async fn pair(&self, who: &str) -> Result<(Session, User)> {
    let session = self.session().await?;
    let users = self.all_users().await?;
    let other = find_user(&users, who)?.clone();
    Ok((session, other))
  }

  fn dispatcher(&self, session: &Session) -> Dispatcher<HttpStore> {
    let sync = Synchronizer::new(Arc::clone(&self.store), SyncConfig { interval: self.poll });
    Dispatcher::new(session, sync)
  }

  // ── Directory ───────────────────────────────────────────────────────────

  pub async fn users(&self) -> Result<()> {
    for user in self.all_users().await? {
      println!("{}", print::user_row(&user, self.user.as_ref()));
    }
    Ok(())
  }

  pub async fn contacts(&self) -> Result<()> {
    let session = self.session().await?;
    let users = self.all_users().await?;
    let snap = self.dispatcher(&session).sync().refresh().await?;
    let roster = view::roster(&users, &snap.entries, session.id());

    println!("Contacts");
    if roster.contacts.is_empty() {
      println!("  (none yet)");
    }
    for row in &roster.contacts {
      println!("{}", print::user_row(row.user, None));
    }

    let pending: Vec<_> = roster
      .others
      .iter()
      .filter(|row| row.relationship.is_pending())
      .collect();
    if !pending.is_empty() {
      println!("\nRequests");
      for row in pending {
        let direction = match row.relationship {
          Relationship::PendingIncoming { .. } => "wants to chat",
          _ => "awaiting answer",
        };
        println!("{}  [{direction}]", print::user_row(row.user, None));
      }
    }
    Ok(())
  }

  // ── Requests ────────────────────────────────────────────────────────────

  pub async fn status(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    let snap = self.dispatcher(&session).sync().refresh().await?;
    let rel = view::relationship(&snap.entries, session.id(), &other.id);
    println!("{}: {rel}", other.display_name());
    println!("  {}", print::hint(&rel, &other));
    Ok(())
  }

  pub async fn request(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    self.dispatcher(&session).send_request(&other.id).await?;
    println!("Chat request sent to {}.", other.display_name());
    Ok(())
  }

  pub async fn accept(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    self.dispatcher(&session).accept_from(&other.id).await?;
    println!("You and {} can now chat.", other.display_name());
    Ok(())
  }

  pub async fn decline(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    self.dispatcher(&session).decline_from(&other.id).await?;
    println!("Declined the request from {}.", other.display_name());
    Ok(())
  }

  pub async fn cancel(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    self.dispatcher(&session).cancel_to(&other.id).await?;
    println!("Withdrew your request to {}.", other.display_name());
    Ok(())
  }

  // ── Messages ────────────────────────────────────────────────────────────

  pub async fn send(&self, who: &str, text: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    let sent = self.dispatcher(&session).send_message(&other.id, text).await?;
    println!("{}", print::message(&sent, session.user(), &other));
    Ok(())
  }

  pub async fn log(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    let snap = self.dispatcher(&session).sync().refresh().await?;
    let chat = ChatView::build(&snap, session.id(), &other.id);
    if !chat.can_send() {
      println!("{}: {}", other.display_name(), chat.relationship);
      println!("  {}", print::hint(&chat.relationship, &other));
      return Ok(());
    }
    for entry in &chat.timeline {
      println!("{}", print::message(entry, session.user(), &other));
    }
    Ok(())
  }

  /// Poll and print until EOF on stdin or Ctrl-C. Lines typed on stdin are
  /// sent as messages; rejected ones are reported and the loop carries on.
  pub async fn watch(&self, who: &str) -> Result<()> {
    let (session, other) = self.pair(who).await?;
    let dispatcher = self.dispatcher(&session);
    let sync = dispatcher.sync().clone();
    let mut updates = sync.subscribe();
    sync.activate();

    let mut lines = stdin_lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seen: HashSet<EntryId> = HashSet::new();
    let mut shown: Option<Relationship> = None;

    let result = loop {
      tokio::select! {
        changed = updates.changed() => {
          if changed.is_err() {
            break Ok(());
          }
          let snap = updates.borrow_and_update().clone();
          if !snap.is_loaded() {
            continue;
          }
          let chat = ChatView::build(&snap, session.id(), &other.id);
          if shown.as_ref() != Some(&chat.relationship) {
            println!("* {}: {}", other.display_name(), chat.relationship);
            if !chat.can_send() {
              println!("  {}", print::hint(&chat.relationship, &other));
            }
            shown = Some(chat.relationship.clone());
          }
          for entry in &chat.timeline {
            if seen.insert(entry.id.clone()) {
              println!("{}", print::message(entry, session.user(), &other));
            }
          }
        }
        line = lines.recv() => match line {
          Some(Ok(text)) if text.trim().is_empty() => {}
          Some(Ok(text)) => {
            if let Err(e) = dispatcher.send_message(&other.id, &text).await {
              eprintln!("not sent: {e}");
            }
          }
          Some(Err(e)) => break Err(anyhow!(e).context("reading stdin")),
          None => break Ok(()),
        },
        _ = &mut ctrl_c => break Ok(()),
      }
    };

    sync.deactivate();
    result
  }

  // ── Profiles ────────────────────────────────────────────────────────────

  pub async fn profile(
    &self,
    name: Option<String>,
    email: Option<String>,
    image: Option<String>,
  ) -> Result<()> {
    let mut session = self.session().await?;
    let current = session.user().clone();
    let profile = Profile {
      full_name: name.unwrap_or(current.full_name),
      email:     email.or(current.email).unwrap_or_default(),
      image:     image.or(current.image),
    };
    let updated = session.update_profile(&*self.store, profile).await?;
    println!("{}", print::user_row(updated, Some(&updated.id)));
    Ok(())
  }

  pub async fn register(&self, name: String, email: String, image: Option<String>) -> Result<()> {
    let user = register(&*self.store, Profile { full_name: name, email, image }).await?;
    println!("Registered {} with id {}.", user.display_name(), user.id);
    println!("Act as them with `--user {}`.", user.id);
    Ok(())
  }
}

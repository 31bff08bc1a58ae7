//! Subcommand handlers. Each run is one "page load": the session is restored
//! from disk before anything else happens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clubledger_core::auth::{self, Credentials, IdentityService, RosterIdentityService};
use clubledger_core::config::ClubConfig;
use clubledger_core::members::RosterMemberService;
use clubledger_core::models::Capability;
use clubledger_core::navigation;
use clubledger_core::session::{FileStore, RestoreOutcome, SessionManager, SystemClock};

use crate::Result;

fn open_session(config: &ClubConfig, with_members: bool) -> (Arc<FileStore>, SessionManager) {
    let store = Arc::new(FileStore::new(config.session_path()));
    let mut manager = SessionManager::new(Arc::clone(&store), SystemClock);
    if with_members {
        manager = manager.with_member_service(Arc::new(RosterMemberService::new(
            config.roster_path(),
        )));
    }
    (store, manager)
}

fn format_instant(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

pub async fn login(config: &ClubConfig, email: String, password: String) -> Result<()> {
    let identity = RosterIdentityService::new(config.roster_path())
        .authenticate(&Credentials { email, password })
        .await?;

    let (store, mut manager) = open_session(config, true);
    auth::issue_token(&identity, store.as_ref())?;
    manager.login(identity.user);
    manager.settle_members().await;

    if let Some(user) = manager.current_user() {
        println!("logged in as {} <{}> ({})", user.name, user.email, user.role);
    }
    if let Some(at) = manager.established_at() {
        println!(
            "session valid until {}",
            format_instant(at.saturating_add(manager.ttl_ms()))
        );
    }
    println!("{} members loaded", manager.members().len());
    Ok(())
}

pub fn status(config: &ClubConfig) {
    let (_, mut manager) = open_session(config, false);
    match manager.restore() {
        RestoreOutcome::NoSession => println!("no session"),
        RestoreOutcome::Expired => println!("session expired; log in again"),
        RestoreOutcome::Restored(user) => {
            let remaining = manager.remaining_ms().unwrap_or(0) / 1000;
            println!(
                "restored as {} <{}> ({}), {}s left",
                user.name, user.email, user.role, remaining
            );
        }
    }
}

pub fn logout(config: &ClubConfig) {
    let (_, mut manager) = open_session(config, false);
    manager.restore();
    manager.logout();
    println!("logged out");
}

pub fn open(config: &ClubConfig, path: &str, capability: Capability) {
    let (_, mut manager) = open_session(config, false);
    manager.restore();
    let view = navigation::navigate(manager.current_user(), path, capability);
    println!("{view}");
}

pub async fn members(config: &ClubConfig) {
    let (_, mut manager) = open_session(config, true);
    match manager.restore() {
        RestoreOutcome::Restored(_) => {}
        RestoreOutcome::Expired => {
            println!("session expired; log in again");
            return;
        }
        RestoreOutcome::NoSession => {
            println!("not logged in");
            return;
        }
    }

    manager.settle_members().await;
    let members = manager.members();
    if members.is_empty() {
        println!("no members");
        return;
    }
    for member in members {
        let joined = member
            .joined_on
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{:.2}\t{}",
            member.id, member.name, member.shares, joined
        );
    }
}

pub fn hash_password(password: &str) -> Result<()> {
    println!("{}", auth::password::hash_password(password)?);
    Ok(())
}

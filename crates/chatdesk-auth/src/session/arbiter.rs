//! Login arbiter: grants, rejects, or takes over the single session.
//!
//! Mutual exclusion comes entirely from the ledger's conditional writes.
//! Presence is only consulted to tell an abandoned session (holder has no
//! live connection) from one still in use.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use chatdesk_core::config::SessionConfig;
use chatdesk_core::error::AppError;
use chatdesk_core::events::{AdminEvent, LogoutReason};
use chatdesk_core::result::AppResult;
use chatdesk_core::task::spawn_detached;
use chatdesk_core::traits::{AdminEventSink, PresenceView};
use chatdesk_core::types::{BootEpoch, SessionKey, UserId};
use chatdesk_database::{AccountDirectory, AcquireOutcome, ActivityLog, SessionLedger, Stores};
use chatdesk_entity::activity::{LoginEvent, LogoutEvent};
use chatdesk_entity::session::SessionGrant;
use chatdesk_entity::user::User;

use super::key::generate_session_key;
use crate::jwt::{JwtDecoder, JwtEncoder};

/// A granted login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Bearer credential for the new session.
    pub token: String,
    /// The account that logged in.
    pub user_id: UserId,
    /// The new session.
    pub session_id: SessionKey,
    /// The abandoned session this login replaced, if any.
    pub replaced: Option<SessionKey>,
}

/// HTTP-facing login/logout decisions.
#[derive(Clone)]
pub struct LoginArbiter {
    directory: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn SessionLedger>,
    activity: Arc<dyn ActivityLog>,
    presence: Arc<dyn PresenceView>,
    events: Arc<dyn AdminEventSink>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    session_config: SessionConfig,
}

impl std::fmt::Debug for LoginArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginArbiter")
            .field("boot", &self.decoder.boot())
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl LoginArbiter {
    /// Creates a new arbiter.
    pub fn new(
        stores: &Stores,
        presence: Arc<dyn PresenceView>,
        events: Arc<dyn AdminEventSink>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            directory: Arc::clone(&stores.directory),
            ledger: Arc::clone(&stores.ledger),
            activity: Arc::clone(&stores.activity),
            presence,
            events,
            encoder,
            decoder,
            session_config,
        }
    }

    /// Boot epoch of this process run.
    pub fn boot(&self) -> BootEpoch {
        self.decoder.boot()
    }

    /// Log `username` in, taking over an abandoned session if needed.
    ///
    /// Errors: validation (empty username), authentication (unknown or
    /// disabled account), configuration (no signing secret), conflict (the
    /// holder is still connected, or a concurrent takeover won).
    pub async fn login(&self, username: &str, ip: Option<String>) -> AppResult<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }

        let user = self
            .directory
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username"))?;

        if !user.is_active {
            return Err(AppError::authentication("Account disabled"));
        }

        // Refuse before touching the ledger so a misconfigured server
        // cannot lock accounts it can never issue credentials for.
        if !self.encoder.is_configured() {
            return Err(AppError::configuration("Server configuration error"));
        }

        let now = Utc::now();
        let grant = SessionGrant {
            session_id: generate_session_key(),
            boot: self.boot(),
            issued_at: now,
        };
        let stale_before = now - self.session_config.stale_after();

        let replaced = match self
            .ledger
            .try_acquire_session(&user.id, &grant, stale_before)
            .await?
        {
            AcquireOutcome::Acquired => None,
            AcquireOutcome::Ineligible => {
                return Err(AppError::authentication("Account disabled"));
            }
            AcquireOutcome::Held(held) => {
                if self.presence.is_online(&user.id) {
                    info!(user_id = %user.id, "Login rejected: session held by a live connection");
                    return Err(AppError::conflict("User already logged in"));
                }
                if !self
                    .ledger
                    .replace_session(&user.id, &held.session_id, &grant)
                    .await?
                {
                    info!(user_id = %user.id, "Login rejected: lost takeover race");
                    return Err(AppError::conflict("User already logged in"));
                }
                Some(held.session_id)
            }
        };

        let token = match self.encoder.issue(&user, &grant) {
            Ok(token) => token,
            Err(e) => {
                self.abandon_grant(&user, &grant).await;
                return Err(e);
            }
        };

        self.announce_login(&user, &grant, replaced.clone(), ip);

        Ok(LoginOutcome {
            token,
            user_id: user.id,
            session_id: grant.session_id,
            replaced,
        })
    }

    /// End the session named by `token`, if it is still the held one.
    ///
    /// Succeeds for any validly signed credential, including those of
    /// disabled accounts and previous process runs.
    pub async fn logout(&self, token: &str, ip: Option<String>) -> AppResult<()> {
        let claims = self.decoder.decode(token)?;
        let user_id = claims.user_id();

        let released = self
            .ledger
            .release_session(&user_id, Some(&claims.sid), Utc::now())
            .await;

        match released {
            Ok(outcome) if outcome.cleared() => {
                info!(user_id = %user_id, "Session released by logout");
                let activity = Arc::clone(&self.activity);
                spawn_detached("record_logout", async move {
                    activity
                        .record_logout(LogoutEvent::new(user_id, LogoutReason::Logout))
                        .await
                });
                self.events.publish(
                    AdminEvent::logout(user_id, LogoutReason::Logout)
                        .with_username(claims.username)
                        .with_ip(ip),
                );
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Logout release failed"),
        }

        Ok(())
    }

    fn announce_login(
        &self,
        user: &User,
        grant: &SessionGrant,
        replaced: Option<SessionKey>,
        ip: Option<String>,
    ) {
        let user_id = user.id;
        let takeover = replaced.is_some();

        let activity = Arc::clone(&self.activity);
        let login_ip = ip.clone();
        spawn_detached("record_login", async move {
            activity
                .record_login(LoginEvent::new(user_id, login_ip, takeover))
                .await?;
            if takeover {
                activity
                    .record_logout(LogoutEvent::new(user_id, LogoutReason::Takeover))
                    .await?;
            }
            Ok(())
        });

        if let Some(previous) = replaced {
            info!(
                user_id = %user_id,
                previous_session = %previous,
                session_id = %grant.session_id,
                "Abandoned session taken over"
            );
            self.events.publish(
                AdminEvent::takeover(user_id, previous)
                    .with_username(user.username.clone())
                    .with_ip(ip.clone()),
            );
        } else {
            info!(user_id = %user_id, session_id = %grant.session_id, "Session granted");
        }

        self.events
            .publish(AdminEvent::login(user_id, user.username.clone()).with_ip(ip));
    }

    async fn abandon_grant(&self, user: &User, grant: &SessionGrant) {
        if let Err(e) = self
            .ledger
            .release_session(&user.id, Some(&grant.session_id), Utc::now())
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to roll back unissued session");
        }
    }
}

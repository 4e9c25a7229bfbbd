//! Console facade: wires config, transport, session and guard together and
//! tracks the current page the way the browser shell's router would.

use crate::auth::{LoginForm, Session};
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::guard::{self, GuardOutcome};
use crate::notify::{Notify, TracingNotifier};
use crate::routes::{self, LOGIN_PATH, ROOT_PATH};
use crate::storage::{FileStore, SessionStore};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::info;

pub struct Console {
    config: Config,
    transport: Transport,
    session: Session,
    notifier: Arc<dyn Notify>,
    current_path: Option<String>,
}

impl Console {
    /// Build a console with file-backed session storage and the default
    /// notifier.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(FileStore::open(&config.storage.path)?);
        Self::with_parts(config, store, Arc::new(TracingNotifier))
    }

    /// Build a console over explicit storage and notifier (tests, embedders).
    pub fn with_parts(config: Config, store: Arc<dyn SessionStore>, notifier: Arc<dyn Notify>) -> Result<Self> {
        let transport = Transport::new(&config.api, store.clone(), notifier.clone())?;
        let session = Session::new(transport.clone(), store, notifier.clone());

        Ok(Self {
            config,
            transport,
            session,
            notifier,
            current_path: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    /// Run the guard for a transition to `path` and track where the console
    /// ends up. Redirect outcomes update the current page to the redirect
    /// target; a forbidden outcome additionally surfaces a notice.
    pub fn navigate(&mut self, path: &str) -> GuardOutcome {
        let target = routes::match_route(path).unwrap_or(&routes::NOT_FOUND);
        let outcome = guard::check(&mut self.session, target, self.current_path.as_deref());

        match &outcome {
            GuardOutcome::Allow => {
                self.current_path = Some(path.to_string());
            }
            GuardOutcome::RedirectToLogin => {
                self.current_path = Some(LOGIN_PATH.to_string());
            }
            GuardOutcome::RedirectTo(redirect) => {
                self.current_path = Some(redirect.clone());
            }
            GuardOutcome::Forbidden { redirect } => {
                self.notifier.error("You do not have permission to access this page");
                self.current_path = Some(redirect.clone());
            }
        }

        outcome
    }

    /// Log in and land on the dashboard, like the browser shell does.
    pub async fn login(&mut self, form: &LoginForm) -> Result<()> {
        self.session.login(form).await?;
        self.current_path = Some(ROOT_PATH.to_string());
        Ok(())
    }

    /// Log out and land on the login entry point.
    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        self.current_path = Some(LOGIN_PATH.to_string());
        Ok(())
    }

    /// React to an error from an API call: a reported session expiry tears
    /// the in-memory session down and moves to the login page (the
    /// transport already cleared storage and surfaced the notice).
    pub fn handle_error(&mut self, error: &Error) {
        if matches!(error, Error::SessionExpired) {
            info!("Session expired, returning to login");
            self.session.handle_expiry();
            self.current_path = Some(LOGIN_PATH.to_string());
        }
    }
}

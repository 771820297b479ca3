//! Application - orchestration layer
//!
//! Owns the HTTP executor, the session and the loaders. Wires
//! config -> session -> profile -> review flow, then runs one command.
//! No workflow rules live here: only wiring and statistics.

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, info, warn};

use crate::clients::AgmsClient;
use crate::config::Config;
use crate::infrastructure::{FileCookieStore, HttpExecutor, RememberedEmailStore};
use crate::models::Status;
use crate::services::{LoginForm, ProfileLoader, ProfileSource, SessionStore, SubmissionLoader};
use crate::utils::logging::{log_dashboard, log_startup, truncate_text, DashboardStats};
use crate::workflow::{FlowLoad, ReviewCtx, ReviewFlow};

/// One CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    Approve { submission_id: i64 },
    Decline { submission_id: i64, reason: String },
    Finalize,
    Logout,
}

impl Command {
    /// Parse the arguments after the program name. No arguments means `dashboard`.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let id = |raw: Option<&String>| -> Result<i64> {
            let raw = raw.ok_or_else(|| anyhow!("missing submission id"))?;
            raw.parse()
                .with_context(|| format!("invalid submission id: {raw}"))
        };

        match args.first().map(String::as_str) {
            None | Some("dashboard") => Ok(Command::Dashboard),
            Some("approve") => Ok(Command::Approve {
                submission_id: id(args.get(1))?,
            }),
            Some("decline") => {
                let submission_id = id(args.get(1))?;
                let reason = args[2.min(args.len())..].join(" ");
                if reason.trim().is_empty() {
                    bail!("decline needs a reason");
                }
                Ok(Command::Decline {
                    submission_id,
                    reason,
                })
            }
            Some("finalize") => Ok(Command::Finalize),
            Some("logout") => Ok(Command::Logout),
            Some(other) => bail!(
                "unknown command '{other}' (expected dashboard | approve <id> | decline <id> <reason> | finalize | logout)"
            ),
        }
    }
}

/// Application root
pub struct App {
    config: Config,
    client: AgmsClient<HttpExecutor>,
    session: SessionStore<FileCookieStore>,
    loader: SubmissionLoader,
}

impl App {
    /// Build the executor, restore the stored session, log in from config if needed
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let executor = HttpExecutor::new(&config)?;
        let client = AgmsClient::new(executor);
        let mut session = SessionStore::new(FileCookieStore::new(&config.token_file))
            .with_remembered_email(RememberedEmailStore::new(&config.remembered_email_file));

        let state = session.initialize()?;
        info!("🔐 stored session: {:?}", state);

        if !session.is_authenticated() {
            let email = config
                .login_email
                .clone()
                .or_else(|| session.remembered_email());
            match (email, config.login_password.clone()) {
                (Some(email), Some(password)) => {
                    let form = LoginForm::new(email, password).remember(true);
                    session.login(&client, &form).await?;
                }
                _ => warn!("⚠️ no stored session and no credentials configured (AGMS_EMAIL / AGMS_PASSWORD)"),
            }
        }
        session.attach(&client);

        let loader = SubmissionLoader::new(&config);
        Ok(Self {
            config,
            client,
            session,
            loader,
        })
    }

    pub async fn run(mut self, command: Command) -> Result<()> {
        if command == Command::Logout {
            self.session.logout(&self.client).await?;
            info!("👋 logged out, token removed from {}", self.config.token_file);
            return Ok(());
        }

        let (mut flow, load) = self.open_flow().await?;

        match command {
            Command::Dashboard => self.dashboard(&flow, &load),
            Command::Approve { submission_id } => {
                let status = flow.approve(&self.client, submission_id).await?;
                info!("✅ submission {} is now {}", submission_id, status);
            }
            Command::Decline {
                submission_id,
                reason,
            } => {
                let status = flow.decline(&self.client, submission_id, &reason).await?;
                info!("❌ submission {} is now {}", submission_id, status);
            }
            Command::Finalize => match flow.finalize_list(&self.client).await {
                Ok(_) => info!("🔒 {} list finalized", flow.ctx()),
                Err(e) => {
                    error!("🔒 finalize refused: {}", e);
                    return Err(e.into());
                }
            },
            Command::Logout => {}
        }
        Ok(())
    }

    /// Session -> profile -> loaded review flow
    async fn open_flow(&self) -> Result<(ReviewFlow, FlowLoad)> {
        let claims = self
            .session
            .claims()
            .cloned()
            .context("not logged in")?;
        let role = claims.role().context("session token carries no known role")?;

        let profile = ProfileLoader::load(&self.client, &claims).await;
        if profile.source == ProfileSource::Fallback {
            warn!("⚠️ showing session data only, profile endpoint did not answer");
        }

        let ctx = ReviewCtx::from_profile(role, &profile.profile);
        info!("👤 {} {}", profile.profile.display_name(), ctx);

        let mut flow = ReviewFlow::new(ctx);
        let load = flow.load(&self.client, &self.loader).await?;
        info!(
            "📥 {} submissions ({:?}), {} subordinate lists",
            flow.entries().len(),
            load.availability,
            load.subordinate_lists
        );
        if load.enrichment.failed > 0 {
            warn!(
                "⚠️ GPA missing for {} of {} submissions",
                load.enrichment.failed, load.enrichment.attempted
            );
        }
        Ok((flow, load))
    }

    fn dashboard(&self, flow: &ReviewFlow, load: &FlowLoad) {
        let mut stats = DashboardStats {
            total: flow.entries().len(),
            awaiting: flow.awaiting_decision().count(),
            subordinate_lists: flow.lists().len(),
            subordinates_finalized: flow.lists().iter().filter(|l| l.is_finalized).count(),
            enrichment_filled: load.enrichment.filled,
            enrichment_failed: load.enrichment.failed,
            ..Default::default()
        };
        for sub in flow.submissions() {
            if sub.status.is_rejection() {
                stats.rejected += 1;
            } else if sub.status != Status::Pending {
                stats.approved += 1;
            }
        }

        for sub in flow.awaiting_decision() {
            info!(
                "  #{} {} ({}) {}",
                sub.id,
                sub.student_name,
                sub.student_number,
                truncate_text(&sub.content, 40)
            );
        }

        let user = self
            .session
            .claims()
            .and_then(|c| c.sub.clone())
            .unwrap_or_default();
        log_dashboard(&user, flow.role(), &stats);

        if flow.is_list_finalized() {
            info!("🔒 list is finalized");
        } else {
            match flow.verdict() {
                Ok(v) if v.is_open() => info!("🔓 list can be finalized"),
                Ok(v) => {
                    for block in v.blocks {
                        info!("⛔ {}", block);
                    }
                }
                Err(_) => {}
            }
        }
    }
}

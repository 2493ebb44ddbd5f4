//! Command-line front end for the repository mirror.
//!
//! Usage:
//!
//! ```text
//! repo-mirror --database-url <url> <command>
//! ```
//!
//! The remote access token is read once from `GITHUB_ACCESS_TOKEN` or
//! `GITHUB_TOKEN`. Commands that only read the catalog still build the
//! remote client so that every command shares one wiring path.

#[path = "repo_mirror/cli.rs"]
mod cli;
#[path = "repo_mirror/render.rs"]
mod render;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command, CreateArgs, SessionCommand};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use eyre::{WrapErr, bail};
use mockable::DefaultClock;
use render::Renderer;
use repo_mirror::config::MirrorConfig;
use repo_mirror::logging;
use repo_mirror::mirror::{
    adapters::{github::GitHubClient, postgres::PostgresMirrorStore, workspace::CapStdWorkspace},
    domain::Repository,
    services::{CatalogService, CreateRepositoryRequest, DeletionService, SyncService},
};
use repo_mirror::session::services::{
    SessionLifecycleService, SessionSummaryCache, StartSessionRequest,
};
use tokio::runtime::Builder;

type Remote = GitHubClient<DefaultClock>;

/// Shared adapters and services for one invocation.
struct App {
    config: MirrorConfig,
    store: Arc<PostgresMirrorStore>,
    remote: Arc<Remote>,
    clock: Arc<DefaultClock>,
    summaries: Arc<SessionSummaryCache>,
    renderer: Renderer,
}

impl App {
    fn build(cli: &Cli) -> eyre::Result<Self> {
        let mut config = MirrorConfig::from_env()?.with_base_dir(cli.base_dir.clone());
        if let Some(api_url) = &cli.api_url {
            config = config.with_api_url(api_url)?;
        }
        if let Some(page_size) = cli.page_size {
            config = config.with_page_size(page_size)?;
        }

        let manager = ConnectionManager::<PgConnection>::new(&cli.database_url);
        let pool = Pool::builder()
            .build(manager)
            .wrap_err("failed to build the database connection pool")?;
        let clock = Arc::new(DefaultClock);
        let remote = Arc::new(GitHubClient::new(&config, Arc::clone(&clock))?);

        Ok(Self {
            config,
            store: Arc::new(PostgresMirrorStore::new(pool)),
            remote,
            clock,
            summaries: Arc::new(SessionSummaryCache::new()),
            renderer: Renderer::new()?,
        })
    }

    fn sync_service(&self) -> SyncService<PostgresMirrorStore, Remote, DefaultClock> {
        SyncService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            Arc::clone(&self.clock),
            self.config.base_dir(),
        )
        .with_summary_cache(Arc::clone(&self.summaries))
    }

    fn catalog(&self) -> CatalogService<PostgresMirrorStore, Remote> {
        CatalogService::new(Arc::clone(&self.store), Arc::clone(&self.remote))
    }

    fn deletion_service(&self) -> DeletionService<PostgresMirrorStore, Remote, CapStdWorkspace> {
        DeletionService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            Arc::new(CapStdWorkspace::new(self.config.base_dir())),
        )
        .with_summary_cache(Arc::clone(&self.summaries))
    }

    fn sessions(
        &self,
    ) -> SessionLifecycleService<PostgresMirrorStore, PostgresMirrorStore, DefaultClock> {
        SessionLifecycleService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.summaries),
            Arc::clone(&self.clock),
        )
    }

    async fn repository(&self, full_name: &str) -> eyre::Result<Repository> {
        Ok(self.catalog().find_by_full_name(full_name).await?)
    }

    async fn run(&self, command: Command) -> eyre::Result<String> {
        match command {
            Command::Sync(args) => {
                let outcome = self.sync_service().sync(&args.scope()).await?;
                Ok(self.renderer.sync_outcome("synced", &outcome)?)
            }
            Command::Import(args) => {
                let outcome = self.sync_service().import(&args.request()).await?;
                Ok(self.renderer.sync_outcome("imported", &outcome)?)
            }
            Command::Create(args) => {
                let repository = self
                    .sync_service()
                    .create_repository(create_request(args))
                    .await?;
                Ok(self.renderer.repositories(std::slice::from_ref(&repository))?)
            }
            Command::Delete { full_name } => {
                let repository = self.repository(&full_name).await?;
                let report = self.deletion_service().delete(&repository).await;
                let rendered = self.renderer.deletion(&report)?;
                if !report.is_clean() {
                    bail!("{rendered}deletion of {full_name} was incomplete");
                }
                Ok(rendered)
            }
            Command::List { username } => {
                let records = self.sync_service().list_remote(username.as_deref()).await?;
                Ok(self.renderer.remote_repositories(&records)?)
            }
            Command::Search(args) => {
                let repositories = self.catalog().search(&args.filter(), args.sort).await?;
                Ok(self.renderer.repositories(&repositories)?)
            }
            Command::Show { full_name, remote } => {
                let catalog = self.catalog();
                let repository = catalog.find_by_full_name(&full_name).await?;
                let detail = catalog.detail(repository.id()).await?;
                let live = if remote {
                    Some(catalog.remote_details(repository.id()).await?)
                } else {
                    None
                };
                Ok(self.renderer.detail(&detail, live.as_ref())?)
            }
            Command::Session(command) => self.run_session(command).await,
        }
    }

    async fn run_session(&self, command: SessionCommand) -> eyre::Result<String> {
        let sessions = self.sessions();
        match command {
            SessionCommand::Start {
                full_name,
                branch,
                notes,
            } => {
                let repository = self.repository(&full_name).await?;
                let mut request = StartSessionRequest::new(repository.id()).with_notes(notes);
                if let Some(name) = branch {
                    request = request.with_branch(name);
                }
                let started = sessions.start(request).await?;
                Ok(self.renderer.session(&started.session)?)
            }
            SessionCommand::End { id, notes } => {
                let ended = sessions.end(id, notes.as_deref()).await?;
                Ok(self.renderer.session(&ended)?)
            }
            SessionCommand::Notes { id, notes } => {
                let updated = sessions.update_notes(id, notes).await?;
                Ok(self.renderer.session(&updated)?)
            }
            SessionCommand::Status { full_name } => {
                let repository = self.repository(&full_name).await?;
                let summary = sessions.summary(repository.id()).await?;
                Ok(self.renderer.session_status(&summary)?)
            }
            SessionCommand::History { full_name } => {
                let repository = self.repository(&full_name).await?;
                let history = sessions.history(repository.id()).await?;
                Ok(self.renderer.session_history(&history)?)
            }
        }
    }
}

fn create_request(args: CreateArgs) -> CreateRepositoryRequest {
    let CreateArgs {
        name,
        description,
        private,
        no_auto_init,
    } = args;
    let request = CreateRepositoryRequest::new(name)
        .private(private)
        .auto_init(!no_auto_init);
    match description {
        Some(text) => request.with_description(text),
        None => request,
    }
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")?;
    let app = App::build(&cli)?;
    let output = runtime.block_on(app.run(cli.command))?;

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{output}").wrap_err("failed to write output")?;
    stdout.flush().wrap_err("failed to flush output")?;
    Ok(())
}

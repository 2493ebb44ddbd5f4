//! Text rendering for command output.

use minijinja::{Environment, context};
use repo_mirror::mirror::domain::{Branch, RemoteRepository, RemoteRepositoryDetails, Repository};
use repo_mirror::mirror::services::{DeletionReport, RepositoryDetail, SyncOutcome};
use repo_mirror::session::domain::{Session, SessionSummary};
use serde::Serialize;

const REPOSITORY_LIST: &str = "\
{% for repo in repositories -%}
{{ repo.full_name }}{% if repo.private %} [private]{% endif %}{% if repo.language %} ({{ repo.language }}){% endif %}  updated {{ repo.updated_at }}
{% else -%}
no repositories
{% endfor -%}";

const REMOTE_LIST: &str = "\
{% for repo in repositories -%}
{{ repo.name }}  {{ repo.stargazers_count }} stars{% if repo.language %}  {{ repo.language }}{% endif %}
{% if repo.description %}    {{ repo.description }}
{% endif %}{% else -%}
no repositories
{% endfor -%}";

const SYNC_SUMMARY: &str = "\
{{ action }} {{ summary.total }} repositories ({{ summary.private }} private, {{ summary.organization }} organization)
";

const REPOSITORY_DETAIL: &str = "\
{{ repo.full_name }}{% if repo.private %} [private]{% endif %}{% if repo.fork %} [fork]{% endif %}
  url:            {{ repo.url }}
{% if repo.description %}  description:    {{ repo.description }}
{% endif %}{% if repo.organization %}  organization:   {{ repo.organization }}
{% endif %}{% if repo.language %}  language:       {{ repo.language }}
{% endif %}  default branch: {{ repo.default_branch }}
  size:           {{ repo.size }} KB
  updated:        {{ repo.updated_at }}
  pushed:         {{ repo.pushed_at or \"never\" }}
  last synced:    {{ repo.last_synced or \"never\" }}
{% if repo.local_path %}  local path:     {{ repo.local_path }}
{% endif %}branches:
{% for branch in branches -%}
  {% if branch.is_default %}*{% else %} {% endif %} {{ branch.name }} {{ branch.sha }}{% if branch.message %} {{ branch.message }}{% endif %}
{% else -%}
  (none)
{% endfor -%}
{% if remote %}remote: {{ remote.stars }} stars, {{ remote.forks }} forks, {{ remote.open_issues }} open issues, {{ remote.watchers }} watchers
{% endif %}";

const DELETION_REPORT: &str = "\
deleted {{ report.full_name }}
  remote: {{ report.remote }}
  local:  {{ report.local }}{% if report.removed_path %} ({{ report.removed_path }}){% endif %}
  record: {{ report.record }}
";

const SESSION: &str = "\
session {{ session.id }}{% if session.active %} [active]{% endif %}
  started: {{ session.started_at }}
{% if session.ended_at %}  ended:   {{ session.ended_at }}
{% endif %}{% if session.notes %}  notes:   {{ session.notes | replace(\"\\n\", \"\\n           \") }}
{% endif %}{% if session.last_file %}  file:    {{ session.last_file }}
{% endif %}";

const SESSION_STATUS: &str = "\
{% if summary.active %}active session {{ summary.active.id }} since {{ summary.active.started_at }}
{% elif summary.has_sessions %}no active session
{% else %}no sessions recorded
{% endif %}";

const SESSION_HISTORY: &str = "\
{% for session in sessions -%}
{{ session.id }} {{ session.started_at }} .. {{ session.ended_at or \"now\" }}{% if session.active %} [active]{% endif %}
{% else -%}
no sessions recorded
{% endfor -%}";

/// Named templates used by the binary.
pub struct Renderer {
    environment: Environment<'static>,
}

#[derive(Debug, Serialize)]
struct RepositoryView {
    full_name: String,
    description: Option<String>,
    url: String,
    private: bool,
    fork: bool,
    language: Option<String>,
    organization: Option<String>,
    default_branch: String,
    size: u64,
    updated_at: String,
    pushed_at: Option<String>,
    last_synced: Option<String>,
    local_path: Option<String>,
}

impl From<&Repository> for RepositoryView {
    fn from(repository: &Repository) -> Self {
        let snapshot = repository.snapshot();
        Self {
            full_name: snapshot.full_name().to_owned(),
            description: snapshot.description().map(ToOwned::to_owned),
            url: snapshot.url().to_owned(),
            private: snapshot.is_private(),
            fork: snapshot.is_fork(),
            language: snapshot.language().map(ToOwned::to_owned),
            organization: snapshot.organization().map(ToOwned::to_owned),
            default_branch: snapshot.default_branch().to_owned(),
            size: snapshot.size(),
            updated_at: snapshot.updated_at().to_rfc3339(),
            pushed_at: snapshot.pushed_at().map(|at| at.to_rfc3339()),
            last_synced: repository.last_synced().map(|at| at.to_rfc3339()),
            local_path: repository.local_path().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct BranchView {
    name: String,
    is_default: bool,
    sha: String,
    message: Option<String>,
}

impl From<&Branch> for BranchView {
    fn from(branch: &Branch) -> Self {
        let sha = branch.last_commit_sha();
        Self {
            name: branch.name().to_string(),
            is_default: branch.is_default(),
            sha: sha.chars().take(7).collect(),
            message: branch
                .last_commit_message()
                .and_then(|message| message.lines().next())
                .map(ToOwned::to_owned),
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionView {
    id: String,
    active: bool,
    started_at: String,
    ended_at: Option<String>,
    notes: String,
    last_file: Option<String>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            active: session.is_active(),
            started_at: session.started_at().to_rfc3339(),
            ended_at: session.ended_at().map(|at| at.to_rfc3339()),
            notes: session.notes().to_owned(),
            last_file: session.workspace().last_file.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeletionView {
    full_name: String,
    remote: String,
    local: String,
    record: String,
    removed_path: Option<String>,
}

impl Renderer {
    /// Registers every template.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut environment = Environment::new();
        environment.add_template("repository_list", REPOSITORY_LIST)?;
        environment.add_template("remote_list", REMOTE_LIST)?;
        environment.add_template("sync_summary", SYNC_SUMMARY)?;
        environment.add_template("repository_detail", REPOSITORY_DETAIL)?;
        environment.add_template("deletion_report", DELETION_REPORT)?;
        environment.add_template("session", SESSION)?;
        environment.add_template("session_status", SESSION_STATUS)?;
        environment.add_template("session_history", SESSION_HISTORY)?;
        Ok(Self { environment })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
        self.environment.get_template(name)?.render(ctx)
    }

    /// Renders a repository listing.
    pub fn repositories(&self, repositories: &[Repository]) -> Result<String, minijinja::Error> {
        let views: Vec<RepositoryView> = repositories.iter().map(RepositoryView::from).collect();
        self.render("repository_list", context! { repositories => views })
    }

    /// Renders a remote listing with stars and language.
    pub fn remote_repositories(
        &self,
        records: &[RemoteRepository],
    ) -> Result<String, minijinja::Error> {
        self.render("remote_list", context! { repositories => records })
    }

    /// Renders the counts of a sync or import run.
    pub fn sync_outcome(
        &self,
        action: &str,
        outcome: &SyncOutcome,
    ) -> Result<String, minijinja::Error> {
        self.render(
            "sync_summary",
            context! { action => action, summary => outcome.summary },
        )
    }

    /// Renders a repository with its branches and optional live statistics.
    pub fn detail(
        &self,
        detail: &RepositoryDetail,
        remote: Option<&RemoteRepositoryDetails>,
    ) -> Result<String, minijinja::Error> {
        let branches: Vec<BranchView> = detail.branches.iter().map(BranchView::from).collect();
        self.render(
            "repository_detail",
            context! {
                repo => RepositoryView::from(&detail.repository),
                branches => branches,
                remote => remote,
            },
        )
    }

    /// Renders a deletion report.
    pub fn deletion(&self, report: &DeletionReport) -> Result<String, minijinja::Error> {
        let view = DeletionView {
            full_name: report.full_name.clone(),
            remote: report.remote.to_string(),
            local: report.local.to_string(),
            record: report.record.to_string(),
            removed_path: report.removed_path.as_ref().map(ToString::to_string),
        };
        self.render("deletion_report", context! { report => view })
    }

    /// Renders a single session.
    pub fn session(&self, session: &Session) -> Result<String, minijinja::Error> {
        self.render("session", context! { session => SessionView::from(session) })
    }

    /// Renders a repository's session summary.
    pub fn session_status(&self, summary: &SessionSummary) -> Result<String, minijinja::Error> {
        let active = summary.active.as_ref().map(SessionView::from);
        self.render(
            "session_status",
            context! {
                summary => context! { active => active, has_sessions => summary.has_sessions },
            },
        )
    }

    /// Renders a session history.
    pub fn session_history(&self, sessions: &[Session]) -> Result<String, minijinja::Error> {
        let views: Vec<SessionView> = sessions.iter().map(SessionView::from).collect();
        self.render("session_history", context! { sessions => views })
    }
}

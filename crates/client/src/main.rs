//! `voxgate` command-line client.
//!
//! Each invocation is one navigation: the session is rehydrated from disk,
//! the command's view goes through the guard, and only then does anything
//! talk to the backend.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use voxgate_auth::{Decision, Role, Route, LOGIN_PATH};
use voxgate_client::types::{AudioAssignment, NewUser};
use voxgate_client::{
    ClientConfig, FileStore, HttpGateway, LoginError, ResourceBody, ResourceClient,
    SessionContext,
};

#[derive(Debug, Parser)]
#[command(name = "voxgate", version, about = "Role-aware client for the transcription service")]
struct Cli {
    /// Backend base URL (overrides VOXGATE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (overrides VOXGATE_SESSION_FILE).
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and open the role's dashboard.
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "VOXGATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show who is signed in.
    Status,
    /// Evaluate a path through the navigation guard.
    Open { path: String },
    #[command(flatten)]
    Admin(AdminCommand),
}

/// Commands that belong to the admin dashboard.
#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// List assigned audio items.
    Audios,
    /// Create a user.
    CreateUser {
        username: String,
        password: String,
        #[arg(value_parser = parse_role)]
        role: Role,
    },
    /// Assign a recording topic to a collector and transcriber.
    AssignAudio {
        topic: String,
        #[arg(long)]
        collector: u64,
        #[arg(long)]
        transcriber: u64,
        #[arg(long)]
        validator: Option<u64>,
    },
    /// Force a machine transcription of an audio item.
    ForceTranscription { audio_id: u64 },
    /// Approve (default) or reject a transcription.
    Review {
        audio_id: u64,
        #[arg(long)]
        reject: bool,
    },
    /// Print the quality report of an audio item.
    QualityReport { audio_id: u64 },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse::<Role>().map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    voxgate_observability::init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = cli.session_file {
        config = config.with_session_file(path);
    }

    let store = FileStore::open(&config.session_file)
        .with_context(|| format!("failed to open session store {:?}", config.session_file))?;
    let mut ctx = SessionContext::rehydrate(store)?;

    run(cli.command, &config, &mut ctx).await
}

async fn run(
    command: Command,
    config: &ClientConfig,
    ctx: &mut SessionContext<FileStore>,
) -> Result<()> {
    match command {
        Command::Login { username, password } => login(config, ctx, &username, &password).await,
        Command::Logout => {
            ctx.logout().context("failed to clear stored session")?;
            println!("signed out; now at {}", ctx.navigate(LOGIN_PATH).path());
            Ok(())
        }
        Command::Status => {
            let session = ctx.session();
            match session.grant() {
                Some(grant) => println!(
                    "signed in as {} ({}), home {}",
                    grant.username,
                    grant.role,
                    grant.role.home_path()
                ),
                None => println!("not signed in ({})", session.status()),
            }
            Ok(())
        }
        Command::Open { path } => {
            match ctx.resolve(&path) {
                Decision::Render(route) => println!("render {}", route.path()),
                redirect => println!("redirect {} -> {}", path, redirect.location()),
            }
            Ok(())
        }
        Command::Admin(admin) => admin_command(admin, config, ctx).await,
    }
}

async fn login(
    config: &ClientConfig,
    ctx: &mut SessionContext<FileStore>,
    username: &str,
    password: &str,
) -> Result<()> {
    if let Decision::RedirectToRoleHome(role) = ctx.resolve(LOGIN_PATH) {
        println!("already signed in as {role}; run `voxgate logout` first");
        return Ok(());
    }

    let gateway = HttpGateway::from_config(config).context("failed to build HTTP client")?;
    match ctx.login(&gateway, username, password).await {
        Ok(role) => {
            let home = ctx.navigate(LOGIN_PATH);
            println!("signed in as {username} ({role}); now at {}", home.path());
            Ok(())
        }
        Err(LoginError::Auth(err)) => bail!(err.user_message()),
        Err(err) => Err(err.into()),
    }
}

async fn admin_command(
    command: AdminCommand,
    config: &ClientConfig,
    ctx: &SessionContext<FileStore>,
) -> Result<()> {
    let dashboard = Route::Dashboard(Role::Admin);
    let decision = ctx.resolve(dashboard.path());
    if decision.is_redirect() {
        bail!(
            "{} is not available to this session (redirected to {})",
            dashboard.path(),
            decision.location()
        );
    }

    let client = ResourceClient::from_config(config).context("failed to build HTTP client")?;
    let token = ctx.session().token();

    match command {
        AdminCommand::Audios => {
            let audios = client.assigned_audios(token).await?;
            if audios.is_empty() {
                println!("no assigned audios");
            }
            for audio in audios {
                println!("{}\t{}\t{}\t{}", audio.id, audio.status, audio.topic, audio.filename);
            }
        }
        AdminCommand::CreateUser { username, password, role } => {
            let resp = client
                .create_user(token, &NewUser { username, password, role })
                .await?;
            println!("{}", resp.msg);
        }
        AdminCommand::AssignAudio { topic, collector, transcriber, validator } => {
            let assignment = AudioAssignment {
                topic,
                collector_id: collector,
                transcriber_id: transcriber,
                validator_id: validator,
            };
            let resp = client.assign_audio(token, &assignment).await?;
            match resp.audio_id {
                Some(id) => println!("{} (audio {id})", resp.msg),
                None => println!("{}", resp.msg),
            }
        }
        AdminCommand::ForceTranscription { audio_id } => {
            let resp = client.force_transcription(token, audio_id).await?;
            println!("{}", resp.msg);
            if let Some(text) = resp.transcription {
                println!("{text}");
            }
        }
        AdminCommand::Review { audio_id, reject } => {
            let resp = client.review_transcription(token, audio_id, !reject).await?;
            println!("{}", resp.msg);
        }
        AdminCommand::QualityReport { audio_id } => {
            match client.audio_quality_report(token, audio_id).await? {
                ResourceBody::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                ResourceBody::Text(text) => println!("{text}"),
            }
            println!("download: {}", client.download_audio_url(audio_id));
        }
    }
    Ok(())
}

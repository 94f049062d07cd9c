//! follow-cli: drive the follow-graph client from a terminal.
//!
//! Usage:
//!   FOLLOW_TOKEN=<jwt> follow-cli dashboard --tab following
//!   FOLLOW_TOKEN=<jwt> follow-cli toggle user_2abc
//!   follow-cli route /admin

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use common_lib::{FollowDirection, FollowStatus, UserPatch};
use env_logger::Env;
use follow_client::admin::{AdminPanel, AdminView};
use follow_client::card;
use follow_client::dashboard::{Dashboard, Tab};
use follow_client::draft;
use follow_client::profile::{Banner, ProfileController, SubmitOutcome};
use follow_client::session::{EnvToken, StaticToken, TokenProvider};
use follow_client::shell::{self, AuthState, Resolution, Route};
use follow_client::upload::HostedImageUploader;
use follow_client::{ApiClient, ClientConfig, ClientError, Viewer};
use std::path::PathBuf;
use std::sync::Arc;

const TOKEN_VAR: &str = "FOLLOW_TOKEN";

#[derive(Parser, Debug)]
#[command(name = "follow-cli")]
#[command(about = "Browse, follow and manage users of the follow-graph backend")]
struct Args {
    /// Base URL of the backend API
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token issued by the identity provider, read from FOLLOW_TOKEN
    /// on every request when not given
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show your card and one of the user lists
    Dashboard {
        /// all, followers or following
        #[arg(long, default_value = "all")]
        tab: Tab,
    },
    Follow {
        user_id: String,
    },
    Unfollow {
        user_id: String,
    },
    /// Follow or unfollow, whichever the user's current row offers
    Toggle {
        user_id: String,
    },
    #[command(subcommand)]
    Admin(AdminCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Show what the guard does with a path
    Route {
        path: String,
    },
    /// Print JSON schemas of the backend contract
    Contract,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    Users,
    Edit {
        user_id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    Delete {
        user_id: String,
        /// Repeat the user id to confirm; deletion cannot be undone
        #[arg(long)]
        confirm: String,
    },
    Follows {
        user_id: String,
    },
    RemoveFollower {
        user_id: String,
        follower_id: String,
    },
    RemoveFollowing {
        user_id: String,
        following_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Validate and save a profile draft
    Complete {
        #[arg(long)]
        draft: PathBuf,
        /// Image to upload as the avatar
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

impl Command {
    fn route(&self) -> Option<Route> {
        match self {
            Command::Dashboard { .. }
            | Command::Follow { .. }
            | Command::Unfollow { .. }
            | Command::Toggle { .. } => Some(Route::Dashboard),
            Command::Admin(_) => Some(Route::Admin),
            Command::Profile(_) => Some(Route::CompleteProfile),
            Command::Route { path } => Some(Route::parse(path)),
            Command::Contract => None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let Some(route) = args.command.route() else {
        return print_contract();
    };

    let config = match &args.base_url {
        None => ClientConfig::from_env(),
        Some(url) => ClientConfig::from_lookup(|key| match key {
            "FOLLOW_API_BASE_URL" => Some(url.clone()),
            _ => std::env::var(key).ok(),
        }),
    };

    let tokens: Arc<dyn TokenProvider> = match args.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(EnvToken::new(TOKEN_VAR)),
    };
    let auth = match Viewer::from_provider(tokens.as_ref()).await {
        Ok(viewer) => AuthState::SignedIn(viewer),
        Err(ClientError::MissingToken) => AuthState::SignedOut,
        Err(e) => return Err(e.into()),
    };

    match shell::resolve(&route, &auth) {
        Resolution::Redirect { to, return_to } => {
            if let Command::Route { .. } = args.command {
                println!("redirect {to} (return to {return_to})");
                return Ok(());
            }
            bail!("sign in required: {to}?redirect_url={return_to}");
        }
        Resolution::Render(page) => {
            if let Command::Route { .. } = args.command {
                println!("render {page}");
                if let Some(next) = page.completion_target() {
                    println!("after completion: {next}");
                }
                return Ok(());
            }
        }
    }

    let Some(viewer) = auth.viewer().cloned() else {
        bail!("sign in required");
    };
    let api = ApiClient::new(&config, tokens)?;

    match args.command {
        Command::Dashboard { tab } => show_dashboard(api, viewer, tab).await,
        Command::Follow { user_id } => {
            toggle(api, viewer, &user_id, Some(FollowStatus::Following)).await
        }
        Command::Unfollow { user_id } => {
            toggle(api, viewer, &user_id, Some(FollowStatus::Follow)).await
        }
        Command::Toggle { user_id } => toggle(api, viewer, &user_id, None).await,
        Command::Admin(command) => admin(api, &viewer, command).await,
        Command::Profile(ProfileCommand::Complete { draft, avatar }) => {
            complete_profile(api, &config, &viewer, draft, avatar).await
        }
        Command::Route { .. } | Command::Contract => Ok(()),
    }
}

fn print_contract() -> Result<()> {
    for (name, schema) in common_lib::contract_schemas() {
        println!("// {name}");
        println!("{}", serde_json::to_string_pretty(&schema)?);
    }
    Ok(())
}

async fn show_dashboard(api: ApiClient, viewer: Viewer, tab: Tab) -> Result<()> {
    let mut dashboard = Dashboard::new(api, viewer);
    dashboard.reload().await;

    match dashboard.own_card() {
        Some(own) => println!("{}", card::render_row(&own)),
        None => {
            if let Some(error) = &dashboard.own_profile().error {
                eprintln!("{error}");
            }
        }
    }

    println!("== {tab} ==");
    if let Some(error) = dashboard.tab_error(tab) {
        eprintln!("Error: {error}");
    }
    let empty = match tab {
        Tab::AllUsers => "No users found.",
        Tab::Followers => "You don't have any followers yet.",
        Tab::Following => "You are not following anyone yet.",
    };
    println!("{}", card::render_rows(&dashboard.tab(tab), empty));
    Ok(())
}

async fn toggle(
    api: ApiClient,
    viewer: Viewer,
    user_id: &str,
    desired: Option<FollowStatus>,
) -> Result<()> {
    let mut dashboard = Dashboard::new(api, viewer);

    let report = match desired {
        Some(desired) => dashboard.toggle_follow(user_id, desired).await,
        None => {
            dashboard.reload().await;
            dashboard.toggle_row(user_id).await?
        }
    };
    let Some(report) = report else {
        bail!("you cannot follow yourself");
    };

    if let Some(error) = dashboard.toggle_error() {
        bail!("Follow Action Error: {error}");
    }
    println!(
        "{} {user_id}: ok (cycle {})",
        report.action.verb(),
        report.refresh.cycle_id
    );
    if let Some(own) = dashboard.own_card() {
        println!("{}", card::render_row(&own));
    }
    Ok(())
}

async fn admin(api: ApiClient, viewer: &Viewer, command: AdminCommand) -> Result<()> {
    let mut panel = AdminPanel::new(api);
    if !panel.gate(viewer) {
        bail!(follow_client::admin::ACCESS_DENIED_MESSAGE);
    }
    panel.load_users().await;
    match panel.view() {
        AdminView::AccessDenied => bail!(follow_client::admin::ACCESS_DENIED_MESSAGE),
        AdminView::Error(message) => bail!("{message}"),
        AdminView::Idle | AdminView::Ready => {}
    }

    let ok = match command {
        AdminCommand::Users => {
            let users = &panel.users().data;
            if users.is_empty() {
                println!("No users found in the system.");
            }
            for user in users {
                println!("{}", card::render_managed(user));
            }
            true
        }
        AdminCommand::Edit {
            user_id,
            username,
            first_name,
            last_name,
            bio,
            avatar_url,
        } => {
            let patch = UserPatch {
                username,
                first_name,
                last_name,
                bio,
                avatar_url,
            };
            panel.edit_user(&user_id, &patch).await
        }
        AdminCommand::Delete { user_id, confirm } => {
            let confirmation = panel
                .request_delete(&user_id)
                .ok_or_else(|| anyhow!("user {user_id} not found"))?;
            println!("{}", confirmation.prompt());
            if confirm != user_id {
                bail!("confirmation does not match {user_id}; nothing deleted");
            }
            panel.delete_user(confirmation).await
        }
        AdminCommand::Follows { user_id } => {
            panel.load_follows(&user_id).await;
            print_follows(&panel);
            panel.follows().is_some_and(|f| f.error.is_none())
        }
        AdminCommand::RemoveFollower {
            user_id,
            follower_id,
        } => {
            let ok = panel
                .remove_follow_edge(FollowDirection::Follower, &user_id, &follower_id)
                .await;
            print_follows(&panel);
            ok
        }
        AdminCommand::RemoveFollowing {
            user_id,
            following_id,
        } => {
            let ok = panel
                .remove_follow_edge(FollowDirection::Following, &user_id, &following_id)
                .await;
            print_follows(&panel);
            ok
        }
    };

    match panel.action_error() {
        Some(error) => bail!("{error}"),
        None if !ok => bail!("admin action failed"),
        None => Ok(()),
    }
}

fn print_follows(panel: &AdminPanel) {
    let Some(follows) = panel.follows() else {
        return;
    };
    if let Some(error) = &follows.error {
        eprintln!("{error}");
    }
    println!("== Followers of {} ==", follows.user_id);
    if follows.followers.is_empty() {
        println!("No followers to display.");
    }
    for user in &follows.followers {
        println!("{}", card::render_managed(user));
    }
    println!("== Following ==");
    if follows.following.is_empty() {
        println!("Not following anyone.");
    }
    for user in &follows.following {
        println!("{}", card::render_managed(user));
    }
}

async fn complete_profile(
    api: ApiClient,
    config: &ClientConfig,
    viewer: &Viewer,
    draft_path: PathBuf,
    avatar: Option<PathBuf>,
) -> Result<()> {
    let loaded = draft::load(&draft_path)
        .await
        .with_context(|| format!("failed to read draft {}", draft_path.display()))?;
    let mut profile_draft = loaded.clone();
    if avatar.is_some() {
        profile_draft.avatar_file = avatar;
        profile_draft.avatar_url = None;
    }

    let uploader = HostedImageUploader::new(config.upload.clone(), config.timeout())?;
    let mut controller = ProfileController::with_draft(viewer, profile_draft);
    let outcome = controller.submit(&api, &uploader).await;

    // an uploaded avatar URL is kept so a retry does not upload again
    if !matches!(outcome, SubmitOutcome::Invalid(_)) {
        draft::save_if_changed(&draft_path, &loaded, controller.draft()).await?;
    }

    for (field, message) in controller.errors().iter() {
        eprintln!("{field}: {message}");
    }
    match controller.banner() {
        Some(Banner::Success(message)) => println!("{message}"),
        Some(Banner::Error(message)) => eprintln!("{message}"),
        None => {}
    }

    match outcome {
        SubmitOutcome::Saved { navigate_to, .. } => {
            println!("next: {navigate_to}");
            Ok(())
        }
        SubmitOutcome::Invalid(_) => bail!("profile is incomplete"),
        SubmitOutcome::UploadFailed(message) => bail!("{message}"),
        SubmitOutcome::Rejected(_) => bail!("profile was not saved"),
    }
}

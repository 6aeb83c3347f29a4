use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use watcher_client::config::{self, AuthMode, Config, ConnectionArgs};
use watcher_client::{ListOptions, TokenAuthenticator, WatcherClient};

/// Command-line client for the OpenStack Watcher API
#[derive(Parser, Debug)]
#[command(name = "watcher", version, about)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format (text, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct PageArgs {
    #[arg(long)]
    limit: Option<u32>,

    #[arg(long)]
    marker: Option<String>,

    #[arg(long)]
    sort_key: Option<String>,

    #[arg(long)]
    sort_dir: Option<String>,
}

impl From<PageArgs> for ListOptions {
    fn from(args: PageArgs) -> Self {
        ListOptions {
            limit: args.limit,
            marker: args.marker,
            sort_key: args.sort_key,
            sort_dir: args.sort_dir,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show who the client is authenticated as
    AuthInfo,
    /// Check that the API accepts our token
    Ping,
    /// Show the service version document
    Version,
    #[command(subcommand)]
    Goal(GoalCommand),
    #[command(subcommand)]
    Strategy(StrategyCommand),
    #[command(subcommand)]
    AuditTemplate(AuditTemplateCommand),
    #[command(subcommand)]
    Audit(AuditCommand),
    #[command(subcommand)]
    ActionPlan(ActionPlanCommand),
    #[command(subcommand)]
    Action(ActionCommand),
    /// Show the decision engine's data model
    DataModel {
        /// Model type (compute, storage, baremetal)
        #[arg(long = "type")]
        model_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    List(PageArgs),
    Show { id: String },
}

#[derive(Subcommand, Debug)]
enum StrategyCommand {
    List {
        /// Only strategies for this goal
        #[arg(long)]
        goal: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Show { id: String },
}

#[derive(Subcommand, Debug)]
enum AuditTemplateCommand {
    List(PageArgs),
    Show { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum AuditCommand {
    List(PageArgs),
    Show { id: String },
    Start { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ActionPlanCommand {
    List(PageArgs),
    Show { id: String },
    Start { id: String },
    Cancel { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ActionCommand {
    List {
        /// Only actions of this action plan
        #[arg(long)]
        action_plan: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Show { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = config::parse_args();

    // Initialize logging with the configured level; RUST_LOG takes precedence
    let log_level = cli.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // Logs go to stderr so stdout stays parseable JSON
    if cli.log_format.eq_ignore_ascii_case("json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = Config::from_args(&cli.connection)?;
    let client = connect(config).await?;

    run(&client, cli.command).await
}

async fn connect(config: Config) -> Result<WatcherClient> {
    match config.auth {
        AuthMode::Keystone(options) => {
            tracing::debug!(
                auth_url = %options.credential.identity_endpoint,
                interface = %options.credential.interface,
                "Authenticating against Keystone"
            );
            Ok(WatcherClient::new(options).await?)
        }
        AuthMode::Token {
            endpoint,
            token,
            api_version,
            timeout,
        } => {
            tracing::debug!(endpoint = %endpoint, "Using pre-issued token");
            let provider = std::sync::Arc::new(TokenAuthenticator::new(endpoint, token));
            let mut client = WatcherClient::with_provider(provider)?;
            client.set_api_version(api_version);
            client.set_timeout(timeout);
            Ok(client)
        }
    }
}

async fn run(client: &WatcherClient, command: Command) -> Result<()> {
    match command {
        Command::AuthInfo => print_json(&client.auth_info().await?),
        Command::Ping => {
            client.ping().await?;
            println!("{} is reachable", client.endpoint().await);
            Ok(())
        }
        Command::Version => print_json(&client.version().await?),
        Command::Goal(cmd) => match cmd {
            GoalCommand::List(page) => print_json(&client.list_goals(&page.into()).await?),
            GoalCommand::Show { id } => print_json(&client.get_goal(&id).await?),
        },
        Command::Strategy(cmd) => match cmd {
            StrategyCommand::List { goal: Some(goal), page } => {
                print_json(&client.list_strategies_by_goal(&goal, &page.into()).await?)
            }
            StrategyCommand::List { goal: None, page } => {
                print_json(&client.list_strategies(&page.into()).await?)
            }
            StrategyCommand::Show { id } => print_json(&client.get_strategy(&id).await?),
        },
        Command::AuditTemplate(cmd) => match cmd {
            AuditTemplateCommand::List(page) => {
                print_json(&client.list_audit_templates(&page.into()).await?)
            }
            AuditTemplateCommand::Show { id } => {
                print_json(&client.get_audit_template(&id).await?)
            }
            AuditTemplateCommand::Delete { id } => {
                client.delete_audit_template(&id).await?;
                println!("Deleted audit template {}", id);
                Ok(())
            }
        },
        Command::Audit(cmd) => match cmd {
            AuditCommand::List(page) => print_json(&client.list_audits(&page.into()).await?),
            AuditCommand::Show { id } => print_json(&client.get_audit(&id).await?),
            AuditCommand::Start { id } => print_json(&client.start_audit(&id).await?),
            AuditCommand::Delete { id } => {
                client.delete_audit(&id).await?;
                println!("Deleted audit {}", id);
                Ok(())
            }
        },
        Command::ActionPlan(cmd) => match cmd {
            ActionPlanCommand::List(page) => {
                print_json(&client.list_action_plans(&page.into()).await?)
            }
            ActionPlanCommand::Show { id } => print_json(&client.get_action_plan(&id).await?),
            ActionPlanCommand::Start { id } => print_json(&client.start_action_plan(&id).await?),
            ActionPlanCommand::Cancel { id } => {
                print_json(&client.cancel_action_plan(&id).await?)
            }
            ActionPlanCommand::Delete { id } => {
                client.delete_action_plan(&id).await?;
                println!("Deleted action plan {}", id);
                Ok(())
            }
        },
        Command::Action(cmd) => match cmd {
            ActionCommand::List {
                action_plan: Some(plan),
                page,
            } => print_json(
                &client
                    .list_actions_by_action_plan(&plan, &page.into())
                    .await?,
            ),
            ActionCommand::List {
                action_plan: None,
                page,
            } => print_json(&client.list_actions(&page.into()).await?),
            ActionCommand::Show { id } => print_json(&client.get_action(&id).await?),
        },
        Command::DataModel { model_type } => {
            print_json(&client.get_data_model(model_type.as_deref()).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! TenderHub CLI - tender and bid workflow from the command line
//!
//! Usage:
//! ```bash
//! tenderhub user add alice
//! tenderhub org add Acme --type llc
//! tenderhub org add-member <org-id> alice
//! tenderhub tender create alice --org <org-id> --service-type delivery --name "Ten trucks"
//! tenderhub tender set-status alice <tender-id> published
//! tenderhub bid create --tender <tender-id> --author-type user --author-id <user-id> --name "Offer"
//! tenderhub bid decide alice <bid-id> approve
//! tenderhub status
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use tenderhub_core::{AuthorType, BidStatus, Decision, OrganizationType, Pagination, ServiceType, TenderStatus};
use tenderhub_persistence::DEFAULT_DATABASE_URL;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;
mod exit;

use commands::{admin, bid, directory, tender};

/// TenderHub - procurement tenders, competing bids and quorum approvals
#[derive(Parser)]
#[command(name = "tenderhub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, env = "TENDERHUB_DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    pub database_url: String,

    /// Pool size; 1 serializes all writers
    #[arg(long, env = "TENDERHUB_MAX_CONNECTIONS", default_value_t = 1, global = true)]
    pub max_connections: u32,

    /// Apply pending migrations on startup
    #[arg(
        long,
        env = "TENDERHUB_AUTO_MIGRATE",
        default_value_t = true,
        action = clap::ArgAction::Set,
        global = true
    )]
    pub auto_migrate: bool,

    /// Log filter (e.g. "info", "tenderhub_workflow=debug")
    #[arg(long, env = "TENDERHUB_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Tender operations
    Tender {
        #[command(subcommand)]
        action: TenderAction,
    },

    /// Bid operations
    Bid {
        #[command(subcommand)]
        action: BidAction,
    },

    /// User directory
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Organization directory
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Maintenance operations outside the workflow
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Apply pending migrations
    Migrate,

    /// Show database status
    Status,
}

#[derive(Args, Clone, Copy)]
pub struct PageArgs {
    /// Maximum rows to return; 0 means no limit
    #[arg(long, default_value_t = 0)]
    pub limit: i64,
    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

impl PageArgs {
    pub fn to_pagination(self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Subcommand)]
pub enum TenderAction {
    /// Create a tender for an organization the user belongs to
    Create {
        username: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        service_type: ServiceTypeArg,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List tenders, optionally filtered by service type
    List {
        #[arg(long, value_delimiter = ',')]
        service_type: Vec<ServiceTypeArg>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List tenders created by a user
    Mine {
        username: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show a tender's status
    Status { username: String, tender_id: String },
    /// Change a tender's status
    SetStatus {
        username: String,
        tender_id: String,
        status: TenderStatusArg,
    },
    /// Edit name, description or service type
    Edit {
        username: String,
        tender_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        service_type: Option<ServiceTypeArg>,
    },
    /// Restore the content of an earlier version as a new version
    Rollback {
        username: String,
        tender_id: String,
        #[arg(value_name = "VERSION")]
        target_version: i64,
    },
    /// Show the version log
    Versions {
        username: String,
        tender_id: String,
        /// Only this version
        #[arg(long, value_name = "VERSION")]
        at_version: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum BidAction {
    /// Submit a bid against a published tender
    Create {
        #[arg(long)]
        tender: String,
        #[arg(long)]
        author_type: AuthorTypeArg,
        /// User id or organization id
        #[arg(long)]
        author_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List bids authored by a user
    Mine {
        username: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List bids on a tender
    List {
        username: String,
        tender_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show a bid's status
    Status { username: String, bid_id: String },
    /// Change a bid's status manually
    SetStatus {
        username: String,
        bid_id: String,
        status: BidStatusArg,
    },
    /// Edit name or description
    Edit {
        username: String,
        bid_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Restore the content of an earlier version as a new version
    Rollback {
        username: String,
        bid_id: String,
        #[arg(value_name = "VERSION")]
        target_version: i64,
    },
    /// Vote on a bid as an employee of the tender's organization
    Decide {
        username: String,
        bid_id: String,
        decision: DecisionArg,
    },
    /// Show the votes recorded on a bid
    Votes { username: String, bid_id: String },
    /// Leave feedback on a bid
    Feedback {
        username: String,
        bid_id: String,
        text: String,
    },
    /// Show the version log
    Versions {
        username: String,
        bid_id: String,
        /// Only this version
        #[arg(long, value_name = "VERSION")]
        at_version: Option<i64>,
    },
    /// Reviews left on an author's bids
    Reviews {
        requester: String,
        author: String,
        tender_id: String,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        username: String,
        /// Explicit id (random if omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
pub enum OrgAction {
    /// Register an organization
    Add {
        name: String,
        #[arg(long, short = 't')]
        r#type: OrgTypeArg,
        /// Explicit id (random if omitted)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a user to an organization
    AddMember { org_id: String, username: String },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Delete a tender with its bids, history, votes and reviews
    DeleteTender { tender_id: String },
    /// Delete a bid with its history, votes and reviews
    DeleteBid { bid_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ServiceTypeArg {
    Construction,
    Delivery,
    Manufacture,
}

impl ServiceTypeArg {
    pub fn to_core_type(&self) -> ServiceType {
        match self {
            ServiceTypeArg::Construction => ServiceType::Construction,
            ServiceTypeArg::Delivery => ServiceType::Delivery,
            ServiceTypeArg::Manufacture => ServiceType::Manufacture,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TenderStatusArg {
    Created,
    Published,
    Closed,
}

impl TenderStatusArg {
    pub fn to_core_type(&self) -> TenderStatus {
        match self {
            TenderStatusArg::Created => TenderStatus::Created,
            TenderStatusArg::Published => TenderStatus::Published,
            TenderStatusArg::Closed => TenderStatus::Closed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BidStatusArg {
    Created,
    Published,
    Canceled,
    Approved,
    Rejected,
}

impl BidStatusArg {
    pub fn to_core_type(&self) -> BidStatus {
        match self {
            BidStatusArg::Created => BidStatus::Created,
            BidStatusArg::Published => BidStatus::Published,
            BidStatusArg::Canceled => BidStatus::Canceled,
            BidStatusArg::Approved => BidStatus::Approved,
            BidStatusArg::Rejected => BidStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AuthorTypeArg {
    User,
    Organization,
}

impl AuthorTypeArg {
    pub fn to_core_type(&self) -> AuthorType {
        match self {
            AuthorTypeArg::User => AuthorType::User,
            AuthorTypeArg::Organization => AuthorType::Organization,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DecisionArg {
    Approve,
    Reject,
}

impl DecisionArg {
    pub fn to_core_type(&self) -> Decision {
        match self {
            DecisionArg::Approve => Decision::Approve,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OrgTypeArg {
    Ie,
    Llc,
    Jsc,
}

impl OrgTypeArg {
    pub fn to_core_type(&self) -> OrganizationType {
        match self {
            OrgTypeArg::Ie => OrganizationType::Ie,
            OrgTypeArg::Llc => OrganizationType::Llc,
            OrgTypeArg::Jsc => OrganizationType::Jsc,
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = db::config_from(&cli);

    match cli.command {
        Commands::Migrate => {
            db::migrate(&config).await?;
        }

        Commands::Status => {
            db::show_status(&config).await?;
        }

        Commands::Tender { action } => {
            let database = db::connect(&config).await?;
            tender::handle(&database, action).await?;
            database.close().await;
        }

        Commands::Bid { action } => {
            let database = db::connect(&config).await?;
            bid::handle(&database, action).await?;
            database.close().await;
        }

        Commands::User { action } => {
            let database = db::connect(&config).await?;
            directory::handle_user(&database, action).await?;
            database.close().await;
        }

        Commands::Org { action } => {
            let database = db::connect(&config).await?;
            directory::handle_org(&database, action).await?;
            database.close().await;
        }

        Commands::Admin { action } => {
            let database = db::connect(&config).await?;
            admin::handle(&database, action).await?;
            database.close().await;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit::report(&err),
    }
}

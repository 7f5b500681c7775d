//! nbhctl - Neighborhood Fleet Manager
//!
//! Usage:
//!   nbhctl -c conductor.example.net -u admin discover
//!   nbhctl -c conductor.example.net -u admin find -n core-wan -o out.csv
//!   nbhctl -c conductor.example.net -u admin clone --hub hub1 --prefix spoke-
//!   nbhctl -c conductor.example.net -u admin apply --name core-v2

mod interactive;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nbhctl_core::api::ConductorClient;
use nbhctl_core::commands::{
    ApplyOptions, CloneOptions, DiscoverOptions, FindOptions, ScanScope, SetOptions,
    SpokeSelection, TargetsOptions, apply, clone, discover, find, set, targets,
};
use nbhctl_core::propagate::FanoutReport;
use nbhctl_core::types::ResourcePath;

#[derive(Parser)]
#[command(name = "nbhctl")]
#[command(about = "Neighborhood manager for conductor-managed router fleets", long_about = None)]
struct Cli {
    /// Conductor FQDN or IP
    #[arg(long, short = 'c')]
    conductor: String,

    /// Username for login (password is prompted)
    #[arg(long, short = 'u')]
    username: Option<String>,

    /// Pre-acquired bearer token (skips login)
    #[arg(long)]
    token: Option<String>,

    /// Accept self-signed conductor certificates
    #[arg(long)]
    insecure: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a scope and list its neighborhoods
    Discover {
        /// Limit the scan to one router
        #[arg(long)]
        router: Option<String>,

        /// Limit the scan to routers with this name prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// List every interface carrying a neighborhood
    Find {
        /// Neighborhood name to look for
        #[arg(long, short)]
        neighborhood: String,

        /// Write matches to a file (.csv or .json) instead of stdout only
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long)]
        router: Option<String>,

        #[arg(long)]
        prefix: Option<String>,
    },

    /// Write the editable router-list checkpoint for a neighborhood
    Targets {
        /// Reference neighborhood whose carriers become the list
        #[arg(long, short)]
        neighborhood: String,

        /// Checkpoint file to write
        #[arg(long, short, default_value = "router_list.txt")]
        output: PathBuf,

        #[arg(long)]
        router: Option<String>,

        #[arg(long)]
        prefix: Option<String>,
    },

    /// Clone a neighborhood on a hub, verify it, and fan it out to spokes
    Clone {
        /// Hub router carrying the source neighborhood
        #[arg(long)]
        hub: String,

        /// Source neighborhood name (selected interactively when omitted)
        #[arg(long)]
        source: Option<String>,

        /// Name for the clone (prompted when omitted)
        #[arg(long)]
        new_name: Option<String>,

        /// Fan out to routers with this name prefix
        #[arg(long, conflicts_with = "target_list")]
        prefix: Option<String>,

        /// Fan out to the routers in this checkpoint file
        #[arg(long)]
        target_list: Option<PathBuf>,

        /// Only touch interfaces whose name contains this (case-insensitive)
        #[arg(long = "match", default_value = "wan")]
        match_substring: String,

        /// Seconds to wait before verifying the clone
        #[arg(long, default_value_t = 5)]
        settle: u64,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Fan an existing neighborhood out over a router-list checkpoint
    Apply {
        /// Neighborhood name to add
        #[arg(long, short)]
        name: String,

        /// Checkpoint file listing the target routers
        #[arg(long, default_value = "router_list.txt")]
        target_list: PathBuf,

        /// Only touch interfaces whose name contains this (case-insensitive)
        #[arg(long = "match", default_value = "wan")]
        match_substring: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Apply a neighborhood to each record of an interface export
    Set {
        /// Neighborhood name to add
        #[arg(long, short)]
        name: String,

        /// Records file written by `find` (.csv or .json)
        #[arg(long, short)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nbhctl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = connect(&cli).await?;
    run_cli(&client, cli.command).await
}

/// Build the client: either around a supplied token, or by logging in.
async fn connect(cli: &Cli) -> Result<ConductorClient> {
    if let Some(token) = &cli.token {
        return Ok(ConductorClient::with_token(
            &cli.conductor,
            token.clone(),
            cli.insecure,
        )?);
    }
    let username = cli
        .username
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("either --token or --username is required"))?;
    let password = interactive::prompt_password(username)?;
    let mut client = ConductorClient::new(&cli.conductor, cli.insecure)?;
    client.login(username, &password).await?;
    tracing::debug!(conductor = %client.base_url(), "session established");
    Ok(client)
}

async fn run_cli(client: &ConductorClient, command: Commands) -> Result<()> {
    match command {
        Commands::Discover { router, prefix } => {
            run_discover(client, scan_scope(router, prefix)?).await?;
        }
        Commands::Find {
            neighborhood,
            output,
            router,
            prefix,
        } => {
            run_find(client, neighborhood, output, scan_scope(router, prefix)?).await?;
        }
        Commands::Targets {
            neighborhood,
            output,
            router,
            prefix,
        } => {
            run_targets(client, neighborhood, output, scan_scope(router, prefix)?).await?;
        }
        Commands::Clone {
            hub,
            source,
            new_name,
            prefix,
            target_list,
            match_substring,
            settle,
            yes,
        } => {
            run_clone(
                client,
                hub,
                source,
                new_name,
                prefix,
                target_list,
                match_substring,
                settle,
                yes,
            )
            .await?;
        }
        Commands::Apply {
            name,
            target_list,
            match_substring,
            yes,
        } => {
            run_apply(client, name, target_list, match_substring, yes).await?;
        }
        Commands::Set { name, input } => {
            run_set(client, name, input).await?;
        }
    }
    Ok(())
}

fn scan_scope(router: Option<String>, prefix: Option<String>) -> Result<ScanScope> {
    match (router, prefix) {
        (Some(_), Some(_)) => anyhow::bail!("--router and --prefix are mutually exclusive"),
        (Some(router), None) => Ok(ScanScope::Router(router)),
        (None, Some(prefix)) => Ok(ScanScope::Prefix(prefix)),
        (None, None) => Ok(ScanScope::Fleet),
    }
}

async fn run_discover(client: &ConductorClient, scope: ScanScope) -> Result<()> {
    let report = discover::run(client, &DiscoverOptions { scope }).await?;
    for entry in &report.neighborhoods {
        println!("{}", style(&entry.name).bold());
        for path in &entry.paths {
            println!("  {path}");
        }
    }
    println!(
        "{}",
        style(format!(
            "Scanned {} router(s), {} interface(s); {} neighborhood name(s).",
            report.routers_scanned,
            report.interfaces_scanned,
            report.neighborhoods.len()
        ))
        .dim()
    );
    Ok(())
}

async fn run_find(
    client: &ConductorClient,
    neighborhood: String,
    output: Option<PathBuf>,
    scope: ScanScope,
) -> Result<()> {
    let report = find::run(
        client,
        &FindOptions {
            neighborhood: neighborhood.clone(),
            scope,
            output,
        },
    )
    .await?;
    match &report.written_to {
        Some(path) => println!(
            "Wrote {} interface(s) carrying '{neighborhood}' to {}",
            report.records.len(),
            path.display()
        ),
        None => {
            for record in &report.records {
                println!("{}", record.to_path());
            }
        }
    }
    println!(
        "{}",
        style(format!(
            "Scanned {} router(s), {} interface(s); {} match(es).",
            report.routers_scanned,
            report.interfaces_scanned,
            report.records.len()
        ))
        .dim()
    );
    Ok(())
}

async fn run_targets(
    client: &ConductorClient,
    neighborhood: String,
    output: PathBuf,
    scope: ScanScope,
) -> Result<()> {
    let report = targets::run(
        client,
        &TargetsOptions {
            neighborhood: neighborhood.clone(),
            scope,
            output,
        },
    )
    .await?;
    for router in &report.routers {
        println!("- {router}");
    }
    println!(
        "{} router(s) carry '{neighborhood}'. List saved to {}; edit it before running `apply`.",
        report.routers.len(),
        report.output.display()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_clone(
    client: &ConductorClient,
    hub: String,
    source: Option<String>,
    new_name: Option<String>,
    prefix: Option<String>,
    target_list: Option<PathBuf>,
    match_substring: String,
    settle: u64,
    yes: bool,
) -> Result<()> {
    // Resolve the source interactively from a hub scan when not given.
    let source = match source {
        Some(source) => source,
        None => {
            let scan = discover::run(
                client,
                &DiscoverOptions {
                    scope: ScanScope::Router(hub.clone()),
                },
            )
            .await?;
            let names: Vec<String> = scan
                .neighborhoods
                .iter()
                .map(|entry| entry.name.clone())
                .collect();
            interactive::select_neighborhood(&names, "Neighborhood to clone")?
        }
    };
    let new_name = match new_name {
        Some(name) => name,
        None => interactive::prompt_new_name()?,
    };

    let spokes = match (prefix, target_list) {
        (Some(prefix), None) => SpokeSelection::Prefix(prefix),
        (None, Some(path)) => SpokeSelection::TargetList(path),
        (None, None) => SpokeSelection::None,
        (Some(_), Some(_)) => unreachable!("clap conflicts_with"),
    };

    let options = CloneOptions {
        hub,
        source,
        new_name: new_name.clone(),
        spokes,
        match_substring,
        settle: Some(Duration::from_secs(settle)),
    };
    let report = clone::run(client, &options, |filtered: &[ResourcePath]| {
        interactive::confirm_fanout(&new_name, filtered, yes)
    })
    .await?;

    println!(
        "Cloned '{}' to '{}' on {} (verified).",
        options.source, report.new_name, report.source
    );
    if report.declined {
        println!("{}", style("Fan-out declined; no spokes touched.").yellow());
    }
    if let Some(fanout) = &report.fanout {
        print_fanout(fanout);
    }
    Ok(())
}

async fn run_apply(
    client: &ConductorClient,
    name: String,
    target_list: PathBuf,
    match_substring: String,
    yes: bool,
) -> Result<()> {
    let options = ApplyOptions {
        name: name.clone(),
        target_list,
        match_substring,
    };
    let report = apply::run(client, &options, |filtered: &[ResourcePath]| {
        interactive::confirm_fanout(&name, filtered, yes)
    })
    .await?;

    if report.declined {
        println!("{}", style("Declined; no routers touched.").yellow());
    }
    if let Some(fanout) = &report.fanout {
        print_fanout(fanout);
    }
    Ok(())
}

async fn run_set(client: &ConductorClient, name: String, input: PathBuf) -> Result<()> {
    let report = set::run(client, &SetOptions { name, input }).await?;
    print_fanout(&report.fanout);
    Ok(())
}

/// Final tally, always printed on normal or isolated-failure completion.
fn print_fanout(report: &FanoutReport) {
    use nbhctl_core::propagate::Verdict;

    for outcome in report.outcomes() {
        let verdict = match outcome.verdict {
            Verdict::Added => style("added").green(),
            Verdict::Skipped => style("skipped").yellow(),
            Verdict::Failed => style("FAILED").red(),
        };
        match &outcome.detail {
            Some(detail) => println!("  {verdict} {} ({detail})", outcome.path),
            None => println!("  {verdict} {}", outcome.path),
        }
    }
    println!(
        "{}",
        style(format!(
            "Done: {} added, {} skipped, {} failed.",
            report.added(),
            report.skipped(),
            report.failed()
        ))
        .bold()
    );
}

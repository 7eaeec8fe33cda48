use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use std::path::PathBuf;

use justfix::address::{redirect_to_address_confirmation_or_next_step, AddressFields};
use justfix::bootstrap::AppBootstrap;
use justfix::config::Config;
use justfix::flows;
use justfix::graphql::{CsrfSource, GraphQlClient};
use justfix::logging;
use justfix::routes::{site_routes, Navigation, RouteMap, SiteType};
use justfix::session::Session;

#[derive(Parser)]
#[command(name = "justfix")]
#[command(about = "Wizard engine for the JustFix family of tenant tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List a site's client routes, or check whether a path is one
    Routes {
        /// Site to use (default: server.site_type)
        #[arg(short, long)]
        site: Option<SiteType>,

        /// Locale prefix (default: server.locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Path to check instead of listing
        #[arg(long)]
        check: Option<String>,
    },

    /// Show back/next/latest steps of the site's main flow for a path
    Progress {
        /// Pathname of the current page
        path: String,

        /// Session JSON file (default: logged-out session)
        #[arg(short, long)]
        session: Option<PathBuf>,
    },

    /// Decide between the address confirmation step and the next step
    Address {
        /// Street address as typed
        input: String,

        /// Street address as geocoded by the server
        resolved: String,

        #[arg(long)]
        input_borough: Option<String>,

        #[arg(long)]
        resolved_borough: Option<String>,
    },

    /// Send GraphQL documents to the batch endpoint as one batch
    Query {
        /// Query documents; `@file` reads a document from a file
        #[arg(required = true)]
        documents: Vec<String>,

        /// Variables (JSON object) applied to every document
        #[arg(long)]
        variables: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Commands::Routes {
            site,
            locale,
            check,
        } => {
            cmd_routes(&config, site, locale, check)?;
        }
        Commands::Progress { path, session } => {
            cmd_progress(&config, &path, session)?;
        }
        Commands::Address {
            input,
            resolved,
            input_borough,
            resolved_borough,
        } => {
            cmd_address(&config, input, resolved, input_borough, resolved_borough);
        }
        Commands::Query {
            documents,
            variables,
        } => {
            cmd_query(&config, documents, variables).await?;
        }
    }

    Ok(())
}

fn cmd_routes(
    config: &Config,
    site: Option<SiteType>,
    locale: Option<String>,
    check: Option<String>,
) -> Result<()> {
    let site = site.unwrap_or(config.server.site_type);
    let locale = locale.unwrap_or_else(|| config.server.locale.clone());
    let route_map = RouteMap::new(&site_routes(site, &locale));

    if let Some(path) = check {
        match route_map.navigation_for(&path) {
            Navigation::Soft(target) => println!("{target}: client route (soft navigation)"),
            Navigation::Hard(target) => println!("{target}: server route (hard redirect)"),
        }
        return Ok(());
    }

    println!(
        "{} routes ({}, {} total)",
        site.display_name(),
        locale,
        route_map.size()
    );
    println!("{}", "─".repeat(60));
    for route in route_map.non_parameterized_routes() {
        println!("  {route}");
    }
    for route in route_map.parameterized_routes() {
        println!("  {route}  (pattern)");
    }

    Ok(())
}

fn cmd_progress(config: &Config, path: &str, session_file: Option<PathBuf>) -> Result<()> {
    let site = config.server.site_type;
    let Some(flow) = flows::flow_for(site, &config.server.locale) else {
        bail!("No flow is modelled for {}", site.display_name());
    };

    let session: Session = match session_file {
        Some(file) => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read session file {}", file.display()))?;
            serde_json::from_str(&contents).context("Failed to parse session file")?
        }
        None => Session::default(),
    };

    if flow.step_for(path).is_none() {
        bail!("{path} is not a step of the {} flow", flow.label());
    }

    let navigation = flow.navigation(&session, path);
    println!("{}", flow.format_progress(path));
    println!();
    println!("  Back:   {}", navigation.prev.as_deref().unwrap_or("-"));
    println!("  Next:   {}", navigation.next.as_deref().unwrap_or("-"));
    println!("  Latest: {}", flow.latest_step_path(&session));
    if let Some(progress) = flow.progress(path) {
        println!("  Step:   {} of {}", progress.current + 1, progress.total);
    }

    Ok(())
}

fn cmd_address(
    config: &Config,
    input: String,
    resolved: String,
    input_borough: Option<String>,
    resolved_borough: Option<String>,
) {
    let routes = site_routes(SiteType::Justfix, &config.server.locale);
    let confirmation = routes
        .path("locale.onboarding.step1AddressModal")
        .unwrap_or("confirmation");
    let next = routes.path("locale.onboarding.step2").unwrap_or("next");

    let input = AddressFields {
        borough: input_borough,
        ..AddressFields::new(input)
    };
    let resolved = AddressFields {
        borough: resolved_borough,
        ..AddressFields::new(resolved)
    };

    println!(
        "{}",
        redirect_to_address_confirmation_or_next_step(&input, &resolved, confirmation, next)
    );
}

fn read_document(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read query document {file}")),
        None => Ok(arg.to_string()),
    }
}

async fn cmd_query(config: &Config, documents: Vec<String>, variables: Option<String>) -> Result<()> {
    let variables = variables
        .map(|v| serde_json::from_str::<serde_json::Value>(&v))
        .transpose()
        .context("--variables must be JSON")?;

    let csrf_token = match &config.server.bootstrap {
        Some(path) => AppBootstrap::load(std::path::Path::new(path))?.session.csrf_token,
        None => String::new(),
    };

    let client = GraphQlClient::new(
        config.batch_url(),
        CsrfSource::Static(csrf_token),
        config.graphql.flush_strategy(),
    );

    let mut pending = Vec::with_capacity(documents.len());
    for document in &documents {
        pending.push(client.fetch(read_document(document)?, variables.clone()));
    }

    for (document, result) in documents.iter().zip(join_all(pending).await) {
        println!("# {document}");
        match result {
            Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
            Err(e) => println!("error: {e}"),
        }
    }

    Ok(())
}

//! Route Advisor - proximity scoring for mobile-service bookings
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API
//! route-advisor serve --addr 127.0.0.1:8080
//!
//! # Would Ana at 11:00 fit the route on 2024-03-15?
//! route-advisor evaluate --date 2024-03-15 --client Ana --time 11:00
//!
//! # Confirm it
//! route-advisor book --date 2024-03-15 --client Ana --time 11:00 --service Color
//!
//! # Show the day's route
//! route-advisor route --date 2024-03-15
//! ```
//!
//! # Environment Variables
//!
//! - `ROUTE_ADVISOR_CONFIG`: path to a TOML config (default: `./route_config.toml`)
//! - `ROUTE_ADVISOR_CORS_ORIGINS`: comma-separated origins allowed by the API
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use route_advisor::api::{create_app, ApiState};
use route_advisor::config::RouteConfig;
use route_advisor::geo::RngJitter;
use route_advisor::planner::{BookingRequest, EvaluationRequest, RoutePlanner};
use route_advisor::types::clock::{format_time, parse_date};
use route_advisor::types::Client;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "route-advisor")]
#[command(about = "Proximity advisor for mobile-service route planning")]
#[command(version)]
struct CliArgs {
    /// Path to a route_config.toml (overrides the standard search order)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API
    Serve {
        /// Override the server address (default from config: "0.0.0.0:8080")
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Classify a proposed booking without saving it
    Evaluate {
        /// Day of the booking (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Client name as registered in the directory
        #[arg(long)]
        client: String,
        /// Proposed time (HH:MM)
        #[arg(long)]
        time: String,
    },

    /// Confirm a booking and append it to the agenda
    Book {
        #[arg(long)]
        date: String,
        #[arg(long)]
        client: String,
        #[arg(long)]
        time: String,
        /// Service label (default from config)
        #[arg(long)]
        service: Option<String>,
    },

    /// Print the day's route: stops, legs and total distance
    Route {
        #[arg(long)]
        date: String,
    },

    /// Register a client in the directory
    AddClient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        neighborhood: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List known neighborhoods and the operator's base
    Neighborhoods,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RouteConfig> {
    match path {
        Some(p) => RouteConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(RouteConfig::load()),
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_server(config: &RouteConfig, planner: RoutePlanner, addr: Option<String>) -> Result<()> {
    let server_addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let app = create_app(ApiState::new(Arc::new(planner)));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!(addr = %server_addr, operator = %config.operator.name, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down");
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

fn run_evaluate(planner: &RoutePlanner, date: &str, client: &str, time: &str) -> Result<()> {
    let request = EvaluationRequest::parse(date, client, time)?;
    let assessment = planner.evaluate(&request, &mut RngJitter::from_entropy())?;
    let rec = &assessment.recommendation;

    if let Some(notice) = &assessment.notice {
        println!("! {notice}");
    }
    println!(
        "{} | {} | {:.1} km ({})",
        rec.classification,
        rec.reason_label,
        rec.distance_km,
        rec.classification.color()
    );
    println!("{}", rec.message);
    println!(
        "{} in {} at {} on {} ({} already booked)",
        assessment.client.name,
        assessment.client.neighborhood,
        format_time(assessment.time),
        assessment.date,
        assessment.scheduled_count
    );
    for slot in &assessment.occupancy {
        let marker = if slot.near { "*" } else { " " };
        println!("  {marker} {} {} ({})", format_time(slot.time), slot.client, slot.neighborhood);
    }
    Ok(())
}

fn run_book(planner: &RoutePlanner, date: &str, client: &str, time: &str, service: Option<&str>) -> Result<()> {
    let request = BookingRequest::parse(date, client, time, service)?;
    let stored = planner
        .confirm(&request, &mut RngJitter::from_entropy())
        .context("Booking was not saved")?;
    println!(
        "Booked {} ({}) on {} at {}: {} [{}]",
        stored.client,
        stored.neighborhood,
        stored.date,
        format_time(stored.time),
        stored.service,
        stored.status
    );
    Ok(())
}

fn run_route(planner: &RoutePlanner, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let route = planner.day_route(date)?;
    if route.is_empty() {
        println!("No appointments on {date}. Base: {}", route.base.name);
        return Ok(());
    }
    println!("Route for {date} from {}:", route.base.name);
    for (stop, leg) in route.stops.iter().zip(&route.legs) {
        let a = &stop.appointment;
        println!(
            "  {}. {} {} ({}) +{:.1} km",
            stop.number,
            format_time(a.time),
            a.client,
            a.neighborhood,
            leg.distance_km
        );
    }
    println!("Total: {:.1} km", route.total_km);
    Ok(())
}

fn run_add_client(planner: &RoutePlanner, name: String, neighborhood: String, contact: String, notes: String) -> Result<()> {
    let client = planner.add_client(Client {
        name,
        neighborhood,
        contact,
        notes,
    })?;
    println!("Registered {} ({})", client.name, client.neighborhood);
    Ok(())
}

fn run_neighborhoods(planner: &RoutePlanner) {
    let base = planner.base();
    println!("Base: {} {}", base.name, base.point);
    for (name, point) in planner.lookup().entries() {
        println!("  {name:<16} {point}");
    }
    println!("Standard slots: {}", planner.standard_slots().join(", "));
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(args.config.as_ref())?;
    let planner = RoutePlanner::from_config(&config);

    match args.command {
        SubCommand::Serve { addr } => run_server(&config, planner, addr).await,
        SubCommand::Evaluate { date, client, time } => run_evaluate(&planner, &date, &client, &time),
        SubCommand::Book {
            date,
            client,
            time,
            service,
        } => run_book(&planner, &date, &client, &time, service.as_deref()),
        SubCommand::Route { date } => run_route(&planner, &date),
        SubCommand::AddClient {
            name,
            neighborhood,
            contact,
            notes,
        } => run_add_client(&planner, name, neighborhood, contact, notes),
        SubCommand::Neighborhoods => {
            run_neighborhoods(&planner);
            Ok(())
        }
    }
}

mod cmd_agent;
mod cmd_config;
mod cmd_drive;
mod cmd_edit;
mod cmd_itinerary;
mod cmd_status;
mod cmd_stop;
mod cmd_story;
mod cmd_trip;
#[cfg(feature = "tui")]
mod tui;
mod workspace;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vox", version, about = "Plan trips, walk them as a story, and let an agent edit them")]
struct Cli {
    /// Store directory (default: $VOX_HOME, else the platform data dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current trip at a glance
    Status,
    /// Add, remove, reorder, and list stops
    Stop {
        #[command(subcommand)]
        cmd: StopCmd,
    },
    /// Show or replace the day-by-day itinerary
    Itinerary {
        #[command(subcommand)]
        cmd: ItineraryCmd,
    },
    /// Show or update trip constraints (only the given fields change)
    Constraints {
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        vibe: Option<String>,
    },
    /// Center the map on a point (lasts for this command only; use
    /// `trip save --lng --lat` to store a center with a trip)
    Focus {
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
    /// Show the theme, or switch between light and dark
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Clear the current trip (keeps the theme)
    Reset,
    /// Save, list, load, and delete named trips
    Trip {
        #[command(subcommand)]
        cmd: TripCmd,
    },
    /// Walk the itinerary stop by stop
    Story {
        /// Print the walk instead of opening the player
        #[arg(long)]
        plain: bool,
    },
    /// Simulate driving from stop to stop
    Drive {
        /// Distance covered per frame, in kilometres
        #[arg(long, default_value_t = vox_core::drive::DEFAULT_STEP_KM)]
        step_km: f64,
        /// Pause between frames, in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
        /// Only print arrivals
        #[arg(long)]
        arrivals_only: bool,
    },
    /// Manage credentials for map search and the voice agent
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
    /// Conversational agent integration
    Agent {
        #[command(subcommand)]
        cmd: AgentCmd,
    },
}

#[derive(Subcommand)]
enum StopCmd {
    /// Add a stop at known coordinates
    Add {
        /// Stop name
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Day number (default: 1)
        #[arg(long)]
        day: Option<u32>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Add a stop at a map point, named by reverse geocoding
    Pin {
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long)]
        day: Option<u32>,
    },
    /// Search for places; optionally add one of the results
    Search {
        query: String,
        /// Add the Nth result (1-based) as a stop
        #[arg(long)]
        pick: Option<usize>,
        #[arg(long)]
        day: Option<u32>,
    },
    /// Remove a stop by id or by position in `stop list`
    Remove { target: String },
    /// Move a stop from one list position to another (1-based)
    Move { from: usize, to: usize },
    /// List stops in trip order
    List,
}

#[derive(Subcommand)]
enum ItineraryCmd {
    /// Print the itinerary grouped by day
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the itinerary from a YAML or JSON day plan
    Set { file: PathBuf },
}

#[derive(Subcommand)]
enum TripCmd {
    /// Save the current trip under a name
    Save {
        /// Trip name (default: the destination, else "Untitled trip")
        #[arg(long)]
        name: Option<String>,
        /// Overwrite an existing trip instead of creating a new one
        #[arg(long)]
        id: Option<String>,
        /// Map center longitude stored with the trip
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
        /// Map center latitude stored with the trip
        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,
    },
    /// List saved trips, newest first
    List,
    /// Replace the current trip with a saved one
    Load { id: String },
    /// Delete a saved trip
    Delete { id: String },
}

#[derive(Subcommand)]
enum AgentCmd {
    /// Start the MCP tool server on stdio
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let home = cli.home.as_deref();

    match cli.cmd {
        Command::Status => cmd_status::execute(home),
        Command::Stop { cmd } => match cmd {
            StopCmd::Add {
                name,
                lng,
                lat,
                day,
                notes,
            } => cmd_stop::add(home, &name, lng, lat, day, notes),
            StopCmd::Pin { lng, lat, day } => cmd_stop::pin(home, lng, lat, day),
            StopCmd::Search { query, pick, day } => cmd_stop::search(home, &query, pick, day),
            StopCmd::Remove { target } => cmd_stop::remove(home, &target),
            StopCmd::Move { from, to } => cmd_stop::reorder(home, from, to),
            StopCmd::List => cmd_stop::list(home),
        },
        Command::Itinerary { cmd } => match cmd {
            ItineraryCmd::Show { json } => cmd_itinerary::show(home, json),
            ItineraryCmd::Set { file } => cmd_itinerary::set(home, &file),
        },
        Command::Constraints {
            destination,
            duration,
            vibe,
        } => cmd_edit::constraints(home, destination, duration, vibe),
        Command::Focus { lng, lat } => cmd_edit::focus(home, lng, lat),
        Command::Theme { toggle } => cmd_edit::theme(home, toggle),
        Command::Reset => cmd_edit::reset(home),
        Command::Trip { cmd } => match cmd {
            TripCmd::Save { name, id, lng, lat } => {
                cmd_trip::save(home, name.as_deref(), id.as_deref(), lng.zip(lat))
            }
            TripCmd::List => cmd_trip::list(home),
            TripCmd::Load { id } => cmd_trip::load(home, &id),
            TripCmd::Delete { id } => cmd_trip::delete(home, &id),
        },
        Command::Story { plain } => cmd_story::execute(home, plain),
        Command::Drive {
            step_km,
            delay_ms,
            arrivals_only,
        } => cmd_drive::execute(home, step_km, delay_ms, arrivals_only),
        Command::Config { cmd } => cmd_config::run(cmd, home),
        Command::Agent { cmd } => match cmd {
            AgentCmd::Serve => cmd_agent::serve(home),
        },
    }
}

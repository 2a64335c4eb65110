use clap::{Parser, Subcommand};

/// Command-line interface definition for hotelbook
#[derive(Parser)]
#[command(
    name = "hotelbook",
    version = env!("CARGO_PKG_VERSION"),
    about = "A small room-booking service: availability search, reservations and an admin calendar on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check the configuration file for missing fields")]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(long = "editor", help = "Editor to use with --edit")]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage rooms
    Room {
        #[command(subcommand)]
        action: RoomAction,
    },

    /// Manage administrator accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Search free rooms for a stay
    Search {
        #[arg(long, help = "Arrival date (YYYY-MM-DD)")]
        start: String,

        #[arg(long, help = "Departure date (YYYY-MM-DD)")]
        end: String,

        #[arg(long, help = "Only check this room id")]
        room: Option<i64>,
    },

    /// Book a room
    Reserve {
        #[arg(long)]
        room: String,

        #[arg(long, help = "Arrival date (YYYY-MM-DD)")]
        start: String,

        #[arg(long, help = "Departure date (YYYY-MM-DD)")]
        end: String,

        #[arg(long = "first")]
        first_name: String,

        #[arg(long = "last")]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,
    },

    /// List and manage reservations
    Reservations {
        #[arg(long = "new", help = "Only reservations not yet processed")]
        new_only: bool,

        #[arg(long, value_name = "ID", help = "Show one reservation")]
        show: Option<i64>,

        #[arg(long, value_name = "ID", help = "Mark a reservation as processed")]
        process: Option<i64>,

        #[arg(long, value_name = "ID", help = "Delete a reservation and its restrictions")]
        delete: Option<i64>,
    },

    /// Show the occupancy calendar of a month
    Calendar {
        #[arg(long, requires = "month")]
        year: Option<i32>,

        #[arg(long, requires = "year")]
        month: Option<u32>,
    },

    /// Block a room for one day
    Block {
        #[arg(long)]
        room: i64,

        #[arg(long, help = "Day to block (YYYY-MM-DD)")]
        date: String,
    },

    /// Remove an owner block
    Unblock {
        #[arg(long, help = "Block id as shown by `calendar`")]
        id: i64,
    },

    /// Run the web server
    Serve {
        #[arg(long, help = "Listen address (overrides listen_addr)")]
        addr: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RoomAction {
    /// Add a room
    Add { name: String },
    /// List every room
    List,
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Add an administrator
    Add {
        #[arg(long = "first")]
        first_name: String,

        #[arg(long = "last")]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long = "access-level", default_value_t = 3)]
        access_level: i64,
    },
}

use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use uuid::Uuid;

use warikan::{
    codec, compute_balance, util, BalanceResult, Config, Database, Expense, Imported, PairState,
    Party, Room, RoomStore,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PaidBy {
    A,
    B,
}

impl From<PaidBy> for Party {
    fn from(value: PaidBy) -> Self {
        match value {
            PaidBy::A => Party::A,
            PaidBy::B => Party::B,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "warikan", version, about = "Track shared expenses between two people")]
struct Cli {
    /// Data directory (default ~/.warikan)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new room for a pair
    New {
        /// First person's name
        person_a: String,
        /// Second person's name
        person_b: String,
    },
    /// List rooms with their current settlement
    List,
    /// Add an expense to a room
    Add {
        /// Room id
        room: Uuid,
        /// What the money was spent on
        #[arg(short, long)]
        description: String,
        /// Amount paid
        #[arg(short, long)]
        amount: f64,
        /// Who paid
        #[arg(short, long, value_enum)]
        paid_by: PaidBy,
        /// Amount billed to the other person (default: half)
        #[arg(short, long)]
        split: Option<f64>,
        /// Date of the expense (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove an expense from a room by id
    Remove {
        /// Room id
        room: Uuid,
        /// Expense id
        expense: String,
    },
    /// Show who owes whom
    Balance {
        /// Room id
        room: Uuid,
    },
    /// Print a shareable link (or bare token) for a room
    Share {
        /// Room id
        room: Uuid,
        /// Base URL for the link (default: share_base_url from config)
        #[arg(long)]
        base: Option<String>,
    },
    /// Import state from a share link or token
    Import {
        /// Share URL or bare token
        link: String,
    },
    /// Delete a room
    Delete {
        /// Room id
        room: Uuid,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.data_dir {
        Some(dir) => {
            util::init_data_dir(Some(dir.clone()));
            Config::load()
        }
        None => {
            // The config file lives inside the data directory, so read it
            // from the default location before honoring its override.
            let config = Config::load();
            util::init_data_dir(config.data_dir.clone());
            config
        }
    };

    // Log to file (~/.warikan/logs/warikan.log)
    fs::create_dir_all(util::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let db = Database::open(util::database_path())?;
    let store = RoomStore::new(db.connection());

    match cli.command {
        Command::New { person_a, person_b } => {
            let room = Room::new(PairState::new(person_a, person_b));
            store.create(&room)?;
            println!("Created room {}", room.id);
        }
        Command::List => {
            let rooms = store.get_all()?;
            if rooms.is_empty() {
                println!("No rooms yet. Create one with `warikan new <person-a> <person-b>`.");
            }
            for room in rooms {
                let result = compute_balance(&room.state);
                println!(
                    "{}  {} & {}  ({} expenses, updated {})",
                    room.id,
                    room.state.party_a,
                    room.state.party_b,
                    room.state.entries.len(),
                    room.updated_at.format("%Y-%m-%d"),
                );
                println!("    {}", settlement_line(&room.state, &result));
            }
        }
        Command::Add {
            room,
            description,
            amount,
            paid_by,
            split,
            date,
        } => {
            let mut room = get_room(&store, room)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let expense = Expense::new(description, amount, split, paid_by.into(), date);
            let id = expense.id.clone();
            room.state.entries.push(expense);
            store.update(room.id, &room.state)?;
            println!("Added expense {}", id);
        }
        Command::Remove { room, expense } => {
            let mut room = get_room(&store, room)?;
            let before = room.state.entries.len();
            room.state.entries.retain(|e| e.id != expense);
            if room.state.entries.len() == before {
                bail!("No expense {} in room {}", expense, room.id);
            }
            store.update(room.id, &room.state)?;
            println!("Removed expense {}", expense);
        }
        Command::Balance { room } => {
            let room = get_room(&store, room)?;
            let result = compute_balance(&room.state);
            println!(
                "{} paid {}",
                room.state.party_a,
                format_amount(result.total_paid_by_a)
            );
            println!(
                "{} paid {}",
                room.state.party_b,
                format_amount(result.total_paid_by_b)
            );
            println!("Total: {}", format_amount(result.total));
            println!("{}", settlement_line(&room.state, &result));
        }
        Command::Share { room, base } => {
            let room = get_room(&store, room)?;
            match base.or(config.share_base_url) {
                Some(base) => println!("{}", codec::share_url(&base, &room.state)?),
                None => println!("{}", codec::encode_state(&room.state)?),
            }
        }
        Command::Import { link } => {
            let state = codec::token_from_url(&link)
                .and_then(codec::decode_state)
                .map_err(|e| {
                    tracing::warn!(error = %e, "Share token did not decode");
                    anyhow::anyhow!("No shareable data found in input")
                })?;
            match store.import_state(state)? {
                Imported::Merged(room) => println!(
                    "Updated room {} ({} & {}) from shared data",
                    room.id, room.state.party_a, room.state.party_b
                ),
                Imported::Created(room) => println!(
                    "Imported room {} ({} & {})",
                    room.id, room.state.party_a, room.state.party_b
                ),
            }
        }
        Command::Delete { room } => {
            if store.delete(room)? {
                println!("Deleted room {}", room);
            } else {
                bail!("No room {}", room);
            }
        }
    }

    Ok(())
}

fn get_room(store: &RoomStore, id: Uuid) -> Result<Room> {
    match store.get_by_id(id)? {
        Some(room) => Ok(room),
        None => bail!("No room {}", id),
    }
}

fn settlement_line(state: &PairState, result: &BalanceResult) -> String {
    match result.settling_party {
        Some(party) => format!(
            "{} pays {} {}",
            state.name_of(party),
            state.name_of(party.other()),
            result.settlement_amount
        ),
        None => "All settled up".to_string(),
    }
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

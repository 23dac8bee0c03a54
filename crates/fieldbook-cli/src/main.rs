use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};

use fieldbook_db::Database;
use fieldbook_service::photos::DEFAULT_UPLOAD_DIR;
use fieldbook_service::{AuthService, CollectionStore, PhotoStore, seed};
use fieldbook_types::api::{CollectionRecord, NewCollection, NewUser, PhotoSummary, UserProfile};
use fieldbook_types::models::User;

#[derive(Parser)]
#[command(name = "fieldbook", about = "Field data collection backend toolkit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize the database and seed the demo accounts
    Init,
    /// Register a new user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Activate or deactivate an account
    SetActive {
        #[arg(long)]
        username: String,
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },
    /// Store a photo from a local file and print its metadata record
    AddPhoto {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Submit a visit record on behalf of a user
    Submit {
        #[arg(long)]
        username: String,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        photo_id: Option<i64>,
    },
    /// List a user's recent visit records
    List {
        #[arg(long)]
        username: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Dashboard statistics for a user
    Stats {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldbook=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Config
    let db_path = std::env::var("FIELDBOOK_DB_PATH").unwrap_or_else(|_| "fieldbook.db".into());
    let upload_dir =
        std::env::var("FIELDBOOK_UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.into());

    let db = Arc::new(Database::open(Path::new(&db_path))?);
    let auth = AuthService::new(db.clone());

    match cli.command {
        Command::Init => {
            let created = seed::seed_demo_users(&auth)?;
            println!("Database ready at {db_path} ({created} demo users created)");
        }

        Command::CreateUser {
            username,
            password,
            full_name,
            email,
        } => {
            let new_user = NewUser {
                username,
                password,
                full_name,
                email,
            };
            match auth.create_user(&new_user)? {
                Some(user) => print_json(&UserProfile::from(&user))?,
                None => bail!("could not create user: invalid input or username already taken"),
            }
        }

        Command::SetActive { username, active } => {
            let user = require_user(&auth, &username)?;
            auth.set_active(user.id, active)?;
            println!("{username}: is_active = {active}");
        }

        Command::AddPhoto { file, mime } => {
            let photos = PhotoStore::new(db.clone(), upload_dir);
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let original = file
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("not a file path: {}", file.display()))?;
            let mime = mime.unwrap_or_else(|| guess_mime(&file).to_string());

            match photos.save(&bytes, original, &mime, None).await? {
                Some(photo) => print_json(&PhotoSummary::from(&photo))?,
                None => bail!("photo rejected: unsupported extension or size out of bounds"),
            }
        }

        Command::Submit {
            username,
            customer,
            description,
            photo_id,
        } => {
            let user = require_user(&auth, &username)?;
            let collections = CollectionStore::new(db.clone());
            let input = NewCollection {
                customer_name: customer,
                description,
                photo_id,
                location_data: None,
                device_info: None,
            };
            match collections.create(user.id, &input)? {
                Some(collection) => print_json(&CollectionRecord::from(&collection))?,
                None => bail!("submission rejected: unknown user or photo reference"),
            }
        }

        Command::List { username, limit } => {
            let user = require_user(&auth, &username)?;
            let collections = CollectionStore::new(db.clone());
            let records: Vec<CollectionRecord> = collections
                .list_by_user(user.id, limit)?
                .iter()
                .map(CollectionRecord::from)
                .collect();
            print_json(&records)?;
        }

        Command::Stats { username } => {
            let user = require_user(&auth, &username)?;
            let collections = CollectionStore::new(db.clone());
            print_json(&collections.dashboard_stats(user.id)?)?;
        }
    }

    Ok(())
}

fn require_user(auth: &AuthService, username: &str) -> anyhow::Result<User> {
    auth.get_by_username(username)?
        .with_context(|| format!("no such user: {username}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

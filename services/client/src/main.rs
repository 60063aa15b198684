//! `beanshub`: command-line front end for the roastery backend.
//!
//! ```bash
//! # Create an account (role defaults to Staff)
//! beanshub --email ana@example.com --password secret sign-up --name Ana
//!
//! # Sign in, load everything the dashboard shows, print a summary
//! beanshub --email ana@example.com --password secret sync
//!
//! # Point at the local emulator suite
//! FIREBASE_AUTH_URL=http://localhost:9099/identitytoolkit.googleapis.com \
//! FIRESTORE_URL=http://localhost:8080 beanshub list green-beans
//! ```

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use beanshub_client::config::ClientConfig;
use beanshub_client::domain::profile::USERS_COLLECTION;
use beanshub_client::domain::record::Record;
use beanshub_client::domain::repository::IdentityPort;
use beanshub_client::infra::firebase_auth::FirebaseAuth;
use beanshub_client::infra::firestore::FirestoreClient;
use beanshub_client::session::SessionBootstrap;
use beanshub_client::store::Store;
use beanshub_client::usecase::auth::{SignInInput, SignInUseCase, SignUpInput, SignUpUseCase};
use beanshub_client::usecase::notification::NotificationsUseCase;
use beanshub_client::usecase::records::Records;
use beanshub_client::usecase::user::UsersUseCase;
use beanshub_core::config::Config;
use beanshub_core::tracing::init_tracing;
use beanshub_domain::bean::GreenBean;
use beanshub_domain::id::{RecordId, UserId};
use beanshub_domain::notification::Notification;
use beanshub_domain::roasting::{RoastingProfile, RoastingSession};
use beanshub_domain::sale::Sale;
use beanshub_domain::user::{User, UserRole};

#[derive(Parser)]
#[command(name = "beanshub", about = "Roastery inventory, roasting and sales client")]
struct Args {
    /// Account email
    #[arg(long, env = "BEANSHUB_EMAIL", global = true)]
    email: Option<String>,

    /// Account password
    #[arg(long, env = "BEANSHUB_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and its profile
    SignUp {
        #[arg(long)]
        name: String,
        /// Defaults to the password given with --password
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Admin, Roaster or Staff
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Sign in, load every collection, print a summary of the session
    Sync,
    /// Print one collection as JSON
    List {
        #[arg(value_enum)]
        collection: Collection,
    },
    /// Receive a green bean lot into inventory
    AddBean {
        #[arg(long)]
        name: String,
        #[arg(long)]
        origin: String,
        /// Kilograms
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        cost_per_kg: f64,
        #[arg(long)]
        variety: Option<String>,
        #[arg(long)]
        process: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        moisture_content: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a record by id
    Delete {
        #[arg(value_enum)]
        collection: Collection,
        id: String,
    },
    /// Mark one notification as read
    MarkRead { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Collection {
    Users,
    GreenBeans,
    RoastingProfiles,
    RoastingSessions,
    Sales,
    Notifications,
}

struct Backend {
    auth: FirebaseAuth,
    documents: FirestoreClient,
}

impl Backend {
    fn new(config: &ClientConfig) -> Self {
        let http = reqwest::Client::new();
        let auth = FirebaseAuth::new(config, http.clone());
        let documents = FirestoreClient::new(config, http, auth.clone());
        Self { auth, documents }
    }

    async fn sign_in(&self, email: String, password: String) -> Result<User> {
        let sign_in = SignInUseCase {
            identity: self.auth.clone(),
            store: self.documents.clone(),
        };
        Ok(sign_in.execute(SignInInput { email, password }).await?)
    }

    fn records(&self) -> Records<FirestoreClient> {
        Records {
            store: self.documents.clone(),
        }
    }

    fn users(&self) -> UsersUseCase<FirestoreClient> {
        UsersUseCase {
            store: self.documents.clone(),
        }
    }

    fn notifications(&self) -> NotificationsUseCase<FirestoreClient> {
        NotificationsUseCase {
            store: self.documents.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = ClientConfig::try_from_env().context("load configuration from environment")?;
    let backend = Backend::new(&config);

    let email = args.email.context("--email or BEANSHUB_EMAIL is required")?;
    let password = args
        .password
        .context("--password or BEANSHUB_PASSWORD is required")?;

    match args.command {
        Command::SignUp {
            name,
            confirm_password,
            phone,
            role,
        } => {
            let sign_up = SignUpUseCase {
                identity: backend.auth.clone(),
                store: backend.documents.clone(),
            };
            let user = sign_up
                .execute(SignUpInput {
                    email,
                    confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                    password,
                    name,
                    phone,
                    role,
                })
                .await?;
            print_json(&user)
        }
        Command::Sync => {
            backend.sign_in(email, password).await?;
            let bootstrap = SessionBootstrap {
                identity: backend.auth.clone(),
                documents: backend.documents.clone(),
                store: Store::new(),
            };
            bootstrap.handle_transition(backend.auth.current_user()).await;
            let state = bootstrap.store.snapshot();
            print_json(&json!({
                "user": state.user,
                "initialized": state.initialized,
                "greenBeans": state.green_beans.len(),
                "roastingProfiles": state.roasting_profiles.len(),
                "roastingSessions": state.roasting_sessions.len(),
                "sales": state.sales.len(),
                "notifications": state.notifications.len(),
                "unread": state.notifications.iter().filter(|n| !n.record.read).count(),
            }))
        }
        Command::List { collection } => {
            let user = backend.sign_in(email, password).await?;
            let records = backend.records();
            match collection {
                Collection::Users => print_json(&backend.users().list().await?),
                Collection::GreenBeans => print_json(&records.list::<GreenBean>().await?),
                Collection::RoastingProfiles => {
                    print_json(&records.list::<RoastingProfile>().await?)
                }
                Collection::RoastingSessions => {
                    print_json(&records.list::<RoastingSession>().await?)
                }
                Collection::Sales => print_json(&records.list::<Sale>().await?),
                Collection::Notifications => {
                    print_json(&backend.notifications().list_for_user(&user.id).await?)
                }
            }
        }
        Command::AddBean {
            name,
            origin,
            quantity,
            cost_per_kg,
            variety,
            process,
            supplier,
            moisture_content,
            notes,
        } => {
            backend.sign_in(email, password).await?;
            let bean = GreenBean {
                name,
                origin,
                variety,
                process,
                supplier,
                quantity,
                cost_per_kg,
                moisture_content,
                notes,
                entry_date: Utc::now(),
            };
            print_json(&backend.records().add_stored(bean).await?)
        }
        Command::Delete { collection, id } => {
            backend.sign_in(email, password).await?;
            let id = RecordId::from(id);
            let records = backend.records();
            match collection {
                Collection::Users => backend.users().delete(&UserId::from(id.as_str())).await?,
                Collection::GreenBeans => records.delete::<GreenBean>(&id).await?,
                Collection::RoastingProfiles => records.delete::<RoastingProfile>(&id).await?,
                Collection::RoastingSessions => records.delete::<RoastingSession>(&id).await?,
                Collection::Sales => records.delete::<Sale>(&id).await?,
                Collection::Notifications => records.delete::<Notification>(&id).await?,
            }
            print_json(&json!({ "deleted": collection_name(collection), "id": id }))
        }
        Command::MarkRead { id } => {
            backend.sign_in(email, password).await?;
            backend.notifications().mark_read(&RecordId::from(id)).await?;
            Ok(())
        }
    }
}

fn collection_name(collection: Collection) -> &'static str {
    match collection {
        Collection::Users => USERS_COLLECTION,
        Collection::GreenBeans => GreenBean::COLLECTION,
        Collection::RoastingProfiles => RoastingProfile::COLLECTION,
        Collection::RoastingSessions => RoastingSession::COLLECTION,
        Collection::Sales => Sale::COLLECTION,
        Collection::Notifications => Notification::COLLECTION,
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

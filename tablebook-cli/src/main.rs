use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tablebook_core::booking::SelectedBooking;
use tablebook_core::routes::{guard, Route, RouteDecision};
use tablebook_core::search::{group_availability, SearchCriteria};
use tablebook_core::session::{Credentials, RegisterProfile, Role, Session};
use tablebook_flow::{BookingFlow, ConfirmationService, ReservationLedger, SessionManager};
use tablebook_gateway::api::ListingUpsert;
use tablebook_gateway::{ApiClient, Config, LocalStore, RemoteStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tablebook")]
#[command(about = "restaurant reservation client", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account (and sign in)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, value_enum, default_value = "customer")]
        role: RoleArg,
    },
    /// Drop the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Search availability and list restaurants with open slots
    Search(SearchArgs),
    /// Book a table and show the confirmation
    Book(BookArgs),
    /// List your reservations (server and locally cached)
    Reservations,
    /// Cancel one reservation by id
    Cancel {
        reservation_id: String,
    },
    /// Print a calendar link for one reservation
    Calendar {
        reservation_id: String,
    },
    /// Restaurant manager operations
    Manager(ManagerArgs),
    /// Admin operations
    Admin(AdminArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Customer,
    Manager,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Customer => Role::Customer,
            RoleArg::Manager => Role::RestaurantManager,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long, help = "Date, YYYY-MM-DD")]
    date: String,
    #[arg(long, help = "Time, HH:MM")]
    time: String,
    #[arg(long, default_value_t = 2)]
    people: u32,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip: Option<String>,
}

#[derive(Args, Debug)]
struct BookArgs {
    #[arg(long)]
    restaurant_id: i64,
    #[arg(long, help = "Date, YYYY-MM-DD")]
    date: String,
    #[arg(long, help = "Time, HH:MM")]
    time: String,
    #[arg(long, default_value_t = 2)]
    people: u32,
    #[arg(long)]
    table_id: i64,
    #[arg(long)]
    restaurant_name: Option<String>,
    /// Ask the server to email a confirmation afterwards
    #[arg(long)]
    notify_email: bool,
    /// Phone number for an SMS confirmation (logged only, no SMS backend)
    #[arg(long)]
    sms: Option<String>,
}

#[derive(Args, Debug)]
struct ManagerArgs {
    #[command(subcommand)]
    command: ManagerCmds,
}

#[derive(Subcommand, Debug)]
enum ManagerCmds {
    /// List your restaurants
    List,
    /// Add or update a listing
    Upsert {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cuisine: String,
        #[arg(long)]
        cost_rating: i32,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        zip_code: String,
    },
}

#[derive(Args, Debug)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCmds,
}

#[derive(Subcommand, Debug)]
enum AdminCmds {
    /// Restaurants waiting for approval
    Pending,
    /// Approve a restaurant
    Approve { restaurant_id: i64 },
    /// Remove a restaurant
    Remove { restaurant_id: i64 },
    /// Reservation and listing totals
    Analytics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablebook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("failed to load config")?;
    tracing::debug!("using api at {}", config.api.base_url);

    let api = Arc::new(ApiClient::new(&config.api)?);
    let local = Arc::new(LocalStore::new(config.storage.dir.clone()));
    let sessions = SessionManager::new(api.clone(), local.clone());
    // Pick up a persisted token; an expired one downgrades silently.
    sessions.restore().await;

    match cli.command {
        Commands::Login { email, password } => {
            let session = sessions.login(&Credentials { email, password }).await?;
            println!("signed in as {} ({})", session.full_name, session.role.as_str());
        }
        Commands::Register {
            email,
            password,
            full_name,
            role,
        } => {
            let session = sessions
                .register(&RegisterProfile {
                    email,
                    password,
                    full_name,
                    role: role.into(),
                })
                .await?;
            println!("registered and signed in as {}", session.full_name);
        }
        Commands::Logout => {
            sessions.logout();
            println!("signed out");
        }
        Commands::Whoami => match sessions.current().session() {
            Some(session) => {
                println!("{} <{}> — {}", session.full_name, session.email, session.role.as_str());
            }
            None => println!("not signed in"),
        },
        Commands::Search(args) => run_search(&api, args).await?,
        Commands::Book(args) => {
            require_route(&sessions, Route::BookingReview)?;
            run_book(&api, &local, args).await?;
        }
        Commands::Reservations => {
            require_route(&sessions, Route::MyReservations)?;
            let mut ledger = ledger(&api, &local);
            print_reservations(ledger.refresh().await);
        }
        Commands::Cancel { reservation_id } => {
            require_route(&sessions, Route::MyReservations)?;
            let mut ledger = ledger(&api, &local);
            ledger.refresh().await;
            let cancelled = ledger.cancel(&reservation_id).await?;
            println!("cancelled reservation {} at {}", cancelled.id, cancelled.restaurant);
        }
        Commands::Calendar { reservation_id } => {
            require_route(&sessions, Route::MyReservations)?;
            let mut ledger = ledger(&api, &local);
            ledger.refresh().await;
            let Some(reservation) = ledger
                .entries()
                .iter()
                .find(|r| r.id == reservation_id)
                .cloned()
            else {
                bail!("no reservation with id {}", reservation_id);
            };

            let confirmations = ConfirmationService::new(api.clone(), local.clone());
            let (details, _) = confirmations.details(&reservation).await;
            let event = confirmations.calendar(&reservation, &details);
            if event.approximate {
                println!("warning: could not parse the reservation time, using the current time");
            }
            println!("{}", event.google_url());
        }
        Commands::Manager(args) => {
            require_route(&sessions, Route::ManagerDashboard)?;
            run_manager(&api, args).await?;
        }
        Commands::Admin(args) => {
            require_route(&sessions, Route::AdminDashboard)?;
            run_admin(&api, args).await?;
        }
    }

    Ok(())
}

/// Apply the route guard to a command. Deferral cannot happen here since
/// restore() has already settled by the time commands run.
fn require_route(sessions: &SessionManager, route: Route) -> anyhow::Result<Session> {
    let state = sessions.current();
    match guard(route, &state) {
        RouteDecision::Render => match state.session() {
            Some(session) => Ok(session.clone()),
            None => bail!("this command requires a signed-in user"),
        },
        RouteDecision::RedirectTo(Route::Login) => bail!("please sign in first (tablebook login)"),
        RouteDecision::RedirectTo(_) => bail!("your role does not allow this command"),
        RouteDecision::Defer => bail!("session is still resolving, try again"),
    }
}

fn ledger(api: &Arc<ApiClient>, local: &Arc<LocalStore>) -> ReservationLedger {
    ReservationLedger::new(Arc::new(RemoteStore::new(api.clone())), local.clone())
}

async fn run_search(api: &Arc<ApiClient>, args: SearchArgs) -> anyhow::Result<()> {
    let criteria = SearchCriteria {
        date: args.date,
        time: args.time,
        people: args.people,
        city: args.city,
        state: args.state,
        zip: args.zip,
    };

    let rows = api.search_availability(&criteria).await?;
    let cards = group_availability(&rows);

    if cards.is_empty() {
        println!("no tables available for those criteria");
        return Ok(());
    }

    for card in cards {
        println!(
            "#{} {} — {}, {} (cost {}/4, rating {:.1})",
            card.restaurant_id, card.name, card.cuisine, card.city, card.cost_rating, card.rating
        );
        let slots: Vec<String> = card
            .slots
            .iter()
            .map(|s| format!("{} (table {})", s.time, s.table_id))
            .collect();
        println!("    {}", slots.join("  "));
    }
    Ok(())
}

async fn run_book(
    api: &Arc<ApiClient>,
    local: &Arc<LocalStore>,
    args: BookArgs,
) -> anyhow::Result<()> {
    let selected = SelectedBooking {
        restaurant_id: Some(args.restaurant_id),
        date: Some(args.date),
        time: Some(args.time),
        people: args.people,
        table_id: Some(args.table_id),
        restaurant_name: args.restaurant_name,
        ..Default::default()
    };

    println!(
        "booking {} on {} at {} for {} people...",
        selected.display_name(),
        selected.date.as_deref().unwrap_or(""),
        selected.time.as_deref().unwrap_or(""),
        selected.people
    );

    let flow = BookingFlow::new(api.clone(), local.clone());
    let reservation = flow.confirm(&selected).await?;

    let confirmations = ConfirmationService::new(api.clone(), local.clone());
    let (details, _) = confirmations.details(&reservation).await;

    println!("confirmed — reservation id {}", reservation.id);
    println!("  {} on {} at {}", details.name, reservation.date, reservation.time);
    if let Some(address) = &details.address {
        println!("  {}", address);
    }

    if args.notify_email || args.sms.is_some() {
        let delivery = confirmations
            .send_confirmation(&reservation, args.notify_email, args.sms.as_deref())
            .await;
        if delivery.email_sent {
            println!("  confirmation email requested");
        } else if args.notify_email {
            println!("  could not request confirmation email");
        }
    }

    let event = confirmations.calendar(&reservation, &details);
    println!("  add to calendar: {}", event.google_url());
    Ok(())
}

fn print_reservations(entries: &[tablebook_core::booking::Reservation]) {
    if entries.is_empty() {
        println!("no reservations yet");
        return;
    }
    for reservation in entries {
        let marker = if reservation.is_local() { " (local)" } else { "" };
        println!(
            "{}  {} on {} at {} — {} people{}",
            reservation.id,
            reservation.restaurant,
            reservation.date,
            reservation.time,
            reservation.people,
            marker
        );
    }
}

async fn run_manager(api: &Arc<ApiClient>, args: ManagerArgs) -> anyhow::Result<()> {
    match args.command {
        ManagerCmds::List => {
            let restaurants = api.manager_restaurants().await?;
            if restaurants.is_empty() {
                println!("no listings yet");
            }
            for restaurant in restaurants {
                println!(
                    "#{} {} — {}",
                    restaurant.id.unwrap_or_default(),
                    restaurant.name,
                    restaurant.cuisine.as_deref().unwrap_or("-")
                );
            }
        }
        ManagerCmds::Upsert {
            name,
            cuisine,
            cost_rating,
            city,
            state,
            zip_code,
        } => {
            api.upsert_listing(&ListingUpsert {
                name: name.clone(),
                cuisine,
                cost_rating,
                city,
                state,
                zip_code,
            })
            .await?;
            println!("listing saved: {}", name);
        }
    }
    Ok(())
}

async fn run_admin(api: &Arc<ApiClient>, args: AdminArgs) -> anyhow::Result<()> {
    match args.command {
        AdminCmds::Pending => {
            let pending = api.pending_restaurants().await?;
            if pending.is_empty() {
                println!("nothing waiting for approval");
            }
            for restaurant in pending {
                println!("#{} {}", restaurant.id.unwrap_or_default(), restaurant.name);
            }
        }
        AdminCmds::Approve { restaurant_id } => {
            api.approve_restaurant(restaurant_id).await?;
            println!("approved restaurant {}", restaurant_id);
        }
        AdminCmds::Remove { restaurant_id } => {
            api.remove_restaurant(restaurant_id).await?;
            println!("removed restaurant {}", restaurant_id);
        }
        AdminCmds::Analytics => {
            let analytics = api.dashboard_analytics().await?;
            println!("reservations: {}", analytics.total_reservations);
            println!("restaurants:  {}", analytics.total_restaurants);
            println!("pending:      {}", analytics.pending_approvals);
        }
    }
    Ok(())
}

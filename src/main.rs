use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use sensor_admin::{
    client::{ApiClient, ApiError},
    config::{self, Config},
    csv_import,
    dashboard::{DashboardController, DashboardFilter, DashboardView},
    forms::{self, ChangePasswordForm, ItemForm, ProfileForm, SensorDataForm, UserForm},
    models::{FetchMode, LoginForm, NewPassword, UserPublic},
    mutations::{mutate, MutationOptions, MutationOutcome},
    query::{keys, Pager, QueryCache},
    session::TokenStore,
    views::{self, load_page},
};

#[derive(Parser)]
#[command(name = "sensor-admin")]
#[command(about = "Admin client for the sensor data backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SENSOR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show the current user and available sections
    Me,
    /// Send a password recovery e-mail
    PasswordRecovery { email: String },
    /// Set a new password using a recovery token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        new_password: String,
    },
    /// Print the HTML of the recovery e-mail (superuser)
    RecoveryHtml { email: String },
    /// Send a test e-mail (superuser)
    TestEmail { email: String },
    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage items
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Manage sensor data
    Sensors {
        #[command(subcommand)]
        command: SensorCommands,
    },
    /// Per-equipment averages over a time window
    Dashboard(DashboardArgs),
    /// Hour-by-hour averages of every equipment over the last day
    Hourly,
    /// List equipment ids with data
    Equipment,
    /// Import sensor data from a CSV file (superuser)
    Upload { file: Option<PathBuf> },
}

#[derive(Subcommand)]
enum UserCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        superuser: bool,
        #[arg(long)]
        inactive: bool,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        superuser: Option<bool>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: Uuid,
    },
    /// Create an account without logging in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
    },
    UpdateMe {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    UpdatePassword {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: Option<String>,
    },
    DeleteMe,
}

#[derive(Subcommand)]
enum ItemCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum SensorCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        id: Uuid,
    },
    /// Every record of one equipment
    ByEquipment {
        equipment_id: String,
    },
    Add {
        #[arg(long)]
        equipment_id: String,
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
        /// Defaults to now (UTC)
        #[arg(long, value_parser = forms::parse_datetime)]
        timestamp: Option<NaiveDateTime>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        equipment_id: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        value: Option<f64>,
        #[arg(long, value_parser = forms::parse_datetime)]
        timestamp: Option<NaiveDateTime>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args)]
struct DashboardArgs {
    /// 24h, 48h, week, month, custom or all
    #[arg(long, default_value = "24h")]
    mode: FetchMode,
    /// Start of a custom range
    #[arg(long, value_parser = forms::parse_datetime)]
    from: Option<NaiveDateTime>,
    /// End of a custom range
    #[arg(long, value_parser = forms::parse_datetime)]
    to: Option<NaiveDateTime>,
    /// Comma separated equipment ids
    #[arg(long)]
    equipment: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Keep the dashboard open and edit the filter from stdin
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let app = App::new(config).await?;

    match cli.command {
        Commands::Login { email, password } => app.login(email, password).await,
        Commands::Logout => {
            app.session.clear().await?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Me => {
            let user = app.current_user().await.map_err(api_error)?;
            print!("{}", views::home::render(&user));
            Ok(())
        }
        Commands::PasswordRecovery { email } => {
            let msg = app
                .client
                .login()
                .recover_password(&email)
                .await
                .map_err(api_error)?;
            println!("{}", msg.message);
            Ok(())
        }
        Commands::ResetPassword {
            token,
            new_password,
        } => {
            if new_password.chars().count() < forms::MIN_PASSWORD_LEN {
                bail!("Password must be at least 8 characters");
            }
            let msg = app
                .client
                .login()
                .reset_password(&NewPassword {
                    token,
                    new_password,
                })
                .await
                .map_err(api_error)?;
            println!("{}", msg.message);
            Ok(())
        }
        Commands::RecoveryHtml { email } => {
            let html = app
                .client
                .login()
                .recover_password_html_content(&email)
                .await
                .map_err(api_error)?;
            println!("{html}");
            Ok(())
        }
        Commands::TestEmail { email } => {
            let msg = app
                .client
                .utils()
                .test_email(&email)
                .await
                .map_err(api_error)?;
            println!("{}", msg.message);
            Ok(())
        }
        Commands::Users { command } => app.users(command).await,
        Commands::Items { command } => app.items(command).await,
        Commands::Sensors { command } => app.sensors(command).await,
        Commands::Dashboard(args) => app.dashboard(args).await,
        Commands::Hourly => {
            let controller = app.dashboard_controller();
            let chart = controller.hourly_averages().await.map_err(api_error)?;
            print!("{}", views::dashboard::render_hourly(&chart));
            Ok(())
        }
        Commands::Equipment => {
            let controller = app.dashboard_controller();
            let options = controller.equipment_options().await.map_err(api_error)?;
            print!("{}", views::dashboard::render_options(&options));
            Ok(())
        }
        Commands::Upload { file } => {
            let outcome = csv_import::import_file(&app.client, &app.cache, file.as_deref()).await;
            print!("{}", views::upload::render(Some(&outcome.toast)));
            if outcome.toast.is_error() {
                bail!("import failed");
            }
            Ok(())
        }
    }
}

/// Keeps the backend's own message as the top-level error text.
fn api_error(e: ApiError) -> anyhow::Error {
    let detail = e.detail();
    anyhow::Error::new(e).context(detail)
}

fn finish<T>(outcome: MutationOutcome<T>) -> Result<T> {
    match outcome.result {
        Ok(value) => {
            println!("{}", outcome.toast);
            Ok(value)
        }
        Err(e) => {
            eprintln!("{}", outcome.toast);
            Err(anyhow::Error::new(e))
        }
    }
}

struct App {
    config: Config,
    client: ApiClient,
    cache: QueryCache,
    session: TokenStore,
}

impl App {
    async fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config).context("building API client")?;
        let session = TokenStore::new(config.token_file.clone());
        if config.api_token.is_none() {
            if let Some(token) = session.load().await {
                client.set_token(Some(token)).await;
            }
        }
        let cache = QueryCache::new(config.query_stale_time());
        info!(base_url = %client.base_url(), "Client ready");

        Ok(Self {
            config,
            client,
            cache,
            session,
        })
    }

    fn page_size(&self) -> u64 {
        self.config.page_size as u64
    }

    fn pager(&self, page: u32) -> Pager {
        Pager::from_page_number(page, self.page_size())
    }

    async fn current_user(&self) -> Result<UserPublic, ApiError> {
        let client = self.client.clone();
        self.cache
            .fetch_query(&keys::current_user(), || async move {
                client.users().read_user_me().await
            })
            .await
    }

    async fn login(&self, email: String, password: String) -> Result<()> {
        let form = LoginForm {
            username: email,
            password,
        };
        let token = self
            .client
            .login()
            .login_access_token(&form)
            .await
            .map_err(api_error)?;
        self.session.save(&token).await?;
        self.client.set_token(Some(token.access_token)).await;

        let user = self.current_user().await.map_err(api_error)?;
        print!("{}", views::home::render(&user));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    async fn users(&self, command: UserCommands) -> Result<()> {
        let users = self.client.users();
        match command {
            UserCommands::List { page } => {
                let pager = self.pager(page);
                let client = self.client.clone();
                let list = load_page(
                    &self.cache,
                    keys::users_page,
                    pager,
                    false,
                    move |p: Pager| {
                        let client = client.clone();
                        async move { client.users().read_users(p.skip(), p.limit()).await }
                    },
                )
                .await
                .map_err(api_error)?;
                let me = self.current_user().await.ok().map(|u| u.id);
                print!("{}", views::users::render(&list, &pager, me));
            }
            UserCommands::Show { id } => {
                let user = users.read_user_by_id(id).await.map_err(api_error)?;
                print!("{}", views::users::render_user(&user));
            }
            UserCommands::Create {
                email,
                password,
                confirm_password,
                full_name,
                superuser,
                inactive,
            } => {
                let body = UserForm {
                    email,
                    full_name,
                    confirm_password: Some(confirm_password.unwrap_or_else(|| password.clone())),
                    password: Some(password),
                    is_superuser: superuser,
                    is_active: !inactive,
                }
                .into_create()?;
                let user = finish(
                    mutate(&self.cache, MutationOptions::user_created(), users.create_user(&body))
                        .await,
                )?;
                print!("{}", views::users::render_user(&user));
            }
            UserCommands::Update {
                id,
                email,
                full_name,
                password,
                confirm_password,
                superuser,
                active,
            } => {
                let current = users.read_user_by_id(id).await.map_err(api_error)?;
                let confirm_password = confirm_password.or_else(|| password.clone());
                let body = UserForm {
                    email: email.unwrap_or(current.email),
                    full_name: full_name.or(current.full_name),
                    password,
                    confirm_password,
                    is_superuser: superuser.unwrap_or(current.is_superuser),
                    is_active: active.unwrap_or(current.is_active),
                }
                .into_update()?;
                let user = finish(
                    mutate(
                        &self.cache,
                        MutationOptions::user_updated(),
                        users.update_user(id, &body),
                    )
                    .await,
                )?;
                print!("{}", views::users::render_user(&user));
            }
            UserCommands::Delete { id } => {
                finish(
                    mutate(&self.cache, MutationOptions::user_deleted(), users.delete_user(id))
                        .await,
                )?;
            }
            UserCommands::Signup {
                email,
                password,
                confirm_password,
                full_name,
            } => {
                let body = UserForm {
                    email,
                    full_name,
                    confirm_password: Some(confirm_password.unwrap_or_else(|| password.clone())),
                    password: Some(password),
                    is_superuser: false,
                    is_active: true,
                }
                .into_register()?;
                let user = finish(
                    mutate(&self.cache, MutationOptions::user_created(), users.register_user(&body))
                        .await,
                )?;
                print!("{}", views::users::render_user(&user));
            }
            UserCommands::UpdateMe { full_name, email } => {
                let body = ProfileForm { full_name, email }.into_update()?;
                let user = finish(
                    mutate(
                        &self.cache,
                        MutationOptions::profile_updated(),
                        users.update_user_me(&body),
                    )
                    .await,
                )?;
                print!("{}", views::users::render_user(&user));
            }
            UserCommands::UpdatePassword {
                current_password,
                new_password,
                confirm_password,
            } => {
                let body = ChangePasswordForm {
                    current_password,
                    confirm_password: confirm_password.unwrap_or_else(|| new_password.clone()),
                    new_password,
                }
                .into_update()?;
                finish(
                    mutate(
                        &self.cache,
                        MutationOptions::password_updated(),
                        users.update_password_me(&body),
                    )
                    .await,
                )?;
            }
            UserCommands::DeleteMe => {
                finish(
                    mutate(
                        &self.cache,
                        MutationOptions::account_deleted(),
                        users.delete_user_me(),
                    )
                    .await,
                )?;
                self.session.clear().await?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    async fn items(&self, command: ItemCommands) -> Result<()> {
        let items = self.client.items();
        match command {
            ItemCommands::List { page } => {
                let pager = self.pager(page);
                let client = self.client.clone();
                let list = load_page(
                    &self.cache,
                    keys::items_page,
                    pager,
                    false,
                    move |p: Pager| {
                        let client = client.clone();
                        async move { client.items().read_items(p.skip(), p.limit()).await }
                    },
                )
                .await
                .map_err(api_error)?;
                print!("{}", views::items::render(&list, &pager));
            }
            ItemCommands::Show { id } => {
                let item = items.read_item(id).await.map_err(api_error)?;
                println!("{}  {}", item.id, item.title);
                if let Some(description) = item.description {
                    println!("{description}");
                }
            }
            ItemCommands::Create { title, description } => {
                let body = ItemForm { title, description }.into_create()?;
                let item = finish(
                    mutate(&self.cache, MutationOptions::item_created(), items.create_item(&body))
                        .await,
                )?;
                println!("{}", item.id);
            }
            ItemCommands::Update {
                id,
                title,
                description,
            } => {
                let current = items.read_item(id).await.map_err(api_error)?;
                let body = ItemForm {
                    title: title.unwrap_or(current.title),
                    description: description.or(current.description),
                }
                .into_update()?;
                finish(
                    mutate(
                        &self.cache,
                        MutationOptions::item_updated(),
                        items.update_item(id, &body),
                    )
                    .await,
                )?;
            }
            ItemCommands::Delete { id } => {
                finish(
                    mutate(&self.cache, MutationOptions::item_deleted(), items.delete_item(id))
                        .await,
                )?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sensor data
    // -----------------------------------------------------------------------

    async fn sensors(&self, command: SensorCommands) -> Result<()> {
        let sensors = self.client.sensor_data();
        match command {
            SensorCommands::List { page } => {
                let pager = self.pager(page);
                let client = self.client.clone();
                let list = load_page(
                    &self.cache,
                    keys::sensors_page,
                    pager,
                    false,
                    move |p: Pager| {
                        let client = client.clone();
                        async move {
                            client
                                .sensor_data()
                                .read_sensors_data(p.skip(), p.limit())
                                .await
                        }
                    },
                )
                .await
                .map_err(api_error)?;
                print!("{}", views::sensors::render(&list, &pager, false));
            }
            SensorCommands::Show { id } => {
                let record = sensors.read_sensor_data(id).await.map_err(api_error)?;
                print!("{}", views::sensors::render_record(&record));
            }
            SensorCommands::ByEquipment { equipment_id } => {
                let list = sensors
                    .read_sensor_data_by_equipment(&equipment_id)
                    .await
                    .map_err(api_error)?;
                print!("{}", views::sensors::render_all(&list));
            }
            SensorCommands::Add {
                equipment_id,
                value,
                timestamp,
            } => {
                let body = SensorDataForm {
                    equipment_id,
                    value,
                    timestamp,
                }
                .into_body(Utc::now().naive_utc())?;
                let record = finish(
                    mutate(
                        &self.cache,
                        MutationOptions::sensor_created(),
                        sensors.create_sensor_data(&body),
                    )
                    .await,
                )?;
                print!("{}", views::sensors::render_record(&record));
            }
            SensorCommands::Edit {
                id,
                equipment_id,
                value,
                timestamp,
            } => {
                let current = sensors.read_sensor_data(id).await.map_err(api_error)?;
                let body = SensorDataForm {
                    equipment_id: equipment_id.unwrap_or(current.equipment_id),
                    value: value.unwrap_or(current.value),
                    timestamp: Some(timestamp.unwrap_or(current.timestamp)),
                }
                .into_body(Utc::now().naive_utc())?;
                let record = finish(
                    mutate(
                        &self.cache,
                        MutationOptions::sensor_updated(),
                        sensors.update_sensor_data(id, &body),
                    )
                    .await,
                )?;
                print!("{}", views::sensors::render_record(&record));
            }
            SensorCommands::Delete { id } => {
                finish(
                    mutate(
                        &self.cache,
                        MutationOptions::sensor_deleted(),
                        sensors.delete_sensor_data(id),
                    )
                    .await,
                )?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    fn dashboard_controller(&self) -> DashboardController {
        DashboardController::new(
            self.client.clone(),
            self.cache.clone(),
            self.page_size(),
            self.config.prefetch_debounce(),
        )
    }

    async fn dashboard(&self, args: DashboardArgs) -> Result<()> {
        let controller = self.dashboard_controller();
        controller.set_filter(DashboardFilter {
            fetch_mode: args.mode,
            begin_custom_date: args.from,
            end_custom_date: args.to,
            equipment_ids: args
                .equipment
                .as_deref()
                .map(config::parse_equipment_ids)
                .unwrap_or_default(),
            page: args.page.saturating_sub(1),
        });

        let view = show_dashboard(&controller).await?;
        if args.interactive {
            interactive_dashboard(&controller, view).await?;
        }
        Ok(())
    }
}

async fn show_dashboard(controller: &DashboardController) -> Result<DashboardView> {
    let view = controller.load().await?;
    print!("{}", views::dashboard::render(&view));
    Ok(view)
}

const DASHBOARD_HELP: &str = "\
Commands:
  next | prev                 change page
  mode <24h|48h|week|month|custom|all>
  from <datetime> | to [<datetime>]
  equipment [<id,id,...>]     empty selects all
  options                     list equipment ids
  hourly                      hourly averages of the last day
  show                        load the current filter
  quit

Filter edits show cached or previous results; the current filter is
fetched in the background once edits pause.";

async fn interactive_dashboard(
    controller: &DashboardController,
    mut last: DashboardView,
) -> Result<()> {
    println!("{DASHBOARD_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        // Paging and explicit reloads fetch now; filter edits are left to the
        // background prefetch.
        let reload = matches!(command, "" | "show" | "next" | "prev");

        match command {
            "" | "show" => {}
            "next" if last.has_next_page() => controller.next_page(),
            "next" => {
                println!("No next page.");
                continue;
            }
            "prev" if last.has_previous_page() => controller.previous_page(),
            "prev" => {
                println!("No previous page.");
                continue;
            }
            "mode" => match arg.parse::<FetchMode>() {
                Ok(mode) => controller.update(|f| f.fetch_mode = mode),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            "from" => match forms::parse_datetime(arg) {
                Ok(start) => controller.update(|f| f.begin_custom_date = Some(start)),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            "to" if arg.is_empty() => controller.update(|f| f.end_custom_date = None),
            "to" => match forms::parse_datetime(arg) {
                Ok(end) => controller.update(|f| f.end_custom_date = Some(end)),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            "equipment" => {
                let ids = config::parse_equipment_ids(arg);
                controller.update(|f| f.equipment_ids = ids);
            }
            "options" => {
                match controller.equipment_options().await {
                    Ok(options) => print!("{}", views::dashboard::render_options(&options)),
                    Err(e) => eprintln!("{}", e.detail()),
                }
                continue;
            }
            "hourly" => {
                match controller.hourly_averages().await {
                    Ok(chart) => print!("{}", views::dashboard::render_hourly(&chart)),
                    Err(e) => eprintln!("{}", e.detail()),
                }
                continue;
            }
            "quit" | "exit" => break,
            "help" => {
                println!("{DASHBOARD_HELP}");
                continue;
            }
            other => {
                println!("Unknown command {other:?}; type help.");
                continue;
            }
        }

        if !reload {
            if let Some(view) = controller.snapshot().await {
                print!("{}", views::dashboard::render(&view));
                if view.is_placeholder {
                    println!("Press enter to load the new filter.");
                } else {
                    last = view;
                }
                continue;
            }
        }

        match show_dashboard(controller).await {
            Ok(view) => last = view,
            Err(e) => {
                eprintln!("{e:#}");
                if let Some(stale) = controller.snapshot().await.filter(|v| v.is_placeholder) {
                    print!("{}", views::dashboard::render(&stale));
                }
            }
        }
    }
    Ok(())
}

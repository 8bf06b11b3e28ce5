use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;
use trimify::{
    app::App,
    cli, config, error,
    types::{PasswordChange, ProfileUpdate},
};

#[derive(Parser, Debug)]
#[command(
    name = "trimify",
    version,
    about = "Shorten URLs, manage them and inspect their analytics from the terminal.",
    propagate_version = true
)]
pub struct Cli {
    /// Print diagnostic logs (request pipeline, session changes) to stderr
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Keep the session in memory only; nothing is written to disk
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn command_for_update() -> clap::Command {
        <Self as CommandFactory>::command()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login(LoginOptions),
    /// Create a new account
    Register(RegisterOptions),
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Create a short URL
    Shorten(ShortenOptions),
    /// List and manage your short URLs
    Urls(UrlsOptions),
    /// Save the QR code of a short URL as PNG
    Qr(QrOptions),
    /// Open a short URL in the browser
    Open(CodeOption),
    /// Account-wide statistics
    Stats,
    /// Click analytics for one short URL
    Analytics(CodeOption),
    /// Show and manage your profile
    Profile(ProfileOptions),
    /// Generate shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    #[clap(long)]
    email: String,
    /// Password; set TRIMIFY_PASSWORD rather than passing it on the command line
    #[clap(long, env = "TRIMIFY_PASSWORD", hide = true, hide_env_values = true)]
    password: Option<String>,
    /// Read the password from the first line of stdin
    #[clap(long, action = ArgAction::SetTrue)]
    password_stdin: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RegisterOptions {
    #[clap(long)]
    username: String,
    #[clap(long)]
    email: String,
    #[clap(long)]
    password: String,
    #[clap(long)]
    confirm_password: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ShortenOptions {
    /// The long URL to shorten
    url: String,
    /// Custom short code instead of a generated one
    #[clap(long = "code")]
    custom_code: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct UrlsOptions {
    #[command(subcommand)]
    command: Option<UrlsSubcommand>,

    /// Only list URLs whose code or target contains this text
    #[clap(long)]
    search: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UrlsSubcommand {
    /// Show one short URL
    Show(CodeOption),
    /// Change the target URL and/or the short code
    Edit(EditOptions),
    /// Delete one or more short URLs
    Delete(CodesOption),
    /// Activate/deactivate one or more short URLs
    Toggle(CodesOption),
}

#[derive(Parser, Debug, Clone)]
pub struct EditOptions {
    short_code: String,
    #[clap(long)]
    url: Option<String>,
    #[clap(long = "code")]
    new_code: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CodeOption {
    short_code: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CodesOption {
    #[clap(required = true, num_args = 1..)]
    short_codes: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct QrOptions {
    short_code: String,
    /// Output file (defaults to qrcode-<code>.png)
    #[clap(long, short)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ProfileOptions {
    #[command(subcommand)]
    command: Option<ProfileSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileSubcommand {
    /// Change username, email or bio
    Update(ProfileUpdateOptions),
    /// Change the account password
    Password(PasswordOptions),
    /// Upload a new avatar image
    Avatar(AvatarOptions),
    /// Delete the account
    Delete(DeleteOptions),
}

#[derive(Parser, Debug, Clone)]
pub struct ProfileUpdateOptions {
    #[clap(long)]
    username: Option<String>,
    #[clap(long)]
    email: Option<String>,
    #[clap(long)]
    bio: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PasswordOptions {
    #[clap(long)]
    current_password: String,
    #[clap(long)]
    new_password: String,
    #[clap(long)]
    confirm_password: String,
}

#[derive(Parser, Debug, Clone)]
pub struct AvatarOptions {
    path: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteOptions {
    /// Confirm the deletion
    #[clap(long)]
    yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("trimify=debug")
    } else {
        EnvFilter::try_new(config::log_filter())
            .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let built = if cli.ephemeral {
        App::ephemeral()
    } else {
        App::from_config()
    };
    let app = match built {
        Ok(app) => app,
        Err(e) => error!("Cannot open session store. Err: {}", e),
    };

    match cli.command {
        Command::Login(opt) => {
            let password = if opt.password_stdin {
                cli::auth::password_from_stdin().await
            } else if let Some(password) = opt.password {
                password
            } else {
                error!("No password given. Set TRIMIFY_PASSWORD or pipe it in with --password-stdin.")
            };
            cli::auth::login(&app, opt.email, password).await
        }
        Command::Register(opt) => {
            cli::auth::register(
                &app,
                opt.username,
                opt.email,
                opt.password,
                opt.confirm_password,
            )
            .await
        }
        Command::Logout => cli::auth::logout(&app),
        Command::Whoami => cli::auth::whoami(&app),
        Command::Shorten(opt) => cli::urls::shorten(&app, opt.url, opt.custom_code).await,
        Command::Urls(opt) => match opt.command {
            Some(UrlsSubcommand::Show(c)) => cli::urls::show(&app, c.short_code).await,
            Some(UrlsSubcommand::Edit(e)) => {
                cli::urls::edit(&app, e.short_code, e.url, e.new_code).await
            }
            Some(UrlsSubcommand::Delete(c)) => cli::urls::delete(&app, c.short_codes).await,
            Some(UrlsSubcommand::Toggle(c)) => cli::urls::toggle(&app, c.short_codes).await,
            None => cli::urls::list(&app, opt.search).await,
        },
        Command::Qr(opt) => cli::urls::qr(&app, opt.short_code, opt.output).await,
        Command::Open(opt) => cli::urls::open(&app, opt.short_code).await,
        Command::Stats => cli::analytics::stats(&app).await,
        Command::Analytics(opt) => cli::analytics::analytics(&app, opt.short_code).await,
        Command::Profile(opt) => match opt.command {
            Some(ProfileSubcommand::Update(u)) => {
                let update = ProfileUpdate {
                    username: u.username,
                    email: u.email,
                    bio: u.bio,
                };
                cli::profile::update(&app, update).await
            }
            Some(ProfileSubcommand::Password(p)) => {
                let change = PasswordChange {
                    current_password: p.current_password,
                    new_password: p.new_password,
                    confirm_password: p.confirm_password,
                };
                cli::profile::change_password(&app, change).await
            }
            Some(ProfileSubcommand::Avatar(a)) => cli::profile::avatar(&app, a.path).await,
            Some(ProfileSubcommand::Delete(d)) => cli::profile::delete(&app, d.yes).await,
            None => cli::profile::show(&app).await,
        },
        Command::Completions(_) => {}
    }
}

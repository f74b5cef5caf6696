//! stratus CLI binary entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use stratus_actor::Actor;
use stratus_login::CredentialResolver;
use stratus_session::SessionStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use stratus_cli::cli::{Cli, Commands};
use stratus_cli::commands::{BuildpackCommand, ServiceBrokerCommand, SessionCommand};
use stratus_cli::output::{OutputFormat, write_error};
use stratus_cli::{CliError, Settings, TerminalPrompter};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and succeed; parse errors exit 1.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let result = runtime.block_on(async {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });
        tokio::select! {
            biased;
            result = run(cli, cancel.clone()) => result,
            () = cancel.cancelled() => Err(CliError::Cancelled),
        }
    });
    // A prompt may still be blocked on stdin.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut stderr = io::stderr().lock();
            if write_error(&mut stderr, &e).is_err() {
                eprintln!("{e}");
            }
            let _ = stderr.flush();
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    let settings = Settings::from_cli(&cli);
    let format = OutputFormat::new(cli.format);
    let store = settings.session_store()?;
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    match cli.command {
        Commands::Login(args) => {
            let mut cmd = session_command(&settings, store, cancel)?;
            cmd.login(&mut stdout, &mut stderr, &format, &args).await?;
        }
        Commands::Auth(args) => {
            let mut cmd = session_command(&settings, store, cancel)?;
            cmd.auth(&mut stdout, &mut stderr, &format, &args).await?;
        }
        Commands::Logout => {
            let cmd = session_command(&settings, store, cancel)?;
            cmd.logout(&mut stdout, &format)?;
        }
        Commands::Api(args) => {
            let mut cmd = session_command(&settings, store, cancel)?;
            cmd.api(&mut stdout, &mut stderr, &format, &args).await?;
        }
        Commands::Target(args) => {
            let mut cmd = session_command(&settings, store, cancel)?;
            cmd.target(&mut stdout, &mut stderr, &format, &args).await?;
        }
        Commands::CreateServiceBroker(args) => {
            let session = store.read()?;
            let client = settings.authenticated_client(&session)?;
            let cmd = ServiceBrokerCommand::new(Actor::new(client));
            cmd.create(&mut stdout, &mut stderr, &format, &args, &session)
                .await?;
        }
        Commands::ServiceBrokers => {
            let session = store.read()?;
            let cmd = ServiceBrokerCommand::new(Actor::new(settings.authenticated_client(&session)?));
            cmd.list(&mut stdout, &mut stderr, &format).await?;
        }
        Commands::ServiceBroker { name } => {
            let session = store.read()?;
            let cmd = ServiceBrokerCommand::new(Actor::new(settings.authenticated_client(&session)?));
            cmd.show(&mut stdout, &mut stderr, &format, &name).await?;
        }
        Commands::CreateBuildpack(args) => {
            let session = store.read()?;
            let cmd = BuildpackCommand::new(Actor::new(settings.authenticated_client(&session)?));
            cmd.create(&mut stdout, &mut stderr, &format, &args).await?;
        }
        Commands::Buildpacks => {
            let session = store.read()?;
            let cmd = BuildpackCommand::new(Actor::new(settings.authenticated_client(&session)?));
            cmd.list(&mut stdout, &mut stderr, &format).await?;
        }
    }

    Ok(())
}

fn session_command<S: SessionStore>(
    settings: &Settings,
    store: S,
    cancel: CancellationToken,
) -> Result<SessionCommand<stratus_api::HttpClient, S, TerminalPrompter>, CliError> {
    let resolver = CredentialResolver::new(settings.client()?, store, TerminalPrompter::new(), cancel);
    Ok(SessionCommand::new(resolver))
}

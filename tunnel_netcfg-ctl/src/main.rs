use exitcode::ExitCode;
use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;

use std::process;

use tunnel_netcfg_lib::config::{self, Config};
use tunnel_netcfg_lib::platform;
use tunnel_netcfg_lib::runner::ProcessRunner;
use tunnel_netcfg_lib::tools::SearchPath;
use tunnel_netcfg_lib::{Error, NetworkController, Request, RouteOutcome, logging};

mod cli;

#[tokio::main]
async fn main() {
    let args = cli::parse();
    let exit = match run(args).await {
        Ok(()) => exitcode::OK,
        Err(code) => code,
    };
    process::exit(exit);
}

async fn run(args: cli::Cli) -> Result<(), ExitCode> {
    match &args.log_file {
        Some(path) => logging::setup_log_file(path).map_err(|e| {
            eprintln!("Error opening log file {}: {}", path.display(), e);
            exitcode::CANTCREAT
        })?,
        None => logging::setup_stderr(),
    }

    let mut config = load_config(&args).await?;
    if args.timeout.is_some() {
        config.timeout = args.timeout;
    }

    let request: Request = args.command.into();

    if args.dry_run {
        return dry_run(&request, args.platform, &config);
    }

    let cancel = CancellationToken::new();
    let ctrlc_cancel = cancel.clone();
    tokio::spawn(async move {
        if ctrl_c().await.is_ok() {
            tracing::debug!("received ctrl-c");
            ctrlc_cancel.cancel();
        }
    });

    let controller = NetworkController::detect(&config)
        .map_err(report)?
        .with_cancellation(cancel);

    execute(&controller, request).await.map_err(report)
}

async fn load_config(args: &cli::Cli) -> Result<Config, ExitCode> {
    match config::read(&args.config_path).await {
        Ok(config) => Ok(config),
        Err(config::Error::NoFile) if args.config_path.as_os_str() == config::DEFAULT_PATH => {
            tracing::debug!("no configuration file, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            tracing::error!(error = %e, path = %args.config_path.display(), "error reading configuration");
            eprintln!("Error reading {}: {}", args.config_path.display(), e);
            Err(exitcode::CONFIG)
        }
    }
}

fn dry_run(request: &Request, platform: Option<platform::PlatformKind>, config: &Config) -> Result<(), ExitCode> {
    let strategy = match platform {
        Some(kind) => platform::for_kind(kind, config),
        None => platform::detect(config).map_err(report)?,
    };
    let controller = NetworkController::new(strategy, ProcessRunner, SearchPath);
    let plan = controller.plan(request).map_err(report)?;
    for planned in plan.steps() {
        println!("[{}] {}", planned.step, planned.command);
    }
    Ok(())
}

async fn execute(controller: &NetworkController, request: Request) -> Result<(), Error> {
    match request {
        Request::SetDns { interface, address } => {
            controller.set_dns(&interface, address).await?;
            println!("DNS for {} set to {}", interface, address);
        }
        Request::FlushDns => {
            controller.flush_dns().await?;
            println!("DNS cache flushed");
        }
        Request::ResetDns { interface } => {
            controller.reset_dns(&interface).await?;
            println!("DNS for {} reset", interface);
        }
        Request::QueryDefaultGateway => println!("{}", controller.default_gateway().await?),
        Request::QueryDefaultInterface => println!("{}", controller.default_interface().await?),
        Request::AddDefaultRoute { gateway } => {
            let outcome = controller.add_default_route(gateway).await?;
            print_route_outcome(&format!("default via {}", gateway), outcome);
        }
        Request::AddFullTunnelRoute(route) => {
            let outcome = controller.add_full_tunnel_route(&route).await?;
            print_route_outcome(&route.to_string(), outcome);
        }
        Request::DeleteFullTunnelRoute(route) => {
            controller.delete_full_tunnel_route(&route).await?;
            println!("Route {} deleted", route);
        }
    }
    Ok(())
}

fn print_route_outcome(route: &str, outcome: RouteOutcome) {
    match outcome {
        RouteOutcome::Added => println!("Route {} added", route),
        RouteOutcome::AlreadyPresent => println!("Route {} already present", route),
    }
}

fn report(err: Error) -> ExitCode {
    eprintln!("Error: {}", err);
    exit_code(&err)
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::UnsupportedPlatform(_)
        | Error::UnsupportedOperation { .. }
        | Error::UnsupportedAddressFamily { .. }
        | Error::NoToolFound { .. } => exitcode::UNAVAILABLE,
        Error::Precondition(_) => exitcode::USAGE,
        Error::Spawn { .. } => exitcode::OSERR,
        Error::Timeout { .. } | Error::Cancelled { .. } => exitcode::TEMPFAIL,
        Error::CommandFailed { .. } | Error::PartialFailure { .. } => exitcode::SOFTWARE,
        Error::EmptyOutput { .. } | Error::InvalidAddress { .. } => exitcode::PROTOCOL,
    }
}

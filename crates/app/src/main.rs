mod config;

use env_logger::Env;
use services::{AppServices, Clock};

use crate::config::{Args, Command, prepare_sqlite_file, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let command = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;

    let args = match command {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Serve(args) => args,
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::default(), args.policy).await?;
    let app = server::create_router(services);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    log::info!("quiz server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("quiz server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        log::error!("{err}");
        std::process::exit(2);
    }
}

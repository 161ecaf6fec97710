use anyhow::anyhow;
use axum::serve;
use futures::TryFutureExt;
use log::{error, info};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use swellscope::{
    app, build_app_state, get_config_info, get_log_level, setup_logger, Collector, Database,
    OpenMeteoClient, Scheduler, Site, StormglassClient, SITE_UTC_OFFSET, SOURCE_OPEN_METEO,
};
use swellscope_core::create_dir_all;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = get_config_info();
    let log_level = get_log_level(&cli);

    setup_logger()
        .level(log_level)
        .level_for("swellscope", log_level)
        .level_for("http_response", log_level)
        .level_for("http_request", log_level)
        .apply()?;

    let data_dir = cli.data_dir();
    let host = cli.host();
    let port = cli.port();
    let remote_url = cli.remote_url();
    let location = cli.location();
    let site = Site {
        latitude: cli.latitude(),
        longitude: cli.longitude(),
    };

    create_dir_all(&data_dir)?;

    let socket_addr = SocketAddr::from_str(&format!("{}:{}", host, port))
        .map_err(|e| anyhow!("invalid address: {}", e))?;

    let listener = TcpListener::bind(socket_addr)
        .map_err(|e| anyhow!("error binding to socket: {}", e))
        .await?;

    info!("SwellScope starting...");
    info!("  Listen: http://{}", socket_addr);
    info!("  Docs:   http://{}/docs", socket_addr);
    info!("  Data dir: {}", data_dir);
    info!("  Site: {} ({}, {})", location, site.latitude, site.longitude);

    let db = Arc::new(Database::new(&data_dir).await.map_err(|e| {
        error!("error setting up SQLite database: {}", e);
        anyhow!("{}", e)
    })?);

    let provider = Arc::new(OpenMeteoClient::new()?);
    let tides = Arc::new(StormglassClient::new(cli.stormglass_key())?);

    let collector = Arc::new(Collector::new(
        db.clone(),
        provider,
        site,
        SOURCE_OPEN_METEO,
        &location,
    ));

    // First cycle runs inside the scheduler task so a slow provider never
    // delays the listener
    let scheduler = Scheduler::new(collector, cli.collect_hour(), SITE_UTC_OFFSET);
    let cancel = CancellationToken::new();
    let scheduler_handle = tokio::spawn(scheduler.run(cancel.clone()));

    let app_state = build_app_state(remote_url, db.clone(), tides, site, location);
    let app = app(app_state);

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cancel.cancel();
    if let Err(e) = scheduler_handle.await {
        error!("scheduler task failed to join: {}", e);
    }
    db.checkpoint().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

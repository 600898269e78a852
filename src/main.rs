use std::{process, sync::Arc};

use folio::{
    application::{
        access::AccessGate,
        error::AppError,
        migrate::migrate_posts,
        posts::PostService,
        projects::ProjectFeed,
        render::render_service,
        repos::PostsRepo,
    },
    config::{self, Command, Settings, StorageBackend},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        github::GitHubClient,
        http::{self, HttpState},
        store::FileStore,
        telemetry,
    },
    presentation::views::SiteView,
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        report_application_error(&err);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    match cli_args.resolved_command() {
        Command::Serve(_) => run_serve(settings).await,
        Command::MigratePosts(_) => run_migrate_posts(settings).await,
    }
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let store = init_store(&settings).await?;
    let state = build_http_state(&settings, store)?;
    serve_http(&settings, state).await
}

/// Copy every markdown post into Postgres, leaving existing slugs alone.
async fn run_migrate_posts(settings: Settings) -> Result<(), AppError> {
    let source = FileStore::new(&settings.storage.posts_dir, settings.site.author.clone());
    let target = connect_postgres(&settings).await?;

    let summary = migrate_posts(&source, &target).await?;
    info!(
        target = "folio::migrate",
        posts_dir = %settings.storage.posts_dir.display(),
        migrated = summary.migrated,
        skipped = summary.skipped,
        total = summary.total,
        "post migration finished"
    );
    Ok(())
}

async fn init_store(settings: &Settings) -> Result<Arc<dyn PostsRepo>, AppError> {
    match settings.storage.backend {
        StorageBackend::Files => {
            info!(
                target = "folio::storage",
                posts_dir = %settings.storage.posts_dir.display(),
                "using file-backed post store"
            );
            Ok(Arc::new(FileStore::new(
                &settings.storage.posts_dir,
                settings.site.author.clone(),
            )))
        }
        StorageBackend::Postgres => {
            info!(target = "folio::storage", "using postgres post store");
            Ok(Arc::new(connect_postgres(settings).await?))
        }
    }
}

async fn connect_postgres(settings: &Settings) -> Result<PostgresRepositories, AppError> {
    let database_url = settings
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.storage.max_connections.get())
            .await
            .map_err(InfraError::from)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    Ok(PostgresRepositories::new(pool))
}

fn build_http_state(settings: &Settings, store: Arc<dyn PostsRepo>) -> Result<HttpState, AppError> {
    let password = settings
        .admin
        .password
        .clone()
        .ok_or_else(|| InfraError::configuration("admin password is not configured"))?;

    let github = GitHubClient::new(
        settings.projects.api_base.as_str(),
        settings.projects.token.clone(),
    )
    .map_err(|err| AppError::unexpected(format!("failed to build GitHub client: {err}")))?;

    Ok(HttpState {
        posts: Arc::new(PostService::new(store.clone(), settings.site.author.clone())),
        store,
        renderer: render_service(),
        projects: Arc::new(ProjectFeed::new(
            Arc::new(github),
            settings.projects.github_user.clone(),
            settings.projects.limit,
        )),
        gate: Arc::new(AccessGate::new(password)),
        site: Arc::new(SiteView {
            title: settings.site.title.clone(),
            author: settings.site.author.clone(),
        }),
    })
}

async fn serve_http(settings: &Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "folio::http",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "folio::http", "server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(
                    target = "folio::http",
                    error = %err,
                    "failed to register signal handlers, falling back to ctrl-c"
                );
            }
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = "folio::http", error = %err, "ctrl-c handler failed");
    }
}

use std::{process, sync::Arc, time::Duration};

use sqlx::PgPool;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use vetrina::{
    application::{
        admin::{
            announcements::AdminAnnouncementService,
            auth::{AdminAuthService, Credentials},
            blog::AdminBlogService,
            carousel::AdminCarouselService,
            categories::AdminCategoryService,
            dashboard::AdminDashboardService,
            products::AdminProductService,
            settings::AdminSettingsService,
            uploads::{AdminUploadService, UploadSigner},
        },
        contact::ContactService,
        error::AppError,
        repos::{
            AnnouncementsRepo, BlogRepo, CarouselRepo, CategoriesRepo, ContactRepo, HealthRepo,
            ProductsRepo, SettingsRepo,
        },
        storefront::{StorefrontRepos, StorefrontService},
    },
    cache::{
        CacheConfig, CacheConsumer, CacheState, CacheTrigger, EventQueue, ResponseStore,
        Revalidator,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminServices, HttpState},
        object_store::S3Presigner,
        revalidation::HttpRevalidator,
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
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

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::InitSettings(_) => run_init_settings(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    connect_and_migrate(&settings).await?;
    info!(target = "vetrina::migrate", "Migrations applied");
    Ok(())
}

async fn run_init_settings(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_and_migrate(&settings).await?;
    let repositories = Arc::new(PostgresRepositories::new(pool));
    let settings_repo: Arc<dyn SettingsRepo> = repositories;
    let service = AdminSettingsService::new(settings_repo, settings.database.settings_batch_timeout);

    let outcome = service.initialize().await?;
    info!(
        target = "vetrina::init_settings",
        created = outcome.created,
        "Default settings seeded"
    );
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_and_migrate(&settings).await?;
    let repositories = Arc::new(PostgresRepositories::new(pool));
    let app = build_application_context(repositories, &settings)?;

    let consume_handle = app.cache_config.auto_consume_interval().map(|period| {
        let consumer = app.cache_trigger.consumer().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                consumer.consume().await;
            }
        })
    });

    let result = serve_http(&settings, app.http_state).await;

    if let Some(handle) = consume_handle {
        handle.abort();
        let _ = handle.await;
    }

    result
}

async fn connect_and_migrate(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(pool)
}

struct ApplicationContext {
    http_state: HttpState,
    cache_config: CacheConfig,
    cache_trigger: Arc<CacheTrigger>,
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApplicationContext, AppError> {
    let products_repo: Arc<dyn ProductsRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();
    let announcements_repo: Arc<dyn AnnouncementsRepo> = repositories.clone();
    let carousel_repo: Arc<dyn CarouselRepo> = repositories.clone();
    let blog_repo: Arc<dyn BlogRepo> = repositories.clone();
    let settings_repo: Arc<dyn SettingsRepo> = repositories.clone();
    let contact_repo: Arc<dyn ContactRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories;

    let cache_config = CacheConfig::from(&settings.cache);
    let store = Arc::new(ResponseStore::new(&cache_config));
    let queue = Arc::new(EventQueue::new());
    let revalidator = HttpRevalidator::from_settings(&settings.revalidation)
        .map_err(AppError::from)?
        .map(|client| Arc::new(client) as Arc<dyn Revalidator>);
    if revalidator.is_none() {
        warn!(
            target = "vetrina::bootstrap",
            "Revalidation endpoint not configured; only local responses will be evicted"
        );
    }
    let consumer = Arc::new(CacheConsumer::new(
        cache_config.clone(),
        store.clone(),
        queue.clone(),
        revalidator,
    ));
    let cache_trigger = Arc::new(CacheTrigger::new(queue, consumer));
    let trigger = Some(cache_trigger.clone());

    let signer = S3Presigner::from_settings(&settings.storage)
        .map(|presigner| Arc::new(presigner) as Arc<dyn UploadSigner>);
    if signer.is_none() {
        warn!(
            target = "vetrina::bootstrap",
            "Object storage not configured; upload URLs cannot be issued"
        );
    }

    let credentials = Credentials::from_parts(
        settings.admin.username.clone(),
        settings.admin.password.clone(),
    );
    if credentials.is_none() && settings.admin.protect_api {
        warn!(
            target = "vetrina::bootstrap",
            "Admin credentials not configured; admin routes will reject every request"
        );
    }

    let admin = AdminServices {
        products: Arc::new(
            AdminProductService::new(products_repo.clone(), categories_repo.clone())
                .with_cache_trigger_opt(trigger.clone()),
        ),
        categories: Arc::new(
            AdminCategoryService::new(categories_repo.clone())
                .with_cache_trigger_opt(trigger.clone()),
        ),
        announcements: Arc::new(
            AdminAnnouncementService::new(announcements_repo.clone())
                .with_cache_trigger_opt(trigger.clone()),
        ),
        carousel: Arc::new(
            AdminCarouselService::new(carousel_repo.clone())
                .with_cache_trigger_opt(trigger.clone()),
        ),
        blog: Arc::new(
            AdminBlogService::new(blog_repo.clone()).with_cache_trigger_opt(trigger.clone()),
        ),
        settings: Arc::new(
            AdminSettingsService::new(
                settings_repo.clone(),
                settings.database.settings_batch_timeout,
            )
            .with_cache_trigger_opt(trigger),
        ),
        dashboard: Arc::new(AdminDashboardService::new(
            products_repo.clone(),
            categories_repo.clone(),
            blog_repo.clone(),
            announcements_repo.clone(),
            carousel_repo.clone(),
            contact_repo.clone(),
        )),
        auth: Arc::new(AdminAuthService::new(credentials)),
        uploads: Arc::new(AdminUploadService::new(signer, settings.storage.presign_ttl)),
    };

    let storefront = Arc::new(StorefrontService::new(StorefrontRepos {
        products: products_repo,
        categories: categories_repo,
        announcements: announcements_repo,
        carousel: carousel_repo,
        blog: blog_repo,
        settings: settings_repo,
        health: health_repo,
    }));

    let http_state = HttpState {
        storefront,
        contact: Arc::new(ContactService::new(contact_repo)),
        admin,
        cache: CacheState {
            config: cache_config.clone(),
            store,
        },
        cache_trigger: cache_trigger.clone(),
        protect_admin: settings.admin.protect_api,
    };

    Ok(ApplicationContext {
        http_state,
        cache_config,
        cache_trigger,
    })
}

async fn serve_http(settings: &config::Settings, http_state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(http_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "vetrina::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let stop = Arc::new(Notify::new());
    let stop_signal = stop.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { stop_signal.notified().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        _ = shutdown_signal() => {}
    }

    stop.notify_one();
    drain(server, settings.server.graceful_shutdown).await
}

async fn drain<F>(server: F, grace: Duration) -> Result<(), AppError>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    info!(
        target = "vetrina::serve",
        grace_seconds = grace.as_secs(),
        "Shutting down"
    );
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|err| AppError::unexpected(format!("server error: {err}"))),
        Err(_) => {
            warn!(
                target = "vetrina::serve",
                "Graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

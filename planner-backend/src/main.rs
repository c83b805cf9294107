use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;

mod agents;
mod config;
mod controllers;
mod error;
mod models;
mod pipeline;
mod providers;

use agents::TaskRoster;
use config::Config;
use pipeline::{ConvergenceSynthesizer, ParallelDispatcher, PlannerPipeline};
use providers::{ActivityCatalog, LiveEventsProvider, ProviderSet, VenueDirectoryProvider};

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<ActivityCatalog>,
    pub roster: Arc<TaskRoster>,
    pub pipeline: Arc<PlannerPipeline>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    // Static catalogs live in the config directory.
    // Check ./config first, then ../config (for running from subdirectory)
    let data_dir = config::resolve_data_dir()
        .unwrap_or_else(|| panic!("Config directory not found in ./config or ../config"));
    log::info!("Using config directory: {:?}", data_dir);

    let catalog =
        Arc::new(ActivityCatalog::load(&data_dir).expect("Failed to load activity catalogs"));

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing providers");
    if config.predicthq_api_key.is_some() {
        log::info!(
            "Events feed enabled, {}mi search radius",
            config.search_radius_miles
        );
    } else {
        log::info!("PREDICTHQ_API_KEY not set, serving catalog fallback events only");
    }
    let providers = ProviderSet::new(
        Arc::new(LiveEventsProvider::new(
            config.predicthq_api_key.clone(),
            config.search_radius_miles,
            Arc::clone(&catalog),
        )),
        Arc::new(VenueDirectoryProvider::new(Arc::clone(&catalog))),
    );

    log::info!("Initializing task roster");
    let roster = Arc::new(agents::create_default_roster());
    for task in roster.tasks() {
        log::info!("  {} - {}", task.name(), task.description());
    }

    let dispatcher = ParallelDispatcher::new(
        Arc::clone(&roster),
        providers,
        Duration::from_secs(config.task_timeout_secs),
    );
    let pipeline = Arc::new(PlannerPipeline::new(
        dispatcher,
        ConvergenceSynthesizer::new(),
        Duration::from_secs(config.request_timeout_secs),
    ));

    log::info!(
        "Starting activity planner on port {} ({}s task budget, {}s request deadline)",
        port,
        config.task_timeout_secs,
        config.request_timeout_secs
    );

    let app_config = config.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                config: app_config.clone(),
                catalog: Arc::clone(&catalog),
                roster: Arc::clone(&roster),
                pipeline: Arc::clone(&pipeline),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::discover::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

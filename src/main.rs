use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bank_ledger::api::{self, AppState};
use bank_ledger::blockchain::{self, MiningProgress, SharedLedger};
use bank_ledger::config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_summary,
        api::handlers::get_chain,
        api::handlers::validate_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::get_all_accounts,
        api::handlers::get_account_balance
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            blockchain::LedgerSummary,
            blockchain::SubmissionResult,
            api::handlers::ChainResponse,
            api::handlers::TransactionRequest,
            api::handlers::MineRequest,
            api::handlers::MineResponse,
            api::handlers::AccountResponse
        )
    ),
    tags(
        (name = "ledger", description = "Bank ledger dashboard endpoints")
    ),
    info(
        title = "Bank Ledger API",
        version = "0.1.0",
        description = "In-memory bank blockchain simulator",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().context("Failed to load configuration")?;

    let ledger = SharedLedger::with_config(config.ledger.clone()).context("Failed to create ledger")?;
    let state = web::Data::new(AppState {
        ledger,
        progress: MiningProgress::from_config(&config.ledger),
    });

    info!(
        "Ledger ready: {} seeded with {} coins, reward {} coins per block",
        config.ledger.privileged_account, config.ledger.privileged_seed, config.ledger.mining_reward
    );
    info!("Starting HTTP server at http://{}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(api::configure_routes)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}

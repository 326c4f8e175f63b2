//! Operator probe: loads one page of a resource list through the controller
//! and prints it as JSON.
//!
//! Usage: `list-probe <resource> [search]`

use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use serde_json::json;

use pushkind_listview::domain::entity::Record;
use pushkind_listview::domain::resource::{DEFAULT_SEARCH_FIELD, ResourceDescriptor};
use pushkind_listview::models::auth::StaticToken;
use pushkind_listview::models::config::{self, ClientConfig};
use pushkind_listview::repository::HttpRepository;
use pushkind_listview::services::controller::{ControllerSettings, ListController};
use pushkind_listview::services::view::{ListView, LoadStatus};

async fn settled(controller: &ListController<HttpRepository<Record>>) -> ListView<Record> {
    let mut view = controller.subscribe();
    loop {
        {
            let current = view.borrow_and_update();
            if matches!(current.status, LoadStatus::Loaded | LoadStatus::Errored) {
                return current.clone();
            }
        }
        if view.changed().await.is_err() {
            return controller.snapshot();
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = env::args().skip(1);
    let Some(resource_name) = args.next() else {
        log::error!("Usage: list-probe <resource> [search]");
        std::process::exit(1);
    };
    let search = args.next();

    let Some(resource) = ResourceDescriptor::by_name(&resource_name) else {
        log::error!("Unknown resource: {resource_name}");
        std::process::exit(1);
    };

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let client_config: ClientConfig = match config::load(&app_env) {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let repo = match HttpRepository::<Record>::new(
        &client_config.api_base_url,
        resource.clone(),
        client_config.request_timeout(),
    ) {
        Ok(repo) => repo,
        Err(err) => {
            log::error!("Error creating API client: {err}");
            std::process::exit(1);
        }
    };

    let token = StaticToken::new(client_config.api_token.clone().unwrap_or_default());
    let controller = ListController::new(
        Arc::new(repo),
        Arc::new(token),
        resource,
        ControllerSettings::from(&client_config),
    );

    controller.activate();
    let mut view = settled(&controller).await;

    if let Some(term) = search {
        if let Err(err) = controller.update_search(DEFAULT_SEARCH_FIELD, &term) {
            log::error!("Cannot search {resource_name}: {err}");
            std::process::exit(1);
        }
        // Wait out the debounce interval and the fetch it triggers.
        let quiet = controller.settings().debounce + std::time::Duration::from_millis(50);
        tokio::time::sleep(quiet).await;
        view = settled(&controller).await;
    }

    controller.deactivate();

    if let Some(error) = view.error {
        log::error!("Failed to load {resource_name}: {}", error.message);
        std::process::exit(1);
    }

    let output = json!({
        "resource": resource_name,
        "pagination": view.pagination(),
        "items": view.items,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            log::error!("Error encoding output: {err}");
            std::process::exit(1);
        }
    }
}

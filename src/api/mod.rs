// API module
//
// JSON dashboard over the shared ledger. Handlers only project ledger state
// and forward submissions and mining requests.

pub mod handlers;
pub mod routes;

// Re-export main components for easier access
pub use handlers::AppState;
pub use routes::configure_routes;

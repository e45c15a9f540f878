pub mod api;
pub mod housekeeping;
pub mod state;
pub mod supervisor;

pub use api::create_router;
pub use housekeeping::Housekeeper;
pub use state::{AppState, APP_VERSION};
pub use supervisor::Supervisor;

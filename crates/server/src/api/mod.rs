pub mod control;
pub mod handlers;
pub mod middleware;
pub mod ocr;
pub mod routes;
pub mod settings;

pub use routes::create_router;

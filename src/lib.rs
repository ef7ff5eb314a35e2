// src/lib.rs

// Deklaracje modułów
pub mod api_client; // klient REST panelu
pub mod config;
pub mod controller; // kontroler widoku listy
pub mod customers;
pub mod dashboard;
pub mod errors;
pub mod filters;
pub mod models;
pub mod orders;
pub mod pagination;
pub mod services;
pub mod state;

pub use controller::{ListController, ListView, RefreshOutcome, RemoteCollection};
pub use errors::AppError;
pub use state::AppState;

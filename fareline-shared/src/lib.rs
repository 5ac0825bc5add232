pub mod models;

pub use models::flight::{FlightResult, Provider, ProviderResponse, UnknownProvider};

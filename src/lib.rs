pub mod config;
pub mod db;
pub mod domain;
pub mod http;
pub mod metrics;
pub mod utils;

pub use domain::customer::{
    CustomerLookupHandler, CustomerRepository, LookupResponse, RepositoryError,
};

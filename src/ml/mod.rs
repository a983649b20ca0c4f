pub mod features;
pub mod filtering;
pub mod models;

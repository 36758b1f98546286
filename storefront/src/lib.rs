// storefront/src/lib.rs

//! Storefront core: product catalog, per-user cart, order placement with
//! compensation, and payment confirmation.
//!
//! Every operation goes through [`Storefront`], which scopes store access to the
//! authenticated user and runs the multi-step operations as `storefront_flow` flows.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod flows;
pub mod models;
pub mod orders;
pub mod payment;
pub mod revalidate;
pub mod state;
pub mod store;
pub mod storefront;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::storefront::Storefront;

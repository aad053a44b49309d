//! Vitrina Core - Shared domain library.
//!
//! This crate provides the domain types and pure logic used across all
//! Vitrina components:
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Tenant, owner and product administration API
//! - `cli` - Migrations and management tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. Everything here runs synchronously on
//! the caller's thread.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and roles
//! - [`catalog`] - Products, conditions and the category/brand taxonomy
//! - [`search`] - Filter, score, sort and paginate a product list
//! - [`cart`] - Shopping cart keyed by product code
//! - [`checkout`] - WhatsApp order message and payment links
//! - [`tenant`] - Tenant configuration, patches, owners and statistics
//! - [`auth`] - Current user and authorization predicates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod search;
pub mod tenant;
pub mod text;
pub mod types;

pub use types::*;

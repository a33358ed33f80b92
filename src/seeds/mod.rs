//! Database seeding functionality
//!
//! Populates tenant-independent catalog data on startup. Seeding is
//! idempotent: existing rows are left untouched.

pub mod billing_package;

pub use billing_package::seed_billing_packages;

//! Merged, sortable overview of product and cart discounts.
pub mod config;
pub mod ctp;
pub mod listing;
pub mod locale;
pub mod model;
pub mod normalize;
pub mod overview;
pub mod view;

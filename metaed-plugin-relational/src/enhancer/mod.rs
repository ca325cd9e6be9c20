//! Relational enhancers, in the order the plugins run them.
//!
//! [`MainTableEnhancer`] and [`ForeignKeyEnhancer`] build the technology
//! neutral table model. [`DatabaseNamingEnhancer`] and
//! [`DeleteTrackingEnhancer`] derive one technology's physical model from it.

mod database_naming;
mod delete_tracking;
mod foreign_key;
mod main_table;

pub use database_naming::DatabaseNamingEnhancer;
pub use delete_tracking::DeleteTrackingEnhancer;
pub use foreign_key::ForeignKeyEnhancer;
pub use main_table::{MainTableEnhancer, main_table_key, schema_for};

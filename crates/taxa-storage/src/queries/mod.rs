//! Query modules for each domain table.

pub mod import_tasks;
pub mod object_tags;
pub mod tags;
pub mod taxonomies;
pub mod util;

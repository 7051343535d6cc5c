//! Link management commands

mod create;
mod delete;
mod helpers;
mod list;
mod read;

pub use create::create_link;
pub use delete::delete_link;
pub use helpers::parse_expiry;
pub use list::list_links;
pub use read::read_link;

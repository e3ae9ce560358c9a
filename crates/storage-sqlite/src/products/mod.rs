//! SQLite storage implementation for products.

mod model;
mod repository;

pub use model::{NewProductDB, ProductChangesetDB, ProductDB};
pub use repository::ProductRepository;

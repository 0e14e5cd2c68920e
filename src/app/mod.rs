pub mod cat_resolver;

pub use cat_resolver::CatResolver;

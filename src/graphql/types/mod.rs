pub mod cat;

pub use cat::{Cat, CatInput, CatModifyInput, Location, LocationInput};

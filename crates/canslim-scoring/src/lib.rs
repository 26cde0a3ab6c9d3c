pub mod factors;
pub mod scorer;


pub use factors::*;
pub use scorer::*;

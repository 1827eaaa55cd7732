pub mod allocation;
pub mod decision;
pub mod market;
pub mod news;

pub use allocation::*;
pub use decision::*;
pub use market::*;
pub use news::*;

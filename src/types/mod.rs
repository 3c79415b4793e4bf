pub mod news;
pub mod series;
pub mod stage;

pub use news::*;
pub use series::*;
pub use stage::*;

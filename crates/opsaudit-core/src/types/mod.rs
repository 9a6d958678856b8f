mod cost;
mod period;
mod resource;

pub use cost::*;
pub use period::*;
pub use resource::*;

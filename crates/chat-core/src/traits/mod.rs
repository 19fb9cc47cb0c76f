mod repositories;

pub use repositories::*;

pub mod claim;
pub mod denial;

pub use claim::*;
pub use denial::*;

pub mod damage;
pub mod errors;
pub mod flag;
pub mod movement;

pub use damage::*;
pub use flag::*;
pub use movement::*;

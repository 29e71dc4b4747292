mod cuisine;
mod menu;
mod restaurant;
mod timing;

pub mod tiny_id;

pub use cuisine::*;
pub use menu::*;
pub use restaurant::*;
pub use timing::*;

//! Pure data structures (DTOs) shared by the engine, the clients and the HTTP layer.

pub mod alert;
pub mod barista;
pub mod menu;
pub mod order;
pub mod report;

pub use alert::*;
pub use barista::*;
pub use menu::*;
pub use order::*;
pub use report::*;

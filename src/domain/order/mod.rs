pub mod entity;
pub mod store;

pub use entity::{Model as Order, OrderStatus};
pub use store::{OrderStore, SeaOrmConnector, SeaOrmOrderStore, StoreConnector};

//! Domain models

pub mod bill;
pub mod order;
pub mod table;

pub use bill::{Bill, BillCreate};
pub use order::{Order, OrderDraft, OrderItem, OrderItemCreate, OrderItemDraft, OrderStatus, OrderUpdate};
pub use table::{Table, TableCreate, TableStatus, TableUpdate};

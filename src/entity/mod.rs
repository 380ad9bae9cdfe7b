// The order_counters table has no entity; the checkout path bumps it with a
// single atomic upsert statement.
pub mod admins;
pub mod audit_logs;
pub mod cart_items;
pub mod messages;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod tags;
pub mod users;

pub use admins::Entity as Admins;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use messages::Entity as Messages;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use tags::Entity as Tags;
pub use users::Entity as Users;

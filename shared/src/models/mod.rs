//! Persisted entity models

pub mod address;
pub mod customer;
pub mod menu;
pub mod order;
pub mod payment;
pub mod pricing;

pub use address::Address;
pub use customer::Customer;
pub use menu::{MenuItem, MenuItemKind, WeeklyMenu, WeeklyMenuItem};
pub use order::{Order, OrderDay, OrderDayDetail, OrderDetail, OrderItem, OrderStatus, PaymentStatus};
pub use payment::{LedgerEntryStatus, Payment};
pub use pricing::{PricingConfig, PricingConfigUpdate};

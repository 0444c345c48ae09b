//! Database Models

// Serde helpers
pub mod serde_thing;

// Auth
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Reviews
pub mod review;

// Re-exports
pub use order::{
    Order, OrderAddress, OrderCreate, OrderId, OrderItem, OrderItemInput, OrderStatus,
    OrderStatusUpdate, PaymentStatus,
};
pub use product::{
    PaginatedResponse, Pagination, Product, ProductCreate, ProductFilters, ProductId,
    ProductUpdate,
};
pub use review::{Review, ReviewCreate, ReviewId, ReviewUpdate};
pub use user::{User, UserCreate, UserId, UserResponse};

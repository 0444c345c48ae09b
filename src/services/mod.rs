//! 业务服务层
//!
//! 每个服务在构造时注入数据库句柄，持有自己需要的仓储。
//! handler 只做参数提取和权限判断，业务规则都在这里。

mod auth;
mod calculator;
mod order;
mod payment;
mod product;
mod review;

pub use auth::{AuthResponse, AuthService, LoginRequest, RefreshRequest, RefreshResponse};
pub use calculator::{
    CalculatorService, PowerBankRequest, PowerBankResponse, UpsRequest, UpsResponse,
};
pub use order::{CheckoutResult, OrderService, OrderStats};
pub use payment::{PaymentResult, PaymentService};
pub use product::ProductService;
pub use review::ReviewService;

//! 核心模块 - 配置、状态与服务器生命周期

mod config;
mod server;
mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;

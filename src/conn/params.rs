pub mod connect_params;
pub mod connect_params_builder;

pub use connect_params::{ConnectParams, IntoConnectParams};
pub use connect_params_builder::ConnectParamsBuilder;

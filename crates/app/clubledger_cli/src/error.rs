use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Auth(#[from] clubledger_core::auth::AuthError),

    #[error("Session store: {}", .0)]
    Store(#[from] clubledger_core::session::StoreError),
}

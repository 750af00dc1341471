use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("pin {0} is not wired")]
    UnknownPin(u8),
}

pub type Result<T> = std::result::Result<T, HwError>;

use std::convert::Infallible;

/// Failures surfaced by lot operations.
///
/// The first four variants are caller-visible outcomes; the remaining ones
/// propagate ledger and codec faults without masking them.
#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    #[error("product {key} does not exist")]
    NotFound { key: String },
    #[error("product {key} already exists")]
    AlreadyExists { key: String },
    #[error("supply {key} is not enough")]
    SupplyNotEnough { key: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("stored record at {key} could not be decoded as a lot")]
    Deserialization {
        key: String,
        #[source]
        source: minicbor::decode::Error,
    },
    #[error("failed to encode lot record")]
    Serialization(#[source] minicbor::encode::Error<Infallible>),
    #[error("ledger failure")]
    Ledger(#[from] sled::Error),
}

impl TransferError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }
}

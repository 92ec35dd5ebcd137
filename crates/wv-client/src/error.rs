use thiserror::Error;
use wv_chain_client::{ContractError, ProviderError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no wallet provider detected; install a browser wallet such as MetaMask")]
    ProviderMissing,
    #[error("no wallet account connected")]
    NotConnected,
    #[error("wallet returned no accounts")]
    NoAccounts,
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        ClientError::Contract(ContractError::Provider(err))
    }
}

impl ClientError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ClientError::Contract(ContractError::Provider(err)) if err.is_user_rejection())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

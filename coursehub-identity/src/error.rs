use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A synthesis failure. Distinct from any performance verdict: a run that
/// merely performed badly still renders a complete report; this error means
/// the inputs violated a structural contract.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid scenario profile `{profile}`: {reason}")]
    InvalidProfile { profile: String, reason: String },
}

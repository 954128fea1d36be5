use rollcall_core::error::CoreError;

/// Error returned by repository operations that apply domain rules inside
/// a transaction (active-semester checks, schedule conflicts).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

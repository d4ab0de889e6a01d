use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Unavailable("connection pool timed out".into()),
        sqlx::Error::PoolClosed => RepoError::Unavailable("connection pool closed".into()),
        sqlx::Error::Io(io) => RepoError::Unavailable(io.to_string()),
        sqlx::Error::Tls(tls) => RepoError::Unavailable(tls.to_string()),
        sqlx::Error::Database(db) if db.code().as_deref() == Some("57014") => RepoError::Timeout,
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => {
            RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db)
            if db.message().contains("violates foreign key constraint")
                || db.message().contains("invalid input syntax") =>
        {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("violates") => RepoError::Integrity {
            message: db.message().to_string(),
        },
        other => RepoError::from_persistence(other),
    }
}

pub(super) fn convert_count(value: i64) -> Result<u64, RepoError> {
    value
        .try_into()
        .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
}

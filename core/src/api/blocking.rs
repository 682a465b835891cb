use crate::api::envelope::ApiError;
use crate::error::ServiceResult;

/// Runs a synchronous service call on tokio's blocking pool so storage I/O
/// and password hashing never stall the async workers.
pub async fn run_blocking<F, T>(call: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join_err) => {
            tracing::error!(error = %join_err, "blocking service call did not complete");
            Err(ApiError::internal())
        }
    }
}

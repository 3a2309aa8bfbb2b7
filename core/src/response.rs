//! The uniform envelope returned by every `ApiSession` operation.
//!
//! Callers branch on `is_successful()` rather than on per-call return
//! shapes. `status` is `None` when the request never produced a response
//! (transport failure, unserializable payload).

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    status: Option<u16>,
    result: Result<T, ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: u16, data: T) -> Self {
        Self {
            status: Some(status),
            result: Ok(data),
        }
    }

    pub fn failure(status: Option<u16>, error: ApiError) -> Self {
        Self {
            status,
            result: Err(error),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.result.is_ok()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.result.as_ref().err()
    }

    pub fn into_data(self) -> Option<T> {
        self.result.ok()
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        self.result
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status: self.status,
            result: self.result.map(f),
        }
    }
}

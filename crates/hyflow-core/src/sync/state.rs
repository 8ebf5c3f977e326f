use hyflow_api::RequestResult;

/// Observable state of one synchronized resource.
///
/// `data` holds the last successful payload and survives later failures,
/// so consumers keep rendering stale-but-real data while `error` explains
/// what went wrong since.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> SyncState<T> {
    /// Marks a refresh as in flight. Previous data stays visible; a
    /// previous error is cleared so consumers stop showing it the moment
    /// a retry begins.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Folds a completed request into the state.
    pub fn finish(&mut self, result: RequestResult<T>) {
        if result.success {
            self.data = result.data;
            self.error = None;
        } else {
            self.error = Some(result.message);
        }
        self.loading = false;
    }
}

/// The two-valued outcome of an admission attempt.
///
/// Rejection is an expected, frequent outcome under load or while draining.
/// It is communicated as a value rather than an error, and the transport
/// layer is expected to translate it into backpressure (e.g., a
/// service-unavailable response), never to log it as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    /// The request was admitted. The caller **must** later report completion
    /// exactly once via
    /// [`ControlPoint::request_complete`](crate::ControlPoint::request_complete),
    /// on every completion path.
    Run,

    /// The request was rejected. No counter was durably incremented, and the
    /// caller **must not** report completion.
    Rejected,
}

impl RunResult {
    /// Reports whether the request was admitted.
    pub const fn is_run(&self) -> bool {
        matches!(self, Self::Run)
    }

    /// Reports whether the request was rejected.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

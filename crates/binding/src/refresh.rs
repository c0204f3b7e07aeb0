/// Receives refresh requests when a bound toggle changes.
///
/// Implementations typically schedule a re-render of whatever reads the
/// toggles; they must not assume one request per change.
pub trait RefreshScheduler: Send + Sync {
	/// Requests a refresh of dependent output.
	fn request_refresh(&self);
}

impl<F> RefreshScheduler for F
where
	F: Fn() + Send + Sync,
{
	fn request_refresh(&self) {
		self()
	}
}

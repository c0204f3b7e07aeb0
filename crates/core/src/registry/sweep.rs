use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use super::RegistryInner;
use crate::error::{LatchError, Result};

/// Running eviction sweeper.
pub(super) struct SweepHandle {
	cancel: CancellationToken,
	runtime: Handle,
}

impl SweepHandle {
	/// Spawns a sweeper on the current runtime.
	pub(super) fn spawn(inner: Weak<RegistryInner>, period: Duration) -> Result<Self> {
		let runtime = Handle::try_current().map_err(|_| LatchError::NoRuntime)?;
		Ok(Self::spawn_on(runtime, inner, period))
	}

	fn spawn_on(runtime: Handle, inner: Weak<RegistryInner>, period: Duration) -> Self {
		let cancel = CancellationToken::new();
		runtime.spawn(run(inner, period, cancel.clone()));
		tracing::trace!(period_ms = period.as_millis() as u64, "toggle.sweeper.start");
		Self { cancel, runtime }
	}

	/// Stops this sweeper and starts a fresh one on the same runtime.
	pub(super) fn restart(self, inner: Weak<RegistryInner>, period: Duration) -> Self {
		self.cancel.cancel();
		Self::spawn_on(self.runtime.clone(), inner, period)
	}

	pub(super) fn stop(&self) {
		tracing::trace!("toggle.sweeper.stop");
		self.cancel.cancel();
	}
}

async fn run(inner: Weak<RegistryInner>, period: Duration, cancel: CancellationToken) {
	let mut tick = interval_at(Instant::now() + period, period);
	tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			_ = cancel.cancelled() => break,
			_ = tick.tick() => {
				let Some(inner) = inner.upgrade() else {
					break;
				};
				inner.evict_idle(Instant::now());
			}
		}
	}
}

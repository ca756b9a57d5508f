//! Redraw throttling for zoom and pan.

/// Coalesces redraw requests into at most one draw per interval.
///
/// Requests arriving inside the window are not dropped: the pending flag
/// survives until the next [`FrameLimiter::poll`] past the window, so the
/// final state of a gesture is always drawn.
#[derive(Clone, Debug)]
pub struct FrameLimiter {
	interval_ms: f64,
	last_draw: Option<f64>,
	pending: bool,
}

impl FrameLimiter {
	/// Limiter allowing one draw per `interval_ms`.
	pub fn new(interval_ms: f64) -> Self {
		Self {
			interval_ms: interval_ms.max(0.0),
			last_draw: None,
			pending: false,
		}
	}

	/// Ask for a redraw.
	pub fn request(&mut self) {
		self.pending = true;
	}

	/// Whether a requested redraw has not been granted yet.
	pub fn is_pending(&self) -> bool {
		self.pending
	}

	/// Whether a pending redraw may run at `now_ms`. Granting it clears the
	/// pending flag and opens a new window.
	pub fn poll(&mut self, now_ms: f64) -> bool {
		if !self.pending {
			return false;
		}
		let open = self
			.last_draw
			.is_none_or(|last| now_ms - last >= self.interval_ms || now_ms < last);
		if open {
			self.drawn(now_ms);
		}
		open
	}

	/// Record a draw that happened for another reason (e.g. a simulation tick).
	pub fn drawn(&mut self, now_ms: f64) {
		self.pending = false;
		self.last_draw = Some(now_ms);
	}
}

impl Default for FrameLimiter {
	fn default() -> Self {
		Self::new(120.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn idle_limiter_grants_nothing() {
		let mut limiter = FrameLimiter::default();
		assert!(!limiter.poll(0.0));
		assert!(!limiter.poll(1_000.0));
	}

	#[test]
	fn first_request_draws_immediately() {
		let mut limiter = FrameLimiter::new(120.0);
		limiter.request();
		assert!(limiter.poll(5.0));
		assert!(!limiter.is_pending());
	}

	#[test]
	fn burst_collapses_and_trailing_request_flushes() {
		let mut limiter = FrameLimiter::new(120.0);
		let mut draws = Vec::new();
		// A wheel burst every 16ms for 300ms, then quiet frames.
		let mut now = 0.0;
		while now <= 600.0 {
			if now <= 300.0 {
				limiter.request();
			}
			if limiter.poll(now) {
				draws.push(now);
			}
			now += 16.0;
		}
		assert_eq!(draws.first(), Some(&0.0));
		for pair in draws.windows(2) {
			assert!(pair[1] - pair[0] >= 120.0);
		}
		// The last request (t=288) lands after the last granted draw.
		assert!(*draws.last().unwrap() >= 288.0);
		assert!(!limiter.is_pending());
	}

	#[test]
	fn tick_draw_satisfies_request() {
		let mut limiter = FrameLimiter::new(120.0);
		limiter.request();
		limiter.drawn(10.0);
		assert!(!limiter.poll(200.0));
	}
}

//! Pan and zoom transform between world (simulation) and screen coordinates.
//!
//! `screen = world * scale + translate`. The scale is clamped to the
//! configured extent on every mutation, so no sequence of gestures can leave
//! it out of range.

use super::config::ScaleExtent;

/// Wheel delta (pixels) per doubling of the zoom factor.
const WHEEL_PIXELS_PER_OCTAVE: f64 = 500.0;

/// Affine pan/zoom transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub translate_x: f64,
	/// Vertical translation in screen pixels.
	pub translate_y: f64,
	scale: f64,
	extent: ScaleExtent,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::identity(ScaleExtent::default())
	}
}

impl ViewTransform {
	/// No pan, scale 1.
	pub fn identity(extent: ScaleExtent) -> Self {
		Self::new(0.0, 0.0, 1.0, extent)
	}

	/// Transform with `scale` clamped into `extent`.
	pub fn new(translate_x: f64, translate_y: f64, scale: f64, extent: ScaleExtent) -> Self {
		Self {
			translate_x,
			translate_y,
			scale: extent.clamp(scale),
			extent,
		}
	}

	/// Current zoom factor.
	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// Zoom bounds.
	pub fn extent(&self) -> ScaleExtent {
		self.extent
	}

	/// World → screen.
	pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x * self.scale + self.translate_x,
			y * self.scale + self.translate_y,
		)
	}

	/// Screen → world.
	pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.translate_x) / self.scale,
			(sy - self.translate_y) / self.scale,
		)
	}

	/// Translate by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.translate_x += dx;
		self.translate_y += dy;
	}

	/// Set the scale, keeping the world point under `anchor` (screen) fixed.
	pub fn scale_to(&mut self, scale: f64, anchor: (f64, f64)) {
		let (wx, wy) = self.invert(anchor.0, anchor.1);
		self.scale = self.extent.clamp(scale);
		self.translate_x = anchor.0 - wx * self.scale;
		self.translate_y = anchor.1 - wy * self.scale;
	}

	/// Multiply the scale by `factor` around `anchor`.
	pub fn zoom_at(&mut self, factor: f64, anchor: (f64, f64)) {
		if factor.is_finite() && factor > 0.0 {
			self.scale_to(self.scale * factor, anchor);
		}
	}

	/// Zoom factor for a wheel event; positive `delta_y` zooms out.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		2f64.powf(-delta_y / WHEEL_PIXELS_PER_OCTAVE)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn apply_and_invert_are_inverses() {
		let t = ViewTransform::new(30.0, -12.5, 2.5, ScaleExtent::default());
		let (wx, wy) = t.invert(100.0, 40.0);
		let (sx, sy) = t.apply(wx, wy);
		assert!((sx - 100.0).abs() < 1e-9 && (sy - 40.0).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut t = ViewTransform::new(10.0, 20.0, 1.0, ScaleExtent::default());
		let before = t.invert(300.0, 200.0);
		t.zoom_at(1.7, (300.0, 200.0));
		let after = t.invert(300.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
	}

	#[test]
	fn scale_is_clamped() {
		let mut t = ViewTransform::default();
		for _ in 0..100 {
			t.zoom_at(2.0, (0.0, 0.0));
		}
		assert_eq!(t.scale(), 5.0);
		for _ in 0..100 {
			t.zoom_at(0.5, (0.0, 0.0));
		}
		assert_eq!(t.scale(), 0.2);
		assert_eq!(ViewTransform::new(0.0, 0.0, 99.0, ScaleExtent::default()).scale(), 5.0);
	}

	#[test]
	fn zero_lower_bound_keeps_invert_finite() {
		let mut t = ViewTransform::identity(ScaleExtent::new(0.0, 5.0));
		for _ in 0..200 {
			t.zoom_at(0.1, (10.0, 10.0));
		}
		assert!(t.scale() > 0.0);
		let (wx, wy) = t.invert(50.0, 50.0);
		assert!(wx.is_finite() && wy.is_finite());
	}

	#[test]
	fn pan_leaves_scale_alone() {
		let mut t = ViewTransform::new(0.0, 0.0, 2.0, ScaleExtent::default());
		t.pan_by(5.0, -5.0);
		assert_eq!((t.translate_x, t.translate_y, t.scale()), (5.0, -5.0, 2.0));
	}

	#[test]
	fn wheel_direction() {
		assert!(ViewTransform::wheel_factor(100.0) < 1.0);
		assert!(ViewTransform::wheel_factor(-100.0) > 1.0);
		assert_eq!(ViewTransform::wheel_factor(0.0), 1.0);
	}
}

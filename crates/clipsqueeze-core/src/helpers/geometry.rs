// crates/clipsqueeze-core/src/helpers/geometry.rs
//
// Size math for the player window and the playback decoder.

/// Largest `(w, h)` with the aspect of `src_w × src_h` that fits inside
/// `max_w × max_h`.
///
/// ```
/// use clipsqueeze_core::helpers::geometry::fit_within;
/// assert_eq!(fit_within(1920, 1080, 640.0, 640.0), (640.0, 360.0));
/// assert_eq!(fit_within(320,  568,  400.0, 284.0), (160.0, 284.0));
/// ```
pub fn fit_within(src_w: u32, src_h: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    if src_w == 0 || src_h == 0 || max_w <= 0.0 || max_h <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_w / src_w as f32).min(max_h / src_h as f32);
    (src_w as f32 * scale, src_h as f32 * scale)
}

/// Decode size for playback: native size capped at `max_w` wide, aspect kept,
/// both sides even.
pub fn playback_size(src_w: u32, src_h: u32, max_w: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (2, 2);
    }
    if src_w <= max_w {
        return (src_w.max(2) & !1, src_h.max(2) & !1);
    }
    let h = (max_w as f64 * src_h as f64 / src_w as f64).round() as u32;
    (max_w.max(2) & !1, h.max(2) & !1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_inputs_collapse() {
        assert_eq!(fit_within(0, 100, 50.0, 50.0), (0.0, 0.0));
        assert_eq!(fit_within(100, 100, 0.0, 50.0), (0.0, 0.0));
    }

    #[test]
    fn small_sources_keep_native_size() {
        assert_eq!(playback_size(320, 568, 640), (320, 568));
    }

    #[test]
    fn large_sources_are_capped() {
        assert_eq!(playback_size(1920, 1080, 640), (640, 360));
        assert_eq!(playback_size(1080, 1920, 640), (640, 1138));
    }

    #[test]
    fn odd_sizes_become_even() {
        assert_eq!(playback_size(321, 241, 640), (320, 240));
    }
}

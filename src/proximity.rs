//! Near-bottom detection.
//!
//! Pure arithmetic, called on every scroll event.  All four inputs share one
//! unit (the app feeds it pixels derived from terminal rows).

/// Pixel height assumed for one terminal row, so the per-list pixel
/// thresholds apply to a terminal list unchanged.
pub const ROW_HEIGHT_PX: u32 = 20;

/// Whether the unseen content below the viewport is within `threshold`.
///
/// Content shorter than the viewport counts as near the bottom.
pub fn is_near_bottom(
    total_content_height: u32,
    viewport_height: u32,
    scroll_offset: u32,
    threshold: u32,
) -> bool {
    let remaining =
        i64::from(total_content_height) - (i64::from(viewport_height) + i64::from(scroll_offset));
    remaining <= i64::from(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_from_bottom() {
        assert!(!is_near_bottom(5000, 800, 0, 100));
    }

    #[test]
    fn exactly_at_threshold_counts() {
        assert!(is_near_bottom(1000, 800, 100, 100));
        assert!(!is_near_bottom(1001, 800, 100, 100));
    }

    #[test]
    fn scrolled_past_the_end() {
        assert!(is_near_bottom(1000, 800, 400, 0));
    }

    #[test]
    fn short_content_is_near_bottom() {
        assert!(is_near_bottom(0, 800, 0, 100));
        assert!(is_near_bottom(300, 800, 0, 0));
    }

    #[test]
    fn larger_threshold_triggers_earlier() {
        assert!(!is_near_bottom(2000, 800, 700, 100));
        assert!(is_near_bottom(2000, 800, 700, 500));
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert!(is_near_bottom(u32::MAX, u32::MAX, u32::MAX, 0));
        assert!(!is_near_bottom(u32::MAX, 0, 0, 0));
    }
}

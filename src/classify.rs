/// Spectral classification mapper
///
/// Pure functions that turn a star's spectral class into display parameters:
/// - Point color (fixed RGB per class)
/// - Kelvin temperature band (informational only)
/// - Render size from luminosity, radius and viewing distance
/// - Label visibility from viewing distance
///
/// No state, no side effects. The viewport calls these once per star per frame.

/// Stars farther than this (light-years) render at the minimum point size
pub const DEFAULT_MAX_RENDER_DISTANCE: f64 = 50.0;

/// Labels are only drawn for stars closer than this (light-years)
pub const DEFAULT_LABEL_DISTANCE: f64 = 25.0;

/// Display color for a spectral class letter
///
/// Colors follow the conventional "hot = blue, cool = orange" mapping.
/// Unknown classes render white.
pub fn class_color(class: char) -> (u8, u8, u8) {
    match class {
        'O' => (155, 176, 255),
        'B' => (170, 191, 255),
        'A' => (202, 215, 255),
        'F' => (248, 247, 255),
        'G' => (255, 244, 234),
        'K' => (255, 210, 161),
        'M' => (255, 204, 111),
        _ => (255, 255, 255),
    }
}

/// Surface temperature band [min, max] in Kelvin for a spectral class
///
/// Standard MK main-sequence bands. Informational only - the display color
/// is looked up by class letter, never computed from temperature.
pub fn temperature_range(class: char) -> (f64, f64) {
    match class {
        'O' => (30_000.0, 60_000.0),
        'B' => (10_000.0, 30_000.0),
        'A' => (7_500.0, 10_000.0),
        'F' => (6_000.0, 7_500.0),
        'G' => (5_200.0, 6_000.0),
        'K' => (3_700.0, 5_200.0),
        'M' => (2_400.0, 3_700.0),
        _ => (0.0, 0.0),
    }
}

/// Point radius in pixels for a star seen from `distance` light-years
///
/// Brightness term: the larger of log-scaled luminosity and log-scaled
/// radius, never below 2.0. Luminosity is clamped at 0.01 and radius at 0.1
/// so dim dwarfs don't blow up the logarithm.
///
/// The brightness is then attenuated linearly with distance (floored at 10%
/// so nearby context never fully vanishes) and the result is floored at 1.0.
/// Anything beyond `max_distance` is a fixed 1.0 pixel dot regardless of how
/// bright it is.
pub fn render_size(luminosity: f64, radius: f64, distance: f64, max_distance: f64) -> f64 {
    if distance > max_distance {
        return 1.0;
    }

    let from_luminosity = luminosity.max(0.01).log10() + 3.0;
    let from_radius = radius.max(0.1).log10() + 2.0;
    let brightness = from_luminosity.max(from_radius).max(2.0);

    let falloff = (1.0 - distance / max_distance).max(0.1);

    (brightness * falloff).max(1.0)
}

/// Whether a star's name label should be drawn at `distance` light-years
pub fn label_visible(distance: f64, threshold: f64) -> bool {
    distance <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_class_colors() {
        assert_eq!(class_color('O'), (155, 176, 255));
        assert_eq!(class_color('G'), (255, 244, 234));
        assert_eq!(class_color('M'), (255, 204, 111));
    }

    #[test]
    fn test_unknown_class_is_white() {
        assert_eq!(class_color('X'), (255, 255, 255));
        assert_eq!(class_color('?'), (255, 255, 255));
    }

    #[test]
    fn test_temperature_bands() {
        let (min, max) = temperature_range('G');
        assert_eq!(min, 5_200.0);
        assert_eq!(max, 6_000.0);

        // Unknown classes have no band
        assert_eq!(temperature_range('Z'), (0.0, 0.0));
    }

    #[test]
    fn test_size_never_below_one_within_range() {
        // A tiny, dim star very close still gets at least a pixel
        let size = render_size(0.0001, 0.05, 49.0, DEFAULT_MAX_RENDER_DISTANCE);
        assert!(size >= 1.0);
    }

    #[test]
    fn test_size_is_exactly_one_beyond_range() {
        // Even an absurdly bright star collapses to 1.0 past the cutoff
        let size = render_size(1.0e9, 100.0, 51.0, DEFAULT_MAX_RENDER_DISTANCE);
        assert_eq!(size, 1.0);
    }

    #[test]
    fn test_size_monotonically_non_increasing_with_distance() {
        let mut previous = f64::MAX;
        for step in 0..120 {
            let distance = step as f64 * 0.5;
            let size = render_size(1.0, 1.0, distance, DEFAULT_MAX_RENDER_DISTANCE);
            assert!(
                size <= previous,
                "size grew from {} to {} at distance {}",
                previous,
                size,
                distance
            );
            previous = size;
        }
    }

    #[test]
    fn test_brighter_stars_render_larger() {
        let dim = render_size(0.1, 1.0, 10.0, DEFAULT_MAX_RENDER_DISTANCE);
        let bright = render_size(100.0, 1.0, 10.0, DEFAULT_MAX_RENDER_DISTANCE);
        assert!(bright > dim);
    }

    #[test]
    fn test_label_visible_at_threshold() {
        assert!(label_visible(25.0, DEFAULT_LABEL_DISTANCE));
        assert!(!label_visible(26.0, DEFAULT_LABEL_DISTANCE));
    }
}

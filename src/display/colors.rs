/// Maps a win percentage to an RGB color: red below 50%, orange at 50%,
/// green towards 100%. A sigmoid steepens the change around 50%.
pub fn color_for_percentage(percentage: f64) -> (u8, u8, u8) {
    let normalized = percentage / 100.0;
    let t = 1.0 / (1.0 + (-8.0 * (normalized - 0.5)).exp());

    if t < 0.5 {
        (255, (t * 2.0 * 165.0).floor() as u8, 0)
    } else {
        let upper = (t - 0.5) * 2.0;
        (
            (255.0 - upper * 255.0).floor() as u8,
            (165.0 + upper * 90.0).floor() as u8,
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(color_for_percentage(0.0), (255, 5, 0));
        assert_eq!(color_for_percentage(50.0), (255, 165, 0));
        assert_eq!(color_for_percentage(100.0), (9, 251, 0));
    }

    #[test]
    fn test_gradient_is_monotonic_in_green() {
        let mut last = 0u8;
        for p in (0..=100).step_by(5) {
            let (_, g, b) = color_for_percentage(p as f64);
            assert!(g >= last, "green dropped at {}%", p);
            assert_eq!(b, 0);
            last = g;
        }
    }
}

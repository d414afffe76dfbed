use crate::types::Landmark;

/// Unsigned angle in degrees at `vertex` between the rays to `a` and `b`,
/// measured in the image plane. Always within `[0, 180]`.
pub fn angle(a: Landmark, vertex: Landmark, b: Landmark) -> f32 {
    let radians = (b.y - vertex.y).atan2(b.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);
    let degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

pub fn distance(a: Landmark, b: Landmark) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0)
    }

    #[test]
    fn straight_line_is_180() {
        let a = angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((a - 180.0).abs() < 1e-4, "got {a}");
    }

    #[test]
    fn right_angle() {
        let a = angle(p(1.0, 0.0), p(0.0, 0.0), p(0.0, 1.0));
        assert!((a - 90.0).abs() < 1e-4, "got {a}");
    }

    #[test]
    fn reflex_angles_fold_back() {
        // Raw atan2 difference here is 270 degrees.
        let a = angle(p(0.0, -1.0), p(0.0, 0.0), p(-1.0, 0.0));
        assert!((a - 90.0).abs() < 1e-4, "got {a}");
        for (a, b) in [((1.0, 1.0), (-1.0, -0.5)), ((-1.0, 0.2), (1.0, -0.2))] {
            let value = angle(p(a.0, a.1), p(0.0, 0.0), p(b.0, b.1));
            assert!((0.0..=180.0).contains(&value), "got {value}");
        }
    }

    #[test]
    fn degenerate_points_do_not_fail() {
        let same = p(0.3, 0.3);
        let a = angle(same, same, same);
        assert!(a == 0.0 || a == 180.0, "got {a}");
    }

    #[test]
    fn distance_uses_depth() {
        let d = distance(Landmark::new(0.0, 0.0, 0.0), Landmark::new(0.0, 0.3, 0.4));
        assert!((d - 0.5).abs() < 1e-6);
        assert_eq!(distance(p(0.2, 0.2), p(0.2, 0.2)), 0.0);
    }
}

/// Range of ray parameters or channel values, `min..=max`.
///
/// Hit tests use the open interior (`surrounds`); the color pipeline uses
/// `clamp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Everything past `min`, unbounded above.
    pub const fn beyond(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// `min < t < max`. A root sitting exactly on either end is rejected.
    pub fn surrounds(&self, t: f32) -> bool {
        self.min < t && t < self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// Shrink the upper end to `t`, keeping `min`.
    pub fn up_to(&self, t: f32) -> Interval {
        Interval::new(self.min, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounds_excludes_both_ends() {
        let ray_t = Interval::beyond(0.001);

        assert!(!ray_t.surrounds(0.001));
        assert!(!ray_t.surrounds(0.0));
        assert!(!ray_t.surrounds(f32::INFINITY));
        assert!(ray_t.surrounds(0.5));
        assert!(ray_t.surrounds(1e30));
    }

    #[test]
    fn test_clamp_to_display_range() {
        let intensity = Interval::new(0.0, 0.999);

        assert_eq!(intensity.clamp(-5.0), 0.0);
        assert_eq!(intensity.clamp(0.5), 0.5);
        assert_eq!(intensity.clamp(1.0), 0.999);
    }

    #[test]
    fn test_up_to_narrows_search() {
        let narrowed = Interval::beyond(0.001).up_to(3.0);
        assert_eq!(narrowed, Interval::new(0.001, 3.0));
        assert!(narrowed.surrounds(2.999));
        assert!(!narrowed.surrounds(3.0));
    }
}

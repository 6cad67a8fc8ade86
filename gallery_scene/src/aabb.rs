use glam::Vec3;

/// Axis-aligned bounding box. Degenerate boxes (min == max on any axis) are
/// legal; they contain nothing and never intersect anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        !self.is_degenerate()
            && point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::splat(0.5), Vec3::splat(1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn separated_boxes_do_not_intersect() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::new(3.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn degenerate_box_never_matches() {
        let flat = Aabb::new(Vec3::ZERO, Vec3::ZERO);
        let other = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(5.0));
        assert!(!flat.intersects(&other));
        assert!(!other.intersects(&flat));
        assert!(!flat.contains_point(Vec3::ZERO));
    }

    #[test]
    fn contains_point_respects_bounds() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert!(a.contains_point(Vec3::new(0.9, -0.9, 0.0)));
        assert!(!a.contains_point(Vec3::new(1.001, 0.0, 0.0)));
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::new(Vec3::splat(-1.0), Vec3::ZERO);
        let b = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let joined = a.union(&b);
        assert_eq!(joined.min, Vec3::splat(-1.0));
        assert_eq!(joined.max, Vec3::splat(2.0));
    }
}

use rand::Rng;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::geometry::PlacedRect;

/// Retry budget for mutation's rejection sampling. The original system
/// retried forever; a saturated disc now fails with `PackingSaturated`
/// instead of hanging.
pub const MAX_MUTATION_ATTEMPTS: usize = 1000;

/// A disc-constrained collection of non-overlapping rectangles; the unit of
/// selection in the evolutionary loop.
///
/// Every `Packing` returned from a public operation satisfies two
/// invariants: rectangles are pairwise disjoint (edge touching allowed) and
/// every rectangle's corners lie inside the disc. Operators never mutate
/// their receiver; crossover and mutation build a fresh child and repair it
/// with [`Packing::correct`].
#[derive(Debug, Clone)]
pub struct Packing {
    radius: f64,
    rects: Vec<PlacedRect>,
}

/// Uniform-area point in a disc of the given radius.
pub(crate) fn random_point_in_disc<R: Rng>(radius: f64, rng: &mut R) -> (f64, f64) {
    let angle = rng.gen_range(0.0..1.0) * 2.0 * std::f64::consts::PI;
    let r = radius * rng.gen_range(0.0..1.0f64).sqrt();
    (angle.cos() * r, angle.sin() * r)
}

impl Packing {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            rects: Vec::new(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn rects(&self) -> &[PlacedRect] {
        &self.rects
    }

    /// Total packed value. Always recomputed.
    pub fn evaluate(&self) -> f64 {
        self.rects.iter().map(|r| r.value).sum()
    }

    /// Appends `candidate` iff it fits the disc and overlaps nothing;
    /// otherwise leaves the packing unchanged.
    pub fn try_add_new(&mut self, candidate: PlacedRect) -> bool {
        if candidate.in_circle(self.radius) && self.rects.iter().all(|r| r.not_overlaps(&candidate))
        {
            self.rects.push(candidate);
            true
        } else {
            false
        }
    }

    /// Evicting insert used by bulk construction and mutation: existing
    /// rectangles overlapping `candidate` are removed first, then the
    /// candidate is appended iff it fits the disc. Note the eviction happens
    /// even when the candidate is then rejected.
    pub fn add_new(&mut self, candidate: PlacedRect) -> bool {
        self.rects.retain(|r| r.not_overlaps(&candidate));
        if candidate.in_circle(self.radius) {
            self.rects.push(candidate);
            true
        } else {
            false
        }
    }

    fn sweep_left(&mut self) {
        self.rects.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
        for i in 0..self.rects.len() {
            let mut left = self.rects[i].left_in_circle(self.radius);
            for j in 0..i {
                let other = self.rects[j];
                // a y-overlapping earlier rectangle blocks the slide
                if !(self.rects[i].y_min >= other.y_max || self.rects[i].y_max <= other.y_min) {
                    left = left.max(other.x_max);
                }
            }
            self.rects[i].move_left_to(left);
        }
    }

    fn sweep_down(&mut self) {
        self.rects.sort_by(|a, b| a.y_min.total_cmp(&b.y_min));
        for i in 0..self.rects.len() {
            let mut down = self.rects[i].down_in_circle(self.radius);
            for j in 0..i {
                let other = self.rects[j];
                if !(self.rects[i].x_min >= other.x_max || self.rects[i].x_max <= other.x_min) {
                    down = down.max(other.y_max);
                }
            }
            self.rects[i].move_down_to(down);
        }
    }

    fn grow_right<R: Rng>(&mut self, catalog: &Catalog, rng: &mut R) {
        // index loop: rectangles appended mid-pass get their own attempts
        let mut i = 0;
        while i < self.rects.len() {
            for _ in 0..catalog.count() {
                let anchor = self.rects[i];
                let candidate = catalog.place_random(rng, anchor.x_max, anchor.y_min);
                if self.try_add_new(candidate) {
                    break;
                }
            }
            i += 1;
        }
    }

    fn grow_up<R: Rng>(&mut self, catalog: &Catalog, rng: &mut R) {
        let mut i = 0;
        while i < self.rects.len() {
            for _ in 0..catalog.count() {
                let anchor = self.rects[i];
                let candidate = catalog.place_random(rng, anchor.x_min, anchor.y_max);
                if self.try_add_new(candidate) {
                    break;
                }
            }
            i += 1;
        }
    }

    /// Four-pass compaction and repair, run after every structural change.
    /// Sweeping closes gaps left by filtering or insertion; growth
    /// opportunistically fills newly exposed edges with random catalog
    /// shapes. One pass of each, in this order, is the contract; leftover
    /// gaps are acceptable.
    pub fn correct<R: Rng>(&mut self, catalog: &Catalog, rng: &mut R) {
        self.sweep_left();
        self.grow_right(catalog, rng);
        self.sweep_down();
        self.grow_up(catalog, rng);
    }

    /// Split both parents by the line `y = a*x + b`: keep this parent's
    /// rectangles above the line, merge in the other parent's rectangles
    /// from below it where they still fit, then repair.
    pub fn cross_by_line<R: Rng>(
        &self,
        other: &Packing,
        a: f64,
        b: f64,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Packing {
        let mut child = self.clone();
        child.rects.retain(|r| r.over_line(a, b));
        for r in other.rects.iter().filter(|r| r.under_line(a, b)) {
            child.try_add_new(*r);
        }
        child.correct(catalog, rng);
        child
    }

    /// Crossover with a randomly sampled split line. The sampling law is
    /// part of the contract: `b = radius * u^2` (biased toward the center),
    /// `a` uniform in [0, 1] with an independent 50% sign flip and 50%
    /// inversion, giving lines of varied steepness through the disc.
    pub fn random_cross<R: Rng>(&self, other: &Packing, catalog: &Catalog, rng: &mut R) -> Packing {
        let u: f64 = rng.gen_range(0.0..1.0);
        let b = self.radius * u * u;
        let mut a: f64 = rng.gen_range(0.0..1.0);
        if rng.gen_bool(0.5) {
            a = -a;
        }
        if rng.gen_bool(0.5) {
            a = 1.0 / a;
        }
        self.cross_by_line(other, a, b, catalog, rng)
    }

    /// Point mutation: drop a random catalog shape at a uniform point in the
    /// disc (evicting whatever it lands on), then repair. Placement is
    /// rejection-sampled up to [`MAX_MUTATION_ATTEMPTS`] times.
    pub fn random_mutation<R: Rng>(&self, catalog: &Catalog, rng: &mut R) -> Result<Packing, Error> {
        let mut child = self.clone();
        for _ in 0..MAX_MUTATION_ATTEMPTS {
            let (x, y) = random_point_in_disc(self.radius, rng);
            let candidate = catalog.place_random(rng, x, y);
            if child.add_new(candidate) {
                child.correct(catalog, rng);
                return Ok(child);
            }
        }
        Err(Error::PackingSaturated {
            attempts: MAX_MUTATION_ATTEMPTS,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::RectangleType;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Validates the two packing invariants: pairwise disjointness and
    /// corner containment in the disc.
    pub(crate) fn assert_packing_valid(packing: &Packing) {
        let rects = packing.rects();
        for (i, r) in rects.iter().enumerate() {
            assert!(
                r.in_circle(packing.radius()),
                "rect {i} ({r}) outside disc of radius {}",
                packing.radius()
            );
            for (j, other) in rects.iter().enumerate().skip(i + 1) {
                assert!(
                    r.not_overlaps(other),
                    "rect {i} ({r}) overlaps rect {j} ({other})"
                );
            }
        }
    }

    fn unit_catalog() -> Catalog {
        Catalog::new([RectangleType::new(2.0, 1.0, 4.0)])
    }

    /// Shapes that can never fit a radius-10 disc, so correct() reduces to
    /// the two sweeps.
    fn oversized_catalog() -> Catalog {
        Catalog::new([RectangleType::new(30.0, 30.0, 1.0)])
    }

    #[test]
    fn test_try_add_then_reject_overlap() {
        let mut packing = Packing::new(10.0);
        let catalog = unit_catalog();
        let first = catalog.types()[0].place(0.0, 0.0);
        assert!(packing.try_add_new(first));
        assert_eq!(packing.evaluate(), 4.0);

        let overlapping = catalog.types()[0].place(0.0, 0.0);
        assert!(!packing.try_add_new(overlapping));
        assert_eq!(packing.evaluate(), 4.0);
        assert_eq!(packing.rects().len(), 1);
    }

    #[test]
    fn test_try_add_rejects_outside_disc() {
        let mut packing = Packing::new(1.0);
        let candidate = RectangleType::new(3.0, 3.0, 5.0).place(0.0, 0.0);
        assert!(!candidate.in_circle(1.0));
        assert!(!packing.try_add_new(candidate));
        assert_eq!(packing.evaluate(), 0.0);
    }

    #[test]
    fn test_try_add_allows_touching() {
        let mut packing = Packing::new(10.0);
        let catalog = unit_catalog();
        assert!(packing.try_add_new(catalog.types()[0].place(0.0, 0.0)));
        assert!(packing.try_add_new(catalog.types()[0].place(2.0, 0.0)));
        assert_eq!(packing.evaluate(), 8.0);
    }

    #[test]
    fn test_add_new_evicts_overlapping() {
        let mut packing = Packing::new(10.0);
        let small = RectangleType::new(1.0, 1.0, 1.0);
        let big = RectangleType::new(4.0, 4.0, 3.0);
        assert!(packing.try_add_new(small.place(0.0, 0.0)));
        assert!(packing.try_add_new(small.place(2.0, 2.0)));
        assert!(packing.try_add_new(small.place(-5.0, -5.0)));

        // lands on the first two, evicts both
        assert!(packing.add_new(big.place(-0.5, -0.5)));
        assert_eq!(packing.rects().len(), 2);
        assert_eq!(packing.evaluate(), 4.0);
        assert_packing_valid(&packing);
    }

    #[test]
    fn test_add_new_evicts_even_on_rejection() {
        let mut packing = Packing::new(10.0);
        let small = RectangleType::new(1.0, 1.0, 1.0);
        assert!(packing.try_add_new(small.place(9.0, 0.0)));

        // overlaps the existing rect but pokes out of the disc: rejected,
        // yet the eviction still happens
        let huge = RectangleType::new(20.0, 20.0, 9.0).place(8.5, -0.5);
        assert!(!packing.add_new(huge));
        assert!(packing.rects().is_empty());
    }

    #[test]
    fn test_correct_sweeps_into_disc_bottom_left() {
        let mut packing = Packing::new(10.0);
        let rect = RectangleType::new(2.0, 1.0, 4.0).place(3.0, 0.0);
        assert!(packing.try_add_new(rect));

        let mut rng = StdRng::seed_from_u64(1);
        packing.correct(&oversized_catalog(), &mut rng);

        let swept = packing.rects()[0];
        // slid left to the circle bound for y-span [0, 1], then down for the
        // resulting x-span
        assert!((swept.x_min - -(99.0f64).sqrt()).abs() < 1e-9);
        assert!((swept.y_min - -1.0).abs() < 1e-9);
        assert_packing_valid(&packing);
    }

    #[test]
    fn test_correct_restores_invariants_after_filtering() {
        let mut rng = StdRng::seed_from_u64(42);
        let catalog = Catalog::new([
            RectangleType::new(2.0, 1.0, 4.0),
            RectangleType::new(3.0, 2.0, 5.0),
            RectangleType::new(1.0, 1.0, 1.0),
        ]);
        let radius = 10.0;

        let mut packing = Packing::new(radius);
        for _ in 0..200 {
            let (x, y) = random_point_in_disc(radius, &mut rng);
            packing.try_add_new(catalog.place_random(&mut rng, x, y));
        }
        assert_packing_valid(&packing);

        // knock a hole in the middle, as a crossover filter would
        let mut filtered = packing.clone();
        filtered.rects.retain(|r| r.x_min.abs() > 2.0);
        filtered.correct(&catalog, &mut rng);
        assert_packing_valid(&filtered);
    }

    #[test]
    fn test_correct_grows_into_empty_disc_edge() {
        let mut rng = StdRng::seed_from_u64(3);
        let catalog = unit_catalog();
        let mut packing = Packing::new(10.0);
        assert!(packing.try_add_new(catalog.types()[0].place(0.0, 0.0)));
        packing.correct(&catalog, &mut rng);
        // plenty of room: growth should have filled some exposed edges
        assert!(packing.rects().len() > 1);
        assert_packing_valid(&packing);
    }

    #[test]
    fn test_cross_by_line_filters_then_repairs() {
        let mut rng = StdRng::seed_from_u64(9);
        let catalog = oversized_catalog();
        let shape = RectangleType::new(2.0, 1.0, 4.0);

        let mut top = Packing::new(10.0);
        assert!(top.try_add_new(shape.place(0.0, 3.0)));
        let mut bottom = Packing::new(10.0);
        assert!(bottom.try_add_new(shape.place(0.0, -4.0)));

        // horizontal split at y = 0; growth disabled by the oversized catalog
        let child = top.cross_by_line(&bottom, 0.0, 0.0, &catalog, &mut rng);
        assert_eq!(child.rects().len(), 2);
        assert_packing_valid(&child);
        // parents untouched
        assert_eq!(top.rects().len(), 1);
        assert_eq!(bottom.rects().len(), 1);
        assert_eq!(top.rects()[0].y_min, 3.0);
    }

    #[test]
    fn test_cross_child_rects_come_from_parents() {
        // with growth disabled, every child rectangle's shape and value must
        // trace back to one of the parents
        let mut rng = StdRng::seed_from_u64(11);
        let catalog = oversized_catalog();
        let a_shape = RectangleType::new(2.0, 1.0, 4.0);
        let b_shape = RectangleType::new(1.0, 3.0, 7.0);

        let mut a = Packing::new(10.0);
        for x in [-6.0, -3.0, 0.0, 3.0] {
            assert!(a.try_add_new(a_shape.place(x, 2.0)));
        }
        let mut b = Packing::new(10.0);
        for x in [-6.0, -3.0, 0.0, 3.0] {
            assert!(b.try_add_new(b_shape.place(x, -4.0)));
        }

        let child = a.random_cross(&b, &catalog, &mut rng);
        assert_packing_valid(&child);
        for r in child.rects() {
            let matches = |w: f64, h: f64, v: f64| {
                (r.width() - w).abs() < 1e-9 && (r.height() - h).abs() < 1e-9 && r.value == v
            };
            assert!(
                matches(2.0, 1.0, 4.0) || matches(1.0, 3.0, 7.0),
                "unexpected child rect {r}"
            );
        }
    }

    #[test]
    fn test_random_cross_valid_over_many_lines() {
        let mut rng = StdRng::seed_from_u64(5);
        let catalog = Catalog::new([
            RectangleType::new(2.0, 1.0, 4.0),
            RectangleType::new(1.0, 1.0, 1.0),
        ]);
        let radius = 8.0;

        let seed_packing = |rng: &mut StdRng| {
            let mut p = Packing::new(radius);
            for _ in 0..100 {
                let (x, y) = random_point_in_disc(radius, rng);
                p.try_add_new(catalog.place_random(rng, x, y));
            }
            p.correct(&catalog, rng);
            p
        };
        let a = seed_packing(&mut rng);
        let b = seed_packing(&mut rng);

        for _ in 0..20 {
            let child = a.random_cross(&b, &catalog, &mut rng);
            assert_packing_valid(&child);
        }
    }

    #[test]
    fn test_random_mutation_preserves_invariants() {
        let mut rng = StdRng::seed_from_u64(17);
        let catalog = unit_catalog();
        let mut packing = Packing::new(6.0);
        assert!(packing.try_add_new(catalog.types()[0].place(0.0, 0.0)));

        let mutant = packing.random_mutation(&catalog, &mut rng).unwrap();
        assert_packing_valid(&mutant);
        assert!(!mutant.rects().is_empty());
        // parent untouched
        assert_eq!(packing.rects().len(), 1);
    }

    #[test]
    fn test_random_mutation_saturation_fails() {
        // nothing in the catalog can ever fit a unit disc
        let catalog = Catalog::new([RectangleType::new(30.0, 30.0, 1.0)]);
        let packing = Packing::new(1.0);
        let mut rng = StdRng::seed_from_u64(2);
        let err = packing.random_mutation(&catalog, &mut rng).unwrap_err();
        assert_eq!(
            err,
            Error::PackingSaturated {
                attempts: MAX_MUTATION_ATTEMPTS
            }
        );
    }

    #[test]
    fn test_evaluate_sums_values() {
        let mut packing = Packing::new(10.0);
        assert_eq!(packing.evaluate(), 0.0);
        assert!(packing.try_add_new(RectangleType::new(1.0, 1.0, 2.5).place(0.0, 0.0)));
        assert!(packing.try_add_new(RectangleType::new(1.0, 1.0, 1.5).place(3.0, 3.0)));
        assert_eq!(packing.evaluate(), 4.0);
    }
}

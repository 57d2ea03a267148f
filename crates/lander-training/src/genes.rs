//! Gene-level operators for the genetic algorithm.
//!
//! These are the building blocks [`PopulationEvolver`](crate::genetic::PopulationEvolver)
//! combines into one reproduction step:
//!
//! - **Initialization**: [`random_gene`] and [`random_chromosome`]
//! - **Crossover**: [`blend`] mixes two parents with a single coefficient
//! - **Mutation**: [`mutate`] replaces genes with fresh random ones
//! - **Repair**: [`smooth`] restores the per-turn rate limits between neighbours
//!
//! All operators work on gene deltas. They never look at absolute commands: the
//! evaluator clamps the absolute rotation and power when it flies the chromosome.

use rand::Rng;

use lander_evaluator::chromosome::{Chromosome, GENE_POWER_RANGE, GENE_ROTATE_RANGE, Gene};

/// Draws a gene uniformly from the legal per-turn delta ranges.
pub fn random_gene<R>(rng: &mut R) -> Gene
where
    R: Rng + ?Sized,
{
    Gene::new(
        rng.random_range(GENE_ROTATE_RANGE.0..=GENE_ROTATE_RANGE.1),
        rng.random_range(GENE_POWER_RANGE.0..=GENE_POWER_RANGE.1),
    )
}

/// Draws `horizon` independent random genes.
pub fn random_chromosome<R>(rng: &mut R, horizon: usize) -> Chromosome
where
    R: Rng + ?Sized,
{
    (0..horizon).map(|_| random_gene(rng)).collect()
}

/// Blend crossover of two parents.
///
/// A single coefficient `r` is drawn from `[0, 1)` for the pair. At every position the
/// first child takes `round(p1 * r + p2 * (1 - r))` and the second child the
/// complementary blend, independently for the rotation and power fields.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blend<R>(p1: &Chromosome, p2: &Chromosome, rng: &mut R) -> (Chromosome, Chromosome)
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let r = rng.random::<f64>();
    blend_with(p1, p2, r)
}

pub(crate) fn blend_with(p1: &Chromosome, p2: &Chromosome, r: f64) -> (Chromosome, Chromosome) {
    let (child1, child2) = p1
        .genes()
        .iter()
        .zip(p2.genes())
        .map(|(a, b)| {
            let c1 = Gene::new(mix(a.rotate, b.rotate, r), mix(a.power, b.power, r));
            let c2 = Gene::new(mix(b.rotate, a.rotate, r), mix(b.power, a.power, r));
            (c1, c2)
        })
        .unzip::<_, _, Vec<_>, Vec<_>>();
    (Chromosome::new(child1), Chromosome::new(child2))
}

#[expect(clippy::cast_possible_truncation)]
fn mix(a: i32, b: i32, r: f64) -> i32 {
    (f64::from(a) * r + f64::from(b) * (1.0 - r)).round() as i32
}

/// Replaces each gene, with probability `chance`, by a fresh random gene.
///
/// # Panics
///
/// Panics if `chance` is outside `[0, 1]`.
pub fn mutate<R>(chromosome: &mut Chromosome, chance: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for gene in chromosome.genes_mut() {
        if rng.random_bool(chance) {
            *gene = random_gene(rng);
        }
    }
}

/// Re-clamps every gene so neighbouring genes stay within the per-turn limits.
///
/// Each gene is first clamped into the legal delta ranges, then into a window of
/// one rate-limit step around the previous gene of the same chromosome.
///
/// ```
/// use lander_evaluator::chromosome::{Chromosome, Gene};
/// use lander_training::genes;
///
/// let mut chromosome = Chromosome::new(vec![Gene::new(-15, -1), Gene::new(15, 1)]);
/// genes::smooth(&mut chromosome);
/// assert_eq!(chromosome.genes(), [Gene::new(-15, -1), Gene::new(0, 0)]);
/// ```
pub fn smooth(chromosome: &mut Chromosome) {
    let step_rotate = GENE_ROTATE_RANGE.1;
    let step_power = GENE_POWER_RANGE.1;
    let mut prev: Option<Gene> = None;
    for gene in chromosome.genes_mut() {
        let mut g = gene.clamped();
        if let Some(p) = prev {
            g.rotate = g.rotate.clamp(
                (p.rotate - step_rotate).max(GENE_ROTATE_RANGE.0),
                (p.rotate + step_rotate).min(GENE_ROTATE_RANGE.1),
            );
            g.power = g.power.clamp(
                (p.power - step_power).max(GENE_POWER_RANGE.0),
                (p.power + step_power).min(GENE_POWER_RANGE.1),
            );
        }
        *gene = g;
        prev = Some(g);
    }
}

/// Whether every gene is legal and within one rate-limit step of its predecessor.
#[must_use]
pub fn is_smooth(chromosome: &Chromosome) -> bool {
    chromosome.genes().iter().all(|g| g.clamped() == *g)
        && chromosome.genes().windows(2).all(|w| {
            (w[1].rotate - w[0].rotate).abs() <= GENE_ROTATE_RANGE.1
                && (w[1].power - w[0].power).abs() <= GENE_POWER_RANGE.1
        })
}

//! Control-sequence representation searched by the genetic algorithm.

use std::iter;

use serde::{Deserialize, Serialize};

use lander_engine::{ActuatorPolicy, Command, MAX_POWER_STEP, MAX_ROTATE_STEP};

/// Legal range of a gene's rotation delta, in degrees.
pub const GENE_ROTATE_RANGE: (i32, i32) = (-MAX_ROTATE_STEP, MAX_ROTATE_STEP);
/// Legal range of a gene's thrust power delta.
pub const GENE_POWER_RANGE: (i32, i32) = (-MAX_POWER_STEP, MAX_POWER_STEP);

/// One turn's incremental change to the commanded rotation and thrust power.
///
/// Genes encode changes rather than absolute commands, so any gene sequence maps to a
/// command sequence the actuators can follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub rotate: i32,
    pub power: i32,
}

impl Gene {
    #[must_use]
    pub const fn new(rotate: i32, power: i32) -> Self {
        Self { rotate, power }
    }

    /// Clamps both deltas into their legal per-turn ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(
            self.rotate.clamp(GENE_ROTATE_RANGE.0, GENE_ROTATE_RANGE.1),
            self.power.clamp(GENE_POWER_RANGE.0, GENE_POWER_RANGE.1),
        )
    }

    /// Absolute command obtained by applying this gene to the `current` command.
    ///
    /// The result respects both the per-turn rate limits and the absolute actuator
    /// ranges, whatever the gene holds.
    ///
    /// ```
    /// use lander_engine::Command;
    /// use lander_evaluator::chromosome::Gene;
    ///
    /// let command = Gene::new(50, 3).apply(Command::new(0, 0));
    /// assert_eq!(command, Command::new(15, 1));
    ///
    /// let command = Gene::new(-10, -1).apply(Command::new(-85, 0));
    /// assert_eq!(command, Command::new(-90, 0));
    /// ```
    #[must_use]
    pub fn apply(self, current: Command) -> Command {
        let requested = Command::new(
            current.rotate.saturating_add(self.rotate),
            current.power.saturating_add(self.power),
        );
        ActuatorPolicy::STRICT.clamp(requested, current)
    }
}

/// A fixed-length sequence of genes, one per simulated turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chromosome {
    genes: Vec<Gene>,
}

impl Chromosome {
    #[must_use]
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn genes_mut(&mut self) -> &mut [Gene] {
        &mut self.genes
    }

    /// The planning horizon encoded by this chromosome.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Drops the first gene and appends `gene`, keeping the horizon unchanged.
    pub fn shift_left(&mut self, gene: Gene) {
        if self.genes.is_empty() {
            return;
        }
        self.genes.remove(0);
        self.genes.push(gene);
    }

    /// Recovers the genes that reproduce `commands` when followed from `initial`.
    ///
    /// Commands outside the rate limits are clamped when the result is flown, so only
    /// command sequences produced by [`Chromosome::commands`] round-trip exactly.
    #[must_use]
    pub fn from_commands(initial: Command, commands: &[Command]) -> Self {
        iter::once(initial)
            .chain(commands.iter().copied())
            .zip(commands)
            .map(|(prev, next)| Gene::new(next.rotate - prev.rotate, next.power - prev.power))
            .collect()
    }

    /// Absolute commands produced when following this chromosome from `initial`.
    pub fn commands(&self, initial: Command) -> impl Iterator<Item = Command> + '_ {
        self.genes.iter().scan(initial, |current, gene| {
            *current = gene.apply(*current);
            Some(*current)
        })
    }
}

impl FromIterator<Gene> for Chromosome {
    fn from_iter<I: IntoIterator<Item = Gene>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_clamped() {
        assert_eq!(Gene::new(50, -3).clamped(), Gene::new(15, -1));
        assert_eq!(Gene::new(-7, 1).clamped(), Gene::new(-7, 1));
    }

    #[test]
    fn test_apply_respects_absolute_ranges() {
        assert_eq!(
            Gene::new(15, 1).apply(Command::new(88, 4)),
            Command::new(90, 4)
        );
        assert_eq!(
            Gene::new(0, -1).apply(Command::new(0, 0)),
            Command::new(0, 0)
        );
        assert_eq!(
            Gene::new(15, 1).apply(Command::new(i32::MAX, i32::MAX)),
            Command::new(90, 4)
        );
    }

    #[test]
    fn test_commands_accumulate() {
        let chromosome: Chromosome = [Gene::new(15, 1), Gene::new(15, 1), Gene::new(-5, 0)]
            .into_iter()
            .collect();
        let commands: Vec<_> = chromosome.commands(Command::new(0, 0)).collect();
        assert_eq!(
            commands,
            vec![Command::new(15, 1), Command::new(30, 2), Command::new(25, 2)]
        );
    }

    #[test]
    fn test_shift_left() {
        let mut chromosome: Chromosome = [Gene::new(1, 0), Gene::new(2, 0), Gene::new(3, 0)]
            .into_iter()
            .collect();
        chromosome.shift_left(Gene::new(4, 1));
        assert_eq!(
            chromosome.genes(),
            &[Gene::new(2, 0), Gene::new(3, 0), Gene::new(4, 1)]
        );
    }

    #[test]
    fn test_from_commands_inverts_commands() {
        let initial = Command::new(-20, 2);
        let chromosome = Chromosome::new(vec![
            Gene::new(15, 1),
            Gene::new(-7, 1),
            Gene::new(0, -1),
            Gene::new(3, 0),
        ]);
        let commands = chromosome.commands(initial).collect::<Vec<_>>();
        let recovered = Chromosome::from_commands(initial, &commands);
        assert_eq!(recovered.commands(initial).collect::<Vec<_>>(), commands);
        assert_eq!(recovered, chromosome);
    }

    #[test]
    fn test_serializes_as_gene_list() {
        let chromosome = Chromosome::new(vec![Gene::new(-3, 1)]);
        let json = serde_json::to_string(&chromosome).unwrap();
        assert_eq!(json, r#"[{"rotate":-3,"power":1}]"#);
    }
}

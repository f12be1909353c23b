//! The generation cycle: both role populations are handed out for evaluation, then each is
//! independently normalized, sorted, selected, recombined, mutated and reshuffled into the next
//! generation.

use crate::{
    brain::Brain,
    config::GeneticConfig,
    error::{Error, Result},
    network::Structure,
    population::{compute_fitness, population_init, sort_by_fitness, GenomeSource, Population, Role},
    random::{GaRng, ProbBinding, ProbStatic, WyRng},
    reproduce::{mutate_except_elite, reshuffle},
    stats::GenerationStats,
    strategy::{Strategy, StrategyKind},
    Genome,
};
use rand::RngCore;
use tracing::{debug, trace};

/// Where the engine is within a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Evaluating,
    FitnessComputed,
    Selected,
    Recombined,
    Mutated,
    Reshuffled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionTarget {
    /// Run this many full generation cycles
    Generation(usize),
    Unbounded,
}

impl EvolutionTarget {
    fn satisfied(&self, completed: usize) -> bool {
        match self {
            Self::Generation(t) => *t <= completed,
            Self::Unbounded => false,
        }
    }
}

/// Called once per role and generation, right after fitness is computed and the population is
/// sorted best first.
pub trait Hook {
    fn fitness_computed(&mut self, stats: &GenerationStats, sorted: &[Genome]) -> Result<()>;
}

impl<F: FnMut(&GenerationStats, &[Genome]) -> Result<()>> Hook for F {
    fn fitness_computed(&mut self, stats: &GenerationStats, sorted: &[Genome]) -> Result<()> {
        self(stats, sorted)
    }
}

impl<A: Hook, B: Hook> Hook for (A, B) {
    fn fitness_computed(&mut self, stats: &GenerationStats, sorted: &[Genome]) -> Result<()> {
        self.0.fitness_computed(stats, sorted)?;
        self.1.fitness_computed(stats, sorted)
    }
}

/// The evaluation side of a run, e.g. a game simulation. It owns how scores come about; the
/// engine only wants one score per genome.
pub trait Arena {
    /// Play out one round with both populations, reporting a score for every genome of both
    /// roles through `round` before returning.
    fn on_generation_ready(&mut self, round: &mut Round<'_>) -> Result<()>;
}

/// Handle on the populations while a round is being evaluated
#[derive(Debug)]
pub struct Round<'a> {
    generation: usize,
    structure: &'a Structure,
    runners: &'a mut Population,
    catchers: &'a mut Population,
}

impl Round<'_> {
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        self.structure
    }

    fn population(&self, role: Role) -> &Population {
        match role {
            Role::Runner => &*self.runners,
            Role::Catcher => &*self.catchers,
        }
    }

    fn population_mut(&mut self, role: Role) -> &mut Population {
        match role {
            Role::Runner => &mut *self.runners,
            Role::Catcher => &mut *self.catchers,
        }
    }

    /// Genomes of `role`, in the order of the slots they play in
    pub fn genomes(&self, role: Role) -> &[Genome] {
        self.population(role).genomes()
    }

    pub fn report_fitness(&mut self, role: Role, index: usize, score: f64) -> Result<()> {
        self.population_mut(role).report(index, score)
    }

    /// Genomes still waiting on a score, across both roles
    pub fn pending(&self) -> usize {
        self.runners.pending() + self.catchers.pending()
    }

    /// Every genome of `role` decoded into a live [Brain]
    pub fn brains(&self, role: Role) -> Result<Vec<Brain>> {
        self.genomes(role)
            .iter()
            .enumerate()
            .map(|(idx, genome)| Brain::new(role, idx, genome, self.structure))
            .collect()
    }

    /// Report the score of every brain, dead or alive, back to its genome
    pub fn bury(&mut self, brains: impl IntoIterator<Item = Brain>) -> Result<()> {
        for brain in brains {
            self.report_fitness(brain.role(), brain.index(), brain.score())?;
        }
        Ok(())
    }
}

/// A normalized copy of `pop`, sorted best first, along with its summary
fn rank(pop: &Population, generation: usize) -> (Vec<Genome>, GenerationStats) {
    let mut genomes = pop.genomes().to_vec();
    let degenerate = compute_fitness(&mut genomes).is_none();
    sort_by_fitness(&mut genomes);
    let stats = GenerationStats::collect(generation, pop.role(), &genomes, degenerate);
    debug!(
        generation,
        role = %stats.role,
        best = stats.best_evaluation,
        mean = stats.mean_evaluation,
        degenerate,
        "fitness computed"
    );
    (genomes, stats)
}

/// Drives the runner and catcher populations through their generations
#[derive(Debug)]
pub struct GeneticAlgorithm {
    structure: Structure,
    strategy: StrategyKind,
    probabilities: ProbStatic,
    mutation_degree: f64,
    runners: Population,
    catchers: Population,
    generation: usize,
    phase: Phase,
}

impl GeneticAlgorithm {
    /// Build both initial populations, loading up to `config.load_count` genomes per role from
    /// `source` and randomizing the rest.
    pub fn new(
        config: &GeneticConfig,
        source: &mut impl GenomeSource,
        rng: &mut impl RngCore,
    ) -> Result<Self> {
        config.validate()?;
        let structure = config.structure()?;
        let weight_count = structure.weight_count();
        let mut init = |role, target| {
            population_init(
                role,
                target,
                weight_count,
                config.init_range,
                config.load_count,
                &mut *source,
                &mut *rng,
            )
        };
        let runners = init(Role::Runner, config.runners)?;
        let catchers = init(Role::Catcher, config.catchers)?;

        Ok(Self {
            structure,
            strategy: config.strategy,
            probabilities: ProbStatic::from_config(config),
            mutation_degree: config.mutation_degree,
            runners,
            catchers,
            generation: 1,
            phase: Phase::Initialized,
        })
    }

    /// Serial number of the generation currently being evaluated, starting at 1
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn population(&self, role: Role) -> &Population {
        match role {
            Role::Runner => &self.runners,
            Role::Catcher => &self.catchers,
        }
    }

    pub fn genomes(&self, role: Role) -> &[Genome] {
        self.population(role).genomes()
    }

    fn transition(&mut self, phase: Phase) {
        trace!(generation = self.generation, ?phase, "phase");
        self.phase = phase;
    }

    /// Start evaluating the current generation. Every genome begins a new life with its scores
    /// cleared.
    pub fn begin_round(&mut self) -> Round<'_> {
        self.runners.begin_round();
        self.catchers.begin_round();
        self.transition(Phase::Evaluating);
        Round {
            generation: self.generation,
            structure: &self.structure,
            runners: &mut self.runners,
            catchers: &mut self.catchers,
        }
    }

    /// Run `f` over both populations, each with its own generator. With the `parallel` feature
    /// the two run concurrently; they share nothing, so results are the same either way.
    fn each_role<T: Send>(
        &mut self,
        rngs: &mut [GaRng; 2],
        f: impl Fn(&mut Population, &mut GaRng) -> T + Sync,
    ) -> [T; 2] {
        let [runner_rng, catcher_rng] = rngs;

        #[cfg(feature = "parallel")]
        let (runners, catchers) = rayon::join(
            || f(&mut self.runners, runner_rng),
            || f(&mut self.catchers, catcher_rng),
        );
        #[cfg(not(feature = "parallel"))]
        let (runners, catchers) = (
            f(&mut self.runners, runner_rng),
            f(&mut self.catchers, catcher_rng),
        );

        [runners, catchers]
    }

    /// Turn the evaluated generation into the next one. Fails, touching nothing, while any
    /// genome of the round is still missing its score or when `hook` fails, so the call may be
    /// retried.
    pub fn evaluation_finished(
        &mut self,
        rng: &mut impl RngCore,
        hook: &mut impl Hook,
    ) -> Result<[GenerationStats; 2]> {
        if self.phase != Phase::Evaluating {
            return Err(Error::InvalidArgument(format!(
                "no round is being evaluated (phase {:?})",
                self.phase
            )));
        }
        for pop in [&self.runners, &self.catchers] {
            let missing = pop.pending();
            if missing > 0 {
                return Err(Error::PendingEvaluation {
                    role: pop.role(),
                    missing,
                });
            }
        }

        // ranked on copies, so a failing hook leaves the round as the evaluator scored it
        let generation = self.generation;
        let (runners, runner_stats) = rank(&self.runners, generation);
        hook.fitness_computed(&runner_stats, &runners)?;
        let (catchers, catcher_stats) = rank(&self.catchers, generation);
        hook.fitness_computed(&catcher_stats, &catchers)?;

        self.runners.replace(runners);
        self.catchers.replace(catchers);
        self.transition(Phase::FitnessComputed);

        let mut rngs = [
            ProbBinding::new(self.probabilities, WyRng::fork(rng)),
            ProbBinding::new(self.probabilities, WyRng::fork(rng)),
        ];

        let strategy = self.strategy;
        self.each_role(&mut rngs, |pop, rng| {
            let selected = strategy.select(pop.genomes(), pop.target(), rng);
            pop.replace(selected);
        });
        self.transition(Phase::Selected);

        self.each_role(&mut rngs, |pop, rng| {
            let selected = core::mem::take(pop.genomes_mut());
            let next = strategy.combine(selected, pop.target(), rng);
            pop.replace(next);
        });
        self.transition(Phase::Recombined);

        let degree = self.mutation_degree;
        self.each_role(&mut rngs, |pop, rng| {
            mutate_except_elite(pop.genomes_mut(), degree, rng)
        });
        self.transition(Phase::Mutated);

        self.each_role(&mut rngs, |pop, rng| reshuffle(pop.genomes_mut(), rng));
        self.transition(Phase::Reshuffled);

        self.generation += 1;
        Ok([runner_stats, catcher_stats])
    }

    /// Alternate evaluation in `arena` and generation cycles until `target` is met
    pub fn evolve(
        &mut self,
        arena: &mut impl Arena,
        target: EvolutionTarget,
        rng: &mut impl RngCore,
        hook: &mut impl Hook,
    ) -> Result<()> {
        let mut completed = 0;
        while !target.satisfied(completed) {
            arena.on_generation_ready(&mut self.begin_round())?;
            self.evaluation_finished(rng, hook)?;
            completed += 1;
        }
        Ok(())
    }
}

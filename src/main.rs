use rand::{Rng, RngCore};
use runcatch::{
    population::Fresh, random::default_rng, Archive, Arena, Brain, DirSource, Error,
    EvolutionTarget, GenerationStats, GeneticAlgorithm, GeneticConfig, Genome, Hook, Role, Round,
    WyRng,
};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Steps a chase lasts when nobody gets caught
const STEPS: usize = 200;
const RUNNER_SPEED: f64 = 0.03;
const CATCHER_SPEED: f64 = 0.035;
const CATCH_RADIUS: f64 = 0.05;

/// A runner and a catcher loose on the unit square `[-1, 1]²`. Each sees the offset to the other,
/// its own position and the time left, and steers with a 2d velocity.
struct Chase {
    rng: WyRng,
}

impl Chase {
    const INPUTS: usize = 5;
    const OUTPUTS: usize = 2;

    fn sense(own: [f64; 2], other: [f64; 2], step: usize) -> [f64; 5] {
        [
            other[0] - own[0],
            other[1] - own[1],
            own[0],
            own[1],
            1. - step as f64 / STEPS as f64,
        ]
    }

    fn advance(pos: &mut [f64; 2], steer: &[f64], speed: f64) {
        for (p, v) in pos.iter_mut().zip(steer) {
            *p = (*p + v * speed).clamp(-1., 1.);
        }
    }

    /// Steps until the catch, or [STEPS] when the runner got away
    fn play(&mut self, runner: &mut Brain, catcher: &mut Brain) -> runcatch::Result<usize> {
        let mut r: [f64; 2] = [self.rng.random_range(-1. ..1.), self.rng.random_range(-1. ..1.)];
        let mut c = [-r[0], -r[1]];

        for step in 0..STEPS {
            if (r[0] - c[0]).hypot(r[1] - c[1]) < CATCH_RADIUS {
                return Ok(step);
            }
            let steer_r = runner.think(&Self::sense(r, c, step))?.to_vec();
            let steer_c = catcher.think(&Self::sense(c, r, step))?.to_vec();
            Self::advance(&mut r, &steer_r, RUNNER_SPEED);
            Self::advance(&mut c, &steer_c, CATCHER_SPEED);
        }
        Ok(STEPS)
    }
}

impl Arena for Chase {
    fn on_generation_ready(&mut self, round: &mut Round<'_>) -> runcatch::Result<()> {
        let structure = round.structure();
        if structure.inputs() != Self::INPUTS || structure.outputs() != Self::OUTPUTS {
            return Err(Error::InvalidStructure(format!(
                "the chase needs {} inputs and {} outputs, got {:?}",
                Self::INPUTS,
                Self::OUTPUTS,
                structure.layers()
            )));
        }

        let mut runners = round.brains(Role::Runner)?;
        let mut catchers = round.brains(Role::Catcher)?;
        if runners.is_empty() || catchers.is_empty() {
            return Err(Error::InvalidArgument(
                "the chase needs at least one runner and one catcher".to_owned(),
            ));
        }
        let mut survived = vec![(0, 0); runners.len()];
        let mut caught = vec![(0, 0); catchers.len()];

        // every brain plays at least once, the smaller side cycles
        for idx in 0..runners.len().max(catchers.len()) {
            let (ri, ci) = (idx % runners.len(), idx % catchers.len());
            let steps = self.play(&mut runners[ri], &mut catchers[ci])?;
            survived[ri].0 += steps;
            survived[ri].1 += 1;
            caught[ci].0 += STEPS - steps + 1;
            caught[ci].1 += 1;
        }

        for (brain, (total, games)) in runners.iter_mut().zip(survived) {
            brain.die(total as f64 / games as f64);
        }
        for (brain, (total, games)) in catchers.iter_mut().zip(caught) {
            brain.die(total as f64 / games as f64);
        }
        round.bury(runners.into_iter().chain(catchers))
    }
}

fn report(stats: &GenerationStats, _: &[Genome]) -> runcatch::Result<()> {
    info!(
        generation = stats.generation,
        role = %stats.role,
        best = stats.best_evaluation,
        mean = stats.mean_evaluation,
        "generation done"
    );
    Ok(())
}

fn run(
    ga: &mut GeneticAlgorithm,
    config: &GeneticConfig,
    rng: &mut WyRng,
    hook: &mut impl Hook,
) -> runcatch::Result<()> {
    let target = match config.generations {
        0 => EvolutionTarget::Unbounded,
        n => EvolutionTarget::Generation(n),
    };
    let mut arena = Chase {
        rng: WyRng::fork(rng),
    };
    ga.evolve(&mut arena, target, rng, hook)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => GeneticConfig::from_file(path)?,
        None => GeneticConfig::default(),
    };
    let seed = config.seed.unwrap_or_else(|| default_rng().next_u64());
    let mut rng = WyRng::seeded(seed);
    info!(
        seed,
        runners = config.runners,
        catchers = config.catchers,
        strategy = ?config.strategy,
        "starting"
    );

    let mut ga = match &config.load_dir {
        Some(dir) => GeneticAlgorithm::new(&config, &mut DirSource::new(dir), &mut rng)?,
        None => GeneticAlgorithm::new(&config, &mut Fresh, &mut rng)?,
    };

    match &config.save_dir {
        Some(dir) => {
            let archive = Archive::new(dir, config.save_count)?;
            config.to_file(archive.dir().join("config.json"))?;
            run(&mut ga, &config, &mut rng, &mut (archive, report))?
        }
        None => run(&mut ga, &config, &mut rng, &mut report)?,
    }

    info!(generation = ga.generation(), "done");
    Ok(())
}

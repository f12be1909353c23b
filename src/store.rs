//! Directory-backed persistence: one flat weight record per genome, named after its role and
//! slot, plus per-generation statistics as JSON lines.

use crate::{
    error::Result,
    population::{GenomeSource, Role},
    scenario::Hook,
    stats::GenerationStats,
    Genome,
};
use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

pub fn genome_file_name(role: Role, index: usize) -> String {
    format!("gene_{role}_{index}.txt")
}

/// Save the first `count` of `genomes` to individual files inside of a directory at `path`
pub fn population_to_files<P: AsRef<Path>>(
    path: P,
    role: Role,
    genomes: &[Genome],
    count: usize,
) -> Result<()> {
    fs::create_dir_all(path.as_ref())?;
    for (idx, genome) in genomes.iter().take(count).enumerate() {
        genome.to_file(path.as_ref().join(genome_file_name(role, idx)))?;
    }
    Ok(())
}

/// Loads initial genomes from a directory of `gene_<role>_<index>.txt` records. Slots without a
/// file are left to be randomized.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl GenomeSource for DirSource {
    fn load(&mut self, role: Role, index: usize) -> Result<Option<Genome>> {
        let path = self.dir.join(genome_file_name(role, index));
        if !path.is_file() {
            return Ok(None);
        }
        Genome::from_file(path).map(Some)
    }
}

/// A [Hook] recording every generation: statistics are appended to `statistics.jsonl`, and the
/// best `save_count` genomes of each role go to `Generation_<n>/`.
#[derive(Debug)]
pub struct Archive {
    dir: PathBuf,
    save_count: usize,
    stats: File,
}

impl Archive {
    pub fn new<P: Into<PathBuf>>(dir: P, save_count: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let stats = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("statistics.jsonl"))?;
        Ok(Self {
            dir,
            save_count,
            stats,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn generation_dir(&self, generation: usize) -> PathBuf {
        self.dir.join(format!("Generation_{generation}"))
    }
}

impl Hook for Archive {
    fn fitness_computed(&mut self, stats: &GenerationStats, sorted: &[Genome]) -> Result<()> {
        writeln!(self.stats, "{}", serde_json::to_string(stats)?)?;
        if self.save_count > 0 {
            let dir = self.generation_dir(stats.generation);
            population_to_files(&dir, stats.role, sorted, self.save_count)?;
            debug!(dir = %dir.display(), role = %stats.role, "saved best genomes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("runcatch-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_name() {
        assert_eq!("gene_Runner_0.txt", genome_file_name(Role::Runner, 0));
        assert_eq!("gene_Catcher_12.txt", genome_file_name(Role::Catcher, 12));
    }

    #[test]
    fn test_dir_source() {
        let dir = scratch("source");
        let genomes = vec![Genome::new(vec![1., 2.]), Genome::new(vec![3., 4.])];
        population_to_files(&dir, Role::Catcher, &genomes, 1).unwrap();

        let mut source = DirSource::new(&dir);
        assert_eq!(Some(genomes[0].clone()), source.load(Role::Catcher, 0).unwrap());
        assert_eq!(None, source.load(Role::Catcher, 1).unwrap());
        assert_eq!(None, source.load(Role::Runner, 0).unwrap());

        fs::write(dir.join(genome_file_name(Role::Runner, 0)), "1;two").unwrap();
        assert!(source.load(Role::Runner, 0).is_err());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_archive() {
        let dir = scratch("archive");
        let mut archive = Archive::new(&dir, 2).unwrap();
        let sorted = vec![
            Genome::new(vec![0.5]),
            Genome::new(vec![0.25]),
            Genome::new(vec![0.125]),
        ];
        let stats = GenerationStats::collect(4, Role::Runner, &sorted, true);
        archive.fitness_computed(&stats, &sorted).unwrap();

        let saved = archive.generation_dir(4);
        assert_eq!(
            sorted[1],
            Genome::from_file(saved.join("gene_Runner_1.txt")).unwrap()
        );
        assert!(!saved.join("gene_Runner_2.txt").exists());

        let lines = fs::read_to_string(dir.join("statistics.jsonl")).unwrap();
        let back: GenerationStats = serde_json::from_str(lines.trim()).unwrap();
        assert_eq!(stats, back);
        fs::remove_dir_all(dir).unwrap();
    }
}

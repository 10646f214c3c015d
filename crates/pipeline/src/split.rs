//! Reproducible train/test partitioning of geometry identifiers.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Which side of the partition a geometry landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Train,
    Test,
}

impl SplitKind {
    pub const ALL: [SplitKind; 2] = [SplitKind::Train, SplitKind::Test];

    pub fn dir_name(&self) -> &'static str {
        match self {
            SplitKind::Train => "Train",
            SplitKind::Test => "Test",
        }
    }
}

impl std::fmt::Display for SplitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SplitKind::Train => "train",
            SplitKind::Test => "test",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<String>,
    pub test: Vec<String>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn membership(&self, id: &str) -> Option<SplitKind> {
        if self.train.iter().any(|t| t == id) {
            Some(SplitKind::Train)
        } else if self.test.iter().any(|t| t == id) {
            Some(SplitKind::Test)
        } else {
            None
        }
    }

    pub fn ids(&self, kind: SplitKind) -> &[String] {
        match kind {
            SplitKind::Train => &self.train,
            SplitKind::Test => &self.test,
        }
    }
}

fn train_size(len: usize, train_fraction: f64) -> usize {
    // Float to int casts saturate, so fractions outside [0, 1] pin to an
    // empty or a full training side.
    ((len as f64 * train_fraction).floor() as usize).min(len)
}

fn cut(mut ids: Vec<String>, train_fraction: f64) -> (Vec<String>, Vec<String>) {
    let test = ids.split_off(train_size(ids.len(), train_fraction));
    (ids, test)
}

/// Shuffles `identifiers` with a generator seeded from `seed` and puts the
/// first `floor(len * train_fraction)` of them in the training set.
///
/// The result only depends on the seed, the fraction and the order of
/// `identifiers`; callers that list identifiers from disk should sort them
/// first. Identifiers are not deduplicated.
pub fn assign(identifiers: &[String], train_fraction: f64, seed: u64) -> Split {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ids = identifiers.to_vec();
    ids.shuffle(&mut rng);
    let (train, test) = cut(ids, train_fraction);
    Split { train, test }
}

/// Like [`assign`] but splits identifiers containing `marker` and the
/// remaining ones separately, so both keep the same train/test ratio.
///
/// Both groups are shuffled by the same generator, the unmarked group first.
pub fn assign_stratified(
    identifiers: &[String],
    train_fraction: f64,
    seed: u64,
    marker: &str,
) -> Split {
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut marked, mut unmarked): (Vec<String>, Vec<String>) = identifiers
        .iter()
        .cloned()
        .partition(|id| id.contains(marker));
    unmarked.shuffle(&mut rng);
    marked.shuffle(&mut rng);

    let (mut train, mut test) = cut(unmarked, train_fraction);
    let (marked_train, marked_test) = cut(marked, train_fraction);
    train.extend(marked_train);
    test.extend(marked_test);
    Split { train, test }
}

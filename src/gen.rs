//! Random expression generation.
//!
//! Trees are built top-down from a single random number generator,
//! so the same seed always gives the same tree.
//! Generation is recursive, which is why the depth is bounded by [`MAX_DEPTH`].

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::*;

/// The largest depth accepted by [`GenSettings::validate`].
pub const MAX_DEPTH: u32 = 24;

/// The default maximum number of arguments of variadic nodes.
pub const MAX_ARGS: usize = 4;

/// The largest maximum number of arguments accepted by [`GenSettings::validate`].
pub const ARGS_LIMIT: usize = 8;

/// Generates a tree of the classic grammar.
///
/// Leaves are reached at `max_depth` at the latest.
/// Nothing bounds `max_depth` here, use [`GenSettings`] for validated input.
pub fn generate<R: Rng + ?Sized>(max_depth: u32, rng: &mut R) -> Expr {
    GenSettings::new(max_depth).create(max_depth, rng)
}

/// Configuration for expression generation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenSettings {
    /// Maximum depth of the tree.
    pub max_depth: u32,
    /// Maximum number of arguments of `mul` and `avg`.
    pub max_args: usize,
    /// The kinds that are drawn from, uniformly.
    pub kinds: Vec<Kind>,
}

impl Default for GenSettings {
    fn default() -> GenSettings {GenSettings::new(4)}
}

impl GenSettings {
    /// Creates settings for the classic grammar.
    pub fn new(max_depth: u32) -> GenSettings {
        GenSettings {
            max_depth,
            max_args: MAX_ARGS,
            kinds: Kind::CLASSIC.to_vec(),
        }
    }

    /// Uses all known kinds, including `abs` and `pow`.
    pub fn extended(self) -> GenSettings {
        GenSettings {kinds: Kind::ALL.to_vec(), ..self}
    }

    /// Returns `true` if trees drawn with these settings stay in `[-1, 1]`.
    pub fn is_closed(&self) -> bool {
        !self.kinds.contains(&Kind::Pow)
    }

    /// Checks the settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth > MAX_DEPTH {
            return Err(Error::config(format!(
                "depth {} is larger than the maximum {}", self.max_depth, MAX_DEPTH)));
        }
        if self.max_args < 2 {
            return Err(Error::config(format!(
                "variadic nodes need at least 2 arguments, got a maximum of {}", self.max_args)));
        }
        if self.max_args > ARGS_LIMIT {
            return Err(Error::config(format!(
                "at most {} arguments are allowed for variadic nodes, got {}",
                ARGS_LIMIT, self.max_args)));
        }
        if self.kinds.is_empty() {
            return Err(Error::config("no kinds to generate from"));
        }
        Ok(())
    }

    /// Generates a tree.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Expr> {
        self.validate()?;
        Ok(self.create(self.max_depth, rng))
    }

    fn create<R: Rng + ?Sized>(&self, depth: u32, rng: &mut R) -> Expr {
        if depth == 0 {return variable(rng)}

        let depth = depth - 1;
        match self.kinds[rng.random_range(0..self.kinds.len())] {
            Kind::Variable => variable(rng),
            Kind::Multiply => Expr::Mul(self.create_args(depth, rng)),
            Kind::Average => Expr::Avg(self.create_args(depth, rng)),
            Kind::Sin => sin(self.create(depth, rng)),
            Kind::Cos => cos(self.create(depth, rng)),
            Kind::Abs => abs(self.create(depth, rng)),
            Kind::Pow => {
                let a = self.create(depth, rng);
                let b = self.create(depth, rng);
                pow(a, b)
            }
        }
    }

    fn create_args<R: Rng + ?Sized>(&self, depth: u32, rng: &mut R) -> Vec<Expr> {
        let n = rng.random_range(2..=self.max_args);
        (0..n).map(|_| self.create(depth, rng)).collect()
    }
}

fn variable<R: Rng + ?Sized>(rng: &mut R) -> Expr {
    if rng.random_bool(0.5) {x()} else {y()}
}

#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::fmt;
use std::path::Path;

use serde::{Serialize, Deserialize};

pub use error::{Error, Result};
pub use gen::{generate, GenSettings, MAX_DEPTH};
pub use render::{clamp_to_byte, Raster, RenderMethod};
pub use report::Report;
pub use settings::{Channels, Settings};

pub mod error;
pub mod gen;
pub mod grid;
pub mod pnm;
pub mod render;
pub mod report;
pub mod settings;

/// Stores expression of two variables (X and Y).
///
/// Fixed arities are enforced by the shape of the variants.
/// Variadic lists must hold at least two children, see [`Expr::check`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Expr {
    /// X.
    X,
    /// Y.
    Y,
    /// Product of all arguments.
    Mul(Vec<Expr>),
    /// Arithmetic mean of all arguments.
    Avg(Vec<Expr>),
    /// Sine of argument times pi.
    Sin(Box<Expr>),
    /// Cosine of argument times pi.
    Cos(Box<Expr>),
    /// Absolute function.
    Abs(Box<Expr>),
    /// First argument raised to the absolute value of the second.
    Pow(Box<(Expr, Expr)>),
}

/// The kind of a node, independent of its children.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// X or Y.
    Variable,
    /// Multiplication.
    Multiply,
    /// Average.
    Average,
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Absolute value.
    Abs,
    /// Power.
    Pow,
}

impl Kind {
    /// The kinds of the classic grammar.
    ///
    /// Trees built from these stay in `[-1, 1]` for inputs in `[-1, 1]`.
    pub const CLASSIC: [Kind; 5] = [
        Kind::Variable, Kind::Multiply, Kind::Average, Kind::Sin, Kind::Cos,
    ];

    /// All known kinds.
    pub const ALL: [Kind; 7] = [
        Kind::Variable, Kind::Multiply, Kind::Average, Kind::Sin, Kind::Cos,
        Kind::Abs, Kind::Pow,
    ];

    /// Gets the arity contract of the kind.
    pub fn arity(self) -> Arity {
        use Kind::*;

        match self {
            Variable => Arity::Fixed(0),
            Sin | Cos | Abs => Arity::Fixed(1),
            Pow => Arity::Fixed(2),
            Multiply | Average => Arity::Variadic {min: 2},
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Kind::*;

        let name = match self {
            Variable => "var",
            Multiply => "mul",
            Average => "avg",
            Sin => "sin",
            Cos => "cos",
            Abs => "abs",
            Pow => "pow",
        };
        w.write_str(name)
    }
}

/// Number of children a kind requires.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many children.
    Fixed(u8),
    /// At least `min` children.
    Variadic {
        /// The minimum number of children.
        min: usize,
    },
}

impl Arity {
    /// Returns `true` if `n` children satisfy the contract.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Fixed(k) => n == k as usize,
            Arity::Variadic {min} => n >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(w, "exactly {}", n),
            Arity::Variadic {min} => write!(w, "at least {}", min),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, w: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;

        match self {
            X => write!(w, "X")?,
            Y => write!(w, "Y")?,
            Mul(args) => {
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {write!(w, " * ")?};
                    write!(w, "{}", a)?;
                }
            }
            Avg(args) => {
                write!(w, "avg(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {write!(w, ", ")?};
                    write!(w, "{}", a)?;
                }
                write!(w, ")")?;
            }
            Sin(a) => write!(w, "sin(pi * {})", a)?,
            Cos(a) => write!(w, "cos(pi * {})", a)?,
            Abs(a) => write!(w, "abs({})", a)?,
            Pow(ab) => write!(w, "({} ^ {})", ab.0, ab.1)?,
        }
        Ok(())
    }
}

impl Expr {
    /// Gets the kind of the node.
    pub fn kind(&self) -> Kind {
        use Expr::*;

        match self {
            X | Y => Kind::Variable,
            Mul(_) => Kind::Multiply,
            Avg(_) => Kind::Average,
            Sin(_) => Kind::Sin,
            Cos(_) => Kind::Cos,
            Abs(_) => Kind::Abs,
            Pow(_) => Kind::Pow,
        }
    }

    /// Gets the arity contract of the node.
    pub fn arity(&self) -> Arity {self.kind().arity()}

    /// Evaluate at a 2D point.
    ///
    /// The point is passed down to every node and never stored,
    /// so a single tree can be evaluated from many threads at once.
    ///
    /// Panics on a `mul` or `avg` node with fewer than 2 children,
    /// use [`Expr::check`] first on trees that were not built by this crate.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        use Expr::*;

        match self {
            X => x,
            Y => y,
            Mul(args) => {
                assert_arity(Kind::Multiply, args.len());
                args.iter().fold(1.0, |acc, a| acc * a.eval(x, y))
            }
            Avg(args) => {
                assert_arity(Kind::Average, args.len());
                let sum = args.iter().fold(0.0, |acc, a| acc + a.eval(x, y));
                sum / args.len() as f64
            }
            Sin(a) => (std::f64::consts::PI * a.eval(x, y)).sin(),
            Cos(a) => (std::f64::consts::PI * a.eval(x, y)).cos(),
            Abs(a) => a.eval(x, y).abs(),
            Pow(ab) => ab.0.eval(x, y).powf(ab.1.eval(x, y).abs()),
        }
    }

    /// Checks that every node has a child count matching its arity.
    ///
    /// Returns the first violation found in depth-first order.
    pub fn check(&self) -> Result<()> {
        use Expr::*;

        match self {
            X | Y => Ok(()),
            Mul(args) | Avg(args) => {
                let expected = self.arity();
                if !expected.accepts(args.len()) {
                    return Err(Error::Structure {
                        kind: self.kind(),
                        expected,
                        actual: args.len(),
                    });
                }
                for a in args {a.check()?}
                Ok(())
            }
            Sin(a) | Cos(a) | Abs(a) => a.check(),
            Pow(ab) => {
                ab.0.check()?;
                ab.1.check()
            }
        }
    }

    /// Gets the length of the longest path from this node to a leaf.
    ///
    /// A single variable has depth zero.
    pub fn depth(&self) -> u32 {
        use Expr::*;

        match self {
            X | Y => 0,
            Mul(args) | Avg(args) => 1 + args.iter().map(|a| a.depth()).max().unwrap_or(0),
            Sin(a) | Cos(a) | Abs(a) => 1 + a.depth(),
            Pow(ab) => 1 + ab.0.depth().max(ab.1.depth()),
        }
    }

    /// Counts the nodes of the tree.
    pub fn node_count(&self) -> usize {
        use Expr::*;

        match self {
            X | Y => 1,
            Mul(args) | Avg(args) => 1 + args.iter().map(|a| a.node_count()).sum::<usize>(),
            Sin(a) | Cos(a) | Abs(a) => 1 + a.node_count(),
            Pow(ab) => 1 + ab.0.node_count() + ab.1.node_count(),
        }
    }
}

fn assert_arity(kind: Kind, actual: usize) {
    let expected = kind.arity();
    assert!(expected.accepts(actual), "`{}` expects {} children, found {}", kind, expected, actual);
}

/// Evaluates a tree at a 2D point.
pub fn evaluate(expr: &Expr, x: f64, y: f64) -> f64 {expr.eval(x, y)}

/// X.
pub fn x() -> Expr {Expr::X}
/// Y.
pub fn y() -> Expr {Expr::Y}
/// Product of all arguments.
///
/// Panics with fewer than 2 arguments.
pub fn mul(args: Vec<Expr>) -> Expr {
    assert_arity(Kind::Multiply, args.len());
    Expr::Mul(args)
}
/// Average of all arguments.
///
/// Panics with fewer than 2 arguments.
pub fn avg(args: Vec<Expr>) -> Expr {
    assert_arity(Kind::Average, args.len());
    Expr::Avg(args)
}
/// `sin(pi * a)`.
pub fn sin(a: Expr) -> Expr {Expr::Sin(Box::new(a))}
/// `cos(pi * a)`.
pub fn cos(a: Expr) -> Expr {Expr::Cos(Box::new(a))}
/// `abs(a)`.
pub fn abs(a: Expr) -> Expr {Expr::Abs(Box::new(a))}
/// `a ^ abs(b)`.
pub fn pow(a: Expr, b: Expr) -> Expr {Expr::Pow(Box::new((a, b)))}
/// Square of an expression.
pub fn square(a: Expr) -> Expr {mul(vec![a.clone(), a])}

/// The fixed expression used for checking grayscale output by eye.
///
/// `sin(pi * sin(pi * sin(pi * sin(pi * sin(pi * sin(pi * sin(pi * cos(pi * Y))))) *
/// cos(pi * sin(pi * cos(pi * avg(sin(pi * Y), X * X)))))))`
pub fn grayscale_test() -> Expr {
    sin(sin(sin(mul(vec![
        sin(sin(sin(sin(cos(y()))))),
        cos(sin(cos(avg(vec![sin(y()), square(x())])))),
    ]))))
}

/// A set of channel trees together with the image size they were made for.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Art {
    /// Width and height of the image.
    pub size: [u32; 2],
    /// One tree per channel.
    pub trees: Vec<Expr>,
}

impl Art {
    /// Gets the text form of every tree.
    pub fn texts(&self) -> Vec<String> {
        self.trees.iter().map(|t| t.to_string()).collect()
    }
}

/// Save to file.
pub fn save<P: AsRef<Path>>(file: P, art: &Art) -> Result<()> {
    use std::fs::File;
    use std::io::Write;

    let mut file = File::create(file)?;
    let encoded: Vec<u8> = bincode::serialize(art)?;
    file.write_all(&encoded)?;
    Ok(())
}

/// Open file.
///
/// Every loaded tree is checked before it is returned,
/// including its depth against [`MAX_DEPTH`].
pub fn open<P: AsRef<Path>>(file: P) -> Result<Art> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(file)?;
    let mut decoded: Vec<u8> = vec![];
    file.read_to_end(&mut decoded)?;
    let art: Art = bincode::deserialize(&decoded)?;
    for tree in &art.trees {
        tree.check()?;
        if tree.depth() > MAX_DEPTH {
            return Err(Error::config(format!(
                "stored tree of depth {} is deeper than the maximum {}", tree.depth(), MAX_DEPTH)));
        }
    }
    Ok(art)
}

//! Raster pipeline.
//!
//! Trees are checked once up front and then only read,
//! so rows can be evaluated on any number of threads without locking.

use rand::Rng;

use crate::*;
use crate::grid::Grid2;

/// Maps a value in `[-1, 1]` to a byte.
///
/// Computes `round((v + 1) * 255 / 2)` rounding half away from zero,
/// so `-1 -> 0`, `0 -> 128` and `1 -> 255`.
/// Values outside the range are clamped, NaN maps to 0.
pub fn clamp_to_byte(v: f64) -> u8 {
    if v.is_nan() {return 0};
    ((v + 1.0) * 255.0 / 2.0).round().clamp(0.0, 255.0) as u8
}

/// Dense intensity matrix of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color mode.
    pub channels: Channels,
    /// Samples in row-major order with channels interleaved, `H x W x C`.
    pub data: Vec<u8>,
    /// Number of samples that evaluated to NaN or infinity.
    pub degenerate: usize,
}

impl Raster {
    /// Creates a black raster.
    pub fn new(width: u32, height: u32, channels: Channels) -> Raster {
        Raster {
            width,
            height,
            channels,
            data: vec![0; width as usize * height as usize * channels.count()],
            degenerate: 0,
        }
    }

    /// Gets the number of samples in one row.
    pub fn row_len(&self) -> usize {self.width as usize * self.channels.count()}

    /// Gets the samples of row `j`.
    pub fn row(&self, j: u32) -> &[u8] {
        let n = self.row_len();
        &self.data[j as usize * n..(j as usize + 1) * n]
    }

    /// Gets channel `c` of the pixel at column `i` and row `j`.
    pub fn get(&self, i: u32, j: u32, c: usize) -> u8 {
        self.row(j)[i as usize * self.channels.count() + c]
    }

    /// Converts to an image.
    #[cfg(feature = "render")]
    pub fn to_image(&self) -> Result<image::DynamicImage> {
        use image::{DynamicImage, GrayImage, RgbImage};

        let data = self.data.clone();
        let img = match self.channels {
            Channels::Gray => GrayImage::from_raw(self.width, self.height, data)
                .map(DynamicImage::ImageLuma8),
            Channels::Rgb => RgbImage::from_raw(self.width, self.height, data)
                .map(DynamicImage::ImageRgb8),
        };
        img.ok_or_else(|| anyhow::anyhow!(
            "raster of {} samples does not fit {}x{}", self.data.len(), self.width, self.height
        ).into())
    }

    /// Saves to an image file, the format is picked from the extension.
    #[cfg(feature = "render")]
    pub fn save<P: AsRef<std::path::Path>>(&self, file: P) -> Result<()> {
        self.to_image()?.save(file).map_err(anyhow::Error::new)?;
        Ok(())
    }
}

/// Specifies how pixels are evaluated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMethod {
    /// Evaluate rows in order on the current thread.
    Single {
        /// How often progress is logged.
        report: Report,
    },
    /// Evaluate rows in parallel using Rayon.
    #[cfg(feature = "render")]
    Parallel {
        /// Number of worker threads, `None` uses the global pool.
        threads: Option<usize>,
    },
}

impl Default for RenderMethod {
    #[cfg(feature = "render")]
    fn default() -> RenderMethod {RenderMethod::Parallel {threads: None}}
    #[cfg(not(feature = "render"))]
    fn default() -> RenderMethod {RenderMethod::Single {report: Report::default()}}
}

/// Generates one tree per channel from a single random stream.
pub fn gen_art<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Result<Art> {
    settings.validate()?;
    let names = settings.channels.names();
    let mut trees = Vec::with_capacity(names.len());
    for &channel in names {
        let tree = settings.gen.generate(rng)?;
        tracing::debug!(channel, depth = tree.depth(), nodes = tree.node_count(), "{}", tree);
        trees.push(tree);
    }
    Ok(Art {size: [settings.width, settings.height], trees})
}

/// Generates trees and renders them.
pub fn run(settings: &Settings, method: RenderMethod) -> Result<(Art, Raster)> {
    let ref mut rng = settings.rng();
    let art = gen_art(settings, rng)?;
    let raster = render(&art, method)?;
    Ok((art, raster))
}

/// Renders art.
pub fn render(art: &Art, method: RenderMethod) -> Result<Raster> {
    match method {
        RenderMethod::Single {report} => gen_to_raster(&art.trees, art.size, report),
        #[cfg(feature = "render")]
        RenderMethod::Parallel {threads} => par_gen_to_raster(&art.trees, art.size, threads),
    }
}

/// Render to raster using single thread.
#[tracing::instrument(skip(trees, report))]
pub fn gen_to_raster(trees: &[Expr], size: [u32; 2], report: Report) -> Result<Raster> {
    let mut raster = prepare(trees, size)?;
    let grid = Grid2(size);
    let xs = grid.xs();
    let label = raster.channels.names().join("/");
    let n = raster.row_len();
    let ref mut rs = report.start();
    let mut degenerate = 0;
    for (j, row) in raster.data.chunks_mut(n).enumerate() {
        let j = j as u32;
        report.progress(rs, &label, j, size[1]);
        degenerate += render_row(trees, &xs, grid.y(j), row);
    }
    finish(&mut raster, degenerate);
    Ok(raster)
}

/// Render to raster using Rayon.
#[cfg(feature = "render")]
#[tracing::instrument(skip(trees))]
pub fn par_gen_to_raster(
    trees: &[Expr],
    size: [u32; 2],
    threads: Option<usize>
) -> Result<Raster> {
    use rayon::prelude::*;

    let mut raster = prepare(trees, size)?;
    let grid = Grid2(size);
    let xs = grid.xs();
    let n = raster.row_len();
    let data = &mut raster.data;
    let mut rows = || -> usize {
        data.par_chunks_mut(n)
            .enumerate()
            .map(|(j, row)| render_row(trees, &xs, grid.y(j as u32), row))
            .sum()
    };
    let degenerate = match threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(anyhow::Error::new)?;
            pool.install(rows)
        }
        None => rows(),
    };
    finish(&mut raster, degenerate);
    Ok(raster)
}

fn prepare(trees: &[Expr], size: [u32; 2]) -> Result<Raster> {
    if size[0] < 2 || size[1] < 2 {
        return Err(Error::config(format!(
            "image must be at least 2x2 pixels, got {}x{}", size[0], size[1])));
    }
    let channels = match trees.len() {
        1 => Channels::Gray,
        3 => Channels::Rgb,
        n => return Err(Error::config(format!("unsupported channel count {}", n))),
    };
    for tree in trees {tree.check()?}
    Ok(Raster::new(size[0], size[1], channels))
}

fn finish(raster: &mut Raster, degenerate: usize) {
    raster.degenerate = degenerate;
    if degenerate > 0 {
        tracing::warn!(degenerate, "clamped non-finite samples");
    }
}

/// Evaluates every tree for one row, returns the number of non-finite samples.
fn render_row(trees: &[Expr], xs: &[f64], y: f64, row: &mut [u8]) -> usize {
    let c = trees.len();
    let mut degenerate = 0;
    for (i, &x) in xs.iter().enumerate() {
        for (k, tree) in trees.iter().enumerate() {
            let v = tree.eval(x, y);
            if !v.is_finite() {degenerate += 1};
            row[i * c + k] = clamp_to_byte(v);
        }
    }
    degenerate
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn single() -> RenderMethod {RenderMethod::Single {report: Report::None}}

    #[test]
    fn byte_mapping() {
        assert_eq!(clamp_to_byte(-1.0), 0);
        assert_eq!(clamp_to_byte(0.0), 128);
        assert_eq!(clamp_to_byte(1.0), 255);
        assert_eq!(clamp_to_byte(0.5), 191);
        assert_eq!(clamp_to_byte(-0.5), 64);
        assert_eq!(clamp_to_byte(-3.0), 0);
        assert_eq!(clamp_to_byte(7.5), 255);
        assert_eq!(clamp_to_byte(f64::NAN), 0);
        assert_eq!(clamp_to_byte(f64::INFINITY), 255);
        assert_eq!(clamp_to_byte(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn x_columns() {
        let art = Art {size: [3, 3], trees: vec![x()]};
        let raster = render(&art, single()).unwrap();
        assert_eq!(raster.channels, Channels::Gray);
        assert_eq!(raster.data.len(), 9);
        for j in 0..3 {
            assert_eq!(raster.row(j), &[0, 128, 255]);
        }
        assert_eq!(raster.degenerate, 0);
    }

    #[test]
    fn depth_zero_gray() {
        let settings = Settings {
            width: 3,
            height: 3,
            gen: GenSettings::new(0),
            seed: Some(5),
            ..Settings::default()
        };
        let (art, raster) = run(&settings, single()).unwrap();
        assert_eq!(art.trees.len(), 1);
        match art.trees[0] {
            Expr::X => for j in 0..3 {assert_eq!(raster.row(j), &[0, 128, 255])},
            Expr::Y => for j in 0..3 {
                let v = [0u8, 128, 255][j as usize];
                assert_eq!(raster.row(j), &[v; 3]);
            },
            ref e => panic!("unexpected {}", e),
        }
    }

    #[test]
    fn rgb_interleaved() {
        let art = Art {size: [3, 3], trees: vec![x(), y(), avg(vec![x(), y()])]};
        let raster = render(&art, single()).unwrap();
        assert_eq!(raster.channels, Channels::Rgb);
        assert_eq!(raster.data.len(), 27);
        assert_eq!(raster.row_len(), 9);
        assert_eq!(raster.get(2, 0, 0), 255);
        assert_eq!(raster.get(2, 0, 1), 0);
        assert_eq!(raster.get(2, 0, 2), 128);
        assert_eq!(raster.get(0, 2, 0), 0);
        assert_eq!(raster.get(0, 2, 1), 255);
        assert_eq!(raster.get(1, 1, 2), 128);
    }

    #[test]
    fn degenerate_samples_are_counted() {
        let art = Art {size: [5, 5], trees: vec![pow(x(), y())]};
        let raster = render(&art, single()).unwrap();
        assert_eq!(raster.degenerate, 4);
        assert_eq!(raster.get(0, 1, 0), 0);
        assert_eq!(raster.get(1, 3, 0), 0);
    }

    #[test]
    fn rejects_bad_input() {
        let art = Art {size: [3, 3], trees: vec![x(), y()]};
        assert!(matches!(render(&art, single()), Err(Error::Config(_))));

        let art = Art {size: [1, 3], trees: vec![x()]};
        assert!(matches!(render(&art, single()), Err(Error::Config(_))));

        let art = Art {size: [3, 3], trees: vec![x(), Expr::Avg(vec![]), y()]};
        assert!(matches!(render(&art, single()), Err(Error::Structure {kind: Kind::Average, ..})));

        let settings = Settings::new(1, 1);
        assert!(matches!(run(&settings, single()), Err(Error::Config(_))));
    }

    #[test]
    fn seeded_runs_repeat() {
        let settings = Settings {
            width: 16,
            height: 9,
            channels: Channels::Rgb,
            gen: GenSettings::new(5).extended(),
            seed: Some(2012),
        };
        let (art1, raster1) = run(&settings, single()).unwrap();
        let (art2, raster2) = run(&settings, single()).unwrap();
        assert_eq!(art1, art2);
        assert_eq!(raster1, raster2);
        assert_eq!(art1.trees.len(), 3);
    }

    #[cfg(feature = "render")]
    #[test]
    fn parallel_matches_single() {
        let mut rng = StdRng::seed_from_u64(99);
        let settings = Settings {
            width: 31,
            height: 17,
            channels: Channels::Rgb,
            gen: GenSettings::new(7).extended(),
            seed: None,
        };
        for _ in 0..10 {
            let art = gen_art(&settings, &mut rng).unwrap();
            let a = render(&art, single()).unwrap();
            let b = render(&art, RenderMethod::Parallel {threads: None}).unwrap();
            let c = render(&art, RenderMethod::Parallel {threads: Some(3)}).unwrap();
            assert_eq!(a, b);
            assert_eq!(a, c);
        }

        let art = Art {size: [64, 48], trees: vec![grayscale_test()]};
        let a = render(&art, RenderMethod::Single {report: Report::Row(8)}).unwrap();
        let b = render(&art, RenderMethod::Parallel {threads: Some(4)}).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn concurrent_eval_matches_sequential() {
        use std::sync::Arc;
        use std::thread;

        let mut rng = StdRng::seed_from_u64(4);
        let tree = Arc::new(GenSettings::new(8).extended().generate(&mut rng).unwrap());
        let grid = Grid2([41, 41]);
        let points: Vec<[f64; 2]> = (0..41)
            .flat_map(|j| (0..41).map(move |i| [grid.x(i), grid.y(j)]))
            .collect();
        let expected: Vec<u64> = points.iter().map(|p| tree.eval(p[0], p[1]).to_bits()).collect();
        let points = Arc::new(points);

        let mut handles = vec![];
        for t in 0..8 {
            let tree = Arc::clone(&tree);
            let points = Arc::clone(&points);
            handles.push(thread::spawn(move || {
                // Each thread walks the points in a different order.
                let n = points.len();
                let mut res = vec![0; n];
                for k in 0..n {
                    let idx = (k * 7 + t * 13) % n;
                    res[idx] = tree.eval(points[idx][0], points[idx][1]).to_bits();
                }
                res
            }));
        }
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[cfg(feature = "render")]
    #[test]
    fn to_image() {
        let art = Art {size: [4, 2], trees: vec![x(), y(), x()]};
        let raster = render(&art, single()).unwrap();
        let img = raster.to_image().unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 0).0, [255, 0, 255]);

        let art = Art {size: [4, 2], trees: vec![y()]};
        let img = render(&art, single()).unwrap().to_image().unwrap();
        assert_eq!(img.color(), image::ColorType::L8);
    }
}

//! Plain text PNM output.
//!
//! Gray rasters are written as `P2` and color rasters as `P3`.
//! The text of every channel expression is kept in a header comment.

use std::io::{self, Write};
use std::path::Path;

use crate::*;

/// Gets the magic number of the format.
pub fn magic(channels: Channels) -> &'static str {
    match channels {
        Channels::Gray => "P2",
        Channels::Rgb => "P3",
    }
}

/// Gets the usual file extension of the format, without the dot.
pub fn extension(channels: Channels) -> &'static str {
    match channels {
        Channels::Gray => "pgm",
        Channels::Rgb => "ppm",
    }
}

/// Writes a raster.
///
/// Every pixel row becomes one line, each sample followed by a space.
pub fn write<W: Write>(w: &mut W, raster: &Raster, comments: &[String]) -> io::Result<()> {
    writeln!(w, "{}", magic(raster.channels))?;
    for comment in comments {
        // Comments end at the line break.
        for line in comment.lines() {writeln!(w, "# {}", line)?}
    }
    writeln!(w, "{} {}", raster.width, raster.height)?;
    writeln!(w, "255")?;
    for j in 0..raster.height {
        for sample in raster.row(j) {write!(w, "{} ", sample)?}
        writeln!(w)?;
    }
    Ok(())
}

/// Saves a raster to file, with the expressions as comments.
pub fn save<P: AsRef<Path>>(file: P, raster: &Raster, comments: &[String]) -> Result<()> {
    let mut w = io::BufWriter::new(std::fs::File::create(file)?);
    write(&mut w, raster, comments)?;
    w.flush()?;
    Ok(())
}

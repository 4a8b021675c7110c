use randart::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let art = Art {size: [301, 301], trees: vec![grayscale_test()]};
    println!("{}", art.trees[0]);

    let raster = render::render(&art, RenderMethod::Single {report: Report::Row(50)})?;
    pnm::save("grayscale-test.pgm", &raster, &art.texts())?;
    raster.save("grayscale-test.png")?;
    Ok(())
}

//! Runs the default step-size scan and plots the three error curves.
//!
//! This binary is the plotting collaborator of the study: the library hands
//! it the curves and the delta axis, and it renders them as labeled lines.

use metroscan::scan::{DeltaScan, ScanConfig};

use plotters::prelude::*;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    const SEED: u64 = 42;

    let config = ScanConfig::default().set_seed(SEED);
    let scan = DeltaScan::new(config);
    let curves = scan.run_progress()?;

    println!("Scanned {} step sizes", curves.len());
    for (delta, err) in &curves.failures {
        eprintln!("delta {delta}: {err}");
    }
    if curves.is_empty() {
        return Err("no step size produced a curve point".into());
    }

    let x_min = curves.deltas.first().copied().unwrap_or(0.0);
    let x_max = curves.deltas.last().copied().unwrap_or(1.0);
    let y_max = curves
        .rms_difference
        .iter()
        .chain(&curves.rms_average)
        .chain(&curves.last_run_stde)
        .fold(0.0f64, |acc, &y| acc.max(y));

    let root = BitMapBackend::new("errors.png", (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Different errors as a function of delta for metropolis integral",
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Delta")
        .y_desc("errors")
        .draw()?;

    let series: [(&[f64], RGBColor, &str); 3] = [
        (&curves.rms_difference, RED, "RMS Difference"),
        (&curves.rms_average, BLUE, "RMS averages"),
        (&curves.last_run_stde, BLACK, "Standard errors"),
    ];
    for (values, color, label) in series {
        chart
            .draw_series(LineSeries::new(
                curves.deltas.iter().copied().zip(values.iter().copied()),
                &color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .draw()?;

    println!("Saved error curves to errors.png");
    Ok(())
}

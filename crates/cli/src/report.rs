use permap_core::{ChangeNotification, Simulation};

/// Print the map positions and survey scores for one year.
pub fn print_year(sim: &Simulation, year: usize, changes: &[ChangeNotification]) {
    let t = year as f64;
    println!();
    println!("== Year {year} ==");

    println!("{:<14} {:>8} {:>8} {:>8} {:>8}", "segment", "perf", "size", "ideal-p", "ideal-s");
    for segment in sim.segments() {
        let centroid = segment.location(t);
        let ideal = segment.ideal_spot(t);
        println!(
            "{:<14} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
            segment.name(),
            centroid.performance,
            centroid.size,
            ideal.performance,
            ideal.size
        );
    }

    println!();
    for change in changes.iter().filter(|c| !c.is_time_change) {
        println!(
            "edited {} -> ({:.2}, {:.2}), age {:.1}",
            change.entity_name, change.coords.performance, change.coords.size, change.age
        );
    }

    let mut header = format!("{:<10} {:>8} {:>8} {:>5}", "product", "perf", "size", "age");
    for segment in sim.segments() {
        header.push_str(&format!(" {:>12}", segment.name()));
    }
    header.push_str(&format!(" {:>12}", "best"));
    println!("{header}");

    for product in sim.products().iter().filter(|p| p.is_alive()) {
        let (Ok(coords), Ok(age)) = (product.coords(Some(year)), product.age(Some(year))) else {
            continue;
        };
        let mut line = format!(
            "{:<10} {:>8.2} {:>8.2} {:>5.1}",
            product.name(),
            coords.performance,
            coords.size,
            age
        );
        for segment in sim.segments() {
            match permap_core::score(product, segment, year) {
                Ok(score) => line.push_str(&format!(" {:>12.3}", score)),
                Err(err) => {
                    tracing::warn!(
                        product = %product.name(),
                        segment = %segment.name(),
                        year,
                        "cannot score: {err}"
                    );
                    line.push_str(&format!(" {:>12}", "n/a"));
                }
            }
        }
        let best = match sim.best_segment(product.name(), year) {
            Ok(Some(card)) => card.segment,
            Ok(None) => "-".to_string(),
            Err(err) => {
                tracing::warn!(
                    product = %product.name(),
                    year,
                    "cannot pick best segment: {err}"
                );
                "n/a".to_string()
            }
        };
        line.push_str(&format!(" {:>12}", best));
        println!("{line}");
    }
}

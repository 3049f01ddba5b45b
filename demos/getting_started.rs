use geo::{Polygon, Rect, coord};
use geo_grid_index::{GridConfig, GridIndexBuilder, Point};

/// A land parcel with an owner and a footprint.
struct Parcel {
    owner: &'static str,
    footprint: Polygon,
}

fn parcel(owner: &'static str, x0: f64, y0: f64, x1: f64, y1: f64) -> Parcel {
    Parcel {
        owner,
        footprint: Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see build statistics)
    env_logger::init();

    println!("=== Grid Index - Getting Started ===\n");

    let parcels = vec![
        parcel("Ada", 0.0, 0.0, 1.0, 1.0),
        parcel("Grace", 5.0, 5.0, 6.0, 6.0),
        parcel("Edsger", 10.0, 10.0, 11.0, 11.0),
    ];

    let index = GridIndexBuilder::new()
        .config(GridConfig::new(10, 10))
        .build_fn(parcels, |p| p.footprint.clone())?;

    let stats = index.stats();
    println!(
        "Indexed {} parcels into {} cell entries ({} of {} cells occupied)\n",
        stats.records, stats.entries, stats.occupied_cells, stats.total_cells
    );

    // === NEAREST OBJECT ===
    println!("1. Nearest parcel");
    println!("-----------------");
    for p in [Point::new(0.5, 0.5), Point::new(3.5, 3.5), Point::new(30.0, -4.0)] {
        match index.nearest_object(&p, None) {
            Some((distance, parcel)) => println!(
                "   ({}, {}) -> {} at distance {:.3}",
                p.x(),
                p.y(),
                parcel.owner,
                distance
            ),
            None => println!("   ({}, {}) -> nothing nearby", p.x(), p.y()),
        }
    }

    // A capped search trades exactness for bounded cost.
    let capped = index.min_distance(&Point::new(3.0, 8.0), Some(1));
    println!("   capped search from (3, 8): {:?}\n", capped);

    // === CONTAINMENT ===
    println!("2. Parcel under a point");
    println!("-----------------------");
    for p in [Point::new(5.5, 5.5), Point::new(20.0, 20.0)] {
        let owner = index.object_on_point(&p).map(|parcel| parcel.owner);
        println!("   ({}, {}) -> {:?}", p.x(), p.y(), owner);
    }

    Ok(())
}

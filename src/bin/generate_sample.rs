//! Writes a synthetic listing file (`vehicles.csv` and `vehicles.parquet`)
//! with the full column set, including the gaps and junk cells real exports
//! carry.  Usage: `generate_sample [OUTPUT_STEM] [ROWS]`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use car_sales_dash::data::schema;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for &(item, w) in items {
            if roll < w {
                return item;
            }
            roll -= w;
        }
        items[items.len() - 1].0
    }
}

// Weights skew toward a few common makes so the rare-group filter has
// something to remove.
const MANUFACTURERS: [(&str, f64); 14] = [
    ("ford", 24.0),
    ("chevrolet", 21.0),
    ("toyota", 11.0),
    ("ram", 7.0),
    ("honda", 7.0),
    ("nissan", 6.0),
    ("jeep", 6.0),
    ("gmc", 5.0),
    ("subaru", 4.0),
    ("hyundai", 3.0),
    ("kia", 2.0),
    ("bmw", 1.5),
    ("audi", 0.3),
    ("mercedes-benz", 0.2),
];
const TYPES: [(&str, f64); 9] = [
    ("SUV", 25.0),
    ("truck", 24.0),
    ("sedan", 23.0),
    ("pickup", 14.0),
    ("coupe", 4.0),
    ("wagon", 3.0),
    ("mini-van", 3.0),
    ("hatchback", 2.5),
    ("convertible", 1.5),
];
const CONDITIONS: [(&str, f64); 6] = [
    ("excellent", 48.0),
    ("good", 39.0),
    ("like new", 9.0),
    ("fair", 3.0),
    ("new", 0.5),
    ("salvage", 0.5),
];
const FUELS: [(&str, f64); 5] = [
    ("gas", 90.0),
    ("diesel", 7.0),
    ("hybrid", 1.5),
    ("other", 1.0),
    ("electric", 0.5),
];
const TRANSMISSIONS: [(&str, f64); 3] = [("automatic", 91.0), ("manual", 5.5), ("other", 3.5)];
const COLORS: [(&str, f64); 12] = [
    ("white", 24.0),
    ("black", 18.0),
    ("silver", 15.0),
    ("grey", 12.0),
    ("blue", 11.0),
    ("red", 10.0),
    ("green", 3.0),
    ("brown", 3.0),
    ("custom", 2.0),
    ("yellow", 1.0),
    ("orange", 0.5),
    ("purple", 0.5),
];

/// One synthetic listing; `None` is a missing cell.
struct Listing {
    price: Option<f64>,
    model_year: Option<f64>,
    odometer: Option<f64>,
    /// Non-numeric text written in place of the odometer reading (CSV only).
    odometer_junk: bool,
    manufacturer: Option<&'static str>,
    kind: Option<&'static str>,
    condition: &'static str,
    fuel: &'static str,
    transmission: &'static str,
    paint_color: Option<&'static str>,
    cylinders: Option<f64>,
    is_4wd: Option<f64>,
    days_listed: f64,
}

fn generate(rng: &mut SimpleRng) -> Listing {
    let kind = rng.weighted(&TYPES);
    let year = (2011.0 - rng.gauss(0.0, 6.0).abs()).round().max(1950.0);
    let age = 2019.0 - year;
    let odometer = (age * 12_500.0 + rng.gauss(0.0, 25_000.0)).abs().round();
    let condition = rng.weighted(&CONDITIONS);
    let condition_factor = match condition {
        "new" | "like new" => 1.25,
        "excellent" => 1.1,
        "good" => 1.0,
        "fair" => 0.7,
        _ => 0.4,
    };
    let base = match kind {
        "truck" | "pickup" => 24_000.0,
        "SUV" | "convertible" => 18_000.0,
        _ => 14_000.0,
    };
    let price = (base * condition_factor * 0.9f64.powf(age) + rng.gauss(0.0, 1_500.0)).max(1.0);
    let cylinders = match kind {
        "truck" | "pickup" => 8.0,
        "SUV" | "mini-van" => 6.0,
        _ => 4.0,
    };
    let is_4wd = matches!(kind, "truck" | "pickup" | "SUV") && rng.chance(0.8);

    Listing {
        price: (!rng.chance(0.01)).then_some(price.round()),
        model_year: (!rng.chance(0.07)).then_some(year),
        odometer: (!rng.chance(0.15)).then_some(odometer),
        odometer_junk: rng.chance(0.005),
        manufacturer: (!rng.chance(0.01)).then(|| rng.weighted(&MANUFACTURERS)),
        kind: (!rng.chance(0.02)).then_some(kind),
        condition,
        fuel: rng.weighted(&FUELS),
        transmission: rng.weighted(&TRANSMISSIONS),
        paint_color: (!rng.chance(0.18)).then(|| rng.weighted(&COLORS)),
        cylinders: (!rng.chance(0.10)).then_some(cylinders),
        // The source marks 4wd with 1 and leaves everything else blank.
        is_4wd: is_4wd.then_some(1.0),
        days_listed: (rng.next_f64() * 120.0).round(),
    }
}

fn fmt_num(v: Option<f64>) -> String {
    v.map(|v| format!("{v}")).unwrap_or_default()
}

fn write_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(schema::EXPECTED_COLUMNS)?;
    for l in listings {
        let odometer = if l.odometer_junk {
            "see description".to_string()
        } else {
            fmt_num(l.odometer)
        };
        writer.write_record([
            fmt_num(l.price),
            fmt_num(l.model_year),
            odometer,
            l.manufacturer.unwrap_or_default().to_string(),
            l.kind.unwrap_or_default().to_string(),
            l.condition.to_string(),
            l.fuel.to_string(),
            l.transmission.to_string(),
            l.paint_color.unwrap_or_default().to_string(),
            fmt_num(l.cylinders),
            fmt_num(l.is_4wd),
            fmt_num(Some(l.days_listed)),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, listings: &[Listing]) -> Result<()> {
    let num = |f: fn(&Listing) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(listings.iter().map(f).collect::<Vec<_>>()))
    };
    let text = |f: fn(&Listing) -> Option<&'static str>| -> ArrayRef {
        Arc::new(StringArray::from(listings.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        num(|l| l.price),
        num(|l| l.model_year),
        num(|l| l.odometer.filter(|_| !l.odometer_junk)),
        text(|l| l.manufacturer),
        text(|l| l.kind),
        text(|l| Some(l.condition)),
        text(|l| Some(l.fuel)),
        text(|l| Some(l.transmission)),
        text(|l| l.paint_color),
        num(|l| l.cylinders),
        num(|l| l.is_4wd),
        num(|l| Some(l.days_listed)),
    ];
    let fields: Vec<Field> = schema::EXPECTED_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
        .collect();
    let arrow_schema = Arc::new(Schema::new(fields));

    let batch =
        RecordBatch::try_new(arrow_schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, arrow_schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let stem = args.next().unwrap_or_else(|| "vehicles".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("row count '{n}' is not a number"))?,
        None => 5_000,
    };

    let mut rng = SimpleRng::new(42);
    let listings: Vec<Listing> = (0..rows).map(|_| generate(&mut rng)).collect();

    let csv_path = PathBuf::from(format!("{stem}.csv"));
    let parquet_path = PathBuf::from(format!("{stem}.parquet"));
    write_csv(&csv_path, &listings)?;
    write_parquet(&parquet_path, &listings)?;

    log::info!(
        "Wrote {rows} listings to {} and {}",
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

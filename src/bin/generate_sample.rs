//! Writes deterministic sample data: `data/superstore.csv` and `data/prices.csv`.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

const REGIONS: [(&str, &[&str]); 4] = [
    ("East", &["New York", "Pennsylvania", "Ohio", "Massachusetts"]),
    ("West", &["California", "Washington", "Arizona", "Colorado"]),
    ("Central", &["Texas", "Illinois", "Michigan", "Minnesota"]),
    ("South", &["Florida", "Georgia", "Kentucky", "Virginia"]),
];

const CATEGORIES: [(&str, &[&str]); 3] = [
    ("Furniture", &["Bookcases", "Chairs", "Furnishings", "Tables"]),
    ("Office Supplies", &["Binders", "Paper", "Storage", "Labels"]),
    ("Technology", &["Phones", "Machines", "Accessories", "Copiers"]),
];

const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_superstore(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut out = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    out.write_record([
        "Row ID",
        "Order Date",
        "Segment",
        "State",
        "Region",
        "Category",
        "Sub-Category",
        "Sales",
        "Profit",
    ])?;

    let first = NaiveDate::from_ymd_opt(2021, 1, 1).context("start date")?;
    let n_rows = 600;
    for row in 0..n_rows {
        let date = first + Duration::days((rng.next_f64() * 4.0 * 365.0) as i64);
        let (region, states) = rng.pick(&REGIONS);
        let state = rng.pick(states);
        let (category, subs) = rng.pick(&CATEGORIES);
        let sub = rng.pick(subs);
        let segment = rng.pick(&SEGMENTS);

        let base = match *category {
            "Technology" => 450.0,
            "Furniture" => 350.0,
            _ => 120.0,
        };
        let sales = (base * (0.2 + rng.next_f64() * 1.8)).max(1.0);
        let margin = match *sub {
            "Tables" | "Bookcases" => rng.gauss(-0.08, 0.15),
            "Copiers" | "Labels" | "Paper" => rng.gauss(0.3, 0.1),
            _ => rng.gauss(0.12, 0.15),
        };

        out.write_record([
            (row + 1).to_string(),
            date.format("%m/%d/%Y").to_string(),
            segment.to_string(),
            state.to_string(),
            region.to_string(),
            category.to_string(),
            sub.to_string(),
            format!("{sales:.2}"),
            format!("{:.4}", sales * margin),
        ])?;
    }
    out.flush()?;
    Ok(n_rows)
}

fn write_prices(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut out = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    out.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;

    let mut date = NaiveDate::from_ymd_opt(2019, 1, 2).context("start date")?;
    let last = NaiveDate::from_ymd_opt(2024, 12, 31).context("end date")?;
    let mut close: f64 = 150.0;
    let mut n = 0;
    while date <= last {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let open = close * (1.0 + rng.gauss(0.0, 0.004));
            close = (open * (1.0 + rng.gauss(0.0004, 0.015))).max(1.0);
            let high = open.max(close) * (1.0 + rng.next_f64() * 0.01);
            let low = open.min(close) * (1.0 - rng.next_f64() * 0.01);
            let volume = (rng.gauss(60_000_000.0, 15_000_000.0)).max(1_000_000.0) as u64;
            out.write_record([
                date.to_string(),
                format!("{open:.2}"),
                format!("{high:.2}"),
                format!("{low:.2}"),
                format!("{close:.2}"),
                volume.to_string(),
            ])?;
            n += 1;
        }
        date += Duration::days(1);
    }
    out.flush()?;
    Ok(n)
}

/// Write both sample files into `dir`, returning the order and bar counts.
fn write_samples(dir: &Path) -> Result<(usize, usize)> {
    let mut rng = SimpleRng::new(42);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let orders = write_superstore(&dir.join("superstore.csv"), &mut rng)?;
    let bars = write_prices(&dir.join("prices.csv"), &mut rng)?;
    Ok((orders, bars))
}

fn main() -> Result<()> {
    let dir = Path::new("data");
    let (orders, bars) = write_samples(dir)?;
    println!("Wrote {orders} orders to {}", dir.join("superstore.csv").display());
    println!("Wrote {bars} price bars to {}", dir.join("prices.csv").display());
    Ok(())
}

//! Writes a synthetic bank-marketing campaign file for trying the dashboard
//! without the real export.
//!
//! Usage: `generate_sample [OUTPUT] [ROWS]`.  A `.parquet` output is written
//! with Arrow; anything else as `;`-separated text.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const JOBS: [(&str, f64); 12] = [
    ("admin.", 0.25),
    ("blue-collar", 0.22),
    ("technician", 0.16),
    ("services", 0.10),
    ("management", 0.07),
    ("retired", 0.04),
    ("entrepreneur", 0.035),
    ("self-employed", 0.035),
    ("housemaid", 0.025),
    ("unemployed", 0.025),
    ("student", 0.02),
    ("unknown", 0.01),
];
const MARITAL: [(&str, f64); 3] = [("married", 0.6), ("single", 0.28), ("divorced", 0.12)];
const MONTHS: [(&str, f64); 10] = [
    ("mar", 0.01),
    ("apr", 0.06),
    ("may", 0.33),
    ("jun", 0.13),
    ("jul", 0.17),
    ("aug", 0.15),
    ("sep", 0.01),
    ("oct", 0.02),
    ("nov", 0.10),
    ("dec", 0.02),
];

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

    /// Pick from `(value, weight)` pairs; weights need not sum to one.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|c| c.1).sum();
        let mut target = self.next_f64() * total;
        for &(value, weight) in choices {
            if target < weight {
                return value;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }
}

/// Column-oriented campaign table.
#[derive(Default)]
struct Campaign {
    age: Vec<i64>,
    job: Vec<&'static str>,
    marital: Vec<&'static str>,
    month: Vec<&'static str>,
    duration: Vec<i64>,
    campaign: Vec<i64>,
    pdays: Vec<i64>,
    previous: Vec<i64>,
    euribor3m: Vec<f64>,
    y: Vec<&'static str>,
}

const HEADER: [&str; 10] = [
    "age", "job", "marital", "month", "duration", "campaign", "pdays", "previous", "euribor3m", "y",
];

fn generate(rows: usize, rng: &mut SimpleRng) -> Campaign {
    let mut c = Campaign::default();
    for _ in 0..rows {
        let job = rng.weighted(&JOBS);
        let base_age = match job {
            "student" => 24.0,
            "retired" => 66.0,
            _ => 40.0,
        };
        let age = rng.gauss(base_age, 9.0).round().clamp(17.0, 98.0) as i64;
        let month = rng.weighted(&MONTHS);
        let duration = rng.gauss(250.0, 180.0).abs().round() as i64;
        let campaign = 1 + (rng.next_f64().powi(3) * 12.0) as i64;
        let contacted_before = rng.next_f64() < 0.1;
        let pdays = if contacted_before {
            (rng.next_f64() * 20.0) as i64
        } else {
            999
        };
        let previous = if contacted_before {
            1 + (rng.next_f64() * 3.0) as i64
        } else {
            0
        };
        let euribor3m = match month {
            "may" | "jun" | "jul" | "aug" => rng.gauss(4.5, 0.4),
            _ => rng.gauss(1.2, 0.5),
        }
        .max(0.6);

        // Longer calls, prior contact and the extremes of age convert better.
        let prior_bonus = if contacted_before { 1.5 } else { 0.0 };
        let age_bonus = if (25..=60).contains(&age) { 0.0 } else { 0.8 };
        let score =
            -3.2 + duration as f64 / 300.0 + prior_bonus + age_bonus - 0.3 * (euribor3m - 3.0);
        let subscribed = rng.next_f64() < 1.0 / (1.0 + (-score).exp());

        c.age.push(age);
        c.job.push(job);
        c.marital.push(rng.weighted(&MARITAL));
        c.month.push(month);
        c.duration.push(duration);
        c.campaign.push(campaign);
        c.pdays.push(pdays);
        c.previous.push(previous);
        c.euribor3m.push((euribor3m * 1000.0).round() / 1000.0);
        c.y.push(if subscribed { "yes" } else { "no" });
    }
    c
}

/// `;`-separated, string fields quoted, as in the public bank-marketing export.
fn write_delimited(c: &Campaign, path: &Path) -> Result<()> {
    let mut out = std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    let header: Vec<String> = HEADER.iter().map(|h| format!("\"{h}\"")).collect();
    writeln!(out, "{}", header.join(";"))?;
    for i in 0..c.age.len() {
        writeln!(
            out,
            "{};\"{}\";\"{}\";\"{}\";{};{};{};{};{};\"{}\"",
            c.age[i],
            c.job[i],
            c.marital[i],
            c.month[i],
            c.duration[i],
            c.campaign[i],
            c.pdays[i],
            c.previous[i],
            c.euribor3m[i],
            c.y[i],
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_parquet(c: Campaign, path: &Path) -> Result<()> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(c.age)),
        Arc::new(StringArray::from(c.job)),
        Arc::new(StringArray::from(c.marital)),
        Arc::new(StringArray::from(c.month)),
        Arc::new(Int64Array::from(c.duration)),
        Arc::new(Int64Array::from(c.campaign)),
        Arc::new(Int64Array::from(c.pdays)),
        Arc::new(Int64Array::from(c.previous)),
        Arc::new(Float64Array::from(c.euribor3m)),
        Arc::new(StringArray::from(c.y)),
    ];
    let fields: Vec<Field> = HEADER
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    log::info!("Preview:\n{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?);

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .unwrap_or_else(|| "bank-additional-full.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 2000,
    };

    let mut rng = SimpleRng::new(42);
    let campaign = generate(rows, &mut rng);
    let path = Path::new(&output);

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "parquet" | "pq"));
    if is_parquet {
        write_parquet(campaign, path)?;
    } else {
        write_delimited(&campaign, path)?;
    }

    println!("Wrote {rows} campaign records to {output}");
    Ok(())
}

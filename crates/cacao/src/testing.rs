//! Synthetic data for tests, benches and doc examples.

use ndarray::Array1;
use rand::prelude::*;

use crate::data::columns::{
    BAR_ORIGIN, BEAN_ORIGIN, BEAN_TYPE, COCOA_PERCENT, COMPANY, COMPANY_LOCATION, RATING, REVIEW_YEAR,
};
use crate::data::{Column, Table, Target};

const COMPANIES: [&str; 6] = ["Soma", "Bonnat", "Pralus", "Domori", "Valrhona", "Amedei"];
const LOCATIONS: [&str; 4] = ["Canada", "France", "Italy", "U.S.A."];
const BEAN_TYPES: [&str; 6] = ["unknown", "blend", "forasetero", "criollo", "trinitario", "other"];
const ORIGINS: [&str; 6] = ["Venezuela", "Ecuador", "Peru", "Madagascar", "Ghana", "multi"];

/// A table with one numeric feature `x` and one categorical feature `cat`
/// with `n_categories` levels, plus uniform random targets in `[1, 5]`.
pub fn numeric_categorical(rows: usize, n_categories: usize, seed: u64) -> (Table, Target) {
    assert!(n_categories >= 1);
    let mut rng = StdRng::seed_from_u64(seed);
    let x: Vec<f64> = (0..rows).map(|_| rng.r#gen::<f64>()).collect();
    let cat: Vec<String> = (0..rows).map(|i| format!("c{}", i % n_categories)).collect();
    let y: Vec<f64> = (0..rows).map(|_| 1.0 + 4.0 * rng.r#gen::<f64>()).collect();

    let table = Table::new(vec![Column::numeric("x", x), Column::categorical("cat", cat)])
        .expect("columns have equal length and distinct names");
    (table, Target::new("y", Array1::from(y)))
}

/// A cleaned review table with the standard schema.
///
/// Ratings follow a smooth function of cocoa percentage and bean type plus
/// noise, rounded to quarter points and clamped to `[1, 5]`.
pub fn synthetic_reviews(rows: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut company = Vec::with_capacity(rows);
    let mut bar_origin = Vec::with_capacity(rows);
    let mut year = Vec::with_capacity(rows);
    let mut cocoa = Vec::with_capacity(rows);
    let mut location = Vec::with_capacity(rows);
    let mut bean_type = Vec::with_capacity(rows);
    let mut bean_origin = Vec::with_capacity(rows);
    let mut rating = Vec::with_capacity(rows);

    for _ in 0..rows {
        let c = rng.gen_range(0..COMPANIES.len());
        let b = rng.gen_range(0..BEAN_TYPES.len());
        let o = rng.gen_range(0..ORIGINS.len());
        let pct = 0.55 + 0.05 * rng.gen_range(0..8_u32) as f64;

        let bonus = if BEAN_TYPES[b] == "criollo" { 0.25 } else { 0.0 };
        let noise = (rng.r#gen::<f64>() - 0.5) * 0.5;
        let raw = 3.5 - 4.0 * (pct - 0.7).abs() + bonus + noise;
        let quarter = ((raw * 4.0).round() / 4.0).clamp(1.0, 5.0);

        company.push(COMPANIES[c].to_string());
        bar_origin.push(format!("{} lot {}", ORIGINS[o], rng.gen_range(1..4)));
        year.push(f64::from(rng.gen_range(2006..2018_u32)));
        cocoa.push(pct);
        location.push(LOCATIONS[c % LOCATIONS.len()].to_string());
        bean_type.push(BEAN_TYPES[b].to_string());
        bean_origin.push(ORIGINS[o].to_string());
        rating.push(quarter);
    }

    Table::new(vec![
        Column::categorical(COMPANY, company),
        Column::categorical(BAR_ORIGIN, bar_origin),
        Column::numeric(REVIEW_YEAR, year),
        Column::numeric(COCOA_PERCENT, cocoa),
        Column::categorical(COMPANY_LOCATION, location),
        Column::categorical(BEAN_TYPE, bean_type),
        Column::categorical(BEAN_ORIGIN, bean_origin),
        Column::numeric(RATING, rating),
    ])
    .expect("columns have equal length and distinct names")
}

//! Generate an original periodic report, then replace it.
//!
//! Run with: `cargo run --example periodic_report --features sped`

use chrono::NaiveDate;
use nota::core::*;
use nota::sped::*;
use rust_decimal_macros::dec;

fn main() {
    let issuer = TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap();

    let entries: Vec<ReportEntry> = (1..=3)
        .map(|number| ReportEntry {
            key: AccessKey::generate(&AccessKeyParts {
                region_code: 35,
                year: 2024,
                month: 6,
                issuer: issuer.clone(),
                model: 55,
                series: 1,
                number,
                emission_type: 1,
                salt: 10_000_000 + number,
            })
            .unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 6, number as u32).unwrap(),
            net_total: dec!(1000.00) * rust_decimal::Decimal::from(number),
            tax_total: dec!(180.00) * rust_decimal::Decimal::from(number),
        })
        .collect();

    let layout = ReportLayout::v1();
    let period = Period::new(2024, 6).unwrap();

    let original = generate_report(
        &layout,
        ReportMode::Original,
        period,
        "11222333000181",
        &entries,
        None,
    )
    .unwrap();

    println!("{}", original.content);
    println!("records: {}  hash: {}", original.record_count, original.hash);

    // A replacement must reference the file it supersedes.
    let replacement = generate_report(
        &layout,
        ReportMode::Replacement,
        period,
        "11222333000181",
        &entries[..2],
        Some(&original.hash),
    )
    .unwrap();

    println!("{}", replacement.content);
}

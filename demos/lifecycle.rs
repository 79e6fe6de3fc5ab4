//! Full document lifecycle: draft → submit → authorize → reverse.
//!
//! Run with: `cargo run --example lifecycle`

use nota::core::*;
use nota::lifecycle::{self, KeyIssuance};
use nota::tax::{RateRule, RateTable, TaxpayerRegime};
use rust_decimal_macros::dec;

fn main() {
    let issuer = Party::new(
        "ACME Industria Ltda",
        TaxId::parse(TaxIdKind::Cnpj, "11.222.333/0001-81").unwrap(),
    )
    .region("SP")
    .municipality("São Paulo");

    let recipient = Party::new(
        "Cliente Comercio SA",
        TaxId::parse(TaxIdKind::Cpf, "111.444.777-35").unwrap(),
    )
    .region("RJ");

    let draft = DraftBuilder::new(issuer, recipient)
        .add_line(
            LineItemBuilder::new("1", "Parafuso M8", dec!(1000), dec!(0.35))
                .category("goods")
                .build(),
        )
        .add_line(
            LineItemBuilder::new("2", "Chapa 2x1m", dec!(10), dec!(150))
                .category("goods")
                .build(),
        )
        .build()
        .unwrap();

    let mut rates = RateTable::new();
    rates.add(RateRule::new("SP", "RJ", "goods", TaxpayerRegime::Normal, dec!(12)));

    let issuance = KeyIssuance::new(35, 55, 1, 2024, 6);
    let submitted = lifecycle::submit(draft, &rates, &issuance, 1, 12_345_678).unwrap();

    let key = submitted.status.key().unwrap();
    println!("access key: {}", key.formatted());

    let totals = &submitted.status.calculation().unwrap().totals;
    println!("net {: >10}  tax {: >10}", totals.net_total, totals.tax_total);

    let authorized = lifecycle::authorize(submitted, "135240000000001", None).unwrap();
    println!("status: {}", authorized.status.name());

    // Economically negate the document with a reversal.
    let reversal = lifecycle::reverse(&authorized, "billing error").unwrap();
    let reversal = lifecycle::submit(reversal, &rates, &issuance, 2, 23_456_789).unwrap();
    let rev_totals = &reversal.status.calculation().unwrap().totals;
    println!(
        "reversal net {: >10}  tax {: >10}",
        rev_totals.net_total, rev_totals.tax_total
    );
}

#![cfg(feature = "sped")]

use chrono::NaiveDate;
use nota::core::*;
use nota::lifecycle;
use nota::sped::*;
use nota::tax::{RateRule, RateTable, TaxpayerRegime};
use rust_decimal_macros::dec;

const ISSUER_CNPJ: &str = "11222333000181";

fn entry(number: u32, net: &str, tax: &str) -> ReportEntry {
    let key = AccessKey::generate(&AccessKeyParts {
        region_code: 35,
        year: 2024,
        month: 6,
        issuer: TaxId::parse(TaxIdKind::Cnpj, ISSUER_CNPJ).unwrap(),
        model: 55,
        series: 1,
        number,
        emission_type: 1,
        salt: 11_111_111,
    })
    .unwrap();
    ReportEntry {
        key,
        date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        net_total: net.parse().unwrap(),
        tax_total: tax.parse().unwrap(),
    }
}

fn period() -> Period {
    Period::new(2024, 6).unwrap()
}

// --- Record counts ---

#[test]
fn count_field_matches_body_records() {
    let layout = ReportLayout::v1();
    for n in [0usize, 1, 7] {
        let entries: Vec<ReportEntry> = (1..=n as u32)
            .map(|i| entry(i, "1000.00", "180.00"))
            .collect();
        let file = generate_report(
            &layout,
            ReportMode::Original,
            period(),
            ISSUER_CNPJ,
            &entries,
            None,
        )
        .unwrap();

        let lines: Vec<&str> = file.content.lines().collect();
        assert_eq!(lines.len(), n + 2, "body count {n}");
        assert_eq!(file.record_count, n + 2);
        assert_eq!(lines[lines.len() - 1], format!("|9990|{n:06}|"));
    }
}

#[test]
fn opening_record_is_line_one_closing_is_last() {
    let layout = ReportLayout::v1();
    let file = generate_report(
        &layout,
        ReportMode::Original,
        period(),
        ISSUER_CNPJ,
        &[entry(1, "1500.00", "270.00")],
        None,
    )
    .unwrap();

    let lines: Vec<&str> = file.content.lines().collect();
    assert!(lines[0].starts_with("|9000|001|0|202406|11222333000181|"));
    assert!(lines[1].starts_with("|9010|"));
    assert!(lines[1].contains("|20240615|1500,00|270,00|"));
    assert!(lines[2].starts_with("|9990|"));
}

#[test]
fn entries_keep_caller_order() {
    let layout = ReportLayout::v1();
    let entries = vec![
        entry(3, "1.00", "0.18"),
        entry(1, "2.00", "0.36"),
        entry(2, "3.00", "0.54"),
    ];
    let file = generate_report(
        &layout,
        ReportMode::Original,
        period(),
        ISSUER_CNPJ,
        &entries,
        None,
    )
    .unwrap();

    let body: Vec<&str> = file
        .content
        .lines()
        .filter(|l| l.starts_with("|9010|"))
        .collect();
    for (line, e) in body.iter().zip(&entries) {
        assert!(line.contains(e.key.as_str()));
    }
}

// --- Modes and the replacement chain ---

#[test]
fn corrective_and_replacement_require_prior_hash() {
    let layout = ReportLayout::v1();
    for mode in [ReportMode::Corrective, ReportMode::Replacement] {
        let err = generate_report(&layout, mode, period(), ISSUER_CNPJ, &[], None).unwrap_err();
        assert!(matches!(err, NotaError::MissingReference { .. }), "{mode:?}");
    }
}

#[test]
fn replacement_chain_embeds_prior_hash() {
    let layout = ReportLayout::v1();
    let original = generate_report(
        &layout,
        ReportMode::Original,
        period(),
        ISSUER_CNPJ,
        &[entry(1, "1000.00", "180.00")],
        None,
    )
    .unwrap();

    let replacement = generate_report(
        &layout,
        ReportMode::Replacement,
        period(),
        ISSUER_CNPJ,
        &[entry(1, "1000.00", "170.00")],
        Some(&original.hash),
    )
    .unwrap();

    let opening = replacement.content.lines().next().unwrap();
    assert!(opening.contains(&original.hash));
    assert!(opening.contains("|2|"));
    assert_ne!(replacement.hash, original.hash);
}

#[test]
fn hash_is_stable_for_identical_input() {
    let layout = ReportLayout::v1();
    let entries = [entry(1, "1000.00", "180.00")];
    let a = generate_report(&layout, ReportMode::Original, period(), ISSUER_CNPJ, &entries, None)
        .unwrap();
    let b = generate_report(&layout, ReportMode::Original, period(), ISSUER_CNPJ, &entries, None)
        .unwrap();
    assert_eq!(a.hash, b.hash);
    assert_eq!(a.content, b.content);
}

// --- Entry sourcing ---

#[test]
fn entries_come_from_authorized_documents_only() {
    let issuer = Party::new(
        "ACME Ltda",
        TaxId::parse(TaxIdKind::Cnpj, ISSUER_CNPJ).unwrap(),
    )
    .region("SP");
    let recipient = Party::new(
        "Cliente SA",
        TaxId::parse(TaxIdKind::Cpf, "11144477735").unwrap(),
    )
    .region("SP");

    let mut rates = RateTable::new();
    rates.add(RateRule::new("SP", "SP", "goods", TaxpayerRegime::Normal, dec!(18)));

    let draft = DraftBuilder::new(issuer, recipient)
        .add_line(
            LineItemBuilder::new("1", "Item", dec!(1), dec!(1000))
                .category("goods")
                .build(),
        )
        .build()
        .unwrap();

    assert!(ReportEntry::from_document(&draft).is_err());

    let issuance = lifecycle::KeyIssuance::new(35, 55, 1, 2024, 6);
    let submitted = lifecycle::submit(draft, &rates, &issuance, 9, 7).unwrap();
    assert!(ReportEntry::from_document(&submitted).is_err());

    let authorized = lifecycle::authorize(submitted, "135240000000001", None).unwrap();
    let entry = ReportEntry::from_document(&authorized).unwrap();
    assert_eq!(entry.net_total, dec!(1000));
    assert_eq!(entry.tax_total, dec!(180.00));
    assert_eq!(&entry.key, authorized.status.key().unwrap());
}

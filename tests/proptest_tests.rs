//! Property-based tests.
//!
//! Run with: `cargo test --features all --test proptest_tests`

use nota::core::*;
use nota::tax::{RateRule, RateTable, TaxpayerRegime, calculate, round_half_up};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn arb_key_parts() -> impl Strategy<Value = AccessKeyParts> {
    (
        1u8..=53,
        2000u16..=2099,
        1u8..=12,
        1u16..=999,
        1u32..=999_999_999,
        0u32..=99_999_999,
    )
        .prop_map(|(region, year, month, series, number, salt)| AccessKeyParts {
            region_code: region,
            year,
            month,
            issuer: TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap(),
            model: 55,
            series,
            number,
            emission_type: 1,
            salt,
        })
}

proptest! {
    /// Generated keys always decompose back into the input fields.
    #[test]
    fn access_key_round_trips(parts in arb_key_parts()) {
        let key = AccessKey::generate(&parts).unwrap();
        prop_assert_eq!(key.as_str().len(), 44);
        let (reparsed, fields) = AccessKey::parse(key.as_str()).unwrap();
        prop_assert_eq!(reparsed.as_str(), key.as_str());
        prop_assert_eq!(fields, parts);
    }

    /// A single-digit corruption is never silently decoded as the
    /// original: parse fails, or the decoded fields differ.
    #[test]
    fn access_key_corruption_never_passes_as_original(
        parts in arb_key_parts(),
        pos in 0usize..44,
        bump in 1u8..=9,
    ) {
        let key = AccessKey::generate(&parts).unwrap();
        let mut bytes = key.as_str().as_bytes().to_vec();
        bytes[pos] = b'0' + (bytes[pos] - b'0' + bump) % 10;
        let corrupted = String::from_utf8(bytes).unwrap();
        prop_assert_ne!(&corrupted, key.as_str());

        match AccessKey::parse(&corrupted) {
            Err(_) => {}
            Ok((_, fields)) => prop_assert_ne!(fields, parts),
        }
    }

    /// Corrupting the check digit itself always fails.
    #[test]
    fn access_key_check_digit_corruption_always_fails(
        parts in arb_key_parts(),
        bump in 1u8..=9,
    ) {
        let key = AccessKey::generate(&parts).unwrap();
        let mut bytes = key.as_str().as_bytes().to_vec();
        bytes[43] = b'0' + (bytes[43] - b'0' + bump) % 10;
        let corrupted = String::from_utf8(bytes).unwrap();
        prop_assert!(AccessKey::parse(&corrupted).is_err());
    }

    /// The formatted rendering is display-only: stripping the spaces
    /// recovers the canonical 44-digit form.
    #[test]
    fn formatted_key_strips_back(parts in arb_key_parts()) {
        let key = AccessKey::generate(&parts).unwrap();
        prop_assert_eq!(key.formatted().replace(' ', ""), key.as_str().to_string());
    }

    /// Exact midpoints always round away from zero, never to even.
    #[test]
    fn midpoints_round_up(cents in 0i64..=1_000_000) {
        let base = Decimal::new(cents, 2);
        let midpoint = base + dec!(0.005);
        prop_assert_eq!(round_half_up(midpoint), base + dec!(0.01));
        prop_assert_eq!(round_half_up(-midpoint), -(base + dec!(0.01)));
    }

    /// Rounding is symmetric about zero, so a reversal line's tax is the
    /// exact negation of the original's.
    #[test]
    fn rounding_is_symmetric(units in 1i64..=10_000_000) {
        let value = Decimal::new(units, 4);
        prop_assert_eq!(round_half_up(-value), -round_half_up(value));
    }

    /// Tax calculation is deterministic and totals are exact line sums.
    #[test]
    fn calculation_deterministic(
        prices in prop::collection::vec((1i64..=1_000_000, 1i64..=1_000), 1..20),
    ) {
        let mut rates = RateTable::new();
        rates.add(RateRule::new("SP", "SP", "goods", TaxpayerRegime::Normal, dec!(18)));

        let lines: Vec<LineItem> = prices
            .iter()
            .enumerate()
            .map(|(i, (price, qty))| {
                LineItemBuilder::new(
                    (i + 1).to_string(),
                    "Item",
                    Decimal::new(*qty, 0),
                    Decimal::new(*price, 2),
                )
                .category("goods")
                .origin("SP")
                .destination("SP")
                .build()
            })
            .collect();

        let a = calculate(&lines, TaxpayerRegime::Normal, &rates).unwrap();
        let b = calculate(&lines, TaxpayerRegime::Normal, &rates).unwrap();
        prop_assert_eq!(&a, &b);

        let line_sum: Decimal = a.lines.iter().map(|l| l.tax_amount).sum();
        prop_assert_eq!(a.totals.tax_total, line_sum);
        prop_assert_eq!(a.totals.levy_total, a.totals.tax_total + a.totals.surcharge_total);
    }

    /// Repeated-digit identifiers never validate, whatever the digit.
    #[test]
    fn repeated_digit_ids_rejected(digit in 0u8..=9) {
        let cnpj: String = std::iter::repeat_n((b'0' + digit) as char, 14).collect();
        let cpf: String = std::iter::repeat_n((b'0' + digit) as char, 11).collect();
        prop_assert!(!TaxId::is_valid(TaxIdKind::Cnpj, &cnpj));
        prop_assert!(!TaxId::is_valid(TaxIdKind::Cpf, &cpf));
    }
}

#[cfg(feature = "xml")]
mod xml_props {
    use nota::xml::{escape, unescape};
    use proptest::prelude::*;

    proptest! {
        /// Escaping then unescaping is the identity for any string,
        /// including strings that already look escaped.
        #[test]
        fn escape_round_trips(s in ".*") {
            prop_assert_eq!(unescape(&escape(&s)).unwrap(), s);
        }

        /// Hostile metacharacter soup in any order survives the trip.
        #[test]
        fn metacharacter_soup_round_trips(s in "[&<>\"'a-z]{0,64}") {
            prop_assert_eq!(unescape(&escape(&s)).unwrap(), s);
        }

        /// Escaped output never contains a bare metacharacter.
        #[test]
        fn escaped_output_is_inert(s in ".*") {
            let e = escape(&s);
            prop_assert!(!e.contains('<'));
            prop_assert!(!e.contains('>'));
            prop_assert!(!e.contains('"'));
            prop_assert!(!e.contains('\''));
        }
    }
}

#[cfg(feature = "sped")]
mod sped_props {
    use chrono::NaiveDate;
    use nota::core::*;
    use nota::sped::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        /// The closing record's count field equals the number of body
        /// records actually written, for any body size.
        #[test]
        fn closing_count_matches_body(n in 0usize..40) {
            let issuer = TaxId::parse(TaxIdKind::Cnpj, "11222333000181").unwrap();
            let entries: Vec<ReportEntry> = (1..=n as u32)
                .map(|i| ReportEntry {
                    key: AccessKey::generate(&AccessKeyParts {
                        region_code: 35,
                        year: 2024,
                        month: 6,
                        issuer: issuer.clone(),
                        model: 55,
                        series: 1,
                        number: i,
                        emission_type: 1,
                        salt: 1,
                    })
                    .unwrap(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    net_total: Decimal::new(i as i64 * 100, 2),
                    tax_total: Decimal::new(i as i64 * 18, 2),
                })
                .collect();

            let file = generate_report(
                &ReportLayout::v1(),
                ReportMode::Original,
                Period::new(2024, 6).unwrap(),
                "11222333000181",
                &entries,
                None,
            )
            .unwrap();

            let last = file.content.lines().last().unwrap();
            let expected = format!("|9990|{n:06}|");
            prop_assert_eq!(last, expected.as_str());
            prop_assert_eq!(file.record_count, n + 2);
        }
    }
}

//! Field extraction from unstructured document text.
//!
//! Given raw text recovered from a printed or scanned fiscal document,
//! locates candidate field values by anchored label matching (labels
//! precede values), validates every candidate identifier with the
//! check-digit parsers, and resolves ambiguity through the document-role
//! section (issuer, recipient, carrier) the candidate appears in rather
//! than first match. Fields that cannot be resolved are reported as
//! unresolved, never fabricated.
//!
//! Requires the `extract` feature.

use serde::{Deserialize, Serialize};

use crate::core::{AccessKey, TaxId, TaxIdKind};

/// Document roles a party section can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Issuer,
    Recipient,
    Carrier,
}

impl Role {
    fn name(&self) -> &'static str {
        match self {
            Self::Issuer => "issuer",
            Self::Recipient => "recipient",
            Self::Carrier => "carrier",
        }
    }
}

/// Label synonyms used as anchors. Matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchors {
    pub access_key: Vec<String>,
    pub company_tax_id: Vec<String>,
    pub person_tax_id: Vec<String>,
    pub state_registration: Vec<String>,
    pub name: Vec<String>,
    pub issuer_section: Vec<String>,
    pub recipient_section: Vec<String>,
    pub carrier_section: Vec<String>,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            access_key: vec!["CHAVE DE ACESSO".into(), "ACCESS KEY".into()],
            company_tax_id: vec!["CNPJ".into()],
            person_tax_id: vec!["CPF".into()],
            state_registration: vec![
                "INSCRICAO ESTADUAL".into(),
                "INSCRIÇÃO ESTADUAL".into(),
                "STATE REGISTRATION".into(),
                "IE".into(),
            ],
            name: vec![
                "RAZAO SOCIAL".into(),
                "RAZÃO SOCIAL".into(),
                "NOME".into(),
                "NAME".into(),
            ],
            issuer_section: vec!["EMITENTE".into(), "ISSUER".into()],
            recipient_section: vec![
                "DESTINATARIO".into(),
                "DESTINATÁRIO".into(),
                "RECIPIENT".into(),
            ],
            carrier_section: vec![
                "TRANSPORTADOR".into(),
                "TRANSPORTADORA".into(),
                "CARRIER".into(),
            ],
        }
    }
}

/// Fields recovered for one party section. All optional; absent fields
/// appear in [`ExtractedDocument::unresolved`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedParty {
    pub name: Option<String>,
    pub tax_id: Option<TaxId>,
    pub state_registration: Option<TaxId>,
}

/// The partially populated extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub access_key: Option<AccessKey>,
    pub issuer: ExtractedParty,
    pub recipient: ExtractedParty,
    pub carrier: ExtractedParty,
    /// Dot-separated paths of fields that could not be resolved.
    pub unresolved: Vec<String>,
}

/// Extract typed fields from raw document text using the default anchors.
pub fn extract(text: &str) -> ExtractedDocument {
    extract_with(text, &Anchors::default())
}

/// Extract typed fields from raw document text.
pub fn extract_with(text: &str, anchors: &Anchors) -> ExtractedDocument {
    let lines: Vec<&str> = text.lines().collect();
    let upper: Vec<String> = lines.iter().map(|l| l.to_uppercase()).collect();

    let mut doc = ExtractedDocument::default();

    doc.access_key = find_access_key(&lines, &upper, anchors);
    if doc.access_key.is_none() {
        doc.unresolved.push("access_key".into());
    }

    let sections = split_sections(&upper, anchors);
    for (role, range) in &sections {
        let party = extract_party(&lines, &upper, range.clone(), anchors, *role, &mut doc.unresolved);
        match role {
            Role::Issuer => doc.issuer = party,
            Role::Recipient => doc.recipient = party,
            Role::Carrier => doc.carrier = party,
        }
    }
    for role in [Role::Issuer, Role::Recipient, Role::Carrier] {
        if !sections.iter().any(|(r, _)| *r == role) {
            doc.unresolved.push(role.name().into());
        }
    }

    tracing::debug!(
        unresolved = doc.unresolved.len(),
        has_key = doc.access_key.is_some(),
        "extraction finished"
    );

    doc
}

/// Split the text into role sections: each section header line opens a
/// section that runs until the next header or end of text.
fn split_sections(upper: &[String], anchors: &Anchors) -> Vec<(Role, std::ops::Range<usize>)> {
    let mut headers: Vec<(usize, Role)> = Vec::new();
    for (i, line) in upper.iter().enumerate() {
        let role = if contains_any(line, &anchors.issuer_section) {
            Some(Role::Issuer)
        } else if contains_any(line, &anchors.recipient_section) {
            Some(Role::Recipient)
        } else if contains_any(line, &anchors.carrier_section) {
            Some(Role::Carrier)
        } else {
            None
        };
        if let Some(role) = role {
            // Keep the first header per role; duplicates are noise.
            if !headers.iter().any(|(_, r)| *r == role) {
                headers.push((i, role));
            }
        }
    }

    let mut sections = Vec::new();
    for (idx, (start, role)) in headers.iter().enumerate() {
        let end = headers
            .get(idx + 1)
            .map(|(next, _)| *next)
            .unwrap_or(upper.len());
        sections.push((*role, *start..end));
    }
    sections
}

fn extract_party(
    lines: &[&str],
    upper: &[String],
    range: std::ops::Range<usize>,
    anchors: &Anchors,
    role: Role,
    unresolved: &mut Vec<String>,
) -> ExtractedParty {
    let mut party = ExtractedParty::default();

    // Company id first; fall back to a personal id for the recipient.
    party.tax_id = find_tax_id(lines, upper, range.clone(), &anchors.company_tax_id, TaxIdKind::Cnpj);
    if party.tax_id.is_none() && role == Role::Recipient {
        party.tax_id = find_tax_id(lines, upper, range.clone(), &anchors.person_tax_id, TaxIdKind::Cpf);
    }
    if party.tax_id.is_none() {
        unresolved.push(format!("{}.tax_id", role.name()));
    }

    party.state_registration = find_tax_id(
        lines,
        upper,
        range.clone(),
        &anchors.state_registration,
        TaxIdKind::StateRegistration,
    );
    if party.state_registration.is_none() {
        unresolved.push(format!("{}.state_registration", role.name()));
    }

    party.name = find_labelled_text(lines, upper, range, &anchors.name);
    if party.name.is_none() {
        unresolved.push(format!("{}.name", role.name()));
    }

    party
}

/// Find the access key: label-anchored candidates first, then any
/// 44-digit run anywhere. Each candidate must survive `AccessKey::parse`
/// or the next location is tried.
fn find_access_key(lines: &[&str], upper: &[String], anchors: &Anchors) -> Option<AccessKey> {
    for (i, line) in upper.iter().enumerate() {
        if let Some(pos) = find_any(line, &anchors.access_key) {
            // Value on the same line after the label, or on the next line.
            let tail = &lines[i][byte_offset(lines[i], pos)..];
            for source in [Some(tail), lines.get(i + 1).copied()].into_iter().flatten() {
                if let Some(key) = parse_key_run(source) {
                    return Some(key);
                }
            }
        }
    }
    // Fallback: unlabelled 44-digit run.
    lines.iter().find_map(|line| parse_key_run(line))
}

/// Pull the first run of 44 digits (ignoring separating spaces) out of a
/// line and parse it.
fn parse_key_run(line: &str) -> Option<AccessKey> {
    let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 44 {
        return None;
    }
    for start in 0..=(digits.len() - 44) {
        if let Ok((key, _)) = AccessKey::parse(&digits[start..start + 44]) {
            return Some(key);
        }
    }
    None
}

/// Find a check-digit-valid identifier after any of the labels within a
/// line range. Invalid candidates fall through to the next location.
fn find_tax_id(
    lines: &[&str],
    upper: &[String],
    range: std::ops::Range<usize>,
    labels: &[String],
    kind: TaxIdKind,
) -> Option<TaxId> {
    for i in range {
        let Some(pos) = find_any(&upper[i], labels) else {
            continue;
        };
        let tail = &lines[i][byte_offset(lines[i], pos)..];
        for source in [Some(tail), lines.get(i + 1).copied()].into_iter().flatten() {
            for candidate in digit_runs(source) {
                if let Ok(id) = TaxId::parse(kind, &candidate) {
                    return Some(id);
                }
            }
        }
    }
    None
}

/// Find free text following any of the labels within a line range.
fn find_labelled_text(
    lines: &[&str],
    upper: &[String],
    range: std::ops::Range<usize>,
    labels: &[String],
) -> Option<String> {
    for i in range {
        let Some(pos) = find_any(&upper[i], labels) else {
            continue;
        };
        let tail = lines[i][byte_offset(lines[i], pos)..]
            .trim_start_matches([':', ' ', '\t'])
            .trim();
        if !tail.is_empty() {
            return Some(tail.to_string());
        }
        if let Some(next) = lines.get(i + 1) {
            let next = next.trim();
            if !next.is_empty() {
                return Some(next.to_string());
            }
        }
    }
    None
}

/// Maximal runs of digits and common identifier punctuation.
fn digit_runs(s: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() || matches!(c, '.' | '/' | '-') {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|r| r.chars().any(|c| c.is_ascii_digit()));
    runs
}

fn contains_any(line: &str, labels: &[String]) -> bool {
    find_any(line, labels).is_some()
}

/// Byte position just past the first matching label, in the uppercased
/// line. Whole-word match for short labels so "IE" does not fire inside
/// other words.
fn find_any(line: &str, labels: &[String]) -> Option<usize> {
    for label in labels {
        let needle = label.to_uppercase();
        let mut search_from = 0;
        while let Some(rel) = line[search_from..].find(&needle) {
            let start = search_from + rel;
            let end = start + needle.len();
            let ok_before = start == 0
                || !line[..start]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c.is_alphanumeric());
            let ok_after = !line[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
            if ok_before && ok_after {
                return Some(end);
            }
            search_from = end;
        }
    }
    None
}

/// The uppercased line and the original line have identical byte layout
/// only for ASCII; recompute the offset defensively by clamping to a char
/// boundary.
fn byte_offset(original: &str, upper_offset: usize) -> usize {
    let mut pos = upper_offset.min(original.len());
    while pos > 0 && !original.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
DANFE - DOCUMENTO AUXILIAR
CHAVE DE ACESSO: 3524 0611 2223 3300 0181 5500 1000 0001 2318 7654 3212

EMITENTE
Razao Social: ACME Industria Ltda
CNPJ: 11.222.333/0001-81
Inscricao Estadual: 1234567-9

DESTINATARIO
Nome: Maria da Silva
CPF: 111.444.777-35

TRANSPORTADORA
Razao Social: Rapido Logistica
CNPJ: 99.999.999/9999-99
";

    #[test]
    fn full_document() {
        let doc = extract(SAMPLE);

        let key = doc.access_key.expect("key");
        assert_eq!(
            key.as_str(),
            "35240611222333000181550010000001231876543212"
        );

        let issuer = &doc.issuer;
        assert_eq!(issuer.name.as_deref(), Some("ACME Industria Ltda"));
        assert_eq!(
            issuer.tax_id.as_ref().map(|id| id.as_str()),
            Some("11222333000181")
        );
        assert_eq!(
            issuer.state_registration.as_ref().map(|id| id.as_str()),
            Some("12345679")
        );

        assert_eq!(doc.recipient.name.as_deref(), Some("Maria da Silva"));
        assert_eq!(
            doc.recipient.tax_id.as_ref().map(|id| id.as_str()),
            Some("11144477735")
        );
    }

    #[test]
    fn invalid_candidate_is_rejected_not_kept() {
        // The carrier CNPJ is all-identical digits and must be rejected.
        let doc = extract(SAMPLE);
        assert!(doc.carrier.tax_id.is_none());
        assert!(doc.unresolved.iter().any(|f| f == "carrier.tax_id"));
        assert_eq!(doc.carrier.name.as_deref(), Some("Rapido Logistica"));
    }

    #[test]
    fn invalid_candidate_falls_through_to_next_location() {
        let text = "\
EMITENTE
CNPJ: 11.222.333/0001-82
CNPJ: 11.222.333/0001-81
";
        let doc = extract(text);
        assert_eq!(
            doc.issuer.tax_id.as_ref().map(|id| id.as_str()),
            Some("11222333000181")
        );
    }

    #[test]
    fn missing_fields_are_listed_never_fabricated() {
        let doc = extract("nothing useful here");
        assert!(doc.access_key.is_none());
        assert!(doc.unresolved.contains(&"access_key".to_string()));
        assert!(doc.unresolved.contains(&"issuer".to_string()));
        assert!(doc.unresolved.contains(&"recipient".to_string()));
        assert!(doc.unresolved.contains(&"carrier".to_string()));
    }

    #[test]
    fn value_on_next_line() {
        let text = "\
EMITENTE
CNPJ
11.222.333/0001-81
";
        let doc = extract(text);
        assert_eq!(
            doc.issuer.tax_id.as_ref().map(|id| id.as_str()),
            Some("11222333000181")
        );
    }

    #[test]
    fn short_label_requires_word_boundary() {
        // "IE" inside "SERIE" must not anchor a state registration.
        let text = "\
EMITENTE
SERIE 1234567-2
";
        let doc = extract(text);
        assert!(doc.issuer.state_registration.is_none());
    }
}

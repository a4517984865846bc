use docanon::config::{PassSettings, ReplacementSpec, SearchSpec};
use docanon::document::{Paragraph, Property};
use docanon::{AnonymizerSettings, InMemoryDocument};

pub struct TestFixtures;

impl TestFixtures {
    pub const DRAWING_TEXT: &'static str = "Drawing ACME.123456.001 approved by Ivanov I.I. for ACME";
    pub const DRAWING_EXPECTED: &'static str = "Drawing ****.123456.001 approved by *********** for ";

    /// Designation split across three runs, a header, a footer and properties.
    pub fn drawing_document() -> InMemoryDocument {
        let mut document = InMemoryDocument::new();
        document.body = vec![
            Paragraph::from_runs(["Drawing AC", "ME.123", "456.001 final"]),
            Paragraph::from_text("Supplier: ACME, contact j.doe@acme.example"),
        ];
        document.headers = vec![Paragraph::from_text("ACME confidential")];
        document.footers = vec![Paragraph::from_text("Sheet 1 of 2")];
        document.text_boxes = vec![Paragraph::from_text("Stamp ACME.123456.002")];
        document.properties = vec![
            Property::new("Title", "ACME.123456.001"),
            Property::new("Company", "ACME"),
            Property::new("Category", "drawings"),
        ];
        document
    }

    /// Two organizations in one document.
    pub fn two_company_document() -> InMemoryDocument {
        let mut document = InMemoryDocument::new();
        document.body = vec![
            Paragraph::from_text("Parts ACME.100200.001 and BOLT.300400.002"),
            Paragraph::from_text("Made by ACME with BOLT tooling, not ACMEX"),
        ];
        document
    }

    /// Plain text with nothing to anonymize.
    pub fn clean_document() -> InMemoryDocument {
        InMemoryDocument::from_text("Nothing regulated in here")
    }

    /// Designations only; other matches are left alone.
    pub fn designation_settings() -> AnonymizerSettings {
        let mut settings = AnonymizerSettings::default();
        settings.first_pass = PassSettings {
            search: vec![SearchSpec::Builtin { name: "Designation".into() }],
            replacement: ReplacementSpec::OrganizationCodeRemoval,
        };
        settings
    }

    pub fn settings_yaml() -> &'static str {
        r#"
options:
  process_headers: false
  case_sensitive: false
first_pass:
  search:
    - type: builtin
      name: Designation
    - type: pattern
      name: Project
      expression: "PRJ-[0-9]+"
  replacement:
    type: composite
    condition:
      kind: match_type_contains
      needle: Designation
    then:
      type: organization_code_removal
    otherwise:
      type: constant
      value: "[project]"
second_pass:
  replacement:
    type: constant
    value: "[org]"
"#
    }
}

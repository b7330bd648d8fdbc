use std::sync::Arc;

use procmeta_core::{AppConfig, Field, Index, IndexEntry};
use procmeta_extract::taxonomy::parse_skos;
use procmeta_extract::{CategoryTable, ExtractError, Extractor, Taxonomy};

const SKOS: &str = r##"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#">
  <skos:ConceptScheme rdf:about="#ccs2012">
    <skos:hasTopConcept rdf:resource="#10010520"/>
    <skos:hasTopConcept rdf:resource="#10003033"/>
  </skos:ConceptScheme>
  <skos:Concept rdf:about="#10010520">
    <skos:prefLabel xml:lang="en">Computer systems organization</skos:prefLabel>
  </skos:Concept>
  <skos:Concept rdf:about="#10010553">
    <skos:prefLabel xml:lang="en">Embedded and cyber-physical systems</skos:prefLabel>
    <skos:broader rdf:resource="#10010520"/>
  </skos:Concept>
  <skos:Concept rdf:about="#10010554">
    <skos:prefLabel xml:lang="en">Real-time systems</skos:prefLabel>
    <skos:broader rdf:resource="#10010553"/>
  </skos:Concept>
  <skos:Concept rdf:about="#10003033">
    <skos:prefLabel xml:lang="en">Networks</skos:prefLabel>
  </skos:Concept>
</rdf:RDF>"##;

const CATEGORIES: &str = "<categories>\
    <category><cat_node>H.5.2</cat_node><name>User Interfaces</name></category>\
</categories>";

const PAPER: &str = "Sensing the City
Jane Doe\u{00B9}, John Smith\u{00B2}
\u{00B9}MIT
\u{00B2}Stanford University
jane.doe@mit.edu
ABSTRACT
Cities are instrumented with many sensors, yet the data they produce rarely
reaches the people who live there. We describe a plat-
form that collects readings from public sensors and presents them as maps
that residents can explore and annotate together.
Categories and Subject Descriptors
H.5.2 [Information Interfaces and Presentation]: User Interfaces
General Terms
Design, Human Factors
CCS CONCEPTS
\u{2022} Computer systems organization \u{2192} Real-time systems;
\u{2022} Hardware \u{2192} Sensor devices
KEYWORDS
urban sensing; participatory maps
1 INTRODUCTION
Body text.
REFERENCES
[1] A. Author. First paper. 2001.
[2] B. Author. Second paper. 2002.
[4] D. Author. Fourth paper. 2004.
";

fn extractor() -> Extractor {
    let taxonomy = Taxonomy::new(
        parse_skos(SKOS).unwrap(),
        CategoryTable::parse(CATEGORIES).unwrap(),
    );
    Extractor::new(&AppConfig::default(), Arc::new(taxonomy)).unwrap()
}

fn entry(affiliations: &str) -> IndexEntry {
    IndexEntry::from_pairs([
        ("file_id", "paper-7"),
        ("order", "7"),
        ("title", "Sensing the City"),
        ("doi", "10.1145/0000000.0000007"),
        ("authors", "Jane Doe, John Smith"),
        ("affiliations", affiliations),
        ("from", "11"),
        ("to", "18"),
    ])
}

#[test]
fn extracts_a_complete_record() {
    let extractor = extractor();
    let extraction = extractor.extract("paper-7", &entry(""), PAPER).unwrap();
    let record = &extraction.record;

    assert_eq!(record.id, "paper-7");
    assert_eq!(record.number, "7");
    assert_eq!(record.title, "Sensing the City");

    assert_eq!(record.authors.len(), 2);
    assert_eq!(record.authors[0].last_name, "Doe");
    assert_eq!(record.authors[0].affiliation, "MIT");
    assert_eq!(record.authors[0].email.as_deref(), Some("jane.doe@mit.edu"));
    assert_eq!(record.authors[1].affiliation, "Stanford University");

    let abstract_text = record.abstract_text.as_deref().unwrap();
    assert!(abstract_text.starts_with("Cities are instrumented"));
    assert!(abstract_text.contains("platform that collects"));
    assert!(!abstract_text.contains('\n'));

    assert_eq!(record.categories.len(), 1);
    assert_eq!(record.categories[0].code, "H.5.2");
    assert_eq!(record.categories[0].descriptor, "User Interfaces");
    assert_eq!(record.general_terms, vec!["Design", "Human Factors"]);

    assert_eq!(record.concepts.len(), 1);
    assert_eq!(record.concepts[0].id, "10010520.10010553.10010554");
    assert_eq!(
        record.concepts[0].description,
        "Computer systems organization~Embedded and cyber-physical systems~Real-time systems"
    );
    assert_eq!(
        record.keywords,
        vec!["urban sensing", "participatory maps", "Hardware", "Sensor devices"]
    );

    assert_eq!(
        record.references.iter().map(|r| r.ref_seq_no).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let issues = &extraction.issues;
    assert_eq!(issues.get(Field::Concepts).len(), 1);
    assert_eq!(issues.get(Field::References).len(), 1);
    assert!(issues.get(Field::References)[0].contains("expected 3"));
    assert_eq!(issues.total(), 2);
    assert!(extraction.needs_review());
}

#[test]
fn validation_accepts_classified_long_document() {
    let extractor = extractor();
    let mut extraction = extractor.extract("paper-7", &entry(""), PAPER).unwrap();
    let before = extraction.issues.total();

    extractor.validate(&extraction.record, &mut extraction.issues);
    assert_eq!(extraction.issues.total(), before);
}

#[test]
fn csv_affiliations_take_precedence_over_header() {
    let extractor = extractor();
    let extraction = extractor
        .extract("paper-7", &entry("CSAIL, MIT; Stanford"), PAPER)
        .unwrap();
    assert_eq!(extraction.record.authors[0].affiliation, "CSAIL, MIT");
    assert_eq!(extraction.record.authors[1].affiliation, "Stanford");
}

#[test]
fn affiliation_mismatch_aborts_the_document() {
    let extractor = extractor();
    let err = extractor
        .extract("paper-7", &entry("MIT"), PAPER)
        .unwrap_err();

    assert!(matches!(err, ExtractError::AffiliationCountMismatch { .. }));
    assert!(err.is_document_level());
}

#[test]
fn indexed_lookup_uses_the_csv_row() {
    let csv = "File ID,Order,Title,Authors,Affiliations,From,To\n\
               paper-7,7,Sensing the City,\"Jane Doe, John Smith\",,11,18\n";
    let index = Index::from_reader(csv.as_bytes(), "file_id").unwrap();
    let extractor = extractor();

    let extraction = extractor.extract_indexed("paper-7", &index, PAPER).unwrap();
    assert_eq!(extraction.record.page_span(), Some(7));
    assert!(matches!(
        extractor.extract_indexed("paper-8", &index, PAPER),
        Err(ExtractError::DocumentNotIndexed(_))
    ));
}

#[test]
fn text_without_sections_is_flagged_not_failed() {
    let extractor = extractor();
    let extraction = extractor
        .extract("paper-7", &entry("MIT; Stanford"), "Just a title\nand a line.")
        .unwrap();

    assert!(extraction.record.abstract_text.is_none());
    assert!(extraction.record.references.is_empty());
    assert_eq!(extraction.record.authors.len(), 2);
    for field in [Field::Abstract, Field::References, Field::Keywords] {
        assert!(!extraction.issues.get(field).is_empty(), "{field} not flagged");
    }
}

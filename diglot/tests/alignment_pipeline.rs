use diglot::aligner::{AlignError, AlignmentWarning};
use diglot::markup::MarkupError;
use diglot::pipeline::{self, export, PipelineError};
use diglot::SectionKey;
use std::path::PathBuf;

fn corpus_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir).join("tests/fixtures/corpus")
}

fn key(text: &str) -> SectionKey {
    SectionKey::parse(text).unwrap()
}

#[test]
fn test_discover_pairs_newest_editions() {
    let corpus = pipeline::discover(&corpus_root()).unwrap();

    assert_eq!(corpus.config.source_language, "lat");
    assert_eq!(corpus.patches.len(), 4);

    let ids: Vec<_> = corpus.listing.pairs.iter().map(|p| p.document_id.as_str()).collect();
    assert_eq!(ids, vec!["phi0448.phi001", "phi0474.phi013"]);
    assert_eq!(corpus.listing.pairs[0].target.version, 2);
    assert_eq!(corpus.listing.unpaired, vec!["phi0448.phi002".to_string()]);
}

#[test]
fn test_failed_document_does_not_stop_siblings() {
    let corpus = pipeline::discover(&corpus_root()).unwrap();
    let report = pipeline::align_corpus(&corpus).unwrap();

    assert_eq!(report.aligned.len(), 1);
    assert_eq!(report.aligned[0].document_id, "phi0448.phi001");
    assert_eq!(report.skipped, vec!["phi0448.phi002".to_string()]);

    assert!(report.has_failures());
    let (document_id, error) = &report.failures[0];
    assert_eq!(document_id, "phi0474.phi013");
    match error {
        PipelineError::AlignError(AlignError::Markup(MarkupError::UnexpectedVariantTag { tag, line, .. })) => {
            assert_eq!(tag, "hi");
            assert_eq!(*line, 13);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_aligned_passages_follow_source_spine_with_patches() {
    let corpus = pipeline::discover(&corpus_root()).unwrap();
    let report = pipeline::align_corpus(&corpus).unwrap();
    let document = &report.aligned[0];

    assert_eq!(document.source_metadata.title, "Commentarii de Bello Gallico");
    assert_eq!(document.source_metadata.author.as_deref(), Some("Julius Caesar"));
    assert_eq!(document.target_metadata.title, "The Gallic War");

    let keys: Vec<_> = document.passages.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "book=1|chapter=1",
            "book=1|chapter=2",
            "book=1|chapter=2|note=1",
            "book=1|chapter=3",
            "book=1|chapter=4",
            "book=2|chapter=1",
        ]
    );

    let passages = &document.passages;
    assert_eq!(
        passages[0].source_text(),
        "Gallia est omnis divisa in partes tres, quarum unam incolunt Belgae."
    );
    assert_eq!(
        passages[0].target_text(),
        "All Gaul is divided into three parts, one of which the Belgae inhabit."
    );
    assert_eq!(
        passages[1].source_text(),
        "Apud Helvetios longe nobilissimus fuit et ditissimus Orgetorix."
    );
    assert_eq!(passages[1].display_label(), "book 1, chapter 2");

    // added translator's note
    assert!(passages[2].source.is_empty());
    assert_eq!(
        passages[2].target_text(),
        "The Helvetii were the most warlike of the Gallic peoples."
    );
    assert!(passages[2].patched);

    // text patch and abbreviation expansion
    assert_eq!(
        passages[3].source_text(),
        "His rebus adducti constituerunt ante diem proficisci."
    );

    // line break, no translation
    assert_eq!(
        passages[4].source_text(),
        "Ea res est Helvetiis per indicium enuntiata.\nMoribus suis Orgetorigem ex vinculis causam dicere coegerunt."
    );
    assert!(passages[4].target.is_empty());
    assert!(!passages[4].patched);

    // removed translation
    assert_eq!(passages[5].source_text(), "Cum esset Caesar in citeriore Gallia\u{2026}");
    assert!(passages[5].target.is_empty());
    assert!(passages[5].patched);

    assert_eq!(document.untranslated(), 2);
    assert_eq!(
        document.warnings,
        vec![
            AlignmentWarning::AnchorNotAdjacent {
                key: key("book=1|chapter=9"),
                after: key("book=1|chapter=1"),
                before: key("book=1|chapter=3"),
                line: 14,
            },
            AlignmentWarning::UnmatchedTarget {
                key: key("book=1|chapter=0"),
            },
        ]
    );
}

#[test]
fn test_export_json() {
    let corpus = pipeline::discover(&corpus_root()).unwrap();
    let report = pipeline::align_corpus(&corpus).unwrap();

    let output_dir = std::env::temp_dir().join(format!("diglot-export-{}", std::process::id()));
    let path = export::to_json(&report.aligned[0], &output_dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "phi0448.phi001.json");

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["document_id"], "phi0448.phi001");
    assert_eq!(json["passages"].as_array().unwrap().len(), 6);
    assert_eq!(json["passages"][0]["key"], "book=1|chapter=1");
    assert_eq!(json["passages"][0]["labels"][1][0], "chapter");
    assert_eq!(json["warnings"][0]["kind"], "anchor_not_adjacent");
    assert_eq!(json["warnings"][1]["key"], "book=1|chapter=0");

    std::fs::remove_dir_all(&output_dir).unwrap();
}

//! Conversion properties over Markdown fixtures
//!
//! Each fixture is parsed, converted with both built-in presets, and checked
//! against the structural guarantees of the styled output.

use std::fs;
use std::path::PathBuf;

use downstyle_core::{
    Appearance, OBJECT_REPLACEMENT, PARAGRAPH_SEPARATOR, RecordingSurface, RunRole, StyledText,
    convert_with_appearance, lay_out,
};
use downstyle_mdast::{Node, Root, parse_commonmark};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse_fixture(name: &str) -> Root {
    let path = fixtures_dir().join(format!("{}.md", name));
    let source = fs::read_to_string(&path).expect("Failed to read fixture file");
    parse_commonmark(&source)
}

/// Text the converter emits verbatim, in document order
fn literals(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&t.value),
            Node::Code(c) => out.push_str(&c.value),
            Node::InlineCode(c) => out.push_str(&c.value),
            Node::Html(h) => out.push_str(&h.value),
            Node::Custom(c) => {
                if let Some(value) = &c.value {
                    out.push_str(value);
                }
                literals(&c.children, out);
            }
            other => literals(other.children(), out),
        }
    }
}

fn count_objects(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Image(_) | Node::ThematicBreak => 1,
            other => count_objects(other.children()),
        })
        .sum()
}

fn check(root: &Root, styled: &StyledText) {
    // Coverage
    let mut expected = String::new();
    literals(&root.children, &mut expected);
    assert_eq!(styled.content_text(), expected);

    // Runs partition the buffer
    let mut end = 0;
    for run in &styled.runs {
        assert_eq!(run.range.start, end, "gap or overlap at {}", end);
        assert!(!run.range.is_empty());
        end = run.range.end;
    }
    assert_eq!(end, styled.text.len());

    // Separators never lead or trail, and never repeat
    assert!(!styled.text.starts_with(PARAGRAPH_SEPARATOR));
    assert!(!styled.text.ends_with(PARAGRAPH_SEPARATOR));
    let doubled: String = [PARAGRAPH_SEPARATOR, PARAGRAPH_SEPARATOR].iter().collect();
    assert!(!styled.text.contains(&doubled));

    // Every embedded object has exactly one placeholder, in order
    assert_eq!(styled.placements.len(), count_objects(&root.children));
    assert_eq!(
        styled.text.matches(OBJECT_REPLACEMENT).count(),
        styled.placements.len()
    );
    for pair in styled.placements.windows(2) {
        assert!(pair[0].offset < pair[1].offset);
    }
    for placement in &styled.placements {
        let run = styled.run_at(placement.offset).expect("placement out of bounds");
        assert_eq!(run.role, RunRole::Object);
        assert_eq!(run.range.len(), OBJECT_REPLACEMENT.len_utf8());
    }

    // Adjacent runs are never mergeable after finishing
    for pair in styled.runs.windows(2) {
        assert!(!pair[0].can_merge(&pair[1]));
    }

    // The surface sees every object once
    let mut surface = RecordingSurface::new();
    assert_eq!(lay_out(styled, &mut surface), styled.placements.len());
}

macro_rules! property_test {
    ($name:ident) => {
        #[test]
        fn $name() {
            let root = parse_fixture(stringify!($name));
            for appearance in [Appearance::Light, Appearance::Dark] {
                let styled = convert_with_appearance(&root, appearance);
                check(&root, &styled);
            }
        }
    };
}

property_test!(basic);
property_test!(inline);
property_test!(lists);
property_test!(quotes);
property_test!(objects);
property_test!(code);
property_test!(unsupported);

#[test]
fn test_basic_json_output() {
    let root = parse_fixture("basic");
    let styled = convert_with_appearance(&root, Appearance::Light);
    let json = serde_json::to_string(&styled).expect("Failed to serialize styled text");
    let back: StyledText = serde_json::from_str(&json).expect("Failed to deserialize styled text");
    assert_eq!(back, styled);
}

#[test]
fn test_objects_placements() {
    let root = parse_fixture("objects");
    let styled = convert_with_appearance(&root, Appearance::Light);
    insta::assert_json_snapshot!(styled.placements[2], @r#"
    {
      "offset": 33,
      "kind": {
        "kind": "image",
        "url": "",
        "title": null,
        "alt": "missing",
        "status": {
          "status": "unresolvable",
          "reason": "empty"
        }
      },
      "size": {
        "width": null,
        "height": null
      }
    }
    "#);
}

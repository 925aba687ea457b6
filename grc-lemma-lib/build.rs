// Parses the Greek ending/contraction rule table and embeds it as JSON at compile time.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct RuleTableRaw {
    min_stem: usize,
    rules: Vec<RuleRaw>,
}

#[derive(Serialize)]
struct RuleRaw {
    class: String,
    anchor: String,
    pattern: String,
    replacements: Vec<String>,
    label: String,
    augment: bool,
}

fn main() {
    let rules_path = Path::new("../data/greek-endings.xml");
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir).join("rules.json");

    println!("cargo:rerun-if-changed={}", rules_path.display());
    let content = fs::read_to_string(rules_path).expect("cannot read data/greek-endings.xml");
    let table = process_xml(&content);

    let json = serde_json::to_string(&table).expect("JSON serialization failed");
    fs::write(&out_path, json).expect("cannot write rules.json");

    println!("cargo:rerun-if-changed=build.rs");
}

fn process_xml(xml: &str) -> RuleTableRaw {
    let mut reader = Reader::from_str(xml);
    let mut table = RuleTableRaw {
        min_stem: 2,
        rules: Vec::new(),
    };
    let mut current_class: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"rules" => {
                if let Some(min_stem) = attribute(e, "min_stem") {
                    table.min_stem = min_stem
                        .parse()
                        .unwrap_or_else(|_| panic!("invalid min_stem: {min_stem}"));
                }
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"section" => {
                current_class = attribute(e, "class");
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"section" => {
                current_class = None;
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"rule" => {
                let class = current_class
                    .clone()
                    .expect("<rule> must appear inside a <section class=...>");
                table.rules.push(read_rule(e, class));
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("XML parse error: {e}"),
            _ => {}
        }
    }

    table
}

/// Build one rule from the attributes of a `<rule/>` element.
fn read_rule(e: &BytesStart, class: String) -> RuleRaw {
    let pattern = attribute(e, "pattern").unwrap_or_default();
    let replace = attribute(e, "replace").unwrap_or_default();
    if pattern.is_empty() || replace.trim().is_empty() {
        panic!("rule in section '{class}' is missing pattern or replace");
    }

    RuleRaw {
        class,
        anchor: attribute(e, "anchor").unwrap_or_else(|| "suffix".to_string()),
        pattern,
        replacements: replace.split_whitespace().map(str::to_string).collect(),
        label: attribute(e, "label").unwrap_or_default(),
        augment: attribute(e, "augment").is_some_and(|v| v == "true"),
    }
}

fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| {
            a.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).to_string())
        })
}

//! Conversion between editing markup and RichText through the public API

mod common;

use common::{richtext_xml, violations};
use pretty_assertions::assert_eq;
use richtext::converters::{
    priority, ConversionRule, Direction, Outcome, RuleEngine, RuleSection, TreeConverter,
};
use richtext::documents::Document;
use richtext::limits::Limits;
use richtext::validators::TrackingListener;
use richtext::{Error, ProcessorConfig, RichTextDataProcessor, XHTML_NAMESPACE};

#[test]
fn test_editing_markup_is_stored() {
    let processor = RichTextDataProcessor::default();
    let stored = processor
        .to_data_string("<h1>Title</h1>\n<p><b>Lorem</b> <i>ipsum</i></p>\n<ul>\n  <li>a b</li>\n</ul>")
        .unwrap();
    assert_eq!(
        stored,
        richtext_xml(concat!(
            r#"<p class="p--heading-1">Title</p>"#,
            "<p><strong>Lorem</strong> <em>ipsum</em></p>",
            "<ul><li>a b</li></ul>",
        ))
    );
}

#[test]
fn test_unknown_markup_is_repaired() {
    let processor = RichTextDataProcessor::default();
    let mut listener = TrackingListener::new();
    let doc = processor
        .to_data_with("<p>a<video>b</video></p>", &mut listener)
        .unwrap();
    assert_eq!(doc.to_xml(), richtext_xml("<p>ab</p>"));
    assert_eq!(listener.severe_count(), 1);
    assert!(violations(processor.schema(), &doc).is_empty());
}

#[test]
fn test_stored_data_conforms() {
    let processor = RichTextDataProcessor::default();
    let doc = processor
        .to_data(concat!(
            "<h3>Head</h3><figure><img src=\"a.png\"/><figcaption>cap</figcaption></figure>",
            "<blockquote>quote <a href=\"x\">link</a></blockquote>",
            "<table><thead><tr><th>H</th></tr></thead><tbody><tr><td><ol><li>1</li></ol></td></tr></tbody></table>",
            "<p><span style=\"color:red\">red</span><sup>2</sup><br/></p>",
        ))
        .unwrap();
    assert_eq!(violations(processor.schema(), &doc), Vec::<String>::new());
}

#[test]
fn test_tables_are_normalized() {
    let processor = RichTextDataProcessor::default();
    assert_eq!(
        processor
            .to_data_string("<table><tfoot><tr><td>F</td></tr></tfoot><tr><td>B</td></tr></table>")
            .unwrap(),
        richtext_xml(concat!(
            "<table><tbody><tr><td>B</td></tr>",
            r#"<tr class="tr--footer"><td>F</td></tr></tbody></table>"#,
        ))
    );
}

#[test]
fn test_stored_links_are_viewed() {
    let processor = RichTextDataProcessor::default();
    let view = processor
        .to_view_string(&richtext_xml(concat!(
            r#"<p class="p--heading-3">T</p>"#,
            r#"<p><a xlink:href="u" xlink:show="new">l</a></p>"#,
        )))
        .unwrap();
    assert_eq!(view, r#"<h3>T</h3><p><a href="u" target="_blank">l</a></p>"#);
}

#[test]
fn test_view_round_trip() {
    let processor = RichTextDataProcessor::default();
    for view in [
        "<p><strong>a</strong> <em>b</em> <s>c</s> <u>d</u></p>",
        "<h4>T</h4><ul><li>a</li><li>b</li></ul>",
        r#"<p><a href="x" target="_self">b</a></p>"#,
    ] {
        let stored = processor.to_data_string(view).unwrap();
        assert_eq!(processor.to_view_string(&stored).unwrap(), view, "{}", stored);
    }
}

#[test]
fn test_view_requires_stored_root() {
    let processor = RichTextDataProcessor::default();
    assert!(matches!(
        processor.to_view(r#"<p xmlns="http://www.coremedia.com/2003/richtext-1.0"/>"#),
        Err(Error::Namespace(_))
    ));
}

#[test]
fn test_processor_limits_apply_to_conversion() {
    let config = ProcessorConfig::new().with_limits(Limits {
        max_depth: 3,
        ..Limits::default()
    });
    let processor = RichTextDataProcessor::new(config).unwrap();
    assert!(processor.to_data("<p>ok</p>").is_ok());
    assert!(matches!(
        processor.to_data("<ul><li><p><em>deep</em></p></li></ul>"),
        Err(Error::LimitExceeded(_))
    ));
}

#[test]
fn test_custom_rules_run_before_standard_rules() {
    let mut processor = RichTextDataProcessor::default();
    // <b class="keep"> becomes <em> before the bold rule sees it
    processor.add_rules(vec![ConversionRule::new()
        .id("keep-bold-as-emphasis")
        .priority(priority::HIGHEST + 1)
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            let keep = ctx.is_element(node, "b")
                && ctx.document().get_attribute(node, None, "class") == Some("keep");
            if !keep {
                return Ok(Outcome::Unchanged);
            }
            let em = ctx.replace_element(node, "em")?;
            ctx.document_mut().remove_attribute(em, None, "class")?;
            Ok(Outcome::Replace(em))
        }))]);

    assert_eq!(
        processor
            .to_data_string(r#"<p><b class="keep">a</b><b>b</b></p>"#)
            .unwrap(),
        richtext_xml("<p><em>a</em><strong>b</strong></p>")
    );
    assert_eq!(processor.to_data_rules().ids()[0], "keep-bold-as-emphasis");
}

#[test]
fn test_converter_between_custom_documents() {
    let engine = RuleEngine::with_rules(
        Direction::ToView,
        vec![
            ConversionRule::new().to_view(RuleSection::new().on_imported(|node, ctx| {
                if ctx.is_element(node, "note") {
                    return Ok(Outcome::Replace(ctx.replace_element(node, "aside")?));
                }
                Ok(Outcome::Unchanged)
            })),
            ConversionRule::new().to_view(RuleSection::new().on_imported(|node, ctx| {
                Ok(if ctx.is_element(node, "secret") {
                    Outcome::Skip
                } else {
                    Outcome::Unchanged
                })
            })),
        ],
    );

    let mut source = Document::parse(
        r#"<notes xmlns="urn:notes"><note id="1">a<secret>b</secret></note></notes>"#,
    )
    .unwrap();
    let note = source.child_elements(source.root().unwrap())[0];
    let mut target = Document::with_root(Some(XHTML_NAMESPACE), "body");

    let converted = TreeConverter::new(&engine)
        .convert(&mut source, note, &mut target)
        .unwrap()
        .unwrap();
    let body = target.root().unwrap();
    target.append_child(body, converted).unwrap();

    assert_eq!(
        target.to_xml(),
        format!(r#"<body xmlns="{}"><aside id="1">a</aside></body>"#, XHTML_NAMESPACE)
    );
    // the source is left intact
    assert_eq!(
        source.to_xml(),
        r#"<notes xmlns="urn:notes"><note id="1">a<secret>b</secret></note></notes>"#
    );
}

#[test]
fn test_engines_keep_rule_order_per_direction() {
    let rules = vec![
        ConversionRule::new().to_data(RuleSection::new()),
        ConversionRule::new()
            .id("late")
            .priority(priority::LOW)
            .to_data(RuleSection::new())
            .to_view(RuleSection::new()),
        ConversionRule::new()
            .to_data(RuleSection::new().priority(priority::HIGH))
            .to_view(RuleSection::new()),
    ];
    let to_data = RuleEngine::with_rules(Direction::ToData, rules.clone());
    let to_view = RuleEngine::with_rules(Direction::ToView, rules);

    assert_eq!(to_data.ids(), vec!["rule-2", "rule-0", "late"]);
    assert_eq!(to_view.ids(), vec!["rule-2", "late"]);
}

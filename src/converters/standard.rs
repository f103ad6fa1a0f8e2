//! Standard mapping between HTML editing markup and RichText
//!
//! [`rules`] returns the rule set a [`RichTextDataProcessor`](crate::RichTextDataProcessor)
//! starts with. Every rule only rewrites what it recognizes; anything the
//! RichText grammar still rejects afterwards is left to the sanitizer.

use super::base::{priority, ConversionRule, Outcome, RuleSection};
use crate::documents::{Document, NodeId};
use crate::error::Result;
use crate::namespaces::QName;
use crate::richtext::xlink;
use crate::{XLINK_NAMESPACE, XML_NAMESPACE};

/// Placeholder the editor puts into empty inline elements
pub const INLINE_FILLER: &str = "\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}\u{2060}";

/// Class marking a paragraph as heading, followed by the level
pub const HEADING_CLASS_PREFIX: &str = "p--heading-";
/// Class of header cells
pub const HEADER_CELL_CLASS: &str = "td--header";
/// Class of table header rows
pub const HEADER_ROW_CLASS: &str = "tr--header";
/// Class of table footer rows
pub const FOOTER_ROW_CLASS: &str = "tr--footer";

/// `xlink:show` values and the link targets they stand for
const SHOW_TARGETS: [(&str, &str); 5] = [
    ("new", "_blank"),
    ("replace", "_self"),
    ("embed", "_embed"),
    ("none", "_none"),
    ("other", "_other"),
];

/// Containers in which whitespace-only text is insignificant
const BLOCK_CONTAINERS: [&str; 9] = [
    "div", "ul", "ol", "blockquote", "table", "thead", "tbody", "tfoot", "tr",
];

/// The standard HTML to RichText rule set
pub fn rules() -> Vec<ConversionRule> {
    vec![
        editor_filler_text(),
        editor_filler_break(),
        editor_attributes(),
        insignificant_whitespace(),
        rename("bold", "b", "strong"),
        rename("italic", "i", "em"),
        headings(),
        styled_span("underline", &["u"], "underline"),
        styled_span("strikethrough", &["s", "del", "strike"], "strike"),
        styled_span("code", &["code"], "code"),
        styled_span("mark", &["mark"], "mark"),
        plain_span(),
        anchors(),
        images(),
        block_images(),
        header_cells(),
        table_sections(),
        table_rows(),
        table_figure(),
        language(),
    ]
}

// ----------------------------------------------------------------------
// Class tokens
// ----------------------------------------------------------------------

fn class_tokens(doc: &Document, node: NodeId) -> Vec<String> {
    doc.get_attribute(node, None, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn has_class(doc: &Document, node: NodeId, class: &str) -> bool {
    doc.get_attribute(node, None, "class")
        .map_or(false, |c| c.split_whitespace().any(|t| t == class))
}

fn add_class(doc: &mut Document, node: NodeId, class: &str) -> Result<()> {
    let mut tokens = class_tokens(doc, node);
    if !tokens.iter().any(|t| t == class) {
        tokens.push(class.to_string());
    }
    doc.set_attribute(node, QName::local("class"), tokens.join(" "))?;
    Ok(())
}

fn remove_class(doc: &mut Document, node: NodeId, class: &str) -> Result<()> {
    let tokens: Vec<String> = class_tokens(doc, node)
        .into_iter()
        .filter(|t| t != class)
        .collect();
    if tokens.is_empty() {
        doc.remove_attribute(node, None, "class")?;
    } else {
        doc.set_attribute(node, QName::local("class"), tokens.join(" "))?;
    }
    Ok(())
}

/// Move an attribute value to another name
fn move_attribute(
    doc: &mut Document,
    node: NodeId,
    from: (Option<&str>, &str),
    to: QName,
) -> Result<()> {
    if let Some(value) = doc.remove_attribute(node, from.0, from.1)? {
        doc.set_attribute(node, to, value)?;
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Editor internals
// ----------------------------------------------------------------------

fn editor_filler_text() -> ConversionRule {
    ConversionRule::new()
        .id("editor-filler-text")
        .to_data(RuleSection::new().on_prepare(|doc, node| {
            let cleaned = doc
                .text(node)
                .filter(|t| t.contains(INLINE_FILLER))
                .map(|t| t.replace(INLINE_FILLER, ""));
            if let Some(cleaned) = cleaned {
                doc.set_text(node, cleaned)?;
            }
            Ok(())
        }))
}

fn editor_filler_break() -> ConversionRule {
    ConversionRule::new()
        .id("editor-filler-break")
        .priority(priority::HIGHEST)
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            let is_filler = ctx.is_element(node, "br")
                && ctx
                    .document()
                    .attribute_node(node, None, "data-cke-filler")
                    .is_some();
            Ok(if is_filler { Outcome::Skip } else { Outcome::Unchanged })
        }))
}

fn editor_attributes() -> ConversionRule {
    ConversionRule::new()
        .id("editor-attributes")
        .priority(priority::HIGH)
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            let doc = ctx.document_mut();
            let internal: Vec<String> = doc
                .attributes(node)
                .iter()
                .filter_map(|a| doc.name(*a))
                .filter(|n| n.namespace.is_none() && n.local_name.starts_with("data-cke-"))
                .map(|n| n.local_name.clone())
                .collect();
            for local_name in internal {
                doc.remove_attribute(node, None, &local_name)?;
            }
            Ok(Outcome::Unchanged)
        }))
}

fn insignificant_whitespace() -> ConversionRule {
    ConversionRule::new()
        .id("insignificant-whitespace")
        .to_data(RuleSection::new().on_appended(|parent, child, ctx| {
            let doc = ctx.document_mut();
            let blank = doc.text(child).map_or(false, |t| t.trim().is_empty());
            if blank && BLOCK_CONTAINERS.iter().any(|c| doc.is_default_element(parent, c)) {
                doc.remove(child)?;
            }
            Ok(())
        }))
}

// ----------------------------------------------------------------------
// Inline formatting
// ----------------------------------------------------------------------

/// Rename an HTML-only element to its RichText equivalent
fn rename(id: &str, view: &'static str, data: &'static str) -> ConversionRule {
    ConversionRule::new()
        .id(id)
        .to_data(RuleSection::new().on_imported(move |node, ctx| {
            if ctx.is_element(node, view) {
                ctx.document_mut().rename_local(node, data)?;
            }
            Ok(Outcome::Unchanged)
        }))
}

fn heading_level(local_name: &str) -> Option<u8> {
    let level = local_name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn headings() -> ConversionRule {
    ConversionRule::new()
        .id("headings")
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            let doc = ctx.document_mut();
            let level = doc
                .local_name(node)
                .and_then(heading_level)
                .filter(|level| doc.is_default_element(node, &format!("h{}", level)));
            if let Some(level) = level {
                doc.rename_local(node, "p")?;
                add_class(doc, node, &format!("{}{}", HEADING_CLASS_PREFIX, level))?;
            }
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported(|node, ctx| {
            if !ctx.is_element(node, "p") {
                return Ok(Outcome::Unchanged);
            }
            let doc = ctx.document_mut();
            let level = class_tokens(doc, node).iter().find_map(|t| {
                t.strip_prefix(HEADING_CLASS_PREFIX)
                    .and_then(|l| heading_level(&format!("h{}", l)))
            });
            if let Some(level) = level {
                remove_class(doc, node, &format!("{}{}", HEADING_CLASS_PREFIX, level))?;
                doc.rename_local(node, &format!("h{}", level))?;
            }
            Ok(Outcome::Unchanged)
        }))
}

/// Map inline elements RichText lacks to a classed `span`
///
/// The first view name is the one restored for the view.
fn styled_span(id: &str, views: &'static [&'static str], class: &'static str) -> ConversionRule {
    ConversionRule::new()
        .id(id)
        .to_data(RuleSection::new().on_imported(move |node, ctx| {
            if views.iter().any(|v| ctx.is_element(node, v)) {
                let doc = ctx.document_mut();
                doc.rename_local(node, "span")?;
                add_class(doc, node, class)?;
            }
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported(move |node, ctx| {
            if ctx.is_element(node, "span") && has_class(ctx.document(), node, class) {
                let doc = ctx.document_mut();
                remove_class(doc, node, class)?;
                doc.rename_local(node, views[0])?;
            }
            Ok(Outcome::Unchanged)
        }))
}

fn plain_span() -> ConversionRule {
    ConversionRule::new()
        .id("plain-span")
        .priority(priority::LOW)
        .to_data(RuleSection::new().on_imported_with_children(|node, ctx| {
            if ctx.is_element(node, "span") && ctx.document().attributes(node).is_empty() {
                Ok(Outcome::Replace(ctx.children_fragment(node)?))
            } else {
                Ok(Outcome::Unchanged)
            }
        }))
}

// ----------------------------------------------------------------------
// Links and images
// ----------------------------------------------------------------------

/// Split a link target into `xlink:show` and `xlink:role`
fn target_to_xlink(target: &str) -> (Option<&'static str>, Option<String>) {
    if target.is_empty() {
        return (None, None);
    }
    if let Some(role) = target.strip_prefix("_role_") {
        return (None, Some(role.to_string()));
    }
    for (show, base) in SHOW_TARGETS {
        if target == base {
            return (Some(show), None);
        }
        let role = target
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|role| !role.is_empty());
        if let Some(role) = role {
            return (Some(show), Some(role.to_string()));
        }
    }
    (Some("other"), Some(target.to_string()))
}

/// Join `xlink:show` and `xlink:role` into a link target
fn xlink_to_target(show: Option<&str>, role: Option<&str>) -> Option<String> {
    let base = show
        .and_then(|show| SHOW_TARGETS.iter().find(|(s, _)| *s == show))
        .map(|(_, base)| *base);
    let role = role.filter(|r| !r.is_empty());
    match (base, role) {
        (None, None) => None,
        (None, Some(role)) => Some(format!("_role_{}", role)),
        (Some("_other"), Some(role)) => Some(role.to_string()),
        (Some(base), None) => Some(base.to_string()),
        (Some(base), Some(role)) => Some(format!("{}_{}", base, role)),
    }
}

fn anchors() -> ConversionRule {
    ConversionRule::new()
        .id("anchors")
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            if !ctx.is_element(node, "a") {
                return Ok(Outcome::Unchanged);
            }
            let doc = ctx.document_mut();
            move_attribute(doc, node, (None, "href"), xlink("href"))?;
            move_attribute(doc, node, (None, "title"), xlink("title"))?;
            if let Some(target) = doc.remove_attribute(node, None, "target")? {
                let (show, role) = target_to_xlink(&target);
                if let Some(show) = show {
                    doc.set_attribute(node, xlink("show"), show)?;
                }
                if let Some(role) = role {
                    doc.set_attribute(node, xlink("role"), role)?;
                }
            }
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported(|node, ctx| {
            if !ctx.is_element(node, "a") {
                return Ok(Outcome::Unchanged);
            }
            let doc = ctx.document_mut();
            move_attribute(doc, node, (Some(XLINK_NAMESPACE), "href"), QName::local("href"))?;
            move_attribute(doc, node, (Some(XLINK_NAMESPACE), "title"), QName::local("title"))?;
            let show = doc.remove_attribute(node, Some(XLINK_NAMESPACE), "show")?;
            let role = doc.remove_attribute(node, Some(XLINK_NAMESPACE), "role")?;
            if let Some(target) = xlink_to_target(show.as_deref(), role.as_deref()) {
                doc.set_attribute(node, QName::local("target"), target)?;
            }
            doc.remove_attribute(node, Some(XLINK_NAMESPACE), "type")?;
            doc.remove_attribute(node, Some(XLINK_NAMESPACE), "actuate")?;
            Ok(Outcome::Unchanged)
        }))
}

fn images() -> ConversionRule {
    ConversionRule::new()
        .id("images")
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            if ctx.is_element(node, "img") {
                let doc = ctx.document_mut();
                move_attribute(doc, node, (None, "src"), xlink("href"))?;
                move_attribute(doc, node, (None, "title"), xlink("title"))?;
            }
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported(|node, ctx| {
            if ctx.is_element(node, "img") {
                let doc = ctx.document_mut();
                move_attribute(doc, node, (Some(XLINK_NAMESPACE), "href"), QName::local("src"))?;
                move_attribute(doc, node, (Some(XLINK_NAMESPACE), "title"), QName::local("title"))?;
                for fixed in ["type", "show", "actuate"] {
                    doc.remove_attribute(node, Some(XLINK_NAMESPACE), fixed)?;
                }
            }
            Ok(Outcome::Unchanged)
        }))
}

/// Wrap images appended to block containers into a paragraph
fn block_images() -> ConversionRule {
    ConversionRule::new()
        .id("block-images")
        .to_data(RuleSection::new().on_appended(|parent, child, ctx| {
            let misplaced = ctx.is_element(child, "img")
                && (ctx.is_element(parent, "div") || ctx.is_element(parent, "blockquote"));
            if misplaced {
                let doc = ctx.document_mut();
                let paragraph = doc.create_default_element("p");
                doc.insert_before(parent, paragraph, Some(child))?;
                doc.append_child(paragraph, child)?;
            }
            Ok(())
        }))
}

// ----------------------------------------------------------------------
// Tables
// ----------------------------------------------------------------------

fn header_cells() -> ConversionRule {
    ConversionRule::new()
        .id("header-cells")
        .to_data(RuleSection::new().on_imported(|node, ctx| {
            if ctx.is_element(node, "th") {
                let doc = ctx.document_mut();
                doc.rename_local(node, "td")?;
                add_class(doc, node, HEADER_CELL_CLASS)?;
            }
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported(|node, ctx| {
            if ctx.is_element(node, "td") && has_class(ctx.document(), node, HEADER_CELL_CLASS) {
                let doc = ctx.document_mut();
                remove_class(doc, node, HEADER_CELL_CLASS)?;
                doc.rename_local(node, "th")?;
            }
            Ok(Outcome::Unchanged)
        }))
}

/// Dissolve `thead` and `tfoot`, marking their rows
fn table_sections() -> ConversionRule {
    ConversionRule::new()
        .id("table-sections")
        .to_data(RuleSection::new().on_imported_with_children(|node, ctx| {
            let class = if ctx.is_element(node, "thead") {
                HEADER_ROW_CLASS
            } else if ctx.is_element(node, "tfoot") {
                FOOTER_ROW_CLASS
            } else {
                return Ok(Outcome::Unchanged);
            };
            let doc = ctx.document_mut();
            for row in doc.child_elements(node) {
                if doc.is_default_element(row, "tr") {
                    add_class(doc, row, class)?;
                }
            }
            Ok(Outcome::Replace(ctx.children_fragment(node)?))
        }))
}

/// Rows of a table, including those inside section elements
///
/// Section elements are removed from the table.
fn take_rows(doc: &mut Document, table: NodeId, sections: &[&str]) -> Result<Vec<NodeId>> {
    let mut rows = Vec::new();
    for child in doc.children(table).to_vec() {
        if doc.is_default_element(child, "tr") {
            rows.push(child);
        } else if sections.iter().any(|s| doc.is_default_element(child, s)) {
            let inner = doc.child_elements(child);
            rows.extend(inner.into_iter().filter(|r| doc.is_default_element(*r, "tr")));
            doc.remove(child)?;
        }
    }
    Ok(rows)
}

/// Row position within a table: header, body or footer
fn row_rank(doc: &Document, row: NodeId) -> u8 {
    if has_class(doc, row, HEADER_ROW_CLASS) {
        0
    } else if has_class(doc, row, FOOTER_ROW_CLASS) {
        2
    } else {
        1
    }
}

/// Collect rows into a single `tbody` and split them up again for the view
fn table_rows() -> ConversionRule {
    ConversionRule::new()
        .id("table-rows")
        .to_data(RuleSection::new().on_imported_with_children(|node, ctx| {
            if !ctx.is_element(node, "table") {
                return Ok(Outcome::Unchanged);
            }
            let doc = ctx.document_mut();
            let mut rows = take_rows(doc, node, &["tbody"])?;
            if rows.is_empty() {
                return Ok(Outcome::Unchanged);
            }
            rows.sort_by_key(|row| row_rank(doc, *row));
            let body = doc.create_default_element("tbody");
            for row in rows {
                doc.append_child(body, row)?;
            }
            doc.append_child(node, body)?;
            Ok(Outcome::Unchanged)
        }))
        .to_view(RuleSection::new().on_imported_with_children(|node, ctx| {
            if !ctx.is_element(node, "table") {
                return Ok(Outcome::Unchanged);
            }
            let doc = ctx.document_mut();
            let rows = take_rows(doc, node, &["thead", "tbody", "tfoot"])?;
            let mut sections: [Option<NodeId>; 3] = [None; 3];
            for row in rows {
                let rank = row_rank(doc, row);
                let section = match sections[rank as usize] {
                    Some(section) => section,
                    None => {
                        let name = ["thead", "tbody", "tfoot"][rank as usize];
                        let section = doc.create_default_element(name);
                        sections[rank as usize] = Some(section);
                        section
                    }
                };
                remove_class(doc, row, HEADER_ROW_CLASS)?;
                remove_class(doc, row, FOOTER_ROW_CLASS)?;
                doc.append_child(section, row)?;
            }
            for section in sections.into_iter().flatten() {
                doc.append_child(node, section)?;
            }
            Ok(Outcome::Unchanged)
        }))
}

fn table_figure() -> ConversionRule {
    ConversionRule::new()
        .id("table-figure")
        .to_data(RuleSection::new().on_imported_with_children(|node, ctx| {
            if ctx.is_element(node, "figure") && has_class(ctx.document(), node, "table") {
                Ok(Outcome::Replace(ctx.children_fragment(node)?))
            } else {
                Ok(Outcome::Unchanged)
            }
        }))
}

// ----------------------------------------------------------------------
// Language
// ----------------------------------------------------------------------

fn language() -> ConversionRule {
    ConversionRule::new()
        .id("language")
        .to_view(RuleSection::new().on_imported(|node, ctx| {
            let doc = ctx.document_mut();
            if let Some(lang) = doc.remove_attribute(node, Some(XML_NAMESPACE), "lang")? {
                if doc.get_attribute(node, None, "lang").is_none() {
                    doc.set_attribute(node, QName::local("lang"), lang)?;
                }
            }
            Ok(Outcome::Unchanged)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{Direction, RuleEngine, TreeConverter};
    use crate::richtext::new_document;
    use crate::{RICHTEXT_NAMESPACE, XHTML_NAMESPACE};
    use pretty_assertions::assert_eq;

    fn to_data(markup: &str) -> String {
        let engine = RuleEngine::with_rules(Direction::ToData, rules());
        let mut source = Document::parse_fragment(markup, XHTML_NAMESPACE).unwrap();
        let source_root = source.root().unwrap();
        let mut target = new_document();
        let root = target.root().unwrap();
        TreeConverter::new(&engine)
            .convert_children(&mut source, source_root, &mut target, root)
            .unwrap();
        target.inner_xml(root)
    }

    fn to_view(data: &str) -> String {
        let engine = RuleEngine::with_rules(Direction::ToView, rules());
        let xml = format!(
            r#"<div xmlns="{}" xmlns:xlink="{}">{}</div>"#,
            RICHTEXT_NAMESPACE, XLINK_NAMESPACE, data
        );
        let mut source = Document::parse(&xml).unwrap();
        let source_root = source.root().unwrap();
        let mut target = Document::with_root(Some(XHTML_NAMESPACE), "div");
        let root = target.root().unwrap();
        TreeConverter::new(&engine)
            .convert_children(&mut source, source_root, &mut target, root)
            .unwrap();
        target.inner_xml(root)
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            to_data("<p><b>a</b> <i>b</i></p>"),
            "<p><strong>a</strong> <em>b</em></p>"
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(to_data("<h2>Title</h2>"), r#"<p class="p--heading-2">Title</p>"#);
        assert_eq!(to_view(r#"<p class="p--heading-2">Title</p>"#), "<h2>Title</h2>");
        assert_eq!(
            to_view(r#"<p class="intro p--heading-7">x</p>"#),
            r#"<p class="intro p--heading-7">x</p>"#
        );
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
    }

    #[test]
    fn test_styled_spans() {
        assert_eq!(
            to_data("<p><u>a</u><del>b</del><code>c</code><mark>d</mark></p>"),
            concat!(
                r#"<p><span class="underline">a</span><span class="strike">b</span>"#,
                r#"<span class="code">c</span><span class="mark">d</span></p>"#
            )
        );
        assert_eq!(
            to_view(r#"<p><span class="strike">b</span><span class="x underline">a</span></p>"#),
            r#"<p><s>b</s><u class="x">a</u></p>"#
        );
    }

    #[test]
    fn test_anchor_to_data() {
        assert_eq!(
            to_data(r#"<p><a href="https://example.org" title="T" target="_blank">x</a></p>"#),
            r#"<p><a xlink:href="https://example.org" xlink:title="T" xlink:show="new">x</a></p>"#
        );
        assert_eq!(
            to_data(r##"<p><a href="#1" target="frame">x</a></p>"##),
            r##"<p><a xlink:href="#1" xlink:show="other" xlink:role="frame">x</a></p>"##
        );
    }

    #[test]
    fn test_anchor_to_view() {
        assert_eq!(
            to_view(concat!(
                r#"<p><a xlink:type="simple" xlink:href="u" xlink:show="replace" "#,
                r#"xlink:role="r" xlink:actuate="onRequest">x</a></p>"#
            )),
            r#"<p><a href="u" target="_self_r">x</a></p>"#
        );
    }

    #[test]
    fn test_target_mapping() {
        assert_eq!(target_to_xlink(""), (None, None));
        assert_eq!(target_to_xlink("_blank"), (Some("new"), None));
        assert_eq!(target_to_xlink("_self"), (Some("replace"), None));
        assert_eq!(target_to_xlink("_embed"), (Some("embed"), None));
        assert_eq!(target_to_xlink("_none"), (Some("none"), None));
        assert_eq!(target_to_xlink("_other"), (Some("other"), None));
        assert_eq!(target_to_xlink("_role_main"), (None, Some("main".to_string())));
        assert_eq!(
            target_to_xlink("_blank_main"),
            (Some("new"), Some("main".to_string()))
        );
        assert_eq!(
            target_to_xlink("_blanket"),
            (Some("other"), Some("_blanket".to_string()))
        );

        for target in ["_blank", "_self", "_embed", "_none", "_other", "_role_x", "_self_x", "frame"] {
            let (show, role) = target_to_xlink(target);
            assert_eq!(xlink_to_target(show, role.as_deref()).as_deref(), Some(target));
        }
        assert_eq!(xlink_to_target(None, None), None);
        assert_eq!(xlink_to_target(Some("bogus"), None), None);
    }

    #[test]
    fn test_images() {
        assert_eq!(
            to_data(r#"<img src="a.png" alt="A"/><p>x<img src="b.png" title="B"/></p>"#),
            r#"<p><img alt="A" xlink:href="a.png"/></p><p>x<img xlink:href="b.png" xlink:title="B"/></p>"#
        );
        assert_eq!(
            to_view(concat!(
                r#"<p><img alt="A" xlink:type="simple" xlink:href="a.png" "#,
                r#"xlink:show="embed" xlink:actuate="onLoad"/></p>"#
            )),
            r#"<p><img alt="A" src="a.png"/></p>"#
        );
    }

    #[test]
    fn test_tables() {
        let view = concat!(
            r#"<figure class="table"><table>"#,
            "<thead><tr><th>H</th></tr></thead>",
            "<tbody><tr><td>B</td></tr></tbody>",
            "<tfoot><tr><td>F</td></tr></tfoot>",
            "</table></figure>"
        );
        let data = concat!(
            "<table><tbody>",
            r#"<tr class="tr--header"><td class="td--header">H</td></tr>"#,
            "<tr><td>B</td></tr>",
            r#"<tr class="tr--footer"><td>F</td></tr>"#,
            "</tbody></table>"
        );
        assert_eq!(to_data(view), data);
        assert_eq!(
            to_view(data),
            concat!(
                "<table>",
                "<thead><tr><th>H</th></tr></thead>",
                "<tbody><tr><td>B</td></tr></tbody>",
                "<tfoot><tr><td>F</td></tr></tfoot>",
                "</table>"
            )
        );
    }

    #[test]
    fn test_footer_before_body_is_reordered() {
        assert_eq!(
            to_data("<table><tfoot><tr><td>F</td></tr></tfoot><tr><td>B</td></tr></table>"),
            r#"<table><tbody><tr><td>B</td></tr><tr class="tr--footer"><td>F</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_editor_internals() {
        assert_eq!(to_data(r#"<p>a<br data-cke-filler="true"/></p>"#), "<p>a</p>");
        assert_eq!(to_data("<p>a<br/>b</p>"), "<p>a<br/>b</p>");
        assert_eq!(
            to_data(&format!(r#"<p data-cke-saved="1">a{}b</p>"#, INLINE_FILLER)),
            "<p>ab</p>"
        );
        assert_eq!(
            to_data(r#"<p><span>a</span><span class="x">b</span></p>"#),
            r#"<p>a<span class="x">b</span></p>"#
        );
    }

    #[test]
    fn test_insignificant_whitespace() {
        assert_eq!(
            to_data("\n<ul>\n  <li>a b</li>\n</ul>\n<p> </p>"),
            "<ul><li>a b</li></ul><p> </p>"
        );
    }

    #[test]
    fn test_language() {
        assert_eq!(to_view(r#"<p xml:lang="de">x</p>"#), r#"<p lang="de">x</p>"#);
        assert_eq!(
            to_view(r#"<p lang="en" xml:lang="de">x</p>"#),
            r#"<p lang="en">x</p>"#
        );
    }

    #[test]
    fn test_rules_have_unique_ids() {
        let rules = rules();
        let mut ids: Vec<_> = rules.iter().filter_map(|r| r.get_id()).collect();
        assert_eq!(ids.len(), rules.len());
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}

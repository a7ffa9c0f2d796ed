// ABOUTME: Strict-XML body scanner trying XPath selectors before CSS selectors.
// ABOUTME: CSS selectors are translated to XPath over a practical subset, as lxml's cssselect does.

use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};
use tracing::warn;

use crate::config::XmlSelectorOptions;
use crate::draft::{DraftArticle, RawPage};
use crate::error::{ConfigError, ParseBodyError};
use crate::strategy::BodyParser;

/// Body parser over strict XML. XPath selectors are tried first, then CSS
/// selectors translated to XPath; the first selector with a match wins.
///
/// Only use this against pages known to be well-formed XML; an ill-formed
/// document fails the stage (and therefore the attempt), it is not repaired.
pub struct XmlBodyParser {
    xpath_selectors: Vec<String>,
    css_selectors: Vec<String>,
}

impl XmlBodyParser {
    pub fn new(opts: &XmlSelectorOptions) -> Result<Self, ConfigError> {
        if opts.xpath_selectors.is_empty() && opts.css_selectors.is_empty() {
            return Err(ConfigError::MissingXmlSelectors);
        }
        Ok(Self {
            xpath_selectors: opts.xpath_selectors.clone(),
            css_selectors: opts.css_selectors.clone(),
        })
    }
}

impl BodyParser for XmlBodyParser {
    fn parse_body(
        &self,
        url: &str,
        page: &RawPage,
        _draft: &DraftArticle,
    ) -> Result<String, ParseBodyError> {
        let package = parser::parse(&page.html).map_err(|e| ParseBodyError::InvalidXml {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let doc = package.as_document();
        let factory = Factory::new();
        let context = Context::new();

        let mut expressions: Vec<(String, String)> = self
            .xpath_selectors
            .iter()
            .map(|x| (x.clone(), x.clone()))
            .collect();
        for css in &self.css_selectors {
            match css_to_xpath(css) {
                Ok(xpath) => expressions.push((css.clone(), xpath)),
                Err(message) => {
                    warn!(url, selector = css.as_str(), message, "untranslatable css selector, skipping");
                }
            }
        }

        for (selector, expression) in &expressions {
            let xpath = match factory.build(expression) {
                Ok(Some(xpath)) => xpath,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        url,
                        selector = selector.as_str(),
                        message = %e,
                        "invalid xpath selector, skipping"
                    );
                    continue;
                }
            };

            match xpath.evaluate(&context, doc.root()) {
                Ok(Value::Nodeset(nodes)) => {
                    if let Some(node) = nodes.document_order_first() {
                        return Ok(serialize_node(node));
                    }
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(
                        url,
                        selector = selector.as_str(),
                        message = %e,
                        "xpath evaluation failed, skipping"
                    );
                    continue;
                }
            }
        }

        Err(ParseBodyError::NoMatch {
            url: url.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "xml"
    }
}

/// Translate a practical CSS subset to XPath: tag, `*`, `.class`, `#id`,
/// `[attr]`, `[attr=value]`, compounds thereof, and descendant / `>` child
/// combinators. Anything else (pseudo-classes, sibling combinators) is
/// rejected.
pub fn css_to_xpath(css: &str) -> Result<String, String> {
    let spaced = css.replace('>', " > ");
    let tokens: Vec<&str> = spaced.split_whitespace().collect();
    if tokens.is_empty() {
        return Err("empty selector".to_string());
    }

    let mut xpath = String::new();
    let mut expect_selector = true;
    let mut first = true;
    let mut child_combinator = false;

    for token in tokens {
        if token == ">" {
            if expect_selector || first {
                return Err(format!("misplaced '>' in selector: {}", css));
            }
            child_combinator = true;
            expect_selector = true;
            continue;
        }

        if !expect_selector && !first {
            // Plain whitespace between selectors: descendant combinator.
            child_combinator = false;
        }

        let step = simple_selector_to_step(token)?;
        if first {
            xpath.push_str("//");
            xpath.push_str(&step);
            first = false;
        } else if child_combinator {
            xpath.push('/');
            xpath.push_str(&step);
            child_combinator = false;
        } else {
            xpath.push_str("/descendant::");
            xpath.push_str(&step);
        }
        expect_selector = false;
    }

    if expect_selector && !first {
        return Err(format!("selector ends with combinator: {}", css));
    }
    Ok(xpath)
}

/// One compound simple selector (e.g. `div.story#main[data-x=y]`) to an
/// XPath step with predicates.
fn simple_selector_to_step(token: &str) -> Result<String, String> {
    let mut chars = token.char_indices().peekable();
    let mut tag_end = 0;
    for (i, c) in chars.by_ref() {
        if c == '.' || c == '#' || c == '[' {
            break;
        }
        if c == ':' {
            return Err(format!("pseudo-classes are not supported: {}", token));
        }
        tag_end = i + c.len_utf8();
    }

    let tag = &token[..tag_end];
    let tag = if tag.is_empty() || tag == "*" { "*" } else { tag };
    if !(tag == "*" || tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')) {
        return Err(format!("unsupported tag in selector: {}", token));
    }

    let mut step = tag.to_string();
    let rest = &token[tag_end..];
    let mut i = 0;
    let bytes = rest.as_bytes();
    while i < bytes.len() {
        match bytes[i] {
            b'.' | b'#' => {
                let marker = bytes[i];
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && !matches!(bytes[end], b'.' | b'#' | b'[') {
                    end += 1;
                }
                let name = &rest[start..end];
                if name.is_empty() {
                    return Err(format!("empty class or id in selector: {}", token));
                }
                if marker == b'.' {
                    step.push_str(&format!(
                        "[contains(concat(' ', normalize-space(@class), ' '), ' {} ')]",
                        name
                    ));
                } else {
                    step.push_str(&format!("[@id='{}']", name));
                }
                i = end;
            }
            b'[' => {
                let close = rest[i..]
                    .find(']')
                    .ok_or_else(|| format!("unclosed attribute in selector: {}", token))?
                    + i;
                let inner = &rest[i + 1..close];
                match inner.split_once('=') {
                    Some((attr, value)) => {
                        let value = value.trim_matches('\'').trim_matches('"');
                        step.push_str(&format!("[@{}='{}']", attr, value));
                    }
                    None => step.push_str(&format!("[@{}]", inner)),
                }
                i = close + 1;
            }
            b':' => return Err(format!("pseudo-classes are not supported: {}", token)),
            _ => return Err(format!("unsupported selector syntax: {}", token)),
        }
    }

    Ok(step)
}

/// Serialize a matched node back to XML text. Elements serialize with their
/// subtree; other node kinds serialize as their string value.
fn serialize_node(node: Node) -> String {
    match node {
        Node::Element(el) => {
            let mut out = String::new();
            write_element(el, &mut out);
            out
        }
        other => other.string_value(),
    }
}

fn write_element(el: Element, out: &mut String) {
    out.push('<');
    out.push_str(el.name().local_part());
    for attr in el.attributes() {
        out.push(' ');
        out.push_str(attr.name().local_part());
        out.push_str("=\"");
        out.push_str(&escape_attr(attr.value()));
        out.push('"');
    }

    let children = el.children();
    if children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in children {
        match child {
            ChildOfElement::Element(child_el) => write_element(child_el, out),
            ChildOfElement::Text(text) => out.push_str(&escape_text(text.text())),
            ChildOfElement::Comment(_) | ChildOfElement::ProcessingInstruction(_) => {}
        }
    }
    out.push_str("</");
    out.push_str(el.name().local_part());
    out.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

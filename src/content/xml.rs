//! A lossless XML tree on top of `quick-xml`, and XML document transforms.
//!
//! The tree keeps text, comments, CDATA, the declaration, processing
//! instructions and the doctype exactly as read, including escaped forms, so a
//! document that is parsed and written back is unchanged apart from
//! self-closing tags, which are always written as `<name ... />`.
//!
//! Transform documents mirror the target's structure. Elements carrying
//! `xdt:Transform` act on the target elements they locate; elements without it
//! only narrow the location for their children. Supported directives:
//!
//! | `xdt:Transform` | Effect |
//! |---|---|
//! | `Replace` | replace the first located element |
//! | `Insert` | append as last child of the parent |
//! | `InsertBefore(name)` / `InsertAfter(name)` | insert next to the first sibling named `name` |
//! | `Remove` / `RemoveAll` | remove the first / every located element |
//! | `SetAttributes` / `SetAttributes(a,b)` | copy all / the listed attributes |
//! | `RemoveAttributes(a,b)` | remove the listed attributes |
//!
//! `xdt:Locator="Match(a,b)"` restricts location to elements whose listed
//! attributes equal the transform element's.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::error::TransformError;

pub const XDT_NAMESPACE: &str = "http://schemas.microsoft.com/XML-Document-Transform";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    Declaration(String),
    Instruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attribute names and raw (still escaped) values, in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self, String> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            attributes.push((lossy(attr.key.as_ref()), lossy(&attr.value)));
        }
        Ok(Self {
            name: lossy(start.name().as_ref()),
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    /// Child elements, skipping text and other nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

/// A parsed document: the root element and the nodes around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    /// Parse `content`. The error is a human-readable reason.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(content);
        let mut top: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("{e} (near byte {})", reader.buffer_position()))?;
            let node = match event {
                Event::Start(e) => {
                    stack.push(Element::from_start(&e, false)?);
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => return Err("closing tag without an open element".into()),
                },
                Event::Empty(e) => Node::Element(Element::from_start(&e, true)?),
                Event::Text(t) => Node::Text(lossy(&t)),
                Event::CData(t) => Node::CData(lossy(&t)),
                Event::Comment(t) => Node::Comment(lossy(&t)),
                Event::Decl(d) => Node::Declaration(lossy(&d)),
                Event::PI(p) => Node::Instruction(lossy(&p)),
                Event::DocType(t) => Node::DocType(lossy(&t)),
                Event::Eof => break,
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("element <{}> is never closed", open.name));
        }
        if top
            .iter()
            .any(|n| matches!(n, Node::Text(t) | Node::CData(t) if !t.trim().is_empty()))
        {
            return Err("text outside the root element".into());
        }

        let mut prolog = Vec::new();
        let mut root = None;
        let mut epilog = Vec::new();
        for node in top {
            match node {
                Node::Element(e) if root.is_none() => root = Some(e),
                Node::Element(_) => {
                    return Err("document has more than one root element".into());
                }
                other if root.is_none() => prolog.push(other),
                other => epilog.push(other),
            }
        }
        let root = root.ok_or("document has no root element")?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            write_node(&mut out, node);
        }
        write_element(&mut out, &self.root);
        for node in &self.epilog {
            write_node(&mut out, node);
        }
        out
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(e) => write_element(out, e),
        Node::Text(t) => out.push_str(t),
        Node::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Node::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        Node::Declaration(t) | Node::Instruction(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        Node::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t.trim_start());
            out.push('>');
        }
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        let quote = if value.contains('"') { '\'' } else { '"' };
        out.push(' ');
        out.push_str(key);
        out.push('=');
        out.push(quote);
        out.push_str(value);
        out.push(quote);
    }
    if element.children.is_empty() && element.self_closing {
        out.push_str(" />");
        return;
    }
    out.push('>');
    for child in &element.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

// -- Transforms ---------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Verb {
    Replace,
    Insert,
    InsertBefore(String),
    InsertAfter(String),
    Remove,
    RemoveAll,
    SetAttributes(Vec<String>),
    RemoveAttributes(Vec<String>),
}

#[derive(Debug, PartialEq, Eq)]
enum Locator {
    All,
    Match(Vec<String>),
}

impl Locator {
    fn matches(&self, candidate: &Element, transform: &Element) -> bool {
        match self {
            Locator::All => true,
            Locator::Match(names) => names
                .iter()
                .all(|n| candidate.attribute(n) == transform.attribute(n)),
        }
    }
}

enum Position {
    End,
    Before(usize),
    After(usize),
}

/// Attribute names of the transform namespace, bound to the prefix the
/// transform document declares.
struct Directives<'a> {
    prefix: String,
    transform: String,
    locator: String,
    path: &'a Path,
}

impl<'a> Directives<'a> {
    fn new(root: &Element, path: &'a Path) -> Self {
        let prefix = root
            .attributes
            .iter()
            .find_map(|(k, v)| {
                k.strip_prefix("xmlns:")
                    .filter(|_| v == XDT_NAMESPACE)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "xdt".to_string());
        Self {
            transform: format!("{prefix}:Transform"),
            locator: format!("{prefix}:Locator"),
            prefix,
            path,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> TransformError {
        TransformError::InvalidTransformation {
            path: self.path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn is_directive(&self, name: &str) -> bool {
        name.strip_prefix(&self.prefix)
            .is_some_and(|rest| rest.starts_with(':'))
            || name.strip_prefix("xmlns:") == Some(self.prefix.as_str())
    }

    fn own_attributes<'e>(&self, element: &'e Element) -> impl Iterator<Item = &'e (String, String)> {
        element
            .attributes
            .iter()
            .filter(|(k, _)| !self.is_directive(k))
    }

    /// A copy of `element` with every directive attribute removed, recursively.
    fn clean(&self, element: &Element) -> Element {
        Element {
            name: element.name.clone(),
            attributes: self.own_attributes(element).cloned().collect(),
            children: element
                .children
                .iter()
                .map(|n| match n {
                    Node::Element(e) => Node::Element(self.clean(e)),
                    other => other.clone(),
                })
                .collect(),
            self_closing: element.self_closing,
        }
    }

    fn verb(&self, element: &Element) -> Result<Option<Verb>, TransformError> {
        let Some(value) = element.attribute(&self.transform) else {
            return Ok(None);
        };
        let (name, args) = parse_call(value).ok_or_else(|| self.invalid(format!("malformed transform \"{value}\"")))?;
        let verb = match name {
            "Replace" => Verb::Replace,
            "Insert" => Verb::Insert,
            "Remove" => Verb::Remove,
            "RemoveAll" => Verb::RemoveAll,
            "SetAttributes" => Verb::SetAttributes(args),
            "RemoveAttributes" if !args.is_empty() => Verb::RemoveAttributes(args),
            "RemoveAttributes" => return Err(self.invalid("RemoveAttributes needs attribute names")),
            "InsertBefore" => Verb::InsertBefore(self.sibling_name(&args)?),
            "InsertAfter" => Verb::InsertAfter(self.sibling_name(&args)?),
            other => return Err(self.invalid(format!("unsupported transform \"{other}\""))),
        };
        Ok(Some(verb))
    }

    /// The element name an `InsertBefore`/`InsertAfter` argument points at.
    /// Accepts a bare name or a plain path, whose last step is used.
    fn sibling_name(&self, args: &[String]) -> Result<String, TransformError> {
        let arg = args.join(",");
        let last = arg.rsplit('/').next().unwrap_or_default().trim();
        if last.is_empty() || last.contains(['[', ']', '@', '(', ')']) {
            return Err(self.invalid(format!(
                "unsupported insert target \"{arg}\": expected a sibling element name"
            )));
        }
        Ok(last.to_string())
    }

    fn locator(&self, element: &Element) -> Result<Locator, TransformError> {
        let Some(value) = element.attribute(&self.locator) else {
            return Ok(Locator::All);
        };
        match parse_call(value) {
            Some(("Match", args)) if !args.is_empty() => Ok(Locator::Match(args)),
            _ => Err(self.invalid(format!("unsupported locator \"{value}\""))),
        }
    }
}

/// Split `Name(a, b)` into `("Name", ["a", "b"])`. A bare `Name` has no args.
fn parse_call(value: &str) -> Option<(&str, Vec<String>)> {
    let value = value.trim();
    let Some(open) = value.find('(') else {
        return Some((value, Vec::new()));
    };
    let inner = value[open + 1..].strip_suffix(')')?;
    let args = inner
        .split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    Some((value[..open].trim(), args))
}

/// Apply the transform document `transform` (read from `path`) to `target`.
pub fn apply_transform(
    target: &mut XmlDocument,
    transform: &XmlDocument,
    path: &Path,
) -> Result<(), TransformError> {
    let directives = Directives::new(transform.root(), path);
    let transform_root = transform.root();
    let root = &mut target.root;

    if transform_root.name != root.name {
        return Err(directives.invalid(format!(
            "root element <{}> does not match target root <{}>",
            transform_root.name, root.name
        )));
    }
    match directives.verb(transform_root)? {
        None => {}
        Some(Verb::SetAttributes(names)) => set_attributes(root, transform_root, &names, &directives),
        Some(Verb::RemoveAttributes(names)) => remove_attributes(root, &names),
        Some(other) => {
            return Err(directives.invalid(format!("{other:?} is not allowed on the root element")));
        }
    }
    apply_children(root, transform_root, &directives)?;

    root.attributes
        .retain(|(k, v)| !(k.starts_with("xmlns:") && v == XDT_NAMESPACE));
    Ok(())
}

fn apply_children(
    target: &mut Element,
    transform: &Element,
    directives: &Directives<'_>,
) -> Result<(), TransformError> {
    for step in transform.elements() {
        let verb = directives.verb(step)?;
        let locator = directives.locator(step)?;

        match &verb {
            Some(Verb::Insert) => {
                insert_child(target, Position::End, directives.clean(step));
                continue;
            }
            Some(Verb::InsertBefore(sibling) | Verb::InsertAfter(sibling)) => {
                let found = target
                    .children
                    .iter()
                    .position(|n| matches!(n, Node::Element(e) if &e.name == sibling));
                match found {
                    Some(idx) => {
                        let position = if matches!(verb, Some(Verb::InsertBefore(_))) {
                            Position::Before(idx)
                        } else {
                            Position::After(idx)
                        };
                        insert_child(target, position, directives.clean(step));
                    }
                    None => warn!(
                        "{}: no sibling <{}> under <{}> to insert <{}> next to",
                        directives.path.display(),
                        sibling,
                        target.name,
                        step.name
                    ),
                }
                continue;
            }
            _ => {}
        }

        let located: Vec<usize> = target
            .children
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Node::Element(e) if e.name == step.name && locator.matches(e, step) => Some(i),
                _ => None,
            })
            .collect();
        let Some(&first) = located.first() else {
            warn!(
                "{}: no element <{}> under <{}> matches",
                directives.path.display(),
                step.name,
                target.name
            );
            continue;
        };

        match verb {
            None => {
                for idx in located {
                    if let Node::Element(e) = &mut target.children[idx] {
                        apply_children(e, step, directives)?;
                    }
                }
            }
            Some(Verb::Replace) => {
                target.children[first] = Node::Element(directives.clean(step));
            }
            Some(Verb::Remove) => remove_child(target, first),
            Some(Verb::RemoveAll) => {
                for idx in located.into_iter().rev() {
                    remove_child(target, idx);
                }
            }
            Some(Verb::SetAttributes(names)) => {
                for idx in located {
                    if let Node::Element(e) = &mut target.children[idx] {
                        set_attributes(e, step, &names, directives);
                        apply_children(e, step, directives)?;
                    }
                }
            }
            Some(Verb::RemoveAttributes(names)) => {
                for idx in located {
                    if let Node::Element(e) = &mut target.children[idx] {
                        remove_attributes(e, &names);
                        apply_children(e, step, directives)?;
                    }
                }
            }
            Some(Verb::Insert | Verb::InsertBefore(_) | Verb::InsertAfter(_)) => {}
        }
    }
    Ok(())
}

fn set_attributes(
    target: &mut Element,
    step: &Element,
    names: &[String],
    directives: &Directives<'_>,
) {
    for (key, value) in directives.own_attributes(step) {
        if names.is_empty() || names.iter().any(|n| n == key) {
            target.set_attribute(key, value);
        }
    }
}

fn remove_attributes(target: &mut Element, names: &[String]) {
    for name in names {
        target.remove_attribute(name);
    }
}

/// Whitespace that precedes existing child elements, reused for inserted ones.
fn child_indent(parent: &Element) -> Option<String> {
    parent
        .children
        .windows(2)
        .find_map(|pair| match pair {
            [Node::Text(t), Node::Element(_)] if t.trim().is_empty() => Some(t.clone()),
            _ => None,
        })
}

fn insert_child(parent: &mut Element, position: Position, element: Element) {
    let indent = child_indent(parent);
    let element = Node::Element(element);
    match position {
        Position::End => {
            let at = match parent.children.last() {
                Some(Node::Text(t)) if t.trim().is_empty() => parent.children.len() - 1,
                _ => parent.children.len(),
            };
            match indent {
                Some(indent) => {
                    parent.children.insert(at, Node::Text(indent));
                    parent.children.insert(at + 1, element);
                }
                None => parent.children.insert(at, element),
            }
        }
        Position::Before(idx) => {
            parent.children.insert(idx, element);
            if let Some(indent) = indent {
                parent.children.insert(idx + 1, Node::Text(indent));
            }
        }
        Position::After(idx) => {
            parent.children.insert(idx + 1, element);
            if let Some(indent) = indent {
                parent.children.insert(idx + 1, Node::Text(indent));
            }
        }
    }
}

/// Remove the child at `idx` together with the indentation in front of it.
fn remove_child(parent: &mut Element, idx: usize) {
    parent.children.remove(idx);
    if idx > 0 && matches!(&parent.children[idx - 1], Node::Text(t) if t.trim().is_empty()) {
        parent.children.remove(idx - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- app config -->
<configuration>
  <appSettings>
    <add key="env" value="dev" />
    <add key="debug" value="true" />
  </appSettings>
  <connectionStrings>
    <add name="db" connectionString="Server=dev" providerName="System.Data.SqlClient" />
  </connectionStrings>
  <system.web>
    <compilation debug="true" targetFramework="4.8" />
  </system.web>
</configuration>
"#;

    fn run(transform: &str) -> String {
        let mut doc = XmlDocument::parse(BASE).unwrap();
        let transform = XmlDocument::parse(transform).unwrap();
        apply_transform(&mut doc, &transform, Path::new("Web.Release.config")).unwrap();
        doc.to_xml()
    }

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<configuration xmlns:xdt="{XDT_NAMESPACE}">
{body}
</configuration>"#
        )
    }

    #[test]
    fn parse_and_write_is_lossless() {
        let doc = XmlDocument::parse(BASE).unwrap();
        assert_eq!(doc.to_xml(), BASE);
    }

    #[test]
    fn escaped_text_and_cdata_survive() {
        let src = "<a x=\"1 &amp; 2\"><![CDATA[<raw>]]>&lt;b&gt;</a>";
        assert_eq!(XmlDocument::parse(src).unwrap().to_xml(), src);
    }

    #[test]
    fn doctype_and_instructions_survive() {
        let src = "<!DOCTYPE note>\n<?style href=\"a.css\"?>\n<note></note>";
        assert_eq!(XmlDocument::parse(src).unwrap().to_xml(), src);
    }

    #[test]
    fn json_is_not_xml() {
        assert!(XmlDocument::parse("{\"a\": 1}").is_err());
    }

    #[test]
    fn unclosed_element_is_an_error() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a>").is_err());
    }

    #[test]
    fn two_roots_are_an_error() {
        assert!(XmlDocument::parse("<a/><b/>").is_err());
    }

    #[test]
    fn set_attributes_with_match_locator() {
        let out = run(&wrap(
            r#"  <appSettings>
    <add key="env" value="release" xdt:Transform="SetAttributes" xdt:Locator="Match(key)" />
  </appSettings>"#,
        ));
        assert!(out.contains(r#"<add key="env" value="release" />"#));
        assert!(out.contains(r#"<add key="debug" value="true" />"#));
        assert!(!out.contains("xdt"));
    }

    #[test]
    fn set_attributes_limited_to_listed_names() {
        let out = run(&wrap(
            r#"  <system.web>
    <compilation debug="false" targetFramework="9.9" xdt:Transform="SetAttributes(debug)" />
  </system.web>"#,
        ));
        assert!(out.contains(r#"<compilation debug="false" targetFramework="4.8" />"#));
    }

    #[test]
    fn remove_attributes() {
        let out = run(&wrap(
            r#"  <system.web>
    <compilation xdt:Transform="RemoveAttributes(debug)" />
  </system.web>"#,
        ));
        assert!(out.contains(r#"<compilation targetFramework="4.8" />"#));
    }

    #[test]
    fn replace_swaps_whole_element() {
        let out = run(&wrap(
            r#"  <connectionStrings xdt:Transform="Replace">
    <add name="db" connectionString="Server=prod" />
  </connectionStrings>"#,
        ));
        assert!(out.contains(r#"<add name="db" connectionString="Server=prod" />"#));
        assert!(!out.contains("Server=dev"));
        assert!(!out.contains("xmlns:xdt"));
    }

    #[test]
    fn remove_takes_first_match_and_its_indent() {
        let out = run(&wrap(
            r#"  <appSettings>
    <add xdt:Transform="Remove" />
  </appSettings>"#,
        ));
        assert!(!out.contains(r#"key="env""#));
        assert!(out.contains("<appSettings>\n    <add key=\"debug\" value=\"true\" />\n  </appSettings>"));
    }

    #[test]
    fn remove_all_takes_every_match() {
        let out = run(&wrap(
            r#"  <appSettings>
    <add xdt:Transform="RemoveAll" />
  </appSettings>"#,
        ));
        assert!(!out.contains("<add key="));
        assert!(out.contains("<appSettings>\n  </appSettings>"));
    }

    #[test]
    fn insert_appends_with_sibling_indent() {
        let out = run(&wrap(
            r#"  <appSettings>
    <add key="new" value="1" xdt:Transform="Insert" />
  </appSettings>"#,
        ));
        assert!(out.contains(
            "<add key=\"debug\" value=\"true\" />\n    <add key=\"new\" value=\"1\" />\n  </appSettings>"
        ));
    }

    #[test]
    fn insert_before_and_after_named_sibling() {
        let out = run(&wrap(
            r#"  <system.web>
    <authentication mode="Forms" xdt:Transform="InsertBefore(/configuration/system.web/compilation)" />
    <customErrors mode="On" xdt:Transform="InsertAfter(compilation)" />
  </system.web>"#,
        ));
        let auth = out.find("<authentication").unwrap();
        let comp = out.find("<compilation").unwrap();
        let errors = out.find("<customErrors").unwrap();
        assert!(auth < comp && comp < errors);
    }

    #[test]
    fn unmatched_step_leaves_document_alone() {
        let out = run(&wrap(
            r#"  <appSettings>
    <add key="missing" value="x" xdt:Transform="SetAttributes" xdt:Locator="Match(key)" />
  </appSettings>"#,
        ));
        assert_eq!(out, BASE);
    }

    #[test]
    fn custom_prefix_is_recognized() {
        let transform = format!(
            r#"<configuration xmlns:t="{XDT_NAMESPACE}">
  <appSettings>
    <add key="env" value="qa" t:Transform="SetAttributes" t:Locator="Match(key)" />
  </appSettings>
</configuration>"#
        );
        let out = run(&transform);
        assert!(out.contains(r#"<add key="env" value="qa" />"#));
    }

    #[test]
    fn unsupported_locator_is_rejected() {
        let mut doc = XmlDocument::parse(BASE).unwrap();
        let transform = XmlDocument::parse(&wrap(
            r#"  <appSettings xdt:Transform="Replace" xdt:Locator="Condition(@key='x')" />"#,
        ))
        .unwrap();
        let err = apply_transform(&mut doc, &transform, Path::new("t.config")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidTransformation { .. }));
    }

    #[test]
    fn unknown_transform_is_rejected() {
        let mut doc = XmlDocument::parse(BASE).unwrap();
        let transform =
            XmlDocument::parse(&wrap(r#"  <appSettings xdt:Transform="Explode" />"#)).unwrap();
        assert!(apply_transform(&mut doc, &transform, Path::new("t.config")).is_err());
    }

    #[test]
    fn mismatched_root_is_rejected() {
        let mut doc = XmlDocument::parse(BASE).unwrap();
        let transform = XmlDocument::parse("<other/>").unwrap();
        assert!(apply_transform(&mut doc, &transform, Path::new("t.config")).is_err());
    }

    #[test]
    fn parse_call_splits_arguments() {
        assert_eq!(parse_call("Match(name, key)"), Some(("Match", vec!["name".into(), "key".into()])));
        assert_eq!(parse_call("Replace"), Some(("Replace", vec![])));
        assert_eq!(parse_call("Match(name"), None);
    }
}

//! Part descriptor parsing.
//!
//! Descriptors are small XML documents rooted at a `module` element:
//!
//! ```xml
//! <module moduleId="led-red-5mm">
//!   <title>Red LED (5mm)</title>
//!   <properties><property name="family">LED</property></properties>
//!   <tags><tag>LED</tag></tags>
//!   <views><breadboardView><layers image="breadboard/led.svg"/></breadboardView></views>
//!   <connectors>
//!     <connector id="connector0" name="anode" type="male">
//!       <description>positive lead</description>
//!       <views><breadboardView><p svgId="connector0pin" terminalId="connector0terminal"/></breadboardView></views>
//!     </connector>
//!   </connectors>
//! </module>
//! ```

use super::{AssetResolver, ConnectorDefinition, ConnectorKind, ParseError, PartDefinition};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::{BTreeMap, HashSet};

/// The view whose rendering hints are used for the canvas.
const BREADBOARD_VIEW: &str = "breadboardView";

/// Parse a descriptor into a part definition.
///
/// Only the module id is mandatory; every other missing field defaults to
/// empty.
pub fn parse_descriptor<R>(text: &str, resolver: &R) -> Result<PartDefinition, ParseError>
where
    R: AssetResolver + ?Sized,
{
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)
        .map_err(|e| ParseError::MalformedDescriptor(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "module" {
        return Err(ParseError::MissingModuleId);
    }
    let id = root
        .attribute("moduleId")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ParseError::MissingModuleId)?
        .to_string();

    let footprint_ref = view_of(&root)
        .and_then(|view| child(&view, "layers"))
        .and_then(|layers| layers.attribute("image"))
        .filter(|image| !image.trim().is_empty())
        .map(|image| resolver.resolve(image.trim()))
        .unwrap_or_default();

    let connectors = match child(&root, "connectors") {
        Some(node) => parse_connectors(&id, &node)?,
        None => Vec::new(),
    };

    Ok(PartDefinition {
        title: child_text(&root, "title"),
        description: child_text(&root, "description"),
        author: child_text(&root, "author"),
        properties: parse_properties(&root),
        tags: parse_tags(&root),
        footprint_ref,
        connectors,
        id,
    })
}

fn parse_properties(root: &Node) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    let Some(node) = child(root, "properties") else {
        return properties;
    };
    for prop in children(&node, "property") {
        let name = prop.attribute("name").map(str::trim).unwrap_or_default();
        let value = text_of(&prop);
        if !name.is_empty() && !value.is_empty() {
            properties.insert(name.to_string(), value);
        }
    }
    properties
}

fn parse_tags(root: &Node) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    if let Some(node) = child(root, "tags") {
        for tag in children(&node, "tag") {
            let text = text_of(&tag);
            if !text.is_empty() && !tags.contains(&text) {
                tags.push(text);
            }
        }
    }
    tags
}

fn parse_connectors(module_id: &str, node: &Node) -> Result<Vec<ConnectorDefinition>, ParseError> {
    let mut seen = HashSet::new();
    let mut connectors = Vec::new();

    for element in children(node, "connector") {
        let Some(id) = element.attribute("id").map(str::trim).filter(|s| !s.is_empty()) else {
            log::warn!("Skipping connector without id in {}", module_id);
            continue;
        };
        if !seen.insert(id.to_string()) {
            return Err(ParseError::MalformedDescriptor(format!(
                "duplicate connector id '{}' in {}",
                id, module_id
            )));
        }

        let hint = view_of(&element).and_then(|view| child(&view, "p"));
        let hint_attr = |name: &str| {
            hint.and_then(|p| p.attribute(name))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let connector = ConnectorDefinition {
            id: id.to_string(),
            name: element.attribute("name").unwrap_or_default().to_string(),
            kind: ConnectorKind::from_descriptor(element.attribute("type").unwrap_or_default()),
            description: child_text(&element, "description"),
            svg_id: hint_attr("svgId"),
            terminal_id: hint_attr("terminalId"),
            local_position: None,
        };
        if !connector.has_view_hint() {
            log::debug!(
                "Connector {} of {} has no breadboard hint and cannot take wires",
                connector.id,
                module_id
            );
        }
        connectors.push(connector);
    }
    Ok(connectors)
}

/// The breadboard view under `node`'s `views` element.
fn view_of<'a, 'input>(node: &Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    child(node, "views").and_then(|views| child(&views, BREADBOARD_VIEW))
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: &Node, name: &str) -> String {
    child(node, name).map(|n| text_of(&n)).unwrap_or_default()
}

fn text_of(node: &Node) -> String {
    node.text().map(str::trim).unwrap_or_default().to_string()
}

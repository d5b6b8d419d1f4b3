//! Minimal element tree over the QVD header XML.
//!
//! The header only uses element text (no attributes carry data), so the tree keeps for every
//! element its name, its concatenated text and its child elements in document order. Repeated
//! children (`QvdFieldHeader`, `String` tags) stay a list regardless of how many there are.

use std::{fmt::Display, str::FromStr};

use quick_xml::{events::Event, Reader};

use crate::Result;

/// One XML element with its text and children.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Element {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of a child element, `None` if the child is missing or empty
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// Text of a child element that must be present
    pub fn required_text(&self, name: &str) -> Result<&str> {
        match self.child(name) {
            Some(child) => Ok(child.text.trim()),
            None => Err(malformed_error!(
                "Missing required element '{}' in '{}'",
                name,
                self.name
            )),
        }
    }

    /// Base-10 number held by a child element that must be present
    pub fn number<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.required_text(name)?;
        text.parse::<T>().map_err(|error| {
            malformed_error!(
                "Element '{}' in '{}' is not a valid number ('{}'): {}",
                name,
                self.name,
                text,
                error
            )
        })
    }

    /// Base-10 number held by an optional child element; missing or empty yields `None`
    pub fn optional_number<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional_text(name) {
            Some(_) => self.number(name).map(Some),
            None => Ok(None),
        }
    }
}

/// Parses an XML document into its root [`Element`].
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the XML is not well-formed, has no root element or
/// more than one.
pub(crate) fn parse_document(xml: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(Element::new(e.name().as_ref())),
            Ok(Event::Empty(e)) => attach(&mut stack, &mut root, Element::new(e.name().as_ref()))?,
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed_error!("Unbalanced closing tag in header XML"));
                };
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|error| {
                    malformed_error!("Failed to decode header XML text: {}", error)
                })?;
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(element) = stack.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(malformed_error!(
                    "Failed to read header XML at position {}: {}",
                    reader.error_position(),
                    error
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(malformed_error!("Unclosed element '{}' in header XML", open.name));
    }

    root.ok_or_else(|| malformed_error!("No root element found in header XML"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(malformed_error!(
            "Header XML has more than one root element ('{}')",
            element.name
        ));
    }

    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn tree() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<QvdTableHeader>
  <TableName>Orders &amp; Items</TableName>
  <Fields>
    <QvdFieldHeader><FieldName>A</FieldName></QvdFieldHeader>
  </Fields>
  <Comment/>
</QvdTableHeader>"#;

        let root = parse_document(xml).unwrap();
        assert_eq!(root.name, "QvdTableHeader");
        assert_eq!(
            root.optional_text("TableName").as_deref(),
            Some("Orders & Items")
        );
        assert_eq!(root.optional_text("Comment"), None);

        let fields: Vec<_> = root
            .child("Fields")
            .unwrap()
            .children_named("QvdFieldHeader")
            .collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].required_text("FieldName").unwrap(), "A");
    }

    #[test]
    fn numbers() {
        let root =
            parse_document(b"<H><Count> 12 </Count><Bias>-2</Bias><Bad>x1</Bad><Empty></Empty></H>")
                .unwrap();
        assert_eq!(root.number::<usize>("Count").unwrap(), 12);
        assert_eq!(root.number::<i64>("Bias").unwrap(), -2);
        assert!(matches!(
            root.number::<usize>("Bad"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            root.number::<usize>("Missing"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            root.number::<usize>("Empty"),
            Err(Error::Malformed { .. })
        ));
        assert_eq!(root.optional_number::<usize>("Empty").unwrap(), None);
        assert_eq!(root.optional_number::<usize>("Count").unwrap(), Some(12));
    }

    #[test]
    fn malformed() {
        assert!(parse_document(b"").is_err());
        assert!(parse_document(b"<A><B></A>").is_err());
        assert!(parse_document(b"<A>").is_err());
        assert!(parse_document(b"<A/><B/>").is_err());
    }
}

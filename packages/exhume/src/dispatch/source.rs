//! Feeding XML sources through the dispatcher.
//!
//! Tokenizing is delegated to quick-xml's namespace-aware reader; this
//! module only translates its events into dispatcher calls.

use std::fs::File;
use std::io::{BufRead, BufReader};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;

use super::engine::Dispatcher;
use crate::error::Result;
use crate::event::{Attribute, Attributes, ElementName};

impl Dispatcher<'_> {
    /// Parse an XML document held in memory.
    ///
    /// # Errors
    ///
    /// Returns the first parser, conversion or handler error; the parse
    /// stops there.
    pub fn parse_str(&mut self, xml: &str) -> Result<()> {
        self.parse_reader(xml.as_bytes())
    }

    /// Parse an XML file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened, otherwise as
    /// [`Dispatcher::parse_str`].
    pub fn parse_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(file = %path.display(), "Parsing file");
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse XML from any buffered byte stream.
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::parse_str`], plus IO errors from the stream.
    pub fn parse_reader<R: BufRead>(&mut self, source: R) -> Result<()> {
        let mut reader = NsReader::from_reader(source);
        self.begin();
        let result = self.drive(&mut reader);
        self.finish(result.is_ok());
        result
    }

    fn drive<R: BufRead>(&mut self, reader: &mut NsReader<R>) -> Result<()> {
        let namespace_aware = self.options().namespace_aware;
        let mut buf = Vec::new();

        loop {
            let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = namespace_uri(resolved)?.filter(|_| namespace_aware);

            match event {
                Event::Start(start) => {
                    let name = element_name(start.name(), namespace)?;
                    self.start_element(name, || {
                        read_attributes(reader, &start, namespace_aware)
                    })?;
                }
                Event::Empty(start) => {
                    let name = element_name(start.name(), namespace)?;
                    self.start_element(name.clone(), || {
                        read_attributes(reader, &start, namespace_aware)
                    })?;
                    self.end_element(name)?;
                }
                Event::End(end) => {
                    let name = element_name(end.name(), namespace)?;
                    self.end_element(name)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    self.characters(&text);
                }
                Event::CData(cdata) => {
                    self.characters(std::str::from_utf8(&cdata)?);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }
}

fn element_name(name: QName<'_>, namespace: Option<String>) -> Result<ElementName> {
    let qualified = std::str::from_utf8(name.as_ref())?;
    Ok(ElementName::new(qualified).with_namespace(namespace))
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(std::str::from_utf8(uri)?.to_string())),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => Ok(None),
    }
}

fn read_attributes<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    namespace_aware: bool,
) -> Result<Attributes> {
    let mut attributes = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let namespace = if namespace_aware {
            let (resolved, _) = reader.resolve_attribute(attr.key);
            namespace_uri(resolved)?
        } else {
            None
        };
        let name = element_name(attr.key, namespace)?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push(Attribute { name, value });
    }
    Ok(attributes)
}

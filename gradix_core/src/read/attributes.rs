use std::{
    collections::{hash_map::Entry, HashMap},
    str::FromStr,
};

use anyhow::{bail, Result};
use quick_xml::{events::BytesStart, Reader};

use super::XmlReaderConversions;

#[derive(Debug)]
pub(crate) struct Attributes {
    data: HashMap<String, String>,
}

impl Attributes {
    /// Creates a new Attributes object by parsing out all the attributes of the
    /// specified tag. Keys are stored without any namespace prefix.
    pub(crate) fn new<R>(tag: &BytesStart<'_>, xml_reader: &Reader<R>) -> Result<Self> {
        let mut data = HashMap::new();

        for attr in tag.attributes() {
            let attr = attr?;
            let key = xml_reader.bytes_to_string(attr.key.local_name().as_ref())?;
            let value = attr.unescape_value()?.into_owned();

            data.insert(key, value);
        }

        Ok(Self { data })
    }

    /// Removes an optional attribute and returns its raw value.
    pub(crate) fn take(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    /// Gets a mandatory attribute. The attribute is removed from the list
    /// of attributes and returned to the caller.
    pub(crate) fn get<T>(&mut self, key: &str, element: &str) -> Result<T>
    where
        T: FromStr,
    {
        let value = match self.data.entry(key.to_owned()) {
            Entry::Occupied(occupied_entry) => occupied_entry.remove(),
            _ => bail!("Mandatory attribute '{key}' was missing on the '{element}' element"),
        };

        match value.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => bail!(
                "Could not parse attribute '{key}' value {value:?} into {}",
                std::any::type_name::<T>()
            ),
        }
    }
}

use crate::avp::Avp;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Either the still-undecoded payload or the parsed child AVPs, never both at
/// once: decoding a Grouped AVP is memoized (the first access to `avps()`
/// parses and caches), and `set_avps` explicitly invalidates the raw form.
#[derive(Debug, Clone)]
enum GroupedState {
    Raw(Vec<u8>),
    Parsed(Vec<Avp>),
}

#[derive(Debug, Clone)]
pub struct GroupedAvp {
    dict: Arc<Dictionary>,
    state: RefCell<GroupedState>,
}

impl GroupedAvp {
    pub fn new(avps: Vec<Avp>, dict: Arc<Dictionary>) -> GroupedAvp {
        GroupedAvp {
            dict,
            state: RefCell::new(GroupedState::Parsed(avps)),
        }
    }

    /// Wraps an undecoded payload; the child AVPs are parsed lazily on first access.
    pub fn from_raw(raw: Vec<u8>, dict: Arc<Dictionary>) -> GroupedAvp {
        GroupedAvp {
            dict,
            state: RefCell::new(GroupedState::Raw(raw)),
        }
    }

    fn ensure_parsed(&self) -> Result<()> {
        let needs_parse = matches!(&*self.state.borrow(), GroupedState::Raw(_));
        if !needs_parse {
            return Ok(());
        }
        let raw = match self.state.replace(GroupedState::Parsed(Vec::new())) {
            GroupedState::Raw(raw) => raw,
            GroupedState::Parsed(_) => unreachable!(),
        };
        let mut avps = Vec::new();
        let mut cursor = std::io::Cursor::new(&raw);
        let mut offset = 0usize;
        while offset < raw.len() {
            let avp = Avp::decode_from(&mut cursor, Arc::clone(&self.dict))
                .map_err(|e| Error::BadGrouped(format!("{}", e)))?;
            offset += (avp.get_length() + avp.get_padding() as u32) as usize;
            avps.push(avp);
        }
        if offset != raw.len() {
            return Err(Error::BadGrouped(
                "child AVPs did not exactly fill the grouped payload".into(),
            ));
        }
        self.state.replace(GroupedState::Parsed(avps));
        Ok(())
    }

    /// Returns the parsed child AVPs, parsing (and caching) on first access.
    pub fn avps(&self) -> Result<Ref<'_, Vec<Avp>>> {
        self.ensure_parsed()?;
        Ok(Ref::map(self.state.borrow(), |s| match s {
            GroupedState::Parsed(avps) => avps,
            GroupedState::Raw(_) => unreachable!(),
        }))
    }

    /// Replaces the child AVPs, discarding any cached raw payload.
    pub fn set_avps(&mut self, avps: Vec<Avp>) {
        self.state = RefCell::new(GroupedState::Parsed(avps));
    }

    pub fn encode_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        match &*self.state.borrow() {
            GroupedState::Raw(raw) => writer.write_all(raw)?,
            GroupedState::Parsed(avps) => {
                for avp in avps {
                    avp.encode_to(writer)?;
                }
            }
        }
        Ok(())
    }

    pub fn length(&self) -> u32 {
        match &*self.state.borrow() {
            GroupedState::Raw(raw) => raw.len() as u32,
            GroupedState::Parsed(avps) => avps
                .iter()
                .map(|avp| avp.get_length() + avp.get_padding() as u32)
                .sum(),
        }
    }
}

impl PartialEq for GroupedAvp {
    fn eq(&self, other: &Self) -> bool {
        match (self.avps(), other.avps()) {
            (Ok(a), Ok(b)) => *a == *b,
            _ => false,
        }
    }
}

impl fmt::Display for GroupedAvp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.avps() {
            Ok(avps) => {
                for avp in avps.iter() {
                    write!(f, "\n  {}", avp)?;
                }
                Ok(())
            }
            Err(e) => write!(f, "<malformed grouped avp: {}>", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avp::enumerated::EnumeratedAvp;
    use crate::avp::unsigned32::Unsigned32Avp;
    use crate::avp::Avp;
    use crate::dictionary::{self, Dictionary};

    fn dict() -> Arc<Dictionary> {
        Arc::new(Dictionary::new(&[&dictionary::DEFAULT_DICT_XML]))
    }

    #[test]
    fn test_new_grouped_avp() {
        let dict = dict();
        let grouped = GroupedAvp::new(
            vec![
                Avp::new(416, None, EnumeratedAvp::new(1).into(), true, false),
                Avp::new(415, None, Unsigned32Avp::new(1000).into(), true, false),
            ],
            Arc::clone(&dict),
        );
        let avps = grouped.avps().unwrap();
        assert_eq!(avps.len(), 2);
        assert_eq!(avps[0].get_code(), 416);
        assert_eq!(avps[1].get_code(), 415);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let dict = dict();
        let grouped = GroupedAvp::new(
            vec![
                Avp::new(416, None, EnumeratedAvp::new(1).into(), true, false),
                Avp::new(415, None, Unsigned32Avp::new(1000).into(), true, false),
            ],
            Arc::clone(&dict),
        );
        let mut encoded = Vec::new();
        grouped.encode_to(&mut encoded).unwrap();

        let decoded = GroupedAvp::from_raw(encoded, Arc::clone(&dict));
        let avps = decoded.avps().unwrap();
        assert_eq!(avps.len(), 2);
        assert_eq!(avps[0].get_code(), 416);
        assert_eq!(avps[1].get_code(), 415);
        assert_eq!(avps[0].get_enumerated().unwrap(), 1);
        assert_eq!(avps[1].get_unsigned32().unwrap(), 1000);
    }

    #[test]
    fn test_memoized_parse_is_idempotent() {
        let dict = dict();
        let grouped = GroupedAvp::new(
            vec![Avp::new(416, None, EnumeratedAvp::new(1).into(), true, false)],
            Arc::clone(&dict),
        );
        let mut encoded = Vec::new();
        grouped.encode_to(&mut encoded).unwrap();
        let decoded = GroupedAvp::from_raw(encoded, dict);
        let first = decoded.avps().unwrap().len();
        let second = decoded.avps().unwrap().len();
        assert_eq!(first, second);
    }
}

use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;

use super::trie::{LexStore, TrieLexicon, HEADER_SIZE, MAGIC, VERSION};
use super::LexiconError;

impl TrieLexicon {
    pub fn to_bytes(&self) -> Result<Vec<u8>, LexiconError> {
        let (nodes, attrs) = match &self.store {
            LexStore::Owned { nodes, attrs } => (nodes.as_slice(), attrs.as_slice()),
            LexStore::Mapped { .. } => {
                return Err(LexiconError::Parse(
                    "cannot serialize mmap-backed lexicon".into(),
                ));
            }
        };

        let nodes_len: u32 = nodes
            .len()
            .try_into()
            .map_err(|_| LexiconError::Parse("node region exceeds u32::MAX".to_string()))?;
        let attrs_len: u32 = attrs
            .len()
            .try_into()
            .map_err(|_| LexiconError::Parse("attribute region exceeds u32::MAX".to_string()))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + nodes.len() + attrs.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&nodes_len.to_ne_bytes());
        buf.extend_from_slice(&attrs_len.to_ne_bytes());
        buf.extend_from_slice(nodes);
        buf.extend_from_slice(attrs);
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, LexiconError> {
        let (nodes_len, attrs_len) = parse_header(data)?;
        let nodes_start = HEADER_SIZE;
        let attrs_start = nodes_start + nodes_len;
        Ok(Self {
            store: LexStore::Owned {
                nodes: data[nodes_start..attrs_start].to_vec(),
                attrs: data[attrs_start..attrs_start + attrs_len].to_vec(),
            },
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), LexiconError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Memory-map a lexicon file. The mapping stays read-only for the
    /// lifetime of the lexicon.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let file = File::open(path)?;
        // Safety: the file is opened read-only and never truncated by this
        // process while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        let (nodes_len, attrs_len) = parse_header(&mmap)?;
        Ok(Self {
            store: LexStore::Mapped {
                mmap,
                nodes_len,
                attrs_len,
            },
        })
    }
}

fn parse_header(data: &[u8]) -> Result<(usize, usize), LexiconError> {
    if data.len() < 5 {
        return Err(LexiconError::InvalidHeader);
    }
    if &data[..4] != MAGIC {
        return Err(LexiconError::InvalidMagic);
    }
    if data[4] != VERSION {
        return Err(LexiconError::UnsupportedVersion(data[4]));
    }
    if data.len() < HEADER_SIZE {
        return Err(LexiconError::InvalidHeader);
    }
    let nodes_len = u32::from_ne_bytes(data[8..12].try_into().unwrap()) as usize;
    let attrs_len = u32::from_ne_bytes(data[12..16].try_into().unwrap()) as usize;
    if data.len() < HEADER_SIZE + nodes_len + attrs_len {
        return Err(LexiconError::InvalidHeader);
    }
    Ok((nodes_len, attrs_len))
}

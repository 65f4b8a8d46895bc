//! Codec lookup by id.

use tracing::{debug, warn};

use crate::codec::{Codec, CodecId};
use crate::compress::{
    EliasLzCodec, ExternalCodec, ExternalTool, PletterCodec, RawCodec, RleCodec, Variant,
};
use crate::error::{Error, Result};

/// Environment variable naming a Pletter-format compressor command line.
pub const PLETTER_TOOL_ENV: &str = "RETROPACK_PLETTER_TOOL";

/// Environment variable naming a full-layout Elias LZ compressor command line.
pub const ELIAS_TOOL_ENV: &str = "RETROPACK_ELIAS_TOOL";

/// Optional pieces of a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Tool registered as [`CodecId::ExternalPletter`].
    pub pletter_tool: Option<ExternalTool>,
    /// Tool registered as [`CodecId::ExternalEliasFull`].
    pub elias_tool: Option<ExternalTool>,
}

impl RegistryOptions {
    /// Read tool command lines from [`PLETTER_TOOL_ENV`] and
    /// [`ELIAS_TOOL_ENV`]. Unset or blank variables leave the codec
    /// unconfigured.
    pub fn from_env() -> Self {
        let tool = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|command| ExternalTool::parse(&command))
        };
        Self {
            pletter_tool: tool(PLETTER_TOOL_ENV),
            elias_tool: tool(ELIAS_TOOL_ENV),
        }
    }

    /// Register a Pletter-format tool.
    pub fn with_pletter_tool(mut self, tool: ExternalTool) -> Self {
        self.pletter_tool = Some(tool);
        self
    }

    /// Register a full-layout Elias LZ tool.
    pub fn with_elias_tool(mut self, tool: ExternalTool) -> Self {
        self.elias_tool = Some(tool);
        self
    }
}

/// One slot per [`CodecId`].
pub struct Registry {
    codecs: [Option<Box<dyn Codec>>; CodecId::ALL.len()],
}

impl Registry {
    /// The in-crate codecs: raw, run-length, Pletter and both Elias layouts.
    pub fn builtin() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Built-in codecs plus the configured external tools.
    pub fn with_options(options: RegistryOptions) -> Self {
        let mut registry = Self {
            codecs: Default::default(),
        };
        registry.insert(Box::new(RawCodec));
        registry.insert(Box::new(RleCodec::new()));
        registry.insert(Box::new(PletterCodec::new()));
        registry.insert(Box::new(EliasLzCodec::new(Variant::Mini)));
        registry.insert(Box::new(EliasLzCodec::new(Variant::Full)));
        if let Some(tool) = options.pletter_tool {
            registry.insert(Box::new(ExternalCodec::pletter(tool)));
        }
        if let Some(tool) = options.elias_tool {
            registry.insert(Box::new(ExternalCodec::elias_full(tool)));
        }
        registry
    }

    /// Register `codec` under its own id, replacing any previous entry.
    pub fn insert(&mut self, codec: Box<dyn Codec>) {
        let slot = codec.id().as_u8() as usize;
        self.codecs[slot] = Some(codec);
    }

    /// Look up a codec by its persisted id.
    pub fn get(&self, id: u8) -> Result<&dyn Codec> {
        let id = CodecId::try_from(id)?;
        self.codecs[id.as_u8() as usize]
            .as_deref()
            .ok_or(Error::CodecUnavailable(id.as_u8()))
    }

    /// Registered codecs in id order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().filter_map(|codec| codec.as_deref())
    }

    /// Compress with every registered codec and keep the smallest output.
    ///
    /// Codecs that fail are skipped; on equal sizes the lower id wins. Raw is
    /// always registered, so this only fails when every codec does.
    pub fn compress_smallest(&self, data: &[u8]) -> Result<(CodecId, Vec<u8>)> {
        let mut best: Option<(CodecId, Vec<u8>)> = None;
        let mut last_error = None;

        for codec in self.iter() {
            match codec.compress(data) {
                Ok(stream) => {
                    debug!(codec = codec.name(), size = stream.len(), "candidate");
                    if best.as_ref().map_or(true, |(_, b)| stream.len() < b.len()) {
                        best = Some((codec.id(), stream));
                    }
                }
                Err(err) => {
                    warn!(codec = codec.name(), error = %err, "codec skipped");
                    last_error = Some(err);
                }
            }
        }

        best.ok_or_else(|| last_error.unwrap_or(Error::CodecUnavailable(CodecId::Raw.as_u8())))
    }

    /// Decode `data` with the codec registered under `id`.
    pub fn uncompress(&self, id: u8, data: &[u8]) -> Result<Vec<u8>> {
        self.get(id)?.uncompress(data)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|codec| codec.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids() {
        let registry = Registry::builtin();
        for id in 0..=4u8 {
            assert_eq!(registry.get(id).unwrap().id().as_u8(), id);
        }
        assert_eq!(registry.get(5).unwrap_err(), Error::CodecUnavailable(5));
        assert_eq!(registry.get(6).unwrap_err(), Error::CodecUnavailable(6));
        assert_eq!(registry.get(200).unwrap_err(), Error::UnknownCodec(200));
    }

    #[test]
    fn test_external_slots() {
        let options = RegistryOptions::default()
            .with_pletter_tool(ExternalTool::new("pletter"))
            .with_elias_tool(ExternalTool::new("zx7"));
        let registry = Registry::with_options(options);
        assert_eq!(registry.get(5).unwrap().name(), "external-pletter");
        assert_eq!(registry.get(6).unwrap().name(), "external-elias-full");
        assert_eq!(registry.iter().count(), 7);
    }

    #[test]
    fn test_compress_smallest_prefers_lz_on_repetitive_data() {
        let registry = Registry::builtin();
        let data = b"ABCDABCDABCDABCDABCDABCDABCDABCD".repeat(8);
        let (id, stream) = registry.compress_smallest(&data).unwrap();
        assert_ne!(id, CodecId::Raw);
        assert!(stream.len() < data.len());
        assert_eq!(registry.uncompress(id.as_u8(), &stream).unwrap(), data);
    }

    #[test]
    fn test_compress_smallest_empty_input() {
        let (id, stream) = Registry::builtin().compress_smallest(&[]).unwrap();
        assert_eq!(id, CodecId::Raw);
        assert!(stream.is_empty());
    }
}

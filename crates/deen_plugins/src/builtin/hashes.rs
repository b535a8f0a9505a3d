use crate::error::Result;
use crate::plugin_trait::Plugin;
use deen_domain::{Category, PluginDescriptor};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::marker::PhantomData;

/// One-way digest plugin. Output is the lower-case hex digest as ASCII text.
pub struct DigestPlugin<D> {
    descriptor: PluginDescriptor,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> DigestPlugin<D> {
    pub fn new(descriptor: PluginDescriptor) -> Self {
        Self {
            descriptor,
            _digest: PhantomData,
        }
    }
}

impl<D: Digest> Plugin for DigestPlugin<D> {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(hex::encode(D::digest(data)).into_bytes())
    }
}

pub fn sha1() -> DigestPlugin<Sha1> {
    DigestPlugin::new(
        PluginDescriptor::new("sha1", "SHA1", Category::Hash).help("SHA-1 hash of data"),
    )
}

pub fn sha256() -> DigestPlugin<Sha256> {
    DigestPlugin::new(
        PluginDescriptor::new("sha256", "SHA256", Category::Hash).help("SHA-256 hash of data"),
    )
}

pub fn sha512() -> DigestPlugin<Sha512> {
    DigestPlugin::new(
        PluginDescriptor::new("sha512", "SHA512", Category::Hash).help("SHA-512 hash of data"),
    )
}

use crate::{
    expr::{Expression, Path, PathRoot, Step},
    value::Value,
};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// Fingerprint
///
/// SHA-256 digest of an expression or query structure. Equal structures
/// produce equal fingerprints across runs.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub(crate) fn of(feed: impl FnOnce(&mut Sha256)) -> Self {
        let mut hasher = Sha256::new();
        feed(&mut hasher);

        Self(hasher.finalize().into())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

/// Hash expression structure into the hash stream.
pub(crate) fn hash_expression(hasher: &mut Sha256, expression: &Expression) {
    match expression {
        Expression::Constant(constant) => {
            write_tag(hasher, 0x01);
            write_str(hasher, &constant.kind.to_string());
            write_value(hasher, &constant.value);
        }
        Expression::Path(path) => {
            write_tag(hasher, 0x02);
            hash_path(hasher, path);
        }
        Expression::Call { operator, args } => {
            write_tag(hasher, 0x03);
            write_tag(hasher, operator.tag());
            write_len_u32(hasher, args.len());
            for arg in args {
                hash_expression(hasher, arg);
            }
        }
    }
}

pub(crate) fn hash_path(hasher: &mut Sha256, path: &Path) {
    match path.path_root() {
        PathRoot::Record(model) => {
            write_tag(hasher, 0x10);
            write_str(hasher, model.name);
        }
        PathRoot::Element(kind) => {
            write_tag(hasher, 0x11);
            write_str(hasher, &kind.to_string());
        }
    }

    write_len_u32(hasher, path.segments().len());
    for segment in path.segments() {
        match segment.step() {
            Step::Field(name) => {
                write_tag(hasher, 0x12);
                write_str(hasher, name);
            }
            Step::Index(index) => {
                write_tag(hasher, 0x13);
                write_len_u32(hasher, *index);
            }
        }
    }
}

///
/// Encode one value as rank + normal form.
///

fn write_value(hasher: &mut Sha256, value: &Value) {
    write_tag(hasher, value.canonical_rank());
    write_str(hasher, &value.to_string());
}

///
/// Encode one string with length prefix into the hash stream.
///

pub(crate) fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
pub(crate) fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

pub(crate) fn write_u64(hasher: &mut Sha256, value: u64) {
    hasher.update(value.to_be_bytes());
}

pub(crate) fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

pub mod canonical;

pub use canonical::{
    canonicalize, stable_hash, stable_hash_of, stable_stringify, stable_stringify_of,
    CanonicalError,
};

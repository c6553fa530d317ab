pub(crate) mod blob;
pub(crate) mod clock;
pub(crate) mod sweep;

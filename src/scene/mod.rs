pub(crate) mod model;
pub(crate) mod resolve;
pub(crate) mod validate;

pub(crate) mod naming;
pub(crate) mod reference;
pub(crate) mod resolver;

pub(crate) mod interactive;
pub(crate) mod meta;
pub(crate) mod output;
pub(crate) mod profile;
pub(crate) mod search;
pub(crate) mod shared;

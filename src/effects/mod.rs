pub(crate) mod blur;
